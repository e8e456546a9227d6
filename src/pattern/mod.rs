// Multi-channel step grid. Channels and steps are 0-indexed everywhere in
// this API; anything user-facing adds 1 at the display layer.

use std::fmt;

use crate::config::{BEATS_PER_BAR, DEFAULT_CHANNEL_COUNT, DEFAULT_STEP_COUNT, SIXTEENTHS_PER_BAR};
use crate::error::{Result, SamplerError};

mod text;

pub use text::{OFF_CHAR, is_header_line};

/// Which channel fires on which step. Shape is fixed at construction and
/// only changes through an explicit `reset`.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    grid: Vec<Vec<bool>>,
    channel_volumes: Vec<f32>,
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_COUNT, DEFAULT_STEP_COUNT)
            .unwrap_or_else(|_| unreachable!("default dimensions are valid"))
    }
}

impl Pattern {
    pub fn new(channel_count: usize, step_count: usize) -> Result<Self> {
        let mut pattern = Self { grid: Vec::new(), channel_volumes: Vec::new() };
        pattern.reset(channel_count, step_count)?;
        Ok(pattern)
    }

    /// Reallocate the grid to the given dimensions, all steps off.
    pub fn reset(&mut self, channel_count: usize, step_count: usize) -> Result<()> {
        if channel_count < 1 {
            return Err(SamplerError::InvalidChannelCount(channel_count));
        }
        self.grid = vec![vec![false; step_count]; channel_count];
        self.channel_volumes = vec![1.0; channel_count];
        Ok(())
    }

    pub fn channel_count(&self) -> usize {
        self.grid.len()
    }

    pub fn step_count(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    pub fn is_step_set(&self, channel: usize, step: usize) -> Result<bool> {
        self.validate_channel(channel)?;
        if step >= self.step_count() {
            return Err(SamplerError::StepOutOfRange {
                got: step,
                max: self.step_count().saturating_sub(1),
            });
        }
        Ok(self.grid[channel][step])
    }

    pub fn set_step(&mut self, channel: usize, step: usize, on: bool) -> Result<()> {
        // bounds check through the read path
        self.is_step_set(channel, step)?;
        self.grid[channel][step] = on;
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.grid
    }

    pub fn channel_volumes(&self) -> &[f32] {
        &self.channel_volumes
    }

    pub fn set_channel_volumes(&mut self, volumes: Vec<f32>) -> Result<()> {
        if volumes.len() != self.channel_count() {
            return Err(SamplerError::LengthMismatch {
                expected: self.channel_count(),
                got: volumes.len(),
            });
        }
        self.channel_volumes = volumes;
        Ok(())
    }

    fn validate_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channel_count() {
            return Err(SamplerError::ChannelOutOfRange {
                got: channel,
                max: self.channel_count() - 1,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Pattern {
    /// Ruler line plus one `x`/`.` row per channel. The output feeds back
    /// through `set_from_lines` to the same grid, since the ruler starts
    /// with '1' and gets stripped on ingestion.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ruler = build_ruler(self.step_count());
        if !ruler.is_empty() {
            writeln!(f, "{ruler}")?;
        }
        for row in &self.grid {
            let line: String = row.iter().map(|&on| if on { 'x' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// `1   1.2 1.3 1.4 2   2.2 …` — four marks per bar, one bar per sixteen
/// steps.
fn build_ruler(step_count: usize) -> String {
    let mut ruler = String::new();
    for bar in 0..step_count / SIXTEENTHS_PER_BAR {
        for beat in 0..BEATS_PER_BAR {
            if beat == 0 {
                ruler.push_str(&format!("{}   ", bar + 1));
            } else {
                ruler.push_str(&format!("{}.{} ", bar + 1, beat + 1));
            }
        }
    }
    ruler
}
