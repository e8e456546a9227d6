// Text ingestion for patterns: one line per channel, `x`/`X` for an active
// step, space or `.` for a rest.

use crate::error::{Result, SamplerError};

use super::Pattern;

pub const OFF_CHAR: char = '.';

/// Ruler lines (`1   1.2 1.3 1.4` or `1234…`) are presentation, not pattern
/// data. They are recognized by the leading '1'.
pub fn is_header_line(line: &str) -> bool {
    line.starts_with('1')
}

impl Pattern {
    /// Populate the grid from text lines.
    ///
    /// A leading ruler line is discarded. Short lines are right-padded with
    /// rests. Lines only overwrite the channels they name; channels past the
    /// last line keep their current steps.
    pub fn set_from_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
        let lines = match lines.first() {
            Some(first) if is_header_line(first) => &lines[1..],
            _ => &lines[..],
        };

        self.validate_lines(lines)?;

        for (channel, line) in lines.iter().enumerate() {
            let mut chars = line.chars();
            for step in 0..self.step_count() {
                let ch = chars.next().unwrap_or(OFF_CHAR);
                self.set_step(channel, step, ch.eq_ignore_ascii_case(&'x'))?;
            }
        }
        Ok(())
    }

    fn validate_lines(&self, lines: &[&str]) -> Result<()> {
        if lines.len() > self.channel_count() {
            return Err(SamplerError::TooManyLines {
                got: lines.len(),
                max: self.channel_count(),
            });
        }
        for (index, line) in lines.iter().enumerate() {
            let len = line.chars().count();
            if len > self.step_count() {
                return Err(SamplerError::LineTooLong {
                    line: index + 1,
                    got: len,
                    max: self.step_count(),
                });
            }
            for ch in line.chars() {
                if !matches!(ch, ' ' | '.' | 'x' | 'X') {
                    return Err(SamplerError::InvalidPatternChar { ch, line: index + 1 });
                }
            }
        }
        Ok(())
    }
}
