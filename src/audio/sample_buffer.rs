use std::path::Path;

use crate::error::{Result, SamplerError};

use super::frame::StereoFrame;

/// Decoded PCM audio at a known sample rate.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    /// Decode a WAV file at its native sample rate.
    ///
    /// Integer samples are normalized to [-1, 1]; mono files are duplicated
    /// to both sides. A missing file is a `SampleNotFound` rather than a
    /// generic read error so loaders can report which sample is absent.
    pub fn load_wav(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SamplerError::SampleNotFound(path.to_path_buf()));
        }

        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let max = (1i32 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let data: Vec<StereoFrame> = if spec.channels == 1 {
            samples
                .into_iter()
                .map(|x| StereoFrame { left: x, right: x })
                .collect()
        } else {
            samples
                .chunks_exact(spec.channels as usize)
                .map(|c| StereoFrame {
                    left: c[0],
                    right: if c.len() > 1 { c[1] } else { c[0] },
                })
                .collect()
        };

        Ok(Self { data, sample_rate: spec.sample_rate })
    }

    /// A copy with every sample multiplied by `gain` and clamped to the
    /// f32 PCM range. Always derive this from an unscaled buffer; scaling a
    /// scaled buffer compounds the gain.
    pub fn scaled(&self, gain: f32) -> Self {
        let data = self
            .data
            .iter()
            .map(|f| StereoFrame {
                left: (f.left * gain).clamp(-1.0, 1.0),
                right: (f.right * gain).clamp(-1.0, 1.0),
            })
            .collect();
        Self { data, sample_rate: self.sample_rate }
    }

    /// Linear resample to `target_rate`. Identity when rates already match.
    pub fn resampled(&self, target_rate: u32) -> Self {
        if self.sample_rate == target_rate || self.data.is_empty() {
            return Self { data: self.data.clone(), sample_rate: target_rate };
        }

        let ratio = target_rate as f64 / self.sample_rate as f64;
        let out_len = (self.data.len() as f64 * ratio).ceil() as usize;
        let mut out = Vec::with_capacity(out_len);

        for i in 0..out_len {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            let frac = (src_pos - idx as f64) as f32;
            if idx >= self.data.len().saturating_sub(1) {
                out.push(*self.data.last().unwrap_or(&StereoFrame::zero()));
            } else {
                let a = self.data[idx];
                let b = self.data[idx + 1];
                out.push(StereoFrame {
                    left: a.left * (1.0 - frac) + b.left * frac,
                    right: a.right * (1.0 - frac) + b.right * frac,
                });
            }
        }
        Self { data: out, sample_rate: target_rate }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
