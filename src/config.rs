// Every tunable default lives here so the rest of the crate never hardcodes
// channel/step/bpm numbers.

pub const DEFAULT_CHANNEL_COUNT: usize = 8;
pub const DEFAULT_STEP_COUNT: usize = 16;
pub const DEFAULT_BPM: u32 = 120;

pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const BEATS_PER_BAR: usize = 4;
pub const SIXTEENTHS_PER_BAR: usize = 16;

/// Construction-time configuration for a sampler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    pub channel_count: usize,
    pub step_count: usize,
    pub bpm: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            channel_count: DEFAULT_CHANNEL_COUNT,
            step_count: DEFAULT_STEP_COUNT,
            bpm: DEFAULT_BPM,
        }
    }
}

impl SamplerConfig {
    pub fn with_bpm(bpm: u32) -> Self {
        Self { bpm, ..Self::default() }
    }
}
