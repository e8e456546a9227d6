//! octobeat — an 8-channel step-sequencer sampler.
//!
//! The core is the pattern/sequencer engine: a [`Pattern`] grid of which
//! channel fires on which step, a [`SampleBank`] of per-channel samples, a
//! drift-corrected [`Clock`], and the [`LoopingSampler`] that sweeps the
//! pattern over the bank in time. Audio decode and playback sit behind the
//! [`audio::AudioSink`] boundary.

pub mod audio;
pub mod bank_init;
pub mod clock;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod pattern;
pub mod sampler;

pub use clock::{Clock, ClockSwitch};
pub use config::SamplerConfig;
pub use error::{Result, SamplerError};
pub use pattern::Pattern;
pub use sampler::{Channel, LoopingSampler, SampleBank};
