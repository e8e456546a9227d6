use std::path::Path;
use std::sync::Arc;

use crate::audio::AudioSink;
use crate::clock::Clock;
use crate::config::SamplerConfig;
use crate::error::{Result, SamplerError};
use crate::loader::{self, PatternBankDoc};
use crate::pattern::Pattern;

use super::SampleBank;

/// Pattern + bank + clock, wired into looping playback.
///
/// One thread owns the sampler and drives `play_loop`; triggered samples mix
/// on the audio thread and are never waited on. Mutating the pattern or bank
/// while a loop runs is the caller's problem to avoid — there is no internal
/// locking.
#[derive(Debug)]
pub struct LoopingSampler {
    channel_count: usize,
    bank: SampleBank,
    pattern: Option<Pattern>,
    clock: Clock,
}

impl LoopingSampler {
    /// A sampler with an empty bank sized to the configured channel count
    /// and no pattern yet. Fails when the tempo or grid is degenerate.
    pub fn new(config: SamplerConfig, sink: Arc<dyn AudioSink>) -> Result<Self> {
        Ok(Self {
            channel_count: config.channel_count,
            bank: SampleBank::new(config.channel_count, sink),
            pattern: None,
            clock: Clock::new(config.step_count, config.bpm)?,
        })
    }

    /// Boot a sampler from a combined pattern+bank JSON document: the bank
    /// is sized to the document's sample list, the pattern to its rows.
    pub fn from_pattern_file(
        path: &Path,
        bpm: u32,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        let doc: PatternBankDoc = loader::load_pattern_bank_doc(path)?;
        let pattern = loader::pattern_from_rows(&doc.pattern)?;
        let bank =
            SampleBank::from_entries(&doc.name, doc.description.as_deref(), &doc.samples, sink.clone())?;

        let mut sampler = Self {
            channel_count: bank.len(),
            clock: Clock::new(pattern.step_count(), bpm)?,
            bank,
            pattern: None,
        };
        sampler.set_pattern(pattern);
        Ok(sampler)
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    pub fn set_pattern(&mut self, pattern: Pattern) {
        self.pattern = Some(pattern);
    }

    pub fn bank(&self) -> &SampleBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut SampleBank {
        &mut self.bank
    }

    pub fn set_bank(&mut self, bank: SampleBank) {
        self.bank = bank;
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// One-shot, non-blocking channel trigger (pads mode).
    pub fn play_channel(&self, channel: usize) -> Result<()> {
        self.bank.channel(channel)?.play();
        Ok(())
    }

    /// Sweep the pattern until the clock is stopped. The stop flag is
    /// checked once per sweep, so a sweep in progress always finishes.
    pub fn play_loop(&mut self) -> Result<()> {
        while self.clock.is_running() {
            self.play_pattern()?;
        }
        Ok(())
    }

    /// One full sweep: for every step, fire every channel whose step is set,
    /// then let the clock pace to the next step. Requires a pattern.
    pub fn play_pattern(&mut self) -> Result<()> {
        let Self { channel_count, bank, pattern, clock } = self;
        let pattern = pattern.as_ref().ok_or(SamplerError::NoPattern)?;

        for step in 0..clock.step_count() {
            for channel in 0..*channel_count {
                if pattern.is_step_set(channel, step)? {
                    bank.channel(channel)?.play();
                }
            }
            clock.beat();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::testutil::{CountingSink, scratch_path, write_wav_fixture};
    use std::sync::atomic::Ordering;

    fn sampler_with_sink(config: SamplerConfig) -> (LoopingSampler, Arc<CountingSink>) {
        let sink = Arc::new(CountingSink::default());
        (LoopingSampler::new(config, sink.clone()).unwrap(), sink)
    }

    fn loaded_pattern(channel_count: usize, lines: &[&str]) -> Pattern {
        let mut pattern = Pattern::new(channel_count, 16).unwrap();
        pattern.set_from_lines(lines).unwrap();
        pattern
    }

    fn load_all_channels(sampler: &mut LoopingSampler, count: usize) -> Vec<std::path::PathBuf> {
        (0..count)
            .map(|i| {
                let path = write_wav_fixture("loop", &[i as i16, 2, 3]);
                sampler.bank_mut().set_sample(i, Some(&path)).unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn zero_bpm_is_rejected_at_construction() {
        let sink: Arc<dyn AudioSink> = Arc::new(CountingSink::default());
        let err = LoopingSampler::new(SamplerConfig::with_bpm(0), sink).unwrap_err();
        assert!(matches!(err, SamplerError::InvalidBpm(0)));
    }

    #[test]
    fn play_pattern_without_a_pattern_is_a_precondition_error() {
        let (mut sampler, _sink) = sampler_with_sink(SamplerConfig::default());
        assert!(matches!(sampler.play_pattern(), Err(SamplerError::NoPattern)));
    }

    #[test]
    fn every_other_channel_fires_half_the_grid() {
        let (mut sampler, sink) = sampler_with_sink(SamplerConfig::default());
        let paths = load_all_channels(&mut sampler, 8);

        // even channels on every step, odd channels silent
        let all_on = "xxxxxxxxxxxxxxxx";
        let lines: Vec<&str> = (0..8).map(|c| if c % 2 == 0 { all_on } else { "" }).collect();
        sampler.set_pattern(loaded_pattern(8, &lines));

        // clock stays stopped: beats are no-ops so the sweep runs instantly
        sampler.play_pattern().unwrap();
        assert_eq!(sink.triggers.load(Ordering::SeqCst), 16 * 8 / 2);
        assert_eq!(sampler.clock().counter(), 0);

        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn play_channel_is_a_one_shot_trigger() {
        let (mut sampler, sink) = sampler_with_sink(SamplerConfig::default());
        let paths = load_all_channels(&mut sampler, 8);
        sampler.play_channel(3).unwrap();
        assert_eq!(sink.triggers.load(Ordering::SeqCst), 1);
        assert!(matches!(
            sampler.play_channel(8),
            Err(SamplerError::ChannelOutOfRange { got: 8, max: 7 })
        ));
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn silent_channels_never_trigger() {
        let (mut sampler, sink) = sampler_with_sink(SamplerConfig::default());
        let paths = load_all_channels(&mut sampler, 8);
        sampler.set_pattern(loaded_pattern(8, &[]));
        sampler.play_pattern().unwrap();
        assert_eq!(sink.triggers.load(Ordering::SeqCst), 0);
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn loop_with_a_stopped_clock_returns_without_a_sweep() {
        let (mut sampler, sink) = sampler_with_sink(SamplerConfig::default());
        let paths = load_all_channels(&mut sampler, 8);
        sampler.set_pattern(loaded_pattern(8, &["xxxxxxxxxxxxxxxx"]));
        sampler.play_loop().unwrap();
        assert_eq!(sink.triggers.load(Ordering::SeqCst), 0);
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn loop_finishes_the_sweep_in_which_stop_lands() {
        // bpm 15 at 16 steps is 64 steps/sec, so the one sweep takes ~250ms
        let config = SamplerConfig { channel_count: 2, step_count: 16, bpm: 15 };
        let (mut sampler, sink) = sampler_with_sink(config);
        let paths = load_all_channels(&mut sampler, 2);
        sampler.set_pattern(loaded_pattern(2, &["xxxxxxxxxxxxxxxx", "xxxxxxxxxxxxxxxx"]));

        // the sink stops the clock on the very first trigger; the loop must
        // still deliver the rest of that sweep and then exit
        *sink.stop_on_trigger.lock().unwrap() = Some(sampler.clock().switch());
        sampler.clock().start();
        sampler.play_loop().unwrap();

        assert_eq!(sink.triggers.load(Ordering::SeqCst), 32);
        assert!(!sampler.clock().is_running());
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn from_pattern_file_wires_pattern_and_bank() {
        let kick = write_wav_fixture("dockick", &[1, 2, 3]);
        let snare = write_wav_fixture("docsnare", &[4, 5, 6]);
        let doc = format!(
            r#"{{
                "name": "GarageKit2024",
                "description": "two-piece kit",
                "pattern": [
                    "1   1.2 1.3 1.4 ",
                    "x   x   x   x   ",
                    "  x   x   x   x "
                ],
                "samples": [
                    {{"name": "kick", "path": "{}"}},
                    {{"name": "snare", "path": "{}"}}
                ]
            }}"#,
            kick.display(),
            snare.display()
        );
        let path = scratch_path("patternbank", ".json");
        std::fs::write(&path, doc).unwrap();

        let sink = Arc::new(CountingSink::default());
        let sampler = LoopingSampler::from_pattern_file(&path, 120, sink).unwrap();

        assert_eq!(sampler.channel_count(), 2);
        assert_eq!(sampler.bank().len(), 2);
        assert_eq!(sampler.bank().name(), Some("GarageKi")); // 8-char cap
        let pattern = sampler.pattern().unwrap();
        assert_eq!(pattern.channel_count(), 2);
        assert_eq!(pattern.step_count(), 16);
        assert!(pattern.is_step_set(0, 0).unwrap());
        assert!(pattern.is_step_set(1, 2).unwrap());
        assert_eq!(sampler.clock().bpm(), 120);

        for p in [path, kick, snare] {
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn from_pattern_file_rejects_non_json() {
        let sink: Arc<dyn AudioSink> = Arc::new(CountingSink::default());
        let err = LoopingSampler::from_pattern_file(Path::new("beat.txt"), 120, sink).unwrap_err();
        assert!(matches!(err, SamplerError::UnsupportedPatternFile(_)));
    }
}
