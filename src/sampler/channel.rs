use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{AudioSink, SampleBuffer, SampleId, next_sample_id};
use crate::error::Result;

/// One sample-playback voice of the bank.
///
/// The channel keeps two buffers: the raw decode (`original`) and the
/// volume-scaled copy it actually registers for playback. Volume changes
/// always re-derive from the original, so they never compound.
pub struct Channel {
    index: usize,
    name: Option<String>,
    sample_path: Option<PathBuf>,
    original: Option<SampleBuffer>,
    playable: Option<SampleBuffer>,
    volume_db: f32,
    id: SampleId,
    sink: Arc<dyn AudioSink>,
}

impl Channel {
    pub fn new(index: usize, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            index,
            name: None,
            sample_path: None,
            original: None,
            playable: None,
            volume_db: 0.0,
            id: next_sample_id(),
            sink,
        }
    }

    /// Decode the WAV at `path` and make it this channel's sample, at the
    /// current volume. `None` clears the channel without error.
    pub fn set_sample(&mut self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let original = SampleBuffer::load_wav(path)?;
                self.sample_path = Some(path.to_path_buf());
                self.original = Some(original);
                self.apply_volume();
            }
            None => {
                self.sample_path = None;
                self.original = None;
                self.playable = None;
            }
        }
        Ok(())
    }

    /// Install an already-decoded buffer. Lets the bank's bulk setter decode
    /// everything before committing anything.
    pub(crate) fn install_sample(&mut self, path: PathBuf, original: SampleBuffer) {
        self.sample_path = Some(path);
        self.original = Some(original);
        self.apply_volume();
    }

    /// Set the channel volume in decibels (0 = unity).
    pub fn set_volume(&mut self, db: f32) {
        self.volume_db = db;
        if self.original.is_some() {
            self.apply_volume();
        }
    }

    fn apply_volume(&mut self) {
        let Some(original) = &self.original else { return };
        let gain = 10f32.powf(self.volume_db / 10.0);
        let playable = original.scaled(gain);
        self.sink.register(self.id, playable.clone());
        self.playable = Some(playable);
    }

    /// Fire-and-forget playback trigger. No-op when no sample is loaded;
    /// never blocks and never waits for completion.
    pub fn play(&self) {
        if self.playable.is_some() {
            self.sink.trigger(self.id);
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn sample_path(&self) -> Option<&Path> {
        self.sample_path.as_deref()
    }

    /// The playable (volume-applied) buffer, if a sample is loaded.
    pub fn sample(&self) -> Option<&SampleBuffer> {
        self.playable.as_ref()
    }

    pub fn has_sample(&self) -> bool {
        self.playable.is_some()
    }

    pub fn volume(&self) -> f32 {
        self.volume_db
    }
}

impl fmt::Debug for Channel {
    // `sink` is a trait object with no Debug bound, so it is skipped
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("index", &self.index)
            .field("name", &self.name)
            .field("sample_path", &self.sample_path)
            .field("original", &self.original)
            .field("playable", &self.playable)
            .field("volume_db", &self.volume_db)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Channel {
    // 1-based numbering for humans, "name: path" when the channel is named
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.index + 1)?;
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        match &self.sample_path {
            Some(path) => write!(f, "{}", path.display()),
            None => write!(f, "-"),
        }
    }
}
