use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::{AudioSink, SampleBuffer};
use crate::error::{Result, SamplerError};
use crate::loader::{BankDoc, SampleEntry};

use super::Channel;

/// Hardware bank names are capped at 8 characters (Squid Salmple format).
const MAX_NAME_LEN: usize = 8;

/// A fixed-size collection of channels. The shape never changes after
/// construction; the contents do.
#[derive(Debug)]
pub struct SampleBank {
    channels: Vec<Channel>,
    name: Option<String>,
    description: Option<String>,
}

impl SampleBank {
    pub fn new(channel_count: usize, sink: Arc<dyn AudioSink>) -> Self {
        Self {
            channels: (0..channel_count)
                .map(|i| Channel::new(i, sink.clone()))
                .collect(),
            name: None,
            description: None,
        }
    }

    /// Build a bank from a validated bank document, sized to its sample
    /// list. Decoding happens before any channel is touched, so a missing
    /// file leaves the bank empty rather than half-loaded.
    pub fn from_doc(doc: &BankDoc, sink: Arc<dyn AudioSink>) -> Result<Self> {
        Self::from_entries(&doc.name, doc.description.as_deref(), &doc.samples, sink)
    }

    pub fn from_entries(
        name: &str,
        description: Option<&str>,
        entries: &[SampleEntry],
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self> {
        let mut bank = Self::new(entries.len(), sink);
        bank.set_name(Some(name.to_string()));
        bank.description = description.map(str::to_string);
        bank.set_samples(entries)?;
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel(&self, channel: usize) -> Result<&Channel> {
        self.validate_channel(channel)?;
        Ok(&self.channels[channel])
    }

    pub fn channel_mut(&mut self, channel: usize) -> Result<&mut Channel> {
        self.validate_channel(channel)?;
        Ok(&mut self.channels[channel])
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn set_sample(&mut self, channel: usize, path: Option<&Path>) -> Result<()> {
        self.channel_mut(channel)?.set_sample(path)
    }

    pub fn sample_paths(&self) -> Vec<Option<&Path>> {
        self.channels.iter().map(Channel::sample_path).collect()
    }

    /// Bulk sample assignment, all-or-nothing: the entry list must match the
    /// channel count exactly, and every referenced file must decode before
    /// any channel changes.
    pub fn set_samples(&mut self, entries: &[SampleEntry]) -> Result<()> {
        if entries.len() != self.channels.len() {
            return Err(SamplerError::LengthMismatch {
                expected: self.channels.len(),
                got: entries.len(),
            });
        }

        let mut decoded: Vec<Option<(PathBuf, SampleBuffer)>> = Vec::with_capacity(entries.len());
        for entry in entries {
            match &entry.path {
                Some(path) => {
                    let path = PathBuf::from(path);
                    let buffer = SampleBuffer::load_wav(&path)?;
                    decoded.push(Some((path, buffer)));
                }
                None => decoded.push(None),
            }
        }

        for ((channel, entry), sample) in self.channels.iter_mut().zip(entries).zip(decoded) {
            // entries without a name clear any previous one, so a reload
            // never pairs an old name with a new sample
            channel.set_name(entry.name.clone());
            match sample {
                Some((path, buffer)) => channel.install_sample(path, buffer),
                None => channel.set_sample(None)?,
            }
        }
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name.map(|n| {
            if n.chars().count() > MAX_NAME_LEN {
                n.chars().take(MAX_NAME_LEN).collect()
            } else {
                n
            }
        });
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn channel_volumes(&self) -> Vec<f32> {
        self.channels.iter().map(Channel::volume).collect()
    }

    pub fn set_channel_volumes(&mut self, volumes: &[f32]) -> Result<()> {
        if volumes.len() != self.channels.len() {
            return Err(SamplerError::LengthMismatch {
                expected: self.channels.len(),
                got: volumes.len(),
            });
        }
        for (channel, &db) in self.channels.iter_mut().zip(volumes) {
            channel.set_volume(db);
        }
        Ok(())
    }

    fn validate_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels.len() {
            return Err(SamplerError::ChannelOutOfRange {
                got: channel,
                max: self.channels.len().saturating_sub(1),
            });
        }
        Ok(())
    }
}

impl fmt::Display for SampleBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for channel in &self.channels {
            writeln!(f, "{channel}")?;
        }
        Ok(())
    }
}
