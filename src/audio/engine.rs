use std::collections::HashMap;

use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;
use super::voice::Voice;
use super::AudioCommand;

const MAX_VOICES: usize = 32; // fixed pool so triggers never malloc a voice

/// The mixer that runs inside the output stream callback. Buffers arrive
/// pre-scaled and pre-resampled; all the engine does is hold them and mix
/// whatever voices are live.
pub struct Engine {
    samples: HashMap<SampleId, SampleBuffer>,
    voices: [Voice; MAX_VOICES],
}

impl Engine {
    pub fn new() -> Self {
        Self {
            samples: HashMap::new(),
            voices: [Voice::idle(); MAX_VOICES],
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Register { id, buffer } => {
                // re-registering under the same id swaps the buffer; live
                // voices on the old data end themselves at the new bounds
                self.samples.insert(id, buffer);
            }
            AudioCommand::Trigger { id } => self.trigger(id),
        }
    }

    fn trigger(&mut self, id: SampleId) {
        if !self.samples.contains_key(&id) {
            return;
        }
        // steal the first slot if every voice is busy
        let slot = self.voices.iter().position(|v| !v.active).unwrap_or(0);
        self.voices[slot] = Voice::start(id);
    }

    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        for voice in &mut self.voices {
            if !voice.active {
                continue;
            }
            if let Some(buffer) = self.samples.get(&voice.sample) {
                voice.render_into(buffer, out);
            } else {
                voice.active = false;
            }
        }
    }

    #[cfg(test)]
    fn live_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.active).count()
    }
}
