use super::frame::StereoFrame;
use super::sample_buffer::SampleBuffer;
use super::sample_id::SampleId;

/// One in-flight playback of a registered buffer. Plays the whole buffer
/// front to back, then frees itself; there is no cancellation path.
#[derive(Clone, Copy, Debug)]
pub struct Voice {
    pub sample: SampleId,
    pos: usize,
    pub active: bool,
}

impl Voice {
    pub fn idle() -> Self {
        Self { sample: SampleId(0), pos: 0, active: false }
    }

    pub fn start(sample: SampleId) -> Self {
        Self { sample, pos: 0, active: true }
    }

    /// Mix this voice into `out`, advancing the play position.
    pub fn render_into(&mut self, buffer: &SampleBuffer, out: &mut [StereoFrame]) {
        if !self.active {
            return;
        }

        for frame in out.iter_mut() {
            // buffer may have been swapped for a shorter one mid-flight
            let Some(sample) = buffer.data.get(self.pos) else {
                self.active = false;
                break;
            };
            frame.left += sample.left;
            frame.right += sample.right;
            self.pos += 1;
        }

        if self.pos >= buffer.len() {
            self.active = false;
        }
    }
}
