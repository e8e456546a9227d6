// Audio output boundary. The sequencer never touches the device directly:
// it registers decoded buffers and fires triggers through an `AudioSink`,
// and the cpal-backed implementation mixes them on the stream thread.

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};

mod engine;
mod frame;
mod sample_buffer;
mod sample_id;
mod voice;

pub use frame::StereoFrame;
pub use sample_buffer::SampleBuffer;
pub use sample_id::{SampleId, next_sample_id};

use engine::Engine;

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The stream callback can't load files, so buffers are decoded and
    // scaled up front, registered once, and triggered by id after that.
    Register { id: SampleId, buffer: SampleBuffer },
    Trigger { id: SampleId },
}

/// What the sequencing core needs from an audio backend. Both calls are
/// non-blocking; a trigger is fire-and-forget and nothing reports playback
/// completion back.
pub trait AudioSink: Send + Sync {
    /// Rate buffers should be resampled to before registration.
    fn sample_rate(&self) -> u32;
    fn register(&self, id: SampleId, buffer: SampleBuffer);
    fn trigger(&self, id: SampleId);
}

/// Sink for contexts that never play anything (exports, offline tools).
pub struct NullSink;

impl AudioSink for NullSink {
    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn register(&self, _id: SampleId, _buffer: SampleBuffer) {}

    fn trigger(&self, _id: SampleId) {}
}

/// Cloneable command side of the backend. The stream itself lives in
/// `AudioStream` because cpal streams are pinned to the thread that made
/// them; this half is safe to hand to channels on any thread.
#[derive(Clone)]
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    sample_rate: u32,
}

/// Keep-alive for the output stream. Playback stops when this drops; hold it
/// on the thread that called `start_audio`.
pub struct AudioStream {
    _output_stream: cpal::Stream,
}

impl AudioSink for AudioHandle {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn register(&self, id: SampleId, buffer: SampleBuffer) {
        let buffer = buffer.resampled(self.sample_rate);
        let _ = self.tx.try_send(AudioCommand::Register { id, buffer });
    }

    fn trigger(&self, id: SampleId) {
        let _ = self.tx.try_send(AudioCommand::Trigger { id });
    }
}

pub fn start_audio() -> anyhow::Result<(AudioHandle, AudioStream)> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(1024);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let config = device
        .default_output_config()
        .context("no default output config")?;

    let sample_rate = config.sample_rate();
    let channels = config.channels() as usize;

    match config.sample_format() {
        cpal::SampleFormat::F32 => {
            let output_stream =
                build_output_stream_f32(&device, &config.into(), rx, channels)?;
            output_stream.play().context("failed to play output stream")?;

            Ok((
                AudioHandle { tx, sample_rate },
                AudioStream { _output_stream: output_stream },
            ))
        }
        _ => anyhow::bail!("unsupported sample format (only f32 supported for now)"),
    }
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut engine = Engine::new();
    let mut scratch: Vec<StereoFrame> = Vec::new();

    let err_fn = |err| eprintln!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels;
            scratch.resize(n_frames, StereoFrame::zero());
            engine.render_block(&mut scratch);

            // interleave back out for whatever channel layout the device has
            for (frame, out) in scratch.iter().zip(data.chunks_exact_mut(channels)) {
                out[0] = frame.left;
                if channels > 1 {
                    out[1] = frame.right;
                }
                for extra in out.iter_mut().skip(2) {
                    *extra = 0.0;
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
