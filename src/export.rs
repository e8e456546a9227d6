// Export banks to the ALM Squid Salmple card layout: a `Bank {n}` folder of
// 16-bit 44.1 kHz mono WAVs named `chan-00{n}.wav` (1-based).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::audio::NullSink;
use crate::bank_init;
use crate::error::{Result, SamplerError};
use crate::loader;
use crate::sampler::{Channel, SampleBank};

pub const EXPORT_SAMPLE_RATE: u32 = 44_100;

const EXPORT_SPEC: hound::WavSpec = hound::WavSpec {
    channels: 1,
    sample_rate: EXPORT_SAMPLE_RATE,
    bits_per_sample: 16,
    sample_format: hound::SampleFormat::Int,
};

pub fn sample_output_path(bank_dir: &Path, channel_index: usize) -> PathBuf {
    bank_dir.join(format!("chan-00{}.wav", channel_index + 1))
}

pub fn bank_output_path(set_dir: &Path, bank_number: usize) -> PathBuf {
    set_dir.join(format!("Bank {bank_number}"))
}

/// Write one channel's volume-applied sample into `bank_dir`, converted to
/// the hardware format. Fails if the channel has nothing loaded.
pub fn write_channel(channel: &Channel, bank_dir: &Path) -> Result<PathBuf> {
    let buffer = channel
        .sample()
        .ok_or(SamplerError::NoSample(channel.index()))?;

    let path = sample_output_path(bank_dir, channel.index());
    fs::create_dir_all(bank_dir)?;

    let converted = buffer.resampled(EXPORT_SAMPLE_RATE);
    let mut writer = hound::WavWriter::create(&path, EXPORT_SPEC)?;
    for frame in &converted.data {
        let mono = (frame.left + frame.right) / 2.0;
        writer.write_sample((mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(path)
}

/// Export every loaded channel of a bank into `Bank {bank_number}` under
/// `set_dir`. Channels without samples are skipped rather than failing the
/// rest of the bank.
pub fn write_bank(bank: &SampleBank, bank_number: usize, set_dir: &Path) -> Result<Vec<PathBuf>> {
    let bank_dir = bank_output_path(set_dir, bank_number);
    fs::create_dir_all(&bank_dir)?;

    let mut written = Vec::new();
    for channel in bank.channels() {
        if channel.has_sample() {
            written.push(write_channel(channel, &bank_dir)?);
        }
    }
    Ok(written)
}

/// Load a bank document and export it as one numbered bank.
pub fn export_bank(bank_file: &Path, bank_number: usize, set_dir: &Path) -> Result<Vec<PathBuf>> {
    let doc = loader::load_bank_doc(bank_file)?;
    let bank = SampleBank::from_doc(&doc, Arc::new(NullSink))?;
    write_bank(&bank, bank_number, set_dir)
}

/// Export a whole set: every subdirectory of `input_dir` holding a bank
/// document becomes the next numbered bank under `output_dir`.
pub fn export_set(input_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(SamplerError::NotADirectory(input_dir.to_path_buf()));
    }
    fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    let bank_dirs = bank_init::subdirectories_with(input_dir, "json")?;
    for (index, bank_dir) in bank_dirs.iter().enumerate() {
        let Some(bank_file) = first_json_file(bank_dir)? else {
            continue;
        };
        written.extend(export_bank(&bank_file, index + 1, output_dir)?);
    }
    Ok(written)
}

fn first_json_file(directory: &Path) -> Result<Option<PathBuf>> {
    let mut jsons: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    jsons.sort();
    Ok(jsons.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::testutil::{scratch_path, write_wav_fixture};

    fn loaded_bank(samples: usize) -> (SampleBank, Vec<PathBuf>) {
        let mut bank = SampleBank::new(samples, Arc::new(NullSink));
        let paths: Vec<PathBuf> = (0..samples)
            .map(|i| {
                let path = write_wav_fixture("export", &[(i as i16 + 1) * 1000; 8]);
                bank.set_sample(i, Some(&path)).unwrap();
                path
            })
            .collect();
        (bank, paths)
    }

    #[test]
    fn writes_hardware_format_wavs_with_one_based_names() {
        let (bank, fixtures) = loaded_bank(2);
        let set_dir = scratch_path("set", "");

        let written = write_bank(&bank, 1, &set_dir).unwrap();
        assert_eq!(
            written,
            vec![
                set_dir.join("Bank 1").join("chan-001.wav"),
                set_dir.join("Bank 1").join("chan-002.wav"),
            ]
        );

        let reader = hound::WavReader::open(&written[0]).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, EXPORT_SAMPLE_RATE);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 8);

        let _ = fs::remove_dir_all(set_dir);
        for f in fixtures {
            let _ = fs::remove_file(f);
        }
    }

    #[test]
    fn empty_channel_cannot_be_written_alone() {
        let bank = SampleBank::new(1, Arc::new(NullSink));
        let err = write_channel(bank.channel(0).unwrap(), &scratch_path("none", "")).unwrap_err();
        assert!(matches!(err, SamplerError::NoSample(0)));
    }

    #[test]
    fn bank_export_skips_empty_channels() {
        let mut bank = SampleBank::new(2, Arc::new(NullSink));
        let fixture = write_wav_fixture("partial", &[1000; 4]);
        bank.set_sample(1, Some(&fixture)).unwrap();

        let set_dir = scratch_path("partialset", "");
        let written = write_bank(&bank, 3, &set_dir).unwrap();
        assert_eq!(written, vec![set_dir.join("Bank 3").join("chan-002.wav")]);

        let _ = fs::remove_dir_all(set_dir);
        let _ = fs::remove_file(fixture);
    }

    #[test]
    fn export_set_numbers_banks_by_directory_order() {
        let input = scratch_path("setin", "");
        let output = scratch_path("setout", "");
        let mut fixtures = Vec::new();
        for kit in ["a-kit", "b-kit"] {
            let dir = input.join(kit);
            fs::create_dir_all(&dir).unwrap();
            let wav = write_wav_fixture(kit, &[500; 4]);
            let doc = format!(
                r#"{{"name": "{kit}", "samples": [{{"path": "{}"}}]}}"#,
                wav.display()
            );
            fs::write(dir.join("bank.json"), doc).unwrap();
            fixtures.push(wav);
        }

        let written = export_set(&input, &output).unwrap();
        assert_eq!(
            written,
            vec![
                output.join("Bank 1").join("chan-001.wav"),
                output.join("Bank 2").join("chan-001.wav"),
            ]
        );

        for d in [input, output] {
            let _ = fs::remove_dir_all(d);
        }
        for f in fixtures {
            let _ = fs::remove_file(f);
        }
    }
}
