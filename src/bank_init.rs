// Turn a directory of WAV files into a bank.json document, so a folder of
// samples can be dropped straight into the sampler or the exporter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SamplerError};
use crate::loader::{BankDoc, SampleEntry};

pub const BANK_FILE: &str = "bank.json";

#[derive(Debug)]
pub struct BankInitializer {
    directory: PathBuf,
    force: bool,
    recursive: bool,
    ignore_existing: bool,
}

impl BankInitializer {
    pub fn new(directory: &Path) -> Result<Self> {
        if !directory.is_dir() {
            return Err(SamplerError::NotADirectory(directory.to_path_buf()));
        }
        Ok(Self {
            directory: directory.to_path_buf(),
            force: false,
            recursive: false,
            ignore_existing: false,
        })
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Initialize every sample subdirectory instead of the directory itself.
    /// Existing bank files in subdirectories are left alone.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self.ignore_existing = recursive;
        self
    }

    /// Write the bank file(s). In recursive mode each subdirectory that
    /// holds WAVs gets its own; otherwise the directory itself must hold at
    /// least one WAV.
    pub fn run(&self) -> Result<Vec<PathBuf>> {
        if self.recursive {
            let subdirs = subdirectories_with(&self.directory, "wav")?;
            if !subdirs.is_empty() {
                let mut written = Vec::new();
                for subdir in subdirs {
                    let child = BankInitializer {
                        directory: subdir,
                        force: self.force,
                        recursive: self.recursive,
                        ignore_existing: self.ignore_existing,
                    };
                    written.extend(child.run()?);
                }
                return Ok(written);
            }
        }
        self.write_bank_file()
    }

    fn write_bank_file(&self) -> Result<Vec<PathBuf>> {
        let bank_path = self.directory.join(BANK_FILE);
        if bank_path.exists() {
            if self.ignore_existing {
                return Ok(Vec::new());
            }
            if !self.force {
                return Err(SamplerError::BankExists(self.directory.clone()));
            }
        }

        let wavs = wav_files(&self.directory)?;
        if wavs.is_empty() && !self.recursive {
            return Err(SamplerError::NoWavFiles(self.directory.clone()));
        }

        let doc = self.to_bank_doc(&wavs);
        fs::write(&bank_path, serde_json::to_string_pretty(&doc)?)?;
        Ok(vec![bank_path])
    }

    fn to_bank_doc(&self, wavs: &[PathBuf]) -> BankDoc {
        let name = self
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        BankDoc {
            name,
            description: Some(String::new()),
            samples: wavs
                .iter()
                .map(|path| SampleEntry {
                    name: path
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned()),
                    path: Some(path.display().to_string()),
                })
                .collect(),
        }
    }
}

fn wav_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut wavs: Vec<PathBuf> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("wav"))
        .collect();
    wavs.sort();
    Ok(wavs)
}

/// Subdirectories holding files with the given suffix, or further
/// subdirectories worth descending into.
pub(crate) fn subdirectories_with(directory: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let interesting = fs::read_dir(&path)?.filter_map(|e| e.ok()).any(|e| {
            let p = e.path();
            p.is_dir() || p.extension().and_then(|x| x.to_str()) == Some(suffix)
        });
        if interesting {
            subdirs.push(path);
        }
    }
    subdirs.sort();
    Ok(subdirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;
    use crate::sampler::testutil::scratch_path;

    fn make_dir_with_wavs(stem: &str, names: &[&str]) -> PathBuf {
        let dir = scratch_path(stem, "");
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            // content doesn't matter to the initializer, only the suffix
            fs::write(dir.join(name), b"RIFF").unwrap();
        }
        dir
    }

    #[test]
    fn writes_a_bank_doc_listing_the_wavs() {
        let dir = make_dir_with_wavs("init", &["kick.wav", "snare.wav", "notes.txt"]);
        let written = BankInitializer::new(&dir).unwrap().run().unwrap();
        assert_eq!(written, vec![dir.join(BANK_FILE)]);

        let doc = loader::load_bank_doc(&written[0]).unwrap();
        assert_eq!(doc.samples.len(), 2);
        assert_eq!(doc.samples[0].name.as_deref(), Some("kick"));
        assert_eq!(doc.samples[1].name.as_deref(), Some("snare"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn refuses_a_directory_without_wavs() {
        let dir = make_dir_with_wavs("empty", &[]);
        let err = BankInitializer::new(&dir).unwrap().run().unwrap_err();
        assert!(matches!(err, SamplerError::NoWavFiles(_)));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = make_dir_with_wavs("exists", &["kick.wav"]);
        let init = BankInitializer::new(&dir).unwrap();
        init.run().unwrap();
        let err = BankInitializer::new(&dir).unwrap().run().unwrap_err();
        assert!(matches!(err, SamplerError::BankExists(_)));
        assert!(BankInitializer::new(&dir).unwrap().force(true).run().is_ok());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn recursive_mode_initializes_each_sample_subdirectory() {
        let root = scratch_path("recursive", "");
        for kit in ["kit-a", "kit-b"] {
            let sub = root.join(kit);
            fs::create_dir_all(&sub).unwrap();
            fs::write(sub.join("kick.wav"), b"RIFF").unwrap();
        }
        let written = BankInitializer::new(&root)
            .unwrap()
            .recursive(true)
            .run()
            .unwrap();
        assert_eq!(written.len(), 2);
        assert!(root.join("kit-a").join(BANK_FILE).exists());
        assert!(root.join("kit-b").join(BANK_FILE).exists());
        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn non_directory_is_rejected_up_front() {
        let err = BankInitializer::new(Path::new("/no/such/dir")).unwrap_err();
        assert!(matches!(err, SamplerError::NotADirectory(_)));
    }
}
