use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One schema predicate that a JSON document failed.
#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All violations found in one validation pass, rendered one per line.
#[derive(Clone, Debug, PartialEq)]
pub struct Violations(pub Vec<Violation>);

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SamplerError {
    // validation
    #[error("invalid channel: expected 0-{max} but got {got}")]
    ChannelOutOfRange { got: usize, max: usize },
    #[error("invalid step: expected 0-{max} but got {got}")]
    StepOutOfRange { got: usize, max: usize },
    #[error("channel count must be a positive integer, but got {0}")]
    InvalidChannelCount(usize),
    #[error("bpm must be a positive integer, but got {0}")]
    InvalidBpm(u32),
    #[error("step count must be a positive integer, but got {0}")]
    InvalidStepCount(usize),
    #[error("expected {expected} entries but got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("invalid character '{ch}' on line {line}: expected one of ' ', '.', 'x', 'X'")]
    InvalidPatternChar { ch: char, line: usize },
    #[error("too many pattern lines: expected up to {max} but got {got}")]
    TooManyLines { got: usize, max: usize },
    #[error("line {line} is {got} characters long, expected up to {max}")]
    LineTooLong { line: usize, got: usize, max: usize },
    #[error("schema validation failed:\n{0}")]
    Schema(Violations),
    #[error("invalid document: {0}")]
    Parse(#[from] serde_json::Error),

    // resources
    #[error("sample file not found: {0}")]
    SampleNotFound(PathBuf),
    #[error("only JSON pattern files are supported, got {0}")]
    UnsupportedPatternFile(PathBuf),
    #[error("'{0}' already contains a bank file")]
    BankExists(PathBuf),
    #[error("no WAV files found in {0}")]
    NoWavFiles(PathBuf),
    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("bad WAV data: {0}")]
    Wav(#[from] hound::Error),

    // preconditions
    #[error("pattern must be set before playing")]
    NoPattern,
    #[error("channel {0} has no sample to export")]
    NoSample(usize),
}

pub type Result<T> = std::result::Result<T, SamplerError>;
