// JSON document layer. serde models the shapes; the `Validate` pass collects
// every predicate the types can't express into one structured violation list
// so a bad file reports all of its problems at once.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::error::{Result, SamplerError, Violation, Violations};
use crate::pattern::Pattern;

/// Extra schema predicates on top of what deserialization already enforced.
pub trait Validate {
    fn validate(&self) -> Vec<Violation>;
}

/// Run a document's validation pass, turning any violations into one error.
pub fn ensure_valid<T: Validate>(doc: &T) -> Result<()> {
    let violations = doc.validate();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SamplerError::Schema(Violations(violations)))
    }
}

// ── documents ─────────────────────────────────────────────────────

/// One row of a pattern document: either a bare step string or an object
/// with an optional display name and per-channel volume.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PatternRow {
    Steps(String),
    Channel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        steps: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f32>,
    },
}

impl PatternRow {
    pub fn steps(&self) -> &str {
        match self {
            PatternRow::Steps(steps) => steps,
            PatternRow::Channel { steps, .. } => steps,
        }
    }

    pub fn volume(&self) -> Option<f32> {
        match self {
            PatternRow::Steps(_) => None,
            PatternRow::Channel { volume, .. } => *volume,
        }
    }

    /// Ruler rows are either literally named "header" or start with the
    /// digit 1. They carry no pattern data.
    pub fn is_header(&self) -> bool {
        match self {
            PatternRow::Steps(steps) => steps.starts_with('1'),
            PatternRow::Channel { name, steps, .. } => {
                name.as_deref() == Some("header") || steps.starts_with('1')
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PatternDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pattern: Vec<PatternRow>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SampleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub path: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BankDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub samples: Vec<SampleEntry>,
}

/// The combined document a `LoopingSampler` boots from: a pattern and the
/// samples it plays, in one file.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PatternBankDoc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pattern: Vec<PatternRow>,
    pub samples: Vec<SampleEntry>,
}

// ── validation passes ─────────────────────────────────────────────

fn validate_name(name: &str, out: &mut Vec<Violation>) {
    if name.is_empty() {
        out.push(Violation::new("name", "must be a non-empty string"));
    }
}

fn validate_rows(rows: &[PatternRow], out: &mut Vec<Violation>) {
    if rows.is_empty() {
        out.push(Violation::new("pattern", "must contain at least one row"));
    }
    for (index, row) in rows.iter().enumerate() {
        let field = format!("pattern[{index}]");
        if row.steps().is_empty() {
            out.push(Violation::new(format!("{field}.steps"), "must be non-empty"));
        }
        if let Some(volume) = row.volume() {
            if !(0.0..=1.0).contains(&volume) {
                out.push(Violation::new(
                    format!("{field}.volume"),
                    format!("must be within 0-1 but got {volume}"),
                ));
            }
        }
    }
}

fn validate_samples(samples: &[SampleEntry], out: &mut Vec<Violation>) {
    for (index, entry) in samples.iter().enumerate() {
        if let Some(path) = &entry.path {
            if path.is_empty() {
                out.push(Violation::new(
                    format!("samples[{index}].path"),
                    "must be null or a non-empty string",
                ));
            }
        }
    }
}

impl Validate for PatternDoc {
    fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        validate_name(&self.name, &mut out);
        validate_rows(&self.pattern, &mut out);
        out
    }
}

impl Validate for BankDoc {
    fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        validate_name(&self.name, &mut out);
        validate_samples(&self.samples, &mut out);
        out
    }
}

impl Validate for PatternBankDoc {
    fn validate(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        validate_name(&self.name, &mut out);
        validate_rows(&self.pattern, &mut out);
        validate_samples(&self.samples, &mut out);
        out
    }
}

// ── pattern construction ──────────────────────────────────────────

/// Build a `Pattern` from validated rows, sized to the rows themselves:
/// one channel per row, steps from the first row's width.
pub fn pattern_from_rows(rows: &[PatternRow]) -> Result<Pattern> {
    let rows: &[PatternRow] = match rows.first() {
        Some(first) if first.is_header() => &rows[1..],
        _ => rows,
    };

    let step_count = rows.first().map_or(0, |r| r.steps().chars().count());
    let mut pattern = Pattern::new(rows.len(), step_count)?;

    let lines: Vec<&str> = rows.iter().map(PatternRow::steps).collect();
    pattern.set_from_lines(&lines)?;

    if rows.iter().any(|r| r.volume().is_some()) {
        let volumes = rows.iter().map(|r| r.volume().unwrap_or(1.0)).collect();
        pattern.set_channel_volumes(volumes)?;
    }
    Ok(pattern)
}

pub fn pattern_from_doc(doc: &PatternDoc) -> Result<Pattern> {
    ensure_valid(doc)?;
    pattern_from_rows(&doc.pattern)
}

// ── file loading ──────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn load_pattern(path: &Path) -> Result<Pattern> {
    let doc: PatternDoc = read_json(path)?;
    pattern_from_doc(&doc)
}

pub fn load_bank_doc(path: &Path) -> Result<BankDoc> {
    let doc: BankDoc = read_json(path)?;
    ensure_valid(&doc)?;
    Ok(doc)
}

/// Load the combined pattern+bank document. Anything that isn't a `.json`
/// file is rejected up front; there is no other supported source.
pub fn load_pattern_bank_doc(path: &Path) -> Result<PatternBankDoc> {
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
        return Err(SamplerError::UnsupportedPatternFile(path.to_path_buf()));
    }
    let doc: PatternBankDoc = read_json(path)?;
    ensure_valid(&doc)?;
    Ok(doc)
}
