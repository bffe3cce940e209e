//! JSONL corpus loading.
//!
//! Each line holds one JSON object; the configured key must map to a
//! non-empty string. Unusable lines are logged and skipped, never fatal.

use semsearch_common::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Why a corpus line was not indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Line is not valid UTF-8
    InvalidUtf8(String),

    /// Line is not valid JSON
    InvalidJson(String),

    /// Line is valid JSON but not an object
    NotAnObject,

    /// Text key absent, not a string, or empty
    MissingText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8(e) => write!(f, "invalid UTF-8: {}", e),
            Self::InvalidJson(e) => write!(f, "invalid JSON: {}", e),
            Self::NotAnObject => write!(f, "not a JSON object"),
            Self::MissingText => write!(f, "missing text"),
        }
    }
}

/// A corpus line that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,

    /// Skip reason
    pub reason: SkipReason,
}

/// Parsed corpus: records and their texts, in file order
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Vec<serde_json::Value>,
    texts: Vec<String>,
    skipped: Vec<SkippedLine>,
    text_key: String,
    digest: String,
}

impl Corpus {
    /// Load a JSONL corpus file
    pub fn load(path: impl AsRef<Path>, text_key: &str) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let corpus = Self::parse_bytes(&content, text_key);

        info!(
            "Loaded corpus {} - {} records, {} lines skipped",
            path.display(),
            corpus.len(),
            corpus.skipped.len()
        );
        Ok(corpus)
    }

    /// Parse JSONL content
    pub fn parse(content: &str, text_key: &str) -> Self {
        Self::parse_bytes(content.as_bytes(), text_key)
    }

    /// Parse raw JSONL bytes
    ///
    /// Lines are decoded one at a time, so a line of invalid UTF-8 only
    /// costs that line.
    pub fn parse_bytes(content: &[u8], text_key: &str) -> Self {
        let mut corpus = Self {
            text_key: text_key.to_string(),
            digest: hex::encode(Sha256::digest(content)),
            ..Self::default()
        };

        let mut lines: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();
        // A trailing newline ends the last line rather than opening a new one
        if lines.last().map_or(false, |l| l.is_empty()) {
            lines.pop();
        }

        for (i, line) in lines.into_iter().enumerate() {
            let line_no = i + 1;
            let parsed = std::str::from_utf8(line)
                .map_err(|e| SkipReason::InvalidUtf8(e.to_string()))
                .and_then(|line| parse_line(line, text_key));
            match parsed {
                Ok((record, text)) => {
                    corpus.records.push(record);
                    corpus.texts.push(text);
                }
                Err(reason) => {
                    match &reason {
                        SkipReason::InvalidUtf8(e) => {
                            warn!("Line {} is not valid UTF-8: {}", line_no, e)
                        }
                        SkipReason::InvalidJson(e) => {
                            warn!("Line {} is not valid JSON: {}", line_no, e)
                        }
                        SkipReason::NotAnObject => {
                            warn!("Line {} is not a JSON object", line_no)
                        }
                        SkipReason::MissingText => {
                            warn!("Line {} missing '{}'", line_no, text_key)
                        }
                    }
                    corpus.skipped.push(SkippedLine {
                        line: line_no,
                        reason,
                    });
                }
            }
        }

        corpus
    }

    /// Valid records, in file order
    pub fn records(&self) -> &[serde_json::Value] {
        &self.records
    }

    /// Texts, parallel to `records`
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    /// Lines that were skipped
    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn text_key(&self) -> &str {
        &self.text_key
    }

    /// SHA-256 hex digest of the raw corpus
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Number of valid records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn parse_line(line: &str, text_key: &str) -> std::result::Result<(serde_json::Value, String), SkipReason> {
    let value: serde_json::Value = serde_json::from_str(line.trim())
        .map_err(|e| SkipReason::InvalidJson(e.to_string()))?;

    let object = value.as_object().ok_or(SkipReason::NotAnObject)?;
    let text = object
        .get(text_key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(SkipReason::MissingText)?
        .to_string();

    Ok((value, text))
}
