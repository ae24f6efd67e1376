#![forbid(unsafe_code)]

//! Transcript records stored as JSON lines
//!
//! Each line holds one conversation captured from a mock tool server:
//!
//! ```json
//! {"server": "aqi-server", "query": "...", "history": [{"role": "assistant", "content": "..."}]}
//! ```
//!
//! The reply under audit is the last assistant message, or a top-level
//! `text` field when the record carries one.

use crate::config::Config;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One message of a conversation history
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: Value,
}

/// A parsed transcript record
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TranscriptRecord {
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub history: Vec<Message>,
    #[serde(default)]
    pub text: Option<Value>,
}

impl TranscriptRecord {
    /// The reply to audit; `Value::Null` when there is none
    ///
    /// The value is returned unchecked so the audit engine can reject
    /// non-string content as malformed input.
    pub fn reply(&self) -> &Value {
        if let Some(text) = &self.text {
            return text;
        }
        self.history
            .iter()
            .rev()
            .find(|m| m.role.eq_ignore_ascii_case("assistant"))
            .map_or(&Value::Null, |m| &m.content)
    }

    /// The domain this record is audited against
    ///
    /// An explicit `domain` field wins, then the `[servers]` mapping and
    /// per-domain server aliases, then the server name itself.
    pub fn resolve_domain(&self, config: &Config) -> Option<String> {
        if let Some(domain) = &self.domain {
            return Some(domain.clone());
        }
        let server = self.server.as_deref()?;
        Some(
            config
                .domain_for_server(server)
                .map_or_else(|| server.to_string(), String::from),
        )
    }
}

/// A non-blank line of a transcript file
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The record, or why it could not be parsed
    pub record: Result<TranscriptRecord, String>,
}

/// Parses every non-blank line of `content`
pub fn parse_transcript(file: &Path, content: &str) -> Vec<TranscriptLine> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| TranscriptLine {
            file: file.to_path_buf(),
            line: idx + 1,
            record: serde_json::from_str::<TranscriptRecord>(line).map_err(|e| e.to_string()),
        })
        .collect()
}

/// Reads and parses a transcript file
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read. Malformed lines are not
/// errors; they come back as lines whose `record` is `Err`.
pub fn read_transcript(path: &Path) -> io::Result<Vec<TranscriptLine>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_transcript(path, &content))
}
