#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. All verdict records (sorted by file, line)
//! 2. All summary records (sorted by domain)
//! 3. One status record

use crate::engine::{AuditResult, AuditStatus, BatchResult};
use serde::Serialize;
use std::path::PathBuf;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    /// Creates a new JsonlFormatter
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format a single audit verdict as one JSON line
    pub fn format_result(&self, result: &AuditResult) -> String {
        let mut output = String::new();
        push_record(&mut output, result);
        output
    }

    /// Format a batch result as JSONL
    pub fn format_batch(&self, result: &BatchResult) -> String {
        let mut output = String::new();

        // Verdicts are already sorted by file, then line
        for verdict in &result.verdicts {
            push_record(
                &mut output,
                &VerdictRecord {
                    record_type: "verdict",
                    file: verdict.file.clone(),
                    line: verdict.line,
                    server: verdict.server.as_deref(),
                    domain: &verdict.result.domain,
                    misled: verdict.result.misled,
                    status: verdict.result.status,
                    diagnostic: verdict.result.diagnostic.as_deref(),
                },
            );
        }

        for (domain, summary) in result.summary() {
            push_record(
                &mut output,
                &SummaryRecord {
                    record_type: "summary",
                    domain,
                    misled: summary.misled,
                    not_misled: summary.not_misled,
                    audit_errors: summary.audit_errors,
                },
            );
        }

        let totals = result.totals();
        push_record(
            &mut output,
            &StatusRecord {
                record_type: "status",
                misled: result.any_misled(),
                files_checked: result.files_checked,
                records: totals.total(),
                misled_records: totals.misled,
                audit_errors: totals.audit_errors,
            },
        );

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn push_record<T: Serialize>(output: &mut String, record: &T) {
    if let Ok(json) = serde_json::to_string(record) {
        output.push_str(&json);
        output.push('\n');
    }
}

/// Verdict record for JSONL output
#[derive(Debug, Serialize)]
struct VerdictRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: PathBuf,
    line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    server: Option<&'a str>,
    domain: &'a str,
    misled: bool,
    status: AuditStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagnostic: Option<&'a str>,
}

/// Summary record for JSONL output
#[derive(Debug, Serialize)]
struct SummaryRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    domain: &'a str,
    misled: usize,
    not_misled: usize,
    audit_errors: usize,
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    misled: bool,
    files_checked: usize,
    records: usize,
    misled_records: usize,
    audit_errors: usize,
}
