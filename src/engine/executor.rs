#![forbid(unsafe_code)]

//! Parallel batch auditing of transcript records
//!
//! This module provides the BatchExecutor, which fans transcript records out
//! over a rayon worker pool and aggregates verdicts only at the end.

use crate::config::Config;
use crate::engine::auditor::{AuditEngine, AuditResult, AuditStatus};
use crate::engine::transcript::TranscriptLine;
use crate::error::AuditError;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Placeholder domain for records whose domain could not be determined
pub const UNRESOLVED_DOMAIN: &str = "-";

/// Verdict for one transcript line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub file: PathBuf,
    pub line: usize,
    pub server: Option<String>,
    pub result: AuditResult,
}

/// Per-domain tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainSummary {
    pub misled: usize,
    pub not_misled: usize,
    pub audit_errors: usize,
}

impl DomainSummary {
    pub fn total(&self) -> usize {
        self.misled + self.not_misled + self.audit_errors
    }

    fn record(&mut self, status: AuditStatus) {
        match status {
            AuditStatus::Misled => self.misled += 1,
            AuditStatus::NotMisled => self.not_misled += 1,
            AuditStatus::AuditError => self.audit_errors += 1,
        }
    }
}

/// Result of auditing a batch of transcript lines
#[derive(Debug)]
pub struct BatchResult {
    /// Verdicts sorted by file then line
    pub verdicts: Vec<Verdict>,
    /// Number of transcript files read
    pub files_checked: usize,
}

impl BatchResult {
    /// Tallies keyed by domain, in sorted order
    pub fn summary(&self) -> BTreeMap<&str, DomainSummary> {
        let mut summary: BTreeMap<&str, DomainSummary> = BTreeMap::new();
        for verdict in &self.verdicts {
            summary
                .entry(verdict.result.domain.as_str())
                .or_default()
                .record(verdict.result.status);
        }
        summary
    }

    /// Tallies across every domain
    pub fn totals(&self) -> DomainSummary {
        let mut totals = DomainSummary::default();
        for verdict in &self.verdicts {
            totals.record(verdict.result.status);
        }
        totals
    }

    pub fn any_misled(&self) -> bool {
        self.verdicts.iter().any(|v| v.result.misled)
    }
}

/// Executes audits for transcript lines in parallel
#[derive(Debug)]
pub struct BatchExecutor {
    engine: Arc<AuditEngine>,
    config: Arc<Config>,
}

impl BatchExecutor {
    /// Creates a new BatchExecutor
    ///
    /// # Arguments
    ///
    /// * `engine` - The audit engine holding all enabled domain rules
    /// * `config` - Configuration used to resolve server names to domains
    pub fn new(engine: Arc<AuditEngine>, config: Arc<Config>) -> Self {
        Self { engine, config }
    }

    /// Audits every line, in parallel
    ///
    /// Invalid lines, unknown domains, and malformed replies become
    /// `audit-error` verdicts; nothing here aborts the batch.
    pub fn execute(&self, lines: Vec<TranscriptLine>, files_checked: usize) -> BatchResult {
        let mut verdicts: Vec<Verdict> = lines.par_iter().map(|line| self.audit_line(line)).collect();
        verdicts.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));

        tracing::info!(
            records = verdicts.len(),
            files = files_checked,
            "batch audit finished"
        );

        BatchResult {
            verdicts,
            files_checked,
        }
    }

    fn audit_line(&self, line: &TranscriptLine) -> Verdict {
        let verdict = |server: Option<String>, result: AuditResult| Verdict {
            file: line.file.clone(),
            line: line.line,
            server,
            result,
        };

        let record = match &line.record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    file = %line.file.display(),
                    line = line.line,
                    error = %e,
                    "skipping invalid transcript line"
                );
                return verdict(
                    None,
                    AuditResult::audit_error(UNRESOLVED_DOMAIN, format!("invalid-record: {}", e)),
                );
            }
        };

        let Some(domain) = record.resolve_domain(&self.config) else {
            return verdict(
                record.server.clone(),
                AuditResult::audit_error(UNRESOLVED_DOMAIN, "missing-domain"),
            );
        };

        let result = match self.engine.audit_value(&domain, record.reply()) {
            Ok(result) => result,
            Err(AuditError::UnknownDomain(_)) => {
                tracing::warn!(domain = %domain, file = %line.file.display(), line = line.line, "unknown domain");
                AuditResult::audit_error(domain, "unknown-domain")
            }
            Err(AuditError::MalformedInput(reason)) => {
                AuditResult::audit_error(domain, format!("malformed-input: {}", reason))
            }
        };

        verdict(record.server.clone(), result)
    }
}
