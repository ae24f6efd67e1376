#![forbid(unsafe_code)]

//! Human-readable output with optional color
//!
//! Writes through `termcolor::WriteColor` so the same code drives a colored
//! terminal, a plain pipe, or an in-memory buffer in tests.

use crate::engine::{AuditResult, AuditStatus, BatchResult};
use std::io;
use termcolor::{Color, ColorSpec, WriteColor};

/// Human-readable formatter
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    /// Writes one verdict line: `<STATUS> <domain>[: <diagnostic>]`
    pub fn write_result<W: WriteColor>(&self, out: &mut W, result: &AuditResult) -> io::Result<()> {
        write_status(out, result.status)?;
        write!(out, " {}", result.domain)?;
        if let Some(diagnostic) = &result.diagnostic {
            write!(out, ": {}", diagnostic)?;
        }
        writeln!(out)
    }

    /// Writes flagged verdicts, a per-domain summary, and a closing status line
    ///
    /// Confident `not-misled` verdicts are counted but not listed.
    pub fn write_batch<W: WriteColor>(&self, out: &mut W, result: &BatchResult) -> io::Result<()> {
        let flagged: Vec<_> = result
            .verdicts
            .iter()
            .filter(|v| v.result.status != AuditStatus::NotMisled)
            .collect();

        for verdict in &flagged {
            write!(out, "{}:{}: ", verdict.file.display(), verdict.line)?;
            self.write_result(out, &verdict.result)?;
        }
        if !flagged.is_empty() {
            writeln!(out)?;
        }

        let summary = result.summary();
        if !summary.is_empty() {
            let width = summary.keys().map(|d| d.len()).max().unwrap_or(0);
            writeln!(
                out,
                "{:<width$}  {:>6}  {:>10}  {:>6}",
                "domain", "misled", "not-misled", "errors"
            )?;
            for (domain, counts) in &summary {
                writeln!(
                    out,
                    "{:<width$}  {:>6}  {:>10}  {:>6}",
                    domain, counts.misled, counts.not_misled, counts.audit_errors
                )?;
            }
            writeln!(out)?;
        }

        let totals = result.totals();
        let status = if result.any_misled() {
            AuditStatus::Misled
        } else if totals.audit_errors > 0 {
            AuditStatus::AuditError
        } else {
            AuditStatus::NotMisled
        };
        write_status(out, status)?;
        writeln!(
            out,
            " {} records in {} files: {} misled, {} not misled, {} audit errors",
            totals.total(),
            result.files_checked,
            totals.misled,
            totals.not_misled,
            totals.audit_errors
        )
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn write_status<W: WriteColor>(out: &mut W, status: AuditStatus) -> io::Result<()> {
    let (label, color) = match status {
        AuditStatus::Misled => ("MISLED", Color::Red),
        AuditStatus::NotMisled => ("OK", Color::Green),
        AuditStatus::AuditError => ("ERROR", Color::Yellow),
    };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", label)?;
    out.reset()
}
