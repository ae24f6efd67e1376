//! Audit engine, transcript discovery, and batch execution

pub mod auditor;
pub mod executor;
pub mod file_walker;
pub mod transcript;

pub use auditor::{AuditEngine, AuditResult, AuditStatus, EXTRACTION_ERROR};
pub use executor::{BatchExecutor, BatchResult, DomainSummary, Verdict};
pub use file_walker::{FileWalker, FileWalkerError};
pub use transcript::{TranscriptLine, TranscriptRecord, parse_transcript, read_transcript};
