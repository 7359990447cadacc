//! Error types for the `mediacheck` crate.
//!
//! [`CheckError`] covers the failures that abort an operation: a source that
//! cannot be opened, a pipe that cannot be created, an allocation that cannot
//! be satisfied, or an inspection engine that refuses to start.
//!
//! Problems found *in* the media (missing streams, missing duration, I/O
//! failures while the engine pulls bytes) are never errors. They are recorded
//! as [`DiagnosticReport`](crate::DiagnosticReport)s so the caller sees every
//! problem of a run, not just the first one.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `mediacheck` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CheckError {
    /// A file-backed source could not be opened.
    #[error("Failed to open media source at {path}: {reason}")]
    SourceOpen {
        /// Path that was passed to the check.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The OS refused to create a pipe for the streaming bridge.
    #[error("Failed to create pipe: {0}")]
    PipeCreation(#[source] IoError),

    /// Memory for a result (report sequence, copied text, engine buffer)
    /// could not be allocated. The payload names what was being built.
    #[error("Allocation failed while building {0}")]
    AllocationFailure(&'static str),

    /// The inspection engine could not be initialised.
    #[error("Inspection engine initialisation failed: {0}")]
    EngineInit(String),

    /// An I/O error outside of an inspection run (e.g. reading a subtitle
    /// source into memory).
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// A failed report collection converted into an error via
    /// [`ReportCollection::ensure_passed`](crate::ReportCollection::ensure_passed).
    /// Carries one line per diagnostic.
    #[error("Media check failed:\n{0}")]
    CheckFailed(String),
}
