//! Diagnostic reports and the aggregation step.
//!
//! [`aggregate`] turns the engine's raw flags into a [`ReportCollection`]:
//! an ordered, append-only list of [`DiagnosticReport`]s, the media
//! duration, and a single pass/fail verdict. Every detected condition gets
//! its own report, so callers see the full set of problems of a run.
//!
//! # Example
//!
//! ```
//! use mediacheck::{RawResult, ReportKind, aggregate};
//!
//! let raw = RawResult {
//!     no_duration: true,
//!     no_video_stream: true,
//!     ..RawResult::default()
//! };
//! let collection = aggregate(raw, true)?;
//! assert!(collection.failed());
//! assert!(collection.contains(ReportKind::NoDurationFound));
//! assert!(collection.contains(ReportKind::NoVideoStream));
//! for line in collection.messages() {
//!     println!("{line}");
//! }
//! # Ok::<(), mediacheck::CheckError>(())
//! ```

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::slice::Iter;

use crate::engine::RawResult;
use crate::error::CheckError;

/// What went wrong. Stable across versions; new kinds are only ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReportKind {
    /// The media has no video stream.
    NoVideoStream,
    /// The media has no audio stream.
    NoAudioStream,
    /// The container did not yield a duration.
    NoDurationFound,
    /// Reading the source failed, or the container could not be opened.
    IoError,
    /// The subtitle checker failed internally.
    InternalSubtitleError,
}

impl ReportKind {
    /// Human-readable description, used whenever a report carries no
    /// explicit message.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::NoVideoStream => "no video stream found",
            ReportKind::NoAudioStream => "no audio stream found",
            ReportKind::NoDurationFound => "could not determine duration",
            ReportKind::IoError => "I/O error while reading the media",
            ReportKind::InternalSubtitleError => "internal error while checking subtitles",
        }
    }
}

impl Display for ReportKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.description())
    }
}

/// How serious a report is. Only [`Severity::Error`] fails a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational notice.
    Info,
    /// Problem that does not fail the run.
    Warning,
    /// Problem that fails the run.
    Error,
}

impl Severity {
    fn prefix(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.prefix())
    }
}

/// One detected condition. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticReport {
    kind: ReportKind,
    severity: Severity,
    message: Option<String>,
}

impl DiagnosticReport {
    /// A report whose text is derived from its kind.
    pub fn new(kind: ReportKind, severity: Severity) -> Self {
        Self {
            kind,
            severity,
            message: None,
        }
    }

    /// A report carrying explicit text.
    pub fn with_message(kind: ReportKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: Some(message.into()),
        }
    }

    /// What was detected.
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Whether this report fails the run.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The explicit message, if one was stored.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Text for presentation: the stored message, or the kind's description.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.description())
    }
}

impl Display for DiagnosticReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}: {}", self.severity, self.text())
    }
}

/// Ordered diagnostics of one inspection run, with duration and verdict.
///
/// Invariant: [`failed`](ReportCollection::failed) is `true` exactly when
/// at least one report has [`Severity::Error`]. The collection is
/// append-only while it is being built and read-only once handed out.
/// Dropping it releases every report and its text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCollection {
    reports: Vec<DiagnosticReport>,
    duration: u64,
    failed: bool,
}

impl ReportCollection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a report.
    ///
    /// Storage grows by exactly one slot per report: the set of kinds is
    /// small and bounded, so there is nothing to amortise.
    pub(crate) fn push(&mut self, report: DiagnosticReport) -> Result<(), CheckError> {
        self.reports
            .try_reserve_exact(1)
            .map_err(|_| CheckError::AllocationFailure("report collection"))?;
        self.reports.push(report);
        self.failed = self
            .reports
            .iter()
            .any(|report| report.severity == Severity::Error);
        Ok(())
    }

    pub(crate) fn set_duration(&mut self, duration: u64) {
        self.duration = duration;
    }

    /// Reports in insertion order.
    pub fn reports(&self) -> &[DiagnosticReport] {
        &self.reports
    }

    /// Iterate over reports in insertion order.
    pub fn iter(&self) -> Iter<'_, DiagnosticReport> {
        self.reports.iter()
    }

    /// Number of reports.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// `true` if no condition was detected.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Media duration in whole seconds, `0` if it was not determined.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// `true` if any report has [`Severity::Error`].
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Negation of [`failed`](ReportCollection::failed).
    pub fn passed(&self) -> bool {
        !self.failed
    }

    /// Whether a report of `kind` is present.
    pub fn contains(&self, kind: ReportKind) -> bool {
        self.reports.iter().any(|report| report.kind == kind)
    }

    /// One `"<severity>: <text>"` line per report, in order.
    pub fn messages(&self) -> Vec<String> {
        self.reports.iter().map(ToString::to_string).collect()
    }

    /// Caller-facing summary: verdict, duration, and message lines.
    pub fn summary(&self) -> CheckSummary {
        CheckSummary {
            passed: self.passed(),
            duration: self.duration,
            messages: self.messages(),
        }
    }

    /// Keep the collection if it passed, otherwise turn it into
    /// [`CheckError::CheckFailed`] carrying every message line.
    pub fn ensure_passed(self) -> Result<Self, CheckError> {
        if self.passed() {
            return Ok(self);
        }
        Err(CheckError::CheckFailed(self.messages().join("\n")))
    }
}

impl<'a> IntoIterator for &'a ReportCollection {
    type Item = &'a DiagnosticReport;
    type IntoIter = Iter<'a, DiagnosticReport>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

impl Display for ReportCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for report in &self.reports {
            writeln!(f, "{report}")?;
        }
        if self.reports.is_empty() {
            writeln!(f, "No issues found.")?;
        }
        writeln!(
            f,
            "{} (duration: {}s)",
            if self.failed { "FAILED" } else { "PASSED" },
            self.duration,
        )
    }
}

/// Flattened view of a [`ReportCollection`] for API responses and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    /// `true` if the media passed every check.
    pub passed: bool,
    /// Duration in whole seconds.
    pub duration: u64,
    /// One line per diagnostic.
    pub messages: Vec<String>,
}

/// Translate an engine result into diagnostics.
///
/// With `expect_video == false` the duration and video-stream checks are
/// skipped entirely (audio-only or subtitle-only assets), and so is the
/// I/O check tied to that inspection: the collection stays empty with a
/// zero duration.
///
/// With `expect_video == true`, checks run in a fixed order and every one
/// that fires appends an error:
///
/// 1. duration: missing → [`ReportKind::NoDurationFound`]; present → the
///    collection's duration is set,
/// 2. video stream: missing → [`ReportKind::NoVideoStream`],
/// 3. I/O: failed → [`ReportKind::IoError`].
///
/// Deterministic and free of side effects.
///
/// # Errors
///
/// [`CheckError::AllocationFailure`] if the report list cannot grow. The
/// partially built collection is dropped, never returned.
pub fn aggregate(raw: RawResult, expect_video: bool) -> Result<ReportCollection, CheckError> {
    let mut collection = ReportCollection::new();
    if !expect_video {
        return Ok(collection);
    }

    if raw.no_duration {
        collection.push(DiagnosticReport::new(
            ReportKind::NoDurationFound,
            Severity::Error,
        ))?;
    } else {
        collection.set_duration(raw.duration);
    }

    if raw.no_video_stream {
        collection.push(DiagnosticReport::new(
            ReportKind::NoVideoStream,
            Severity::Error,
        ))?;
    }

    if raw.io_error {
        collection.push(DiagnosticReport::new(ReportKind::IoError, Severity::Error))?;
    }

    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn verdict_follows_error_severity_only() {
        let mut collection = ReportCollection::new();
        collection
            .push(DiagnosticReport::new(ReportKind::NoAudioStream, Severity::Warning))
            .unwrap();
        collection
            .push(DiagnosticReport::new(ReportKind::NoAudioStream, Severity::Info))
            .unwrap();
        assert!(!collection.failed());

        collection
            .push(DiagnosticReport::new(ReportKind::InternalSubtitleError, Severity::Error))
            .unwrap();
        assert!(collection.failed());
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let mut collection = ReportCollection::new();
        for _ in 0..2 {
            collection
                .push(DiagnosticReport::new(ReportKind::IoError, Severity::Error))
                .unwrap();
        }
        let kinds: Vec<_> = collection.iter().map(DiagnosticReport::kind).collect();
        assert_eq!(kinds, vec![ReportKind::IoError, ReportKind::IoError]);
    }

    #[test]
    fn text_prefers_stored_message() {
        let derived = DiagnosticReport::new(ReportKind::NoVideoStream, Severity::Error);
        assert_eq!(derived.message(), None);
        assert_eq!(derived.to_string(), "error: no video stream found");

        let explicit = DiagnosticReport::with_message(
            ReportKind::InternalSubtitleError,
            Severity::Warning,
            "unterminated override block",
        );
        assert_eq!(explicit.to_string(), "warning: unterminated override block");
    }

    #[test]
    fn ensure_passed_joins_messages() {
        let raw = RawResult {
            no_duration: true,
            io_error: true,
            ..RawResult::default()
        };
        let error = aggregate(raw, true).unwrap().ensure_passed().unwrap_err();
        match error {
            CheckError::CheckFailed(text) => assert_eq!(
                text,
                "error: could not determine duration\nerror: I/O error while reading the media"
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
}
