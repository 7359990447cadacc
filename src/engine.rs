//! Boundary with the container-inspection engine.
//!
//! The engine demuxes a container through a [`PullSource`] and reports raw
//! structural findings. It knows nothing about diagnostics or verdicts; the
//! [`aggregate`](crate::aggregate) step turns a [`RawResult`] into a
//! [`ReportCollection`](crate::ReportCollection).
//!
//! [`FfmpegEngine`](crate::FfmpegEngine) is the production implementation.
//! Other implementations (test doubles, alternative demuxers) plug into
//! [`Inspector::with_engine`](crate::Inspector::with_engine).

use crate::error::CheckError;
use crate::source::PullSource;

/// Raw outcome of one engine run.
///
/// Flags are independent: a run can report a missing duration, a missing
/// video stream, and an I/O failure at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawResult {
    /// The container did not yield a duration.
    pub no_duration: bool,
    /// No video stream was found.
    pub no_video_stream: bool,
    /// Pulling bytes failed, or the container could not be opened.
    pub io_error: bool,
    /// Duration in whole seconds. Meaningless when `no_duration` is set.
    pub duration: u64,
}

/// A container-inspection engine.
///
/// Implementations perform exactly one blocking pass over `source` per call
/// and must release everything they allocate before returning.
pub trait InspectionEngine {
    /// Inspect the container behind `source`.
    ///
    /// `buffer_size` is the engine's internal read-ahead size. `label`
    /// identifies the source in the engine's human-readable summary, which
    /// the engine emits on every run.
    ///
    /// # Errors
    ///
    /// Only construction failures (allocation, engine initialisation) are
    /// errors. Failures while pulling bytes set [`RawResult::io_error`].
    fn inspect(
        &self,
        buffer_size: usize,
        label: &str,
        source: PullSource<'_>,
    ) -> Result<RawResult, CheckError>;
}

impl<E: InspectionEngine + ?Sized> InspectionEngine for &E {
    fn inspect(
        &self,
        buffer_size: usize,
        label: &str,
        source: PullSource<'_>,
    ) -> Result<RawResult, CheckError> {
        (**self).inspect(buffer_size, label, source)
    }
}
