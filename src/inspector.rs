//! Inspection entry point.
//!
//! An [`Inspector`] pairs an [`InspectionEngine`] with the [`CheckOptions`]
//! it was built with. Each call performs exactly one blocking engine run on
//! the calling thread; nothing is retried or cached.
//!
//! # Example
//!
//! ```no_run
//! use mediacheck::{CheckError, Inspector};
//!
//! let inspector = Inspector::new();
//! let collection = inspector.check_path("input.mp4", true)?;
//! if collection.failed() {
//!     for line in collection.messages() {
//!         eprintln!("{line}");
//!     }
//! } else {
//!     println!("ok, {}s", collection.duration());
//! }
//! # Ok::<(), CheckError>(())
//! ```

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::config::CheckOptions;
use crate::engine::{InspectionEngine, RawResult};
use crate::error::CheckError;
use crate::ffmpeg::FfmpegEngine;
use crate::report::{ReportCollection, aggregate};
use crate::source::{PullSource, ReaderSource, SeekableReader};

/// Runs inspections with a fixed engine and configuration.
///
/// Holds no per-run state, so one inspector can be shared by reference
/// across threads as long as its engine is `Sync`.
#[derive(Debug, Clone)]
pub struct Inspector<E = FfmpegEngine> {
    engine: E,
    options: CheckOptions,
}

impl Default for Inspector<FfmpegEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector<FfmpegEngine> {
    /// FFmpeg-backed inspector with default options.
    pub fn new() -> Self {
        Self::with_options(CheckOptions::default())
    }

    /// FFmpeg-backed inspector with custom options.
    pub fn with_options(options: CheckOptions) -> Self {
        Self::with_engine(FfmpegEngine::new(), options)
    }
}

impl<E: InspectionEngine> Inspector<E> {
    /// Inspector over any engine.
    pub fn with_engine(engine: E, options: CheckOptions) -> Self {
        log::debug!(
            "Configured inspector (buffer={} bytes, label={:?})",
            options.buffer_size(),
            options.label()
        );
        Self { engine, options }
    }

    /// The options this inspector was built with.
    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Engine read-ahead buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.options.buffer_size()
    }

    /// Run the engine once and return its raw findings.
    ///
    /// # Errors
    ///
    /// Construction failures reported by the engine. Pull-time failures
    /// are reported through [`RawResult::io_error`].
    pub fn inspect(&self, source: PullSource<'_>) -> Result<RawResult, CheckError> {
        log::debug!(
            "Inspecting {} source",
            if source.is_seekable() { "seekable" } else { "forward-only" }
        );
        self.engine
            .inspect(self.options.buffer_size(), self.options.label(), source)
    }

    /// Inspect `source` and aggregate the findings into diagnostics.
    ///
    /// With `expect_video == false` the duration, video-stream, and I/O
    /// findings are not interpreted; see [`aggregate`].
    ///
    /// # Errors
    ///
    /// Engine construction failures, or [`CheckError::AllocationFailure`]
    /// while building the collection. Content problems are reports, never
    /// errors.
    pub fn check(
        &self,
        source: PullSource<'_>,
        expect_video: bool,
    ) -> Result<ReportCollection, CheckError> {
        let raw = self.inspect(source)?;
        let collection = aggregate(raw, expect_video)?;
        log::debug!(
            "Aggregated {} report(s), failed={}",
            collection.len(),
            collection.failed()
        );
        Ok(collection)
    }

    /// Check a random-access reader, such as a remote object opened for
    /// ranged reads.
    ///
    /// # Errors
    ///
    /// See [`check`](Inspector::check).
    pub fn check_reader<R: Read + Seek>(
        &self,
        reader: R,
        expect_video: bool,
    ) -> Result<ReportCollection, CheckError> {
        let mut source = SeekableReader::new(reader);
        self.check(source.as_pull(), expect_video)
    }

    /// Check a forward-only stream. The engine gets no seek capability.
    ///
    /// # Errors
    ///
    /// See [`check`](Inspector::check).
    pub fn check_stream<R: Read>(
        &self,
        reader: R,
        expect_video: bool,
    ) -> Result<ReportCollection, CheckError> {
        let mut source = ReaderSource::new(reader);
        self.check(source.as_pull(), expect_video)
    }

    /// Check a file on disk.
    ///
    /// # Errors
    ///
    /// - [`CheckError::SourceOpen`] if the file cannot be opened.
    /// - Anything [`check`](Inspector::check) returns.
    pub fn check_path<P: AsRef<Path>>(
        &self,
        path: P,
        expect_video: bool,
    ) -> Result<ReportCollection, CheckError> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());

        let open_error = |error: std::io::Error| CheckError::SourceOpen {
            path: path.to_path_buf(),
            reason: error.to_string(),
        };
        let file = File::open(path).map_err(open_error)?;
        let size = file.metadata().map_err(open_error)?.len();

        let mut source = SeekableReader::new(file).with_size(size);
        self.check(source.as_pull(), expect_video)
    }

    /// Check several files in sequence.
    ///
    /// Each entry succeeds or fails independently; results keep the input
    /// order.
    pub fn check_paths<P: AsRef<Path>>(
        &self,
        paths: &[P],
        expect_video: bool,
    ) -> Vec<Result<ReportCollection, CheckError>> {
        paths
            .iter()
            .map(|path| self.check_path(path, expect_video))
            .collect()
    }
}
