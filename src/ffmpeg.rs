//! FFmpeg-backed inspection engine.
//!
//! [`FfmpegEngine`] drives libavformat over a [`PullSource`] through a custom
//! `AVIOContext`: FFmpeg calls back into Rust whenever it needs bytes (and,
//! for seekable sources only, to reposition). Nothing is read ahead beyond
//! the configured buffer and nothing touches the filesystem.
//!
//! Every run also prints FFmpeg's own stream summary (`av_dump_format`)
//! under the configured label. Its verbosity follows FFmpeg's log level,
//! which [`set_engine_log_level`] maps from the `log` crate's vocabulary.
//!
//! # Example
//!
//! ```no_run
//! use log::LevelFilter;
//!
//! // Keep FFmpeg's summary and warnings, drop its debug chatter.
//! mediacheck::set_engine_log_level(LevelFilter::Info);
//! ```

use std::{
    ffi::{CStr, CString, c_int, c_void},
    io::{Error as IoError, ErrorKind, Result as IoResult, SeekFrom},
    panic::{AssertUnwindSafe, catch_unwind},
    ptr,
};

use ffmpeg_next::util::log::Level;
use ffmpeg_sys_next::{AVFormatContext, AVIOContext, AVMediaType};
use log::LevelFilter;

use crate::engine::{InspectionEngine, RawResult};
use crate::error::CheckError;
use crate::source::PullSource;

/// `AVERROR(EIO)`.
const AVERROR_EIO: c_int = -5;
const AVSEEK_SIZE: c_int = 0x10000;
const AVSEEK_FORCE: c_int = 0x20000;
const SEEK_SET: c_int = 0;
const SEEK_CUR: c_int = 1;
const SEEK_END: c_int = 2;
/// FFmpeg's internal time base (microseconds).
const AV_TIME_BASE: i64 = 1_000_000;

/// Inspection engine backed by libavformat.
///
/// Stateless: one instance can serve any number of sequential or concurrent
/// runs on independent sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegEngine;

impl FfmpegEngine {
    /// Create the engine. FFmpeg itself is initialised lazily on first use.
    pub fn new() -> Self {
        Self
    }
}

impl InspectionEngine for FfmpegEngine {
    fn inspect(
        &self,
        buffer_size: usize,
        label: &str,
        source: PullSource<'_>,
    ) -> Result<RawResult, CheckError> {
        ffmpeg_next::init().map_err(|error| CheckError::EngineInit(error.to_string()))?;

        let label = CString::new(label.replace('\0', "")).unwrap_or_default();
        let seekable = source.is_seekable();
        let mut bridge = Bridge {
            source,
            failure: None,
        };

        log::debug!(
            "Starting FFmpeg inspection (buffer={} bytes, seekable={})",
            buffer_size,
            seekable
        );

        let opaque = &mut bridge as *mut Bridge<'_> as *mut c_void;
        let mut raw = RawResult::default();

        {
            // SAFETY: `bridge` outlives `io`, which is dropped at the end of
            // this block before `bridge` is touched again.
            let io = unsafe { CustomIo::allocate(opaque, buffer_size, seekable) }?;

            // SAFETY: `io` stays alive until the input below is closed.
            match unsafe { open_input(&io) }? {
                // No stream summary without an opened context; keep the label
                // visible at the same level instead.
                Err(code) => {
                    log::info!(
                        "{}: FFmpeg could not open the container: {}",
                        label.to_string_lossy(),
                        ffmpeg_next::Error::from(code)
                    );
                    raw.io_error = true;
                }
                Ok(input) => {
                    // SAFETY: `input.context` is a successfully opened demuxer.
                    unsafe { input.collect(&label, &mut raw) };
                }
            }
        }

        if let Some(error) = bridge.failure.take() {
            log::warn!("Pull source failed during inspection: {error}");
            raw.io_error = true;
        }

        log::info!(
            "Inspected {} (duration={}s, no_duration={}, no_video_stream={}, io_error={})",
            label.to_string_lossy(),
            raw.duration,
            raw.no_duration,
            raw.no_video_stream,
            raw.io_error,
        );

        Ok(raw)
    }
}

/// State shared with the AVIO callbacks through FFmpeg's opaque pointer.
struct Bridge<'a> {
    source: PullSource<'a>,
    failure: Option<IoError>,
}

impl Bridge<'_> {
    fn record(&mut self, error: IoError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }
}

/// Owns an `AVIOContext` and its buffer.
struct CustomIo {
    context: *mut AVIOContext,
}

impl CustomIo {
    /// # Safety
    ///
    /// `opaque` must point to a [`Bridge`] that outlives the returned value.
    unsafe fn allocate(
        opaque: *mut c_void,
        buffer_size: usize,
        seekable: bool,
    ) -> Result<Self, CheckError> {
        let size = c_int::try_from(buffer_size)
            .map_err(|_| CheckError::AllocationFailure("engine read buffer"))?;

        unsafe {
            let buffer = ffmpeg_sys_next::av_malloc(buffer_size) as *mut u8;
            if buffer.is_null() {
                return Err(CheckError::AllocationFailure("engine read buffer"));
            }

            let seek: Option<unsafe extern "C" fn(*mut c_void, i64, c_int) -> i64> = if seekable {
                Some(seek_packet)
            } else {
                None
            };

            let context = ffmpeg_sys_next::avio_alloc_context(
                buffer,
                size,
                0,
                opaque,
                Some(read_packet),
                None,
                seek,
            );
            if context.is_null() {
                ffmpeg_sys_next::av_free(buffer as *mut c_void);
                return Err(CheckError::AllocationFailure("engine I/O context"));
            }

            Ok(Self { context })
        }
    }
}

impl Drop for CustomIo {
    fn drop(&mut self) {
        if self.context.is_null() {
            return;
        }
        // FFmpeg may have swapped the buffer during probing; free whatever
        // the context holds now.
        unsafe {
            ffmpeg_sys_next::av_freep(&mut (*self.context).buffer as *mut *mut u8 as *mut c_void);
            ffmpeg_sys_next::avio_context_free(&mut self.context);
        }
    }
}

/// Owns an opened demuxer that reads through a [`CustomIo`].
struct FormatInput {
    context: *mut AVFormatContext,
}

impl FormatInput {
    /// Probe streams, print the engine summary, and fill in `raw`.
    ///
    /// # Safety
    ///
    /// `self.context` must be a successfully opened input.
    unsafe fn collect(&self, label: &CStr, raw: &mut RawResult) {
        unsafe {
            let status = ffmpeg_sys_next::avformat_find_stream_info(self.context, ptr::null_mut());
            if status < 0 {
                log::debug!(
                    "FFmpeg could not read stream info: {}",
                    ffmpeg_next::Error::from(status)
                );
                raw.io_error = true;
            }

            ffmpeg_sys_next::av_dump_format(self.context, 0, label.as_ptr(), 0);

            let format = (*self.context).iformat;
            if !format.is_null() && !(*format).name.is_null() {
                log::debug!(
                    "Container format: {}",
                    CStr::from_ptr((*format).name).to_string_lossy()
                );
            }

            let duration = (*self.context).duration;
            if duration <= 0 {
                raw.no_duration = true;
            } else {
                raw.duration = (duration / AV_TIME_BASE) as u64;
            }

            let video = ffmpeg_sys_next::av_find_best_stream(
                self.context,
                AVMediaType::AVMEDIA_TYPE_VIDEO,
                -1,
                -1,
                ptr::null_mut(),
                0,
            );
            raw.no_video_stream = video < 0;
        }
    }
}

impl Drop for FormatInput {
    fn drop(&mut self) {
        if !self.context.is_null() {
            unsafe { ffmpeg_sys_next::avformat_close_input(&mut self.context) };
        }
    }
}

/// Open a demuxer on top of `io`.
///
/// The outer `Result` carries allocation failures; the inner one carries
/// FFmpeg's error code when the container cannot be opened.
///
/// # Safety
///
/// `io` must outlive the returned [`FormatInput`].
unsafe fn open_input(io: &CustomIo) -> Result<Result<FormatInput, c_int>, CheckError> {
    unsafe {
        let mut context = ffmpeg_sys_next::avformat_alloc_context();
        if context.is_null() {
            return Err(CheckError::AllocationFailure("engine format context"));
        }
        (*context).pb = io.context;
        (*context).flags |= ffmpeg_sys_next::AVFMT_FLAG_CUSTOM_IO as c_int;

        // On failure FFmpeg frees the context (but not our custom pb).
        let code = ffmpeg_sys_next::avformat_open_input(
            &mut context,
            ptr::null(),
            ptr::null(),
            ptr::null_mut(),
        );
        if code < 0 {
            return Ok(Err(code));
        }
        Ok(Ok(FormatInput { context }))
    }
}

/// AVIO read callback.
///
/// `Ok(0)` becomes `AVERROR_EOF`; errors (and panics) become `AVERROR(EIO)`
/// and are remembered on the bridge.
unsafe extern "C" fn read_packet(opaque: *mut c_void, buffer: *mut u8, size: c_int) -> c_int {
    if opaque.is_null() || buffer.is_null() || size <= 0 {
        return ffmpeg_sys_next::AVERROR_EOF;
    }

    // SAFETY: `opaque` is the `Bridge` registered in `CustomIo::allocate`
    // and FFmpeg hands us `size` writable bytes at `buffer`.
    let (bridge, output) = unsafe {
        (
            &mut *(opaque as *mut Bridge<'_>),
            std::slice::from_raw_parts_mut(buffer, size as usize),
        )
    };

    match catch_unwind(AssertUnwindSafe(|| bridge.source.read(output))) {
        Ok(Ok(0)) => ffmpeg_sys_next::AVERROR_EOF,
        Ok(Ok(count)) => count.min(size as usize) as c_int,
        Ok(Err(error)) => {
            bridge.record(error);
            AVERROR_EIO
        }
        Err(_) => {
            bridge.record(IoError::other("pull source panicked during read"));
            AVERROR_EIO
        }
    }
}

/// AVIO seek callback. Only registered for seekable sources.
unsafe extern "C" fn seek_packet(opaque: *mut c_void, offset: i64, whence: c_int) -> i64 {
    if opaque.is_null() {
        return AVERROR_EIO as i64;
    }

    // SAFETY: see `read_packet`.
    let bridge = unsafe { &mut *(opaque as *mut Bridge<'_>) };

    if whence & AVSEEK_SIZE != 0 {
        return match catch_unwind(AssertUnwindSafe(|| bridge.source.size())) {
            Ok(Some(Ok(size))) => i64::try_from(size).unwrap_or(-1),
            _ => -1,
        };
    }

    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let target = seek_target(offset, whence)?;
        bridge
            .source
            .seek(target)
            .unwrap_or_else(|| Err(IoError::from(ErrorKind::Unsupported)))
    }));

    match outcome {
        Ok(Ok(position)) => i64::try_from(position).unwrap_or(AVERROR_EIO as i64),
        Ok(Err(error)) => {
            bridge.record(error);
            AVERROR_EIO as i64
        }
        Err(_) => {
            bridge.record(IoError::other("pull source panicked during seek"));
            AVERROR_EIO as i64
        }
    }
}

/// Translate an FFmpeg `(offset, whence)` pair into a [`SeekFrom`].
fn seek_target(offset: i64, whence: c_int) -> IoResult<SeekFrom> {
    match whence & !AVSEEK_FORCE {
        SEEK_SET => u64::try_from(offset).map(SeekFrom::Start).map_err(|_| {
            IoError::new(ErrorKind::InvalidInput, "negative absolute seek offset")
        }),
        SEEK_CUR => Ok(SeekFrom::Current(offset)),
        SEEK_END => Ok(SeekFrom::End(offset)),
        other => Err(IoError::new(
            ErrorKind::InvalidInput,
            format!("unsupported seek whence {other}"),
        )),
    }
}

/// Set FFmpeg's internal log verbosity from a `log` level filter.
///
/// This controls what FFmpeg prints to stderr, including the per-run stream
/// summary (printed at info level). It does not affect Rust-side `log`
/// output.
pub fn set_engine_log_level(level: LevelFilter) {
    let level = match level {
        LevelFilter::Off => Level::Quiet,
        LevelFilter::Error => Level::Error,
        LevelFilter::Warn => Level::Warning,
        LevelFilter::Info => Level::Info,
        LevelFilter::Debug => Level::Debug,
        LevelFilter::Trace => Level::Trace,
    };
    ffmpeg_next::util::log::set_level(level);
}

/// FFmpeg's current log verbosity, expressed as a `log` level filter.
///
/// FFmpeg levels without a direct counterpart collapse onto the nearest
/// one (`Panic`/`Fatal` → `Error`, `Verbose` → `Info`).
pub fn engine_log_level() -> Option<LevelFilter> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(|level| match level {
            Level::Quiet => LevelFilter::Off,
            Level::Panic | Level::Fatal | Level::Error => LevelFilter::Error,
            Level::Warning => LevelFilter::Warn,
            Level::Info | Level::Verbose => LevelFilter::Info,
            Level::Debug => LevelFilter::Debug,
            Level::Trace => LevelFilter::Trace,
        })
}
