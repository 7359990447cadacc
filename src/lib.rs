//! # mediacheck
//!
//! Validate media containers fed from arbitrary byte sources, without
//! needing the whole file on disk or in memory.
//!
//! `mediacheck` drives FFmpeg's demuxer (via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next)) through a pull-based
//! I/O adapter: the engine asks for bytes, and a caller-owned source answers.
//! The engine's raw findings are turned into an ordered collection of typed
//! diagnostics with a single pass/fail verdict and the media duration.
//!
//! ## Quick Start
//!
//! ### Check a File
//!
//! ```no_run
//! use mediacheck::Inspector;
//!
//! let collection = Inspector::new().check_path("input.mp4", true).unwrap();
//! print!("{collection}");
//! ```
//!
//! ### Check a Remote Object
//!
//! Anything implementing [`Read`](std::io::Read) + [`Seek`](std::io::Seek)
//! can be inspected. Only the bytes the demuxer asks for are pulled.
//!
//! ```no_run
//! use std::fs::File;
//!
//! use mediacheck::{CheckOptions, Inspector};
//!
//! let object = File::open("input.mkv").unwrap();
//! let inspector = Inspector::with_options(
//!     CheckOptions::new().with_buffer_size(1024 * 1024).with_label("bucket/input.mkv"),
//! );
//! let collection = inspector.check_reader(object, true).unwrap();
//! assert!(collection.passed());
//! ```
//!
//! ### Check a Pushed Stream
//!
//! ```no_run
//! use std::io::Write;
//! use std::thread;
//!
//! use mediacheck::{Inspector, create_pipe};
//!
//! let (mut reader, mut writer) = create_pipe().unwrap();
//! let producer = thread::spawn(move || {
//!     writer.write_all(&std::fs::read("input.ts").unwrap()).unwrap();
//! });
//! let collection = Inspector::new().check(reader.as_pull(), true).unwrap();
//! producer.join().unwrap();
//! ```
//!
//! ### Check Subtitles
//!
//! ```no_run
//! use mediacheck::check_subtitle;
//!
//! let script = std::fs::read("lyrics.ass").unwrap();
//! match check_subtitle(&script) {
//!     Some(result) if !result.io_error() => println!("{}", result.lyrics().unwrap_or("")),
//!     Some(_) => eprintln!("unreadable subtitle file"),
//!     None => eprintln!("not an ASS script"),
//! }
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `Inspector::check_paths_parallel` checks files across rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system;
//! `ffmpeg-sys-next` links against them at build time.

pub mod config;
pub mod engine;
pub mod error;
pub mod ffmpeg;
pub mod inspector;
pub mod pipe;
#[cfg(feature = "rayon")]
mod rayon;
pub mod report;
pub mod source;
pub mod subtitle;

pub use config::{CheckOptions, DEFAULT_BUFFER_SIZE, DEFAULT_LABEL, MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use engine::{InspectionEngine, RawResult};
pub use error::CheckError;
pub use ffmpeg::{FfmpegEngine, engine_log_level, set_engine_log_level};
pub use inspector::Inspector;
pub use pipe::{PipeSource, create_pipe};
pub use report::{CheckSummary, DiagnosticReport, ReportCollection, ReportKind, Severity, aggregate};
pub use source::{MemorySource, PullSource, ReadSource, ReaderSource, SeekSource, SeekableReader};
pub use subtitle::{
    AssParser, SubtitleCheckResult, SubtitleChecker, SubtitleParser, SubtitleRawResult,
    check_subtitle,
};
