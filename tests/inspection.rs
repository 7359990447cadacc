//! Inspector behaviour with scripted and FFmpeg-backed engines.
//!
//! FFmpeg-backed tests on real media require fixture files from
//! `tests/fixtures/generate_fixtures.sh` and return early without them.

use std::cell::RefCell;
use std::io::{Cursor, Error as IoError, ErrorKind, Result as IoResult, Write};
use std::path::Path;

use mediacheck::{
    CheckError, CheckOptions, FfmpegEngine, InspectionEngine, Inspector, MemorySource,
    PullSource, RawResult, ReadSource, ReaderSource, ReportKind, create_pipe,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.mp4"
}

/// 16-bit mono PCM WAV of silence: a 44-byte RIFF header and `samples`
/// samples at `sample_rate`.
fn silent_wav(sample_rate: u32, samples: u32) -> Vec<u8> {
    let data_size = samples * 2;
    let mut wav = Vec::with_capacity(44 + data_size as usize);
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(36 + data_size).to_le_bytes());
    wav.extend_from_slice(b"WAVEfmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&1u16.to_le_bytes()); // mono
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&(sample_rate * 2).to_le_bytes()); // byte rate
    wav.extend_from_slice(&2u16.to_le_bytes()); // block align
    wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.resize(44 + data_size as usize, 0);
    wav
}

/// Engine double returning a fixed result and recording its inputs.
struct Scripted {
    result: RawResult,
    seen: RefCell<Vec<(usize, String, bool)>>,
}

impl Scripted {
    fn new(result: RawResult) -> Self {
        Self {
            result,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl InspectionEngine for Scripted {
    fn inspect(
        &self,
        buffer_size: usize,
        label: &str,
        source: PullSource<'_>,
    ) -> Result<RawResult, CheckError> {
        self.seen
            .borrow_mut()
            .push((buffer_size, label.to_string(), source.is_seekable()));
        Ok(self.result)
    }
}

/// Engine double that fails to construct.
struct Exhausted;

impl InspectionEngine for Exhausted {
    fn inspect(&self, _: usize, _: &str, _: PullSource<'_>) -> Result<RawResult, CheckError> {
        Err(CheckError::AllocationFailure("engine read buffer"))
    }
}

#[test]
fn scripted_findings_flow_into_the_collection() {
    let engine = Scripted::new(RawResult {
        no_video_stream: true,
        duration: 180,
        ..RawResult::default()
    });
    let inspector = Inspector::with_engine(&engine, CheckOptions::new().with_label("bucket/key"));

    let bytes = [0u8; 64];
    let mut memory = MemorySource::from_slice(&bytes);
    let collection = inspector.check(memory.as_pull(), true).expect("check");

    assert!(collection.failed());
    assert!(collection.contains(ReportKind::NoVideoStream));
    assert_eq!(collection.duration(), 180);

    let seen = engine.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (32 * 1024, "bucket/key".to_string(), true));
}

#[test]
fn inspect_returns_raw_findings_untouched() {
    let expected = RawResult {
        no_duration: true,
        io_error: true,
        ..RawResult::default()
    };
    let inspector = Inspector::with_engine(Scripted::new(expected), CheckOptions::default());
    let raw = inspector
        .inspect(MemorySource::from_slice(b"").as_pull())
        .expect("inspect");
    assert_eq!(raw, expected);
}

#[test]
fn engine_construction_failure_is_an_error() {
    let inspector = Inspector::with_engine(Exhausted, CheckOptions::default());
    let result = inspector.check_stream(Cursor::new(vec![1u8; 8]), true);
    assert!(matches!(result, Err(CheckError::AllocationFailure(_))));
}

#[test]
fn missing_file_is_a_source_open_error() {
    let inspector = Inspector::with_engine(Scripted::new(RawResult::default()), CheckOptions::new());
    match inspector.check_path("does/not/exist.mkv", true) {
        Err(CheckError::SourceOpen { path, .. }) => {
            assert_eq!(path, Path::new("does/not/exist.mkv"));
        }
        other => panic!("expected SourceOpen, got {other:?}"),
    }
}

#[test]
fn batch_checks_fail_per_entry() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"payload").expect("write");

    let inspector = Inspector::with_engine(
        Scripted::new(RawResult {
            duration: 3,
            ..RawResult::default()
        }),
        CheckOptions::new(),
    );
    let paths = [file.path().to_path_buf(), "missing.mp4".into()];
    let results = inspector.check_paths(&paths, true);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().expect("first").duration(), 3);
    assert!(matches!(results[1], Err(CheckError::SourceOpen { .. })));
}

// ── FFmpeg engine ────────────────────────────────────────────────

#[test]
fn ffmpeg_reports_empty_input_as_io_error() {
    let inspector = Inspector::new();
    let collection = inspector
        .check(MemorySource::from_slice(b"").as_pull(), true)
        .expect("check");
    assert!(collection.failed());
    assert!(collection.contains(ReportKind::IoError));
}

#[test]
fn ffmpeg_rejects_garbage_without_erroring() {
    let garbage: Vec<u8> = (0..64 * 1024u32).map(|i| (i * 7 + 3) as u8).collect();
    let collection = Inspector::new()
        .check_reader(Cursor::new(garbage), true)
        .expect("check");
    assert!(collection.failed());
}

#[test]
fn ffmpeg_reports_pull_failures_as_io_error() {
    struct Reset;

    impl ReadSource for Reset {
        fn read(&mut self, _buffer: &mut [u8]) -> IoResult<usize> {
            Err(IoError::new(ErrorKind::ConnectionReset, "object stream reset"))
        }
    }

    let mut reset = Reset;
    let collection = Inspector::new()
        .check(PullSource::forward(&mut reset), true)
        .expect("check");
    assert!(collection.contains(ReportKind::IoError));
}

#[test]
fn ffmpeg_findings_are_ignored_for_audio_only_checks() {
    let collection = Inspector::with_engine(FfmpegEngine::new(), CheckOptions::new())
        .check(MemorySource::from_slice(b"").as_pull(), false)
        .expect("check");
    assert!(collection.is_empty());
    assert!(collection.passed());
}

#[test]
fn ffmpeg_reads_duration_and_streams_from_seekable_memory() {
    let wav = silent_wav(8000, 2 * 8000);
    assert_eq!(wav.len(), 44 + 32_000);

    let collection = Inspector::new()
        .check(MemorySource::from_slice(&wav).as_pull(), true)
        .expect("check");

    assert_eq!(collection.duration(), 2);
    assert!(collection.contains(ReportKind::NoVideoStream));
    assert!(!collection.contains(ReportKind::NoDurationFound));
    assert!(!collection.contains(ReportKind::IoError));
    assert_eq!(collection.len(), 1);
}

#[test]
fn ffmpeg_truncates_duration_to_whole_seconds() {
    let wav = silent_wav(8000, 8000 * 5 / 2);
    let raw = Inspector::new()
        .inspect(MemorySource::from_slice(&wav).as_pull())
        .expect("inspect");

    assert_eq!(raw.duration, 2);
    assert!(!raw.no_duration);
    assert!(raw.no_video_stream);
    assert!(!raw.io_error);
}

#[test]
fn ffmpeg_reads_valid_media_without_a_seek_callback() {
    let wav = silent_wav(8000, 2 * 8000);
    let mut forward = ReaderSource::new(Cursor::new(wav));
    let pull = forward.as_pull();
    assert!(!pull.is_seekable());

    let collection = Inspector::new().check(pull, true).expect("check");
    assert_eq!(collection.duration(), 2);
    assert!(collection.contains(ReportKind::NoVideoStream));
    assert!(!collection.contains(ReportKind::IoError));
}

#[test]
fn ffmpeg_accepts_valid_media_through_a_pipe() {
    let wav = silent_wav(8000, 8000);
    let (mut reader, mut writer) = create_pipe().expect("pipe");
    let producer = std::thread::spawn(move || {
        // The demuxer may stop early and close the pipe.
        let _ = writer.write_all(&wav);
    });

    let raw = Inspector::new().inspect(reader.as_pull()).expect("inspect");
    drop(reader);
    producer.join().expect("producer");

    assert!(!raw.io_error);
    assert!(!raw.no_duration);
    assert_eq!(raw.duration, 1);
}

#[test]
fn ffmpeg_accepts_sample_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let collection = Inspector::new().check_path(path, true).expect("check");
    assert!(collection.passed(), "{collection}");
    assert!(collection.duration() > 0);
}

#[test]
fn ffmpeg_accepts_sample_video_through_a_pipe() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let bytes = std::fs::read(path).expect("read fixture");
    let (mut reader, mut writer) = create_pipe().expect("pipe");
    let producer = std::thread::spawn(move || {
        // The demuxer may stop early and close the pipe.
        let _ = writer.write_all(&bytes);
    });

    let collection = Inspector::new().check(reader.as_pull(), true).expect("check");
    drop(reader);
    producer.join().expect("producer");

    assert!(!collection.contains(ReportKind::NoVideoStream));
}

#[test]
fn ffmpeg_flags_audio_only_media() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    let inspector = Inspector::new();
    let strict = inspector.check_path(path, true).expect("check");
    assert!(strict.contains(ReportKind::NoVideoStream));

    let relaxed = inspector.check_path(path, false).expect("check");
    assert!(relaxed.passed());
}
