//! Pull-source adapters: pass-through reads, seeks, and size queries.

use std::io::{Cursor, Error as IoError, ErrorKind, Result as IoResult, SeekFrom};

use mediacheck::{
    MemorySource, PullSource, ReadSource, ReaderSource, SeekSource, SeekableReader,
};

fn drain(source: &mut PullSource<'_>) -> IoResult<Vec<u8>> {
    let mut collected = Vec::new();
    let mut buffer = [0u8; 3];
    loop {
        let count = source.read(&mut buffer)?;
        if count == 0 {
            return Ok(collected);
        }
        collected.extend_from_slice(&buffer[..count]);
    }
}

#[test]
fn memory_source_passes_bytes_through() {
    let bytes = b"\x1a\x45\xdf\xa3 matroska";
    let mut memory = MemorySource::from_slice(bytes);
    let mut pull = memory.as_pull();
    assert!(pull.is_seekable());
    assert_eq!(drain(&mut pull).unwrap(), bytes);
}

#[test]
fn memory_source_seeks_and_reports_size() {
    let bytes: Vec<u8> = (0..32).collect();
    let mut memory = MemorySource::from_slice(&bytes);
    let mut pull = memory.as_pull();

    assert_eq!(pull.size().unwrap().unwrap(), 32);
    assert_eq!(pull.seek(SeekFrom::Start(30)).unwrap().unwrap(), 30);
    assert_eq!(drain(&mut pull).unwrap(), vec![30, 31]);
    assert_eq!(pull.seek(SeekFrom::End(-4)).unwrap().unwrap(), 28);
    assert_eq!(pull.seek(SeekFrom::Current(2)).unwrap().unwrap(), 30);
}

#[test]
fn forward_source_has_no_seek_capability() {
    let mut reader = ReaderSource::new(Cursor::new(vec![9u8; 10]));
    let mut pull = reader.as_pull();
    assert!(!pull.is_seekable());
    assert!(pull.seek(SeekFrom::Start(0)).is_none());
    assert!(pull.size().is_none());
    assert_eq!(drain(&mut pull).unwrap().len(), 10);
}

#[test]
fn seekable_reader_discovers_size_lazily() {
    let mut reader = SeekableReader::new(Cursor::new(vec![0u8; 100]));
    reader.seek(SeekFrom::Start(40)).unwrap();
    assert_eq!(reader.size().unwrap(), 100);
    // Size discovery must not move the read position.
    assert_eq!(reader.seek(SeekFrom::Current(0)).unwrap(), 40);
}

#[test]
fn known_size_is_reported_without_seeking() {
    let mut reader = SeekableReader::new(Cursor::new(vec![0u8; 10])).with_size(4096);
    assert_eq!(reader.size().unwrap(), 4096);
}

#[test]
fn read_failures_propagate() {
    struct Failing;

    impl ReadSource for Failing {
        fn read(&mut self, _buffer: &mut [u8]) -> IoResult<usize> {
            Err(IoError::new(ErrorKind::TimedOut, "deadline exceeded"))
        }
    }

    let mut failing = Failing;
    let mut pull = PullSource::forward(&mut failing);
    let error = drain(&mut pull).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TimedOut);
}

#[test]
fn custom_seekable_sources_bind_as_seekable() {
    /// Serves a fixed-size object of zeros, like a ranged remote read.
    struct Zeros {
        position: u64,
        length: u64,
    }

    impl ReadSource for Zeros {
        fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
            let remaining = self.length.saturating_sub(self.position);
            let count = remaining.min(buffer.len() as u64) as usize;
            buffer[..count].fill(0);
            self.position += count as u64;
            Ok(count)
        }
    }

    impl SeekSource for Zeros {
        fn seek(&mut self, position: SeekFrom) -> IoResult<u64> {
            self.position = match position {
                SeekFrom::Start(offset) => offset,
                SeekFrom::End(delta) => self.length.saturating_add_signed(delta),
                SeekFrom::Current(delta) => self.position.saturating_add_signed(delta),
            };
            Ok(self.position)
        }
    }

    let mut zeros = Zeros {
        position: 0,
        length: 7,
    };
    let mut pull = PullSource::seekable(&mut zeros);
    assert_eq!(pull.size().unwrap().unwrap(), 7);
    assert_eq!(drain(&mut pull).unwrap(), vec![0u8; 7]);
}
