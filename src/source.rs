//! Pull-based byte sources.
//!
//! The inspection engine never receives a whole file. It pulls bytes on
//! demand through a [`PullSource`], which binds a caller-owned handle to
//! either a read capability or a read + seek capability.
//!
//! Two traits describe the capabilities:
//!
//! - [`ReadSource`]: "read up to N bytes". Every source has this.
//! - [`SeekSource`]: adds "seek to offset" and "report total size". Only
//!   random-access sources (files, in-memory buffers, ranged object reads)
//!   implement it.
//!
//! Seek absence is a type-level property: a [`PipeSource`](crate::PipeSource)
//! does not implement [`SeekSource`] and can only ever be bound as
//! [`PullSource::Forward`].
//!
//! Adapters here are pure pass-through. They do not buffer, transform, or
//! look at the bytes they move.
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//!
//! use mediacheck::{PullSource, SeekableReader};
//!
//! let mut source = SeekableReader::new(File::open("input.mkv")?);
//! let pull = PullSource::seekable(&mut source);
//! assert!(pull.is_seekable());
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{Cursor, ErrorKind, Read, Result as IoResult, Seek, SeekFrom};

/// A source of bytes that can be read sequentially.
///
/// `Ok(0)` signals end of stream. An `Err` is reported to the engine as an
/// I/O failure for the current run.
pub trait ReadSource {
    /// Read up to `buffer.len()` bytes into `buffer`, returning how many
    /// bytes were written.
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize>;
}

/// A [`ReadSource`] that also supports random access.
pub trait SeekSource: ReadSource {
    /// Move the read position, returning the new absolute offset.
    fn seek(&mut self, position: SeekFrom) -> IoResult<u64>;

    /// Total size of the source in bytes.
    ///
    /// The default implementation seeks to the end and back. Sources that
    /// know their size up front (e.g. from an object-store HEAD) should
    /// override it.
    fn size(&mut self) -> IoResult<u64> {
        let current = self.seek(SeekFrom::Current(0))?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }
}

/// A caller-owned source bound to the capabilities it actually has.
///
/// The borrow ties the source's lifetime to the inspection call: the handle
/// must outlive the run, and the adapter never takes ownership of it.
pub enum PullSource<'a> {
    /// Strictly forward, non-seekable source (pipes, sockets, stdin).
    Forward(&'a mut dyn ReadSource),
    /// Random-access source.
    Seekable(&'a mut dyn SeekSource),
}

impl<'a> PullSource<'a> {
    /// Bind a forward-only source.
    pub fn forward(source: &'a mut dyn ReadSource) -> Self {
        PullSource::Forward(source)
    }

    /// Bind a seekable source.
    pub fn seekable(source: &'a mut dyn SeekSource) -> Self {
        PullSource::Seekable(source)
    }

    /// Whether the bound source offers a seek capability.
    pub fn is_seekable(&self) -> bool {
        matches!(self, PullSource::Seekable(_))
    }

    /// Pull up to `buffer.len()` bytes from the source.
    pub fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        match self {
            PullSource::Forward(source) => source.read(buffer),
            PullSource::Seekable(source) => source.read(buffer),
        }
    }

    /// Seek the source. Returns `None` when the source is forward-only.
    pub fn seek(&mut self, position: SeekFrom) -> Option<IoResult<u64>> {
        match self {
            PullSource::Forward(_) => None,
            PullSource::Seekable(source) => Some(source.seek(position)),
        }
    }

    /// Total size of the source. Returns `None` when the source is
    /// forward-only.
    pub fn size(&mut self) -> Option<IoResult<u64>> {
        match self {
            PullSource::Forward(_) => None,
            PullSource::Seekable(source) => Some(source.size()),
        }
    }
}

/// Forward-only adapter over any [`Read`].
///
/// Use this for stdin, sockets, or any stream that cannot seek.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Bind this adapter as a [`PullSource::Forward`].
    pub fn as_pull(&mut self) -> PullSource<'_> {
        PullSource::Forward(self)
    }

    /// Recover the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ReadSource for ReaderSource<R> {
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        read_retrying(&mut self.reader, buffer)
    }
}

/// Seekable adapter over any [`Read`] + [`Seek`].
///
/// Covers files, in-memory cursors, and remote objects exposing ranged
/// reads through the std I/O traits.
#[derive(Debug)]
pub struct SeekableReader<R> {
    reader: R,
    size: Option<u64>,
}

impl<R: Read + Seek> SeekableReader<R> {
    /// Wrap a reader. Its size is discovered lazily by seeking.
    pub fn new(reader: R) -> Self {
        Self { reader, size: None }
    }

    /// Record the total size up front so size queries never seek.
    #[must_use]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Bind this adapter as a [`PullSource::Seekable`].
    pub fn as_pull(&mut self) -> PullSource<'_> {
        PullSource::Seekable(self)
    }

    /// Recover the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read + Seek> ReadSource for SeekableReader<R> {
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        read_retrying(&mut self.reader, buffer)
    }
}

impl<R: Read + Seek> SeekSource for SeekableReader<R> {
    fn seek(&mut self, position: SeekFrom) -> IoResult<u64> {
        self.reader.seek(position)
    }

    fn size(&mut self) -> IoResult<u64> {
        if let Some(size) = self.size {
            return Ok(size);
        }
        let current = self.reader.stream_position()?;
        let end = self.reader.seek(SeekFrom::End(0))?;
        self.reader.seek(SeekFrom::Start(current))?;
        self.size = Some(end);
        Ok(end)
    }
}

/// Seekable source over a borrowed byte slice.
pub type MemorySource<'a> = SeekableReader<Cursor<&'a [u8]>>;

impl<'a> SeekableReader<Cursor<&'a [u8]>> {
    /// Serve bytes from memory.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Self::new(Cursor::new(bytes)).with_size(bytes.len() as u64)
    }
}

fn read_retrying<R: Read>(reader: &mut R, buffer: &mut [u8]) -> IoResult<usize> {
    loop {
        match reader.read(buffer) {
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Error as IoError, ErrorKind};

    use super::*;

    struct Flaky {
        interruptions: usize,
    }

    impl Read for Flaky {
        fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
            if self.interruptions > 0 {
                self.interruptions -= 1;
                return Err(IoError::from(ErrorKind::Interrupted));
            }
            buffer[0] = 7;
            Ok(1)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut source = ReaderSource::new(Flaky { interruptions: 3 });
        let mut buffer = [0u8; 4];
        assert_eq!(ReadSource::read(&mut source, &mut buffer).unwrap(), 1);
        assert_eq!(buffer[0], 7);
    }

    #[test]
    fn default_size_restores_position() {
        struct Plain(Cursor<Vec<u8>>);
        impl ReadSource for Plain {
            fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
                self.0.read(buffer)
            }
        }
        impl SeekSource for Plain {
            fn seek(&mut self, position: SeekFrom) -> IoResult<u64> {
                self.0.seek(position)
            }
        }

        let mut plain = Plain(Cursor::new(vec![1, 2, 3, 4, 5]));
        plain.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(plain.size().unwrap(), 5);
        assert_eq!(plain.seek(SeekFrom::Current(0)).unwrap(), 2);
    }
}
