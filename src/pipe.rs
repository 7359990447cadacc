//! Streaming bridge over an OS pipe.
//!
//! Some sources push bytes (an upload body, a download callback, a child
//! process) instead of answering reads. [`create_pipe`] gives such a producer
//! the write end of a unidirectional OS pipe while the inspection pulls from
//! the read end through a [`PipeSource`].
//!
//! Pipes cannot seek, so [`PipeSource`] only implements
//! [`ReadSource`](crate::ReadSource). Callers that need seeking must use a
//! different adapter.
//!
//! # Example
//!
//! ```no_run
//! use std::{fs::File, io, thread};
//!
//! use mediacheck::{Inspector, create_pipe};
//!
//! let (mut reader, mut writer) = create_pipe()?;
//! let producer = thread::spawn(move || {
//!     let mut file = File::open("input.mkv")?;
//!     io::copy(&mut file, &mut writer)
//! });
//!
//! let collection = Inspector::new().check(reader.as_pull(), true)?;
//! let _ = producer.join();
//! println!("{collection}");
//! # Ok::<(), mediacheck::CheckError>(())
//! ```

use std::io::{ErrorKind, PipeReader, PipeWriter, Read, Result as IoResult};

use crate::error::CheckError;
use crate::source::{PullSource, ReadSource};

/// Read end of a streaming bridge.
///
/// Reads block until the producer writes or every write end is closed, at
/// which point they return `Ok(0)`.
#[derive(Debug)]
pub struct PipeSource {
    reader: PipeReader,
}

impl PipeSource {
    /// Bind the read end as a [`PullSource::Forward`].
    pub fn as_pull(&mut self) -> PullSource<'_> {
        PullSource::Forward(self)
    }

    /// Recover the underlying pipe reader.
    pub fn into_inner(self) -> PipeReader {
        self.reader
    }
}

impl ReadSource for PipeSource {
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        loop {
            match self.reader.read(buffer) {
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                result => return result,
            }
        }
    }
}

/// Create a unidirectional OS pipe.
///
/// Returns the read end wrapped for inspection and the raw write end for the
/// producer. Dropping the writer signals end of stream.
///
/// # Errors
///
/// Returns [`CheckError::PipeCreation`] if the OS cannot create the pipe
/// (e.g. the process is out of file descriptors). No retry is attempted.
pub fn create_pipe() -> Result<(PipeSource, PipeWriter), CheckError> {
    open_pipe_with(std::io::pipe)
}

pub(crate) fn open_pipe_with<F>(open: F) -> Result<(PipeSource, PipeWriter), CheckError>
where
    F: FnOnce() -> IoResult<(PipeReader, PipeWriter)>,
{
    let (reader, writer) = open().map_err(|error| {
        log::warn!("Pipe creation failed: {error}");
        CheckError::PipeCreation(error)
    })?;
    log::debug!("Created streaming bridge pipe");
    Ok((PipeSource { reader }, writer))
}
