//! Inspection configuration.
//!
//! [`CheckOptions`] is a builder for the settings an
//! [`Inspector`](crate::Inspector) is constructed with. They are fixed for the
//! lifetime of the inspector: engines are long-lived and reused, so buffer
//! sizing is not a per-call parameter.
//!
//! # Example
//!
//! ```no_run
//! use mediacheck::{CheckOptions, Inspector};
//!
//! let options = CheckOptions::new()
//!     .with_buffer_size(64 * 1024)
//!     .with_label("s3://bucket/video/42");
//! let inspector = Inspector::with_options(options);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};

/// Default read-ahead buffer handed to the inspection engine (32 KiB).
///
/// Matches FFmpeg's own default I/O buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

/// Smallest accepted read-ahead buffer (4 KiB).
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Largest accepted read-ahead buffer (1 MiB).
pub const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Label the engine prints in its per-run summary when none is configured.
pub const DEFAULT_LABEL: &str = "remote object";

/// Construction-time settings for an [`Inspector`](crate::Inspector).
///
/// The buffer size is a tuning value, not a correctness parameter: larger
/// buffers mean fewer pulls from the source at the cost of memory.
#[derive(Clone, PartialEq, Eq)]
pub struct CheckOptions {
    pub(crate) buffer_size: usize,
    pub(crate) label: String,
}

impl Debug for CheckOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CheckOptions")
            .field("buffer_size", &self.buffer_size)
            .field("label", &self.label)
            .finish()
    }
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckOptions {
    /// Create options with the default buffer size and label.
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    /// Set the engine's internal read-ahead buffer size in bytes.
    ///
    /// Clamped to [`MIN_BUFFER_SIZE`]..=[`MAX_BUFFER_SIZE`].
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE);
        self
    }

    /// Set the label identifying the source in the engine's summary output.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The configured read-ahead buffer size in bytes.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// The configured summary label.
    pub fn label(&self) -> &str {
        &self.label
    }
}
