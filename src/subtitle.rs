//! Subtitle checks.
//!
//! A [`SubtitleChecker`] hands an in-memory subtitle payload to a
//! [`SubtitleParser`] and turns what comes back into a caller-owned
//! [`SubtitleCheckResult`]: either the extracted lyrics, or an I/O-error
//! flag. A parser that cannot produce any result at all yields `None`,
//! which is distinct from a successful result with empty lyrics.
//!
//! [`AssParser`] is the default parser, for ASS/SSA karaoke scripts.
//!
//! # Example
//!
//! ```
//! use mediacheck::check_subtitle;
//!
//! let script = "[Events]\n\
//!     Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n\
//!     Dialogue: 0,0:00:01.00,0:00:04.00,Default,,0,0,0,,{\\k20}Hel{\\k30}lo\n";
//!
//! let result = check_subtitle(script.as_bytes()).expect("parsable script");
//! assert!(!result.io_error());
//! assert_eq!(result.lyrics(), Some("Hello"));
//! ```

use std::io::{Read, Seek, SeekFrom};

use crate::error::CheckError;

/// Raw output of a [`SubtitleParser`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtitleRawResult {
    /// The payload could not be read as a subtitle file.
    pub io_error: bool,
    /// Extracted text. Only meaningful when `io_error` is clear.
    pub text: Option<String>,
}

/// A subtitle payload parser.
pub trait SubtitleParser {
    /// Parse `buffer`.
    ///
    /// Returns `None` when no result can be constructed at all (for example
    /// when the payload is not a subtitle script of the expected kind).
    fn parse(&self, buffer: &[u8]) -> Option<SubtitleRawResult>;
}

impl<P: SubtitleParser + ?Sized> SubtitleParser for &P {
    fn parse(&self, buffer: &[u8]) -> Option<SubtitleRawResult> {
        (**self).parse(buffer)
    }
}

/// Outcome of a subtitle check.
///
/// Exactly one of "lyrics" and "I/O error" holds: [`lyrics`] is `Some`
/// if and only if [`io_error`] is `false`.
///
/// [`lyrics`]: SubtitleCheckResult::lyrics
/// [`io_error`]: SubtitleCheckResult::io_error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCheckResult {
    lyrics: Option<String>,
}

impl SubtitleCheckResult {
    fn from_raw(raw: SubtitleRawResult) -> Self {
        if raw.io_error {
            return Self { lyrics: None };
        }
        Self {
            lyrics: Some(raw.text.unwrap_or_default()),
        }
    }

    /// The extracted lyrics, absent on I/O error.
    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    /// Whether the parser hit its I/O-error path.
    pub fn io_error(&self) -> bool {
        self.lyrics.is_none()
    }

    /// Take ownership of the lyrics.
    pub fn into_lyrics(self) -> Option<String> {
        self.lyrics
    }
}

/// Runs a [`SubtitleParser`] over subtitle payloads.
#[derive(Debug, Clone, Default)]
pub struct SubtitleChecker<P = AssParser> {
    parser: P,
}

impl SubtitleChecker<AssParser> {
    /// A checker using [`AssParser`].
    pub fn new() -> Self {
        Self { parser: AssParser }
    }
}

impl<P: SubtitleParser> SubtitleChecker<P> {
    /// A checker using a custom parser.
    pub fn with_parser(parser: P) -> Self {
        Self { parser }
    }

    /// Check an in-memory payload.
    ///
    /// Returns `None` if the parser produced no result.
    pub fn check(&self, buffer: &[u8]) -> Option<SubtitleCheckResult> {
        let Some(raw) = self.parser.parse(buffer) else {
            log::debug!("Subtitle parser produced no result ({} bytes)", buffer.len());
            return None;
        };
        let result = SubtitleCheckResult::from_raw(raw);
        log::debug!(
            "Checked subtitle payload ({} bytes, io_error={})",
            buffer.len(),
            result.io_error()
        );
        Some(result)
    }

    /// Rewind `source`, read it completely, and check the bytes.
    ///
    /// # Errors
    ///
    /// - [`CheckError::AllocationFailure`] if the payload buffer cannot be
    ///   allocated.
    /// - [`CheckError::IoError`] if seeking or reading `source` fails.
    pub fn check_source<R: Read + Seek>(
        &self,
        mut source: R,
    ) -> Result<Option<SubtitleCheckResult>, CheckError> {
        let length = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        let mut buffer = Vec::new();
        let capacity = usize::try_from(length)
            .map_err(|_| CheckError::AllocationFailure("subtitle buffer"))?;
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| CheckError::AllocationFailure("subtitle buffer"))?;
        source.read_to_end(&mut buffer)?;

        Ok(self.check(&buffer))
    }
}

/// Check an in-memory payload with [`AssParser`].
pub fn check_subtitle(buffer: &[u8]) -> Option<SubtitleCheckResult> {
    SubtitleChecker::new().check(buffer)
}

/// Parser for ASS/SSA scripts.
///
/// - A payload that is not text (invalid UTF-8, embedded NUL) is an I/O
///   error.
/// - A payload without an `[Events]` section yields no result.
/// - Otherwise the lyrics are the `Text` field of every `Dialogue:` line,
///   with override blocks (`{\k20}` and friends) removed and ASS escapes
///   resolved, one line per dialogue.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssParser;

/// `Text` is the tenth field of the standard v4+ event format.
const DEFAULT_TEXT_FIELD: usize = 9;

impl SubtitleParser for AssParser {
    fn parse(&self, buffer: &[u8]) -> Option<SubtitleRawResult> {
        let Ok(script) = std::str::from_utf8(buffer) else {
            return Some(io_failure());
        };
        if script.contains('\0') {
            return Some(io_failure());
        }
        let script = script.strip_prefix('\u{feff}').unwrap_or(script);

        let mut in_events = false;
        let mut seen_events = false;
        let mut text_field = DEFAULT_TEXT_FIELD;
        let mut lines = Vec::new();

        for line in script.lines() {
            let line = line.trim();
            if line.starts_with('[') && line.ends_with(']') {
                in_events = line.eq_ignore_ascii_case("[events]");
                seen_events |= in_events;
                continue;
            }
            if !in_events {
                continue;
            }

            if let Some(format) = line.strip_prefix("Format:") {
                if let Some(position) = format
                    .split(',')
                    .position(|field| field.trim().eq_ignore_ascii_case("text"))
                {
                    text_field = position;
                }
            } else if let Some(dialogue) = line.strip_prefix("Dialogue:")
                && let Some(text) = dialogue.splitn(text_field + 1, ',').nth(text_field)
            {
                let cleaned = strip_ass_tags(text);
                if !cleaned.is_empty() {
                    lines.push(cleaned);
                }
            }
        }

        if !seen_events {
            return None;
        }

        Some(SubtitleRawResult {
            io_error: false,
            text: Some(lines.join("\n")),
        })
    }
}

fn io_failure() -> SubtitleRawResult {
    SubtitleRawResult {
        io_error: true,
        text: None,
    }
}

/// Remove `{...}` override blocks and resolve `\N`, `\n` and `\h`.
fn strip_ass_tags(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        if c == '{' && !in_tag {
            in_tag = true;
        } else if c == '}' && in_tag {
            in_tag = false;
        } else if !in_tag {
            result.push(c);
        }
    }

    result
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", " ")
        .trim()
        .to_string()
}
