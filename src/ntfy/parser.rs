//! Line decoding for the ntfy JSON stream.
//!
//! Contains the stateful [`LineDecoder`] that splits raw chunks into lines,
//! the per-line [`parse_line`], and [`event_stream`], which turns a byte
//! stream into a lazy sequence of [`Frame`]s.

use futures_util::stream::{self, Stream};
use futures_util::StreamExt;

use crate::error::{ParseError, StreamError};
use crate::ntfy::events::NotificationEvent;
use crate::traits::ByteStream;

/// Longest line accepted before the stream is considered broken.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// One item decoded from the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A well-formed record
    Event(NotificationEvent),
    /// A line that could not be decoded; skip it
    Malformed(ParseError),
}

/// Decode one line of text into a notification event.
pub fn parse_line(line: &str) -> Result<NotificationEvent, ParseError> {
    serde_json::from_str(line).map_err(|e| ParseError::invalid_json(line, &e))
}

/// Decode one raw line. Blank lines yield `None`.
pub fn decode_line(raw: &[u8]) -> Option<Frame> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    let line = match std::str::from_utf8(raw) {
        Ok(line) => line,
        Err(_) => return Some(Frame::Malformed(ParseError::invalid_utf8(raw))),
    };

    if line.trim().is_empty() {
        return None;
    }

    Some(match parse_line(line) {
        Ok(event) => Frame::Event(event),
        Err(e) => Frame::Malformed(e),
    })
}

/// Decode a complete input in one go.
///
/// The input is already in memory, so no line length limit applies.
pub fn parse_all(input: &[u8]) -> Vec<Frame> {
    input.split(|&b| b == b'\n').filter_map(decode_line).collect()
}

/// Splits a chunked byte stream into newline-terminated lines.
#[derive(Debug)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    limit: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::with_limit(MAX_LINE_BYTES)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            limit,
        }
    }

    /// Append a chunk.
    ///
    /// Fails when the pending partial line grows past the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        self.buffer.extend_from_slice(chunk);
        let pending = match self.buffer.iter().rposition(|&b| b == b'\n') {
            Some(pos) => self.buffer.len() - pos - 1,
            None => self.buffer.len(),
        };
        if pending > self.limit {
            return Err(StreamError::LineTooLong { limit: self.limit });
        }
        Ok(())
    }

    /// Take the next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let offset = self.buffer[self.scanned..].iter().position(|&b| b == b'\n');
        match offset {
            Some(offset) => {
                let end = self.scanned + offset;
                let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
                line.pop();
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Flush the trailing unterminated line at end of input.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

struct DecodeState {
    bytes: ByteStream,
    decoder: LineDecoder,
    done: bool,
}

/// Turn a byte stream into a lazy sequence of frames.
///
/// Malformed lines come out as [`Frame::Malformed`] and the sequence goes on.
/// A read failure comes out as a single `Err` and the sequence ends; so does
/// EOF, after the trailing line is flushed.
pub fn event_stream(bytes: ByteStream) -> impl Stream<Item = Result<Frame, StreamError>> + Send {
    let state = DecodeState {
        bytes,
        decoder: LineDecoder::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            // First, drain complete lines already buffered
            while let Some(line) = state.decoder.next_line() {
                if let Some(frame) = decode_line(&line) {
                    return Some((Ok(frame), state));
                }
            }

            if state.done {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    if let Err(e) = state.decoder.push(&chunk) {
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((
                        Err(StreamError::ReadFailed {
                            message: e.to_string(),
                        }),
                        state,
                    ));
                }
                None => {
                    state.done = true;
                    if let Some(frame) = state.decoder.finish().as_deref().and_then(decode_line) {
                        return Some((Ok(frame), state));
                    }
                    return None;
                }
            }
        }
    })
}
