//! Record closing over a line cursor.
//!
//! Every ASC record (description, section list, contour, property) may span
//! one or many physical lines. [`close`] finds where the current record
//! ends within one span of text; [`Cursor`] drives it across lines.

use std::io::BufRead;

use crate::error::{MbfError, Result};

use super::asc::State;
use super::source::LineSource;

/// Outcome of scanning a span for a close bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Close<'a> {
    /// Text before the bracket, or the whole span if none was found.
    pub content: &'a str,
    /// Whether a close bracket was found.
    pub closed: bool,
    /// Text after the bracket.
    pub rest: &'a str,
}

/// Find the first close bracket.
///
/// Neither bracket depth nor quoting is tracked: `a (b) c)` closes after
/// `b`, and so does `"a)b"`.
pub fn close(remainder: &str) -> Close<'_> {
    match remainder.find(')') {
        Some(i) => Close {
            content: remainder[..i].trim_end(),
            closed: true,
            rest: remainder[i + 1..].trim_start(),
        },
        None => Close {
            content: remainder,
            closed: false,
            rest: "",
        },
    }
}

/// Owned cursor over the current line buffer.
///
/// The buffer always holds the unconsumed, left-trimmed remainder of the
/// current physical line. Anything left after a record closes stays
/// available to the next reader.
pub struct Cursor<R> {
    source: LineSource<R>,
    buf: String,
}

impl<R: BufRead> Cursor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            source: LineSource::new(reader),
            buf: String::new(),
        }
    }

    /// The unconsumed text of the current line.
    pub fn rest(&self) -> &str {
        &self.buf
    }

    /// Current physical line number.
    pub fn line(&self) -> usize {
        self.source.line()
    }

    /// Drop `n` bytes from the front of the buffer.
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.buf.len());
        self.buf = self.buf[n..].trim_start().to_string();
    }

    /// Discard the rest of the current line.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Make sure the buffer holds significant text, pulling lines as
    /// needed. Returns `false` at end of input.
    pub fn fill(&mut self) -> Result<bool> {
        while self.buf.is_empty() {
            match self.source.next_line()? {
                Some(line) => self.buf = line,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Like [`fill`](Self::fill), but end of input is an error.
    pub fn require(&mut self, state: State) -> Result<()> {
        if self.fill()? {
            Ok(())
        } else {
            Err(self.eof(state))
        }
    }

    /// One closer step: the content up to the close bracket on the current
    /// line, or the whole line if it does not close there.
    ///
    /// When the record is still open the next line is loaded, so running
    /// out of input mid-record fails with `UnexpectedEndOfInput`.
    pub fn close_step(&mut self, state: State) -> Result<(String, bool)> {
        let step = close(&self.buf);
        let content = step.content.to_string();
        let closed = step.closed;
        self.buf = step.rest.to_string();

        if !closed {
            match self.source.next_line()? {
                Some(line) => self.buf = line,
                None => return Err(self.eof(state)),
            }
        }
        Ok((content, closed))
    }

    /// Read up to the next close bracket, joining lines with single spaces.
    pub fn close_record(&mut self, state: State) -> Result<String> {
        let mut content = String::new();
        loop {
            let (chunk, closed) = self.close_step(state)?;
            join(&mut content, &chunk);
            if closed {
                return Ok(content);
            }
        }
    }

    /// Read a record whose opening bracket was already consumed, following
    /// nested brackets until they balance.
    ///
    /// Inner brackets are kept, so `RGB (255, 0, 0))` reads as
    /// `RGB (255, 0, 0)`.
    pub fn read_balanced(&mut self, state: State) -> Result<String> {
        let mut value = String::new();
        let mut depth = 1usize;
        loop {
            let chunk = self.close_record(state)?;
            depth += chunk.matches('(').count();
            depth -= 1;
            value.push_str(&chunk);
            if depth == 0 {
                return Ok(value);
            }
            value.push(')');
        }
    }

    fn eof(&self, state: State) -> MbfError {
        MbfError::UnexpectedEndOfInput {
            state: state.to_string(),
            line: self.source.line(),
        }
    }
}

/// Append `chunk` to `content`, separated by one space.
fn join(content: &mut String, chunk: &str) {
    if chunk.is_empty() {
        return;
    }
    if !content.is_empty() {
        content.push(' ');
    }
    content.push_str(chunk);
}
