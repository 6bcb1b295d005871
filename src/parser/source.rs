//! Line-oriented input with comment stripping.

use std::io::BufRead;

use crate::error::Result;

/// Comment marker: everything after it on a line is ignored.
pub const COMMENT: char = ';';

/// Supplies comment-stripped, trimmed lines from a reader.
///
/// Line numbers are 1-indexed and count physical lines, blank ones included.
pub struct LineSource<R> {
    reader: R,
    line: usize,
    raw: Vec<u8>,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            raw: Vec::new(),
        }
    }

    /// Read the next line, or `None` at end of input.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected;
    /// instrument exports are not always clean.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.raw.clear();
        let read = self.reader.read_until(b'\n', &mut self.raw)?;
        if read == 0 {
            return Ok(None);
        }
        self.line += 1;
        let text = String::from_utf8_lossy(&self.raw);
        Ok(Some(strip_line(&text).to_string()))
    }

    /// Number of the last line returned.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Remove a trailing comment and surrounding whitespace.
///
/// The first `;` starts the comment, quoted or not.
pub fn strip_line(line: &str) -> &str {
    match line.find(COMMENT) {
        Some(i) => line[..i].trim(),
        None => line.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_comment() {
        assert_eq!(strip_line(")  ;  End of description"), ")");
    }

    #[test]
    fn test_strip_line_comment_only() {
        assert_eq!(strip_line(";\tV3 text file written for MicroBrightField products."), "");
    }

    #[test]
    fn test_strip_line_whitespace() {
        assert_eq!(strip_line("   (Closed)  \r\n"), "(Closed)");
    }

    #[test]
    fn test_strip_line_unbalanced_quote() {
        assert_eq!(strip_line("(Description 5\" wide) ; note \"x\""), "(Description 5\" wide)");
    }

    #[test]
    fn test_line_source_numbers() {
        let input = "first\n\n; comment\nlast";
        let mut source = LineSource::new(input.as_bytes());

        assert_eq!(source.next_line().unwrap().as_deref(), Some("first"));
        assert_eq!(source.line(), 1);
        assert_eq!(source.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(source.next_line().unwrap().as_deref(), Some("last"));
        assert_eq!(source.line(), 4);
        assert_eq!(source.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_source_lossy() {
        let input: &[u8] = b"(Description \xe9t\xe9)\n";
        let mut source = LineSource::new(input);

        let line = source.next_line().unwrap().unwrap();
        assert!(line.starts_with("(Description"));
        assert!(line.ends_with(')'));
    }
}
