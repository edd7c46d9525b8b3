//! Newline-delimited JSON framing.
//!
//! Network chunks do not respect line boundaries: a JSON object (or a single
//! multi-byte character) may be split across two reads. [`LineDecoder`]
//! keeps the unterminated tail as raw bytes until the next chunk completes
//! it. A line longer than the decoder's limit is dropped whole.

use agent_core::models::StreamEvent;
use tracing::{debug, warn};

/// Longest line kept by [`LineDecoder::new`], in bytes.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Incremental splitter of a byte stream into text lines.
#[derive(Debug)]
pub struct LineDecoder {
    /// Bytes after the last `\n` seen so far.
    partial: Vec<u8>,
    max_line: usize,
    /// Set while skipping the rest of an oversized line.
    discarding: bool,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that drops any line longer than `max_line` bytes.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            partial: Vec::new(),
            max_line,
            discarding: false,
        }
    }

    /// Feed one chunk and return every line it completes.
    ///
    /// Returned lines have the `\n` (and a preceding `\r`) removed. Invalid
    /// UTF-8 is replaced with U+FFFD.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.append(&rest[..pos]);
            if self.discarding {
                self.discarding = false;
            } else {
                lines.push(take_line(&mut self.partial));
            }
            rest = &rest[pos + 1..];
        }
        self.append(rest);

        lines
    }

    /// Flush the unterminated last line, if any, at end of stream.
    pub fn finish(&mut self) -> Option<String> {
        if std::mem::take(&mut self.discarding) || self.partial.is_empty() {
            None
        } else {
            Some(take_line(&mut self.partial))
        }
    }

    /// Number of buffered bytes not yet terminated by a newline.
    pub fn pending_len(&self) -> usize {
        self.partial.len()
    }

    fn append(&mut self, bytes: &[u8]) {
        if self.discarding {
            return;
        }
        if self.pending_len() + bytes.len() > self.max_line {
            warn!(
                buffered = self.pending_len() + bytes.len(),
                limit = self.max_line,
                "dropping oversized stream line"
            );
            self.partial.clear();
            self.discarding = true;
            return;
        }
        self.partial.extend_from_slice(bytes);
    }
}

fn take_line(buf: &mut Vec<u8>) -> String {
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    let line = String::from_utf8_lossy(buf).into_owned();
    buf.clear();
    line
}

/// Parse one stream line.
///
/// Blank lines and lines that are not a JSON event object yield `None`.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamEvent>(trimmed) {
        Ok(StreamEvent::Unknown) => {
            debug!(line = trimmed, "ignoring stream line with unknown type");
            Some(StreamEvent::Unknown)
        }
        Ok(event) => Some(event),
        Err(e) => {
            debug!(error = %e, line = trimmed, "skipping malformed stream line");
            None
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_splits_complete_lines() {
        let mut dec = LineDecoder::new();
        let lines = dec.push(b"one\ntwo\n");
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(dec.pending_len(), 0);
        assert!(dec.finish().is_none());
    }

    #[test]
    fn test_partial_line_is_carried_over() {
        let mut dec = LineDecoder::new();
        assert_eq!(dec.push(br#"{"type":"st"#), Vec::<String>::new());
        assert_eq!(dec.pending_len(), 11);

        let lines = dec.push(b"ep\",\"content\":\"a\"}\n{\"ty");
        assert_eq!(lines, vec![r#"{"type":"step","content":"a"}"#]);

        let lines = dec.push(b"pe\":\"answer\",\"content\":\"b\"}\n");
        assert_eq!(lines, vec![r#"{"type":"answer","content":"b"}"#]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let mut dec = LineDecoder::new();
        let text = "Grüße\n".as_bytes();
        // 'ü' is two bytes; split in the middle of it.
        let split = 3;
        assert!(dec.push(&text[..split]).is_empty());
        assert_eq!(dec.push(&text[split..]), vec!["Grüße"]);
    }

    #[test]
    fn test_crlf_is_stripped() {
        let mut dec = LineDecoder::new();
        assert_eq!(dec.push(b"a\r\nb\r\n"), vec!["a", "b"]);
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut dec = LineDecoder::new();
        assert!(dec.push(b"tail").is_empty());
        assert_eq!(dec.finish().as_deref(), Some("tail"));
        assert!(dec.finish().is_none());
    }

    #[test]
    fn test_empty_lines_are_returned_as_empty() {
        let mut dec = LineDecoder::new();
        assert_eq!(dec.push(b"\n\nx\n"), vec!["", "", "x"]);
    }

    #[test]
    fn test_oversized_line_is_dropped_until_newline() {
        let mut dec = LineDecoder::with_max_line(8);
        assert!(dec.push(b"12345").is_empty());
        assert!(dec.push(b"6789").is_empty());
        assert_eq!(dec.pending_len(), 0);
        assert!(dec.push(b"more junk").is_empty());
        assert_eq!(dec.pending_len(), 0);

        // The rest of the long line goes; the next one is intact.
        assert_eq!(dec.push(b"tail\nok\n"), vec!["ok"]);
        assert_eq!(dec.push(b"12345678\n"), vec!["12345678"]);
    }

    #[test]
    fn test_oversized_tail_is_not_flushed() {
        let mut dec = LineDecoder::with_max_line(4);
        assert!(dec.push(b"abcdef").is_empty());
        assert!(dec.finish().is_none());
        assert_eq!(dec.push(b"ab\n"), vec!["ab"]);
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(
            parse_line(r#"{"type":"info","content":"Found 3 relevant examples."}"#),
            Some(StreamEvent::Info {
                content: "Found 3 relevant examples.".into()
            })
        );
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("{not json"), None);
        assert_eq!(parse_line(r#"{"content":"no type"}"#), None);
        assert_eq!(
            parse_line(r#"{"type":"progress","content":"?"}"#),
            Some(StreamEvent::Unknown)
        );
    }
}
