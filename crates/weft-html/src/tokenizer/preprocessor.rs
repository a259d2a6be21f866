//! [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
//!
//! The input buffer the tokenizer reads from. It holds the raw code points
//! written so far and normalizes them lazily as the cursor advances, so that
//! text can be appended (streaming) or spliced in at the cursor
//! (`document.write`) at any point of the parse.

use std::char::REPLACEMENT_CHARACTER;

/// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
///
/// "Before the tokenization stage, the input stream must be preprocessed by
/// normalizing newlines."
#[derive(Debug, Default)]
pub struct Preprocessor {
    buffer: Vec<char>,
    /// Index of the next unconsumed code point in `buffer`.
    pos: usize,
    /// No more text will be appended; running out of input now means EOF.
    last_chunk_written: bool,
    /// A CR was the last buffered code point; drop a LF that arrives with the
    /// next chunk.
    skip_next_new_line: bool,
    /// High surrogate left over at the end of the previous UTF-16 chunk.
    pending_high_surrogate: Option<u16>,
    /// (offset, line, column) of the last location lookup.
    line_cache: (usize, usize, usize),
}

impl Preprocessor {
    /// An empty buffer waiting for input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_cache: (0, 1, 1),
            ..Self::default()
        }
    }

    /// Append a chunk of input at the end of the buffer.
    pub fn write(&mut self, chunk: &str) {
        self.buffer.extend(chunk.chars());
    }

    /// Append UTF-16 code units. Surrogate pairs are combined into one scalar
    /// value, including pairs split across two calls; lone surrogates become
    /// U+FFFD.
    pub fn write_utf16(&mut self, units: &[u16]) {
        let mut pending: Vec<u16> = self.pending_high_surrogate.take().into_iter().collect();
        pending.extend_from_slice(units);

        if let Some(&last) = pending.last()
            && is_high_surrogate(last)
        {
            let _ = pending.pop();
            self.pending_high_surrogate = Some(last);
        }

        let text: String = char::decode_utf16(pending)
            .map(|unit| unit.unwrap_or(REPLACEMENT_CHARACTER))
            .collect();
        self.write(&text);
    }

    /// Splice `text` into the buffer at the cursor, so it is consumed before
    /// anything that was already buffered.
    pub fn insert_at_cursor(&mut self, text: &str) {
        let tail = self.buffer.split_off(self.pos);
        self.buffer.extend(text.chars());
        self.buffer.extend(tail);
    }

    /// Mark the end of input. A dangling high surrogate becomes U+FFFD.
    pub fn end(&mut self) {
        if self.pending_high_surrogate.take().is_some() {
            self.buffer.push(REPLACEMENT_CHARACTER);
        }
        self.last_chunk_written = true;
    }

    /// Whether [`end`](Self::end) has been called.
    #[must_use]
    pub const fn is_last_chunk_written(&self) -> bool {
        self.last_chunk_written
    }

    /// True once every code point has been consumed and no more input can arrive.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.last_chunk_written && self.pos >= self.buffer.len()
    }

    /// Raw buffer offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Consume and return the next normalized code point.
    ///
    /// Returns `None` when the buffer is exhausted; callers use
    /// [`is_last_chunk_written`](Self::is_last_chunk_written) to tell EOF
    /// from "wait for more input".
    pub fn advance_and_peek(&mut self) -> Option<char> {
        if self.skip_next_new_line {
            if self.pos < self.buffer.len() {
                self.skip_next_new_line = false;
                if self.buffer[self.pos] == '\n' {
                    self.pos += 1;
                }
            } else if self.last_chunk_written {
                self.skip_next_new_line = false;
            } else {
                return None;
            }
        }

        let c = *self.buffer.get(self.pos)?;
        self.pos += 1;

        // "To normalize newlines in a string, replace every U+000D CR U+000A LF
        // code point pair with a single U+000A LF code point, and then replace
        // every remaining U+000D CR code point with a U+000A LF code point."
        if c == '\r' {
            match self.buffer.get(self.pos) {
                Some('\n') => self.pos += 1,
                Some(_) => {}
                None => self.skip_next_new_line = !self.last_chunk_written,
            }
            return Some('\n');
        }

        Some(normalize(c))
    }

    /// Step the cursor back over the last code point returned by
    /// [`advance_and_peek`](Self::advance_and_peek). A CRLF pair is stepped
    /// over as the single LF it produced.
    pub fn retreat(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.skip_next_new_line = false;
        self.pos -= 1;
        if self.buffer[self.pos] == '\n' && self.pos > 0 && self.buffer[self.pos - 1] == '\r' {
            self.pos -= 1;
        }
    }

    /// Look at the normalized code point `offset` places past the cursor
    /// without consuming anything. `None` means it is not buffered (yet).
    #[must_use]
    pub fn peek(&self, offset: usize) -> Option<char> {
        let mut index = self.pos;
        if self.skip_next_new_line && self.buffer.get(index) == Some(&'\n') {
            index += 1;
        }

        let mut remaining = offset;
        loop {
            let c = *self.buffer.get(index)?;
            index += 1;
            let c = if c == '\r' {
                if self.buffer.get(index) == Some(&'\n') {
                    index += 1;
                }
                '\n'
            } else {
                normalize(c)
            };
            if remaining == 0 {
                return Some(c);
            }
            remaining -= 1;
        }
    }

    /// 1-based (line, column) of a raw buffer offset. Offsets are expected to
    /// be queried in increasing order; earlier offsets rescan from the start.
    pub fn line_and_column(&mut self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.buffer.len());
        let (mut at, mut line, mut column) = self.line_cache;
        if offset < at {
            (at, line, column) = (0, 1, 1);
        }

        while at < offset {
            match self.buffer[at] {
                '\n' if at > 0 && self.buffer[at - 1] == '\r' => {}
                '\n' | '\r' => {
                    line += 1;
                    column = 1;
                }
                _ => column += 1,
            }
            at += 1;
        }

        self.line_cache = (at, line, column);
        (line, column)
    }
}

const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

/// [§ 13.2.3.5](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
/// Noncharacters in the stream become U+FFFD.
fn normalize(c: char) -> char {
    if is_noncharacter(u32::from(c)) {
        REPLACEMENT_CHARACTER
    } else {
        c
    }
}

/// [Infra § 4.6 noncharacter](https://infra.spec.whatwg.org/#noncharacter)
///
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
#[must_use]
pub const fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE) == 0xFFFE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(pre: &mut Preprocessor) -> String {
        std::iter::from_fn(|| pre.advance_and_peek()).collect()
    }

    #[test]
    fn test_crlf_and_lone_cr_become_lf() {
        let mut pre = Preprocessor::new();
        pre.write("a\r\nb\rc\n");
        pre.end();
        assert_eq!(drain(&mut pre), "a\nb\nc\n");
        assert!(pre.is_eof());
    }

    #[test]
    fn test_crlf_split_across_chunks() {
        let mut pre = Preprocessor::new();
        pre.write("a\r");
        assert_eq!(drain(&mut pre), "a\n");
        pre.write("\nb");
        pre.end();
        assert_eq!(drain(&mut pre), "b");
    }

    #[test]
    fn test_retreat_steps_over_crlf_pair() {
        let mut pre = Preprocessor::new();
        pre.write("x\r\ny");
        pre.end();
        assert_eq!(pre.advance_and_peek(), Some('x'));
        assert_eq!(pre.advance_and_peek(), Some('\n'));
        pre.retreat();
        assert_eq!(pre.position(), 1);
        assert_eq!(pre.advance_and_peek(), Some('\n'));
        assert_eq!(pre.advance_and_peek(), Some('y'));
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut pre = Preprocessor::new();
        pre.write("ab\r\nc");
        assert_eq!(pre.peek(0), Some('a'));
        assert_eq!(pre.peek(2), Some('\n'));
        assert_eq!(pre.peek(3), Some('c'));
        assert_eq!(pre.peek(4), None);
        assert_eq!(pre.position(), 0);
    }

    #[test]
    fn test_insert_at_cursor_is_read_next() {
        let mut pre = Preprocessor::new();
        pre.write("<p>tail");
        for _ in 0..3 {
            let _ = pre.advance_and_peek();
        }
        pre.insert_at_cursor("new ");
        pre.end();
        assert_eq!(drain(&mut pre), "new tail");
    }

    #[test]
    fn test_noncharacters_are_replaced() {
        let mut pre = Preprocessor::new();
        pre.write("a\u{FDD0}b\u{FFFF}\u{10FFFE}");
        pre.end();
        assert_eq!(drain(&mut pre), "a\u{FFFD}b\u{FFFD}\u{FFFD}");
    }

    #[test]
    fn test_utf16_pairs_combine_even_when_split() {
        let mut pre = Preprocessor::new();
        // U+1F600 is D83D DE00.
        pre.write_utf16(&[0x61, 0xD83D]);
        pre.write_utf16(&[0xDE00, 0xDC00, 0x62]);
        pre.end();
        assert_eq!(drain(&mut pre), "a\u{1F600}\u{FFFD}b");
    }

    #[test]
    fn test_dangling_high_surrogate_at_end() {
        let mut pre = Preprocessor::new();
        pre.write_utf16(&[0x61, 0xD800]);
        pre.end();
        assert_eq!(drain(&mut pre), "a\u{FFFD}");
    }

    #[test]
    fn test_line_and_column() {
        let mut pre = Preprocessor::new();
        pre.write("ab\r\ncd\ne");
        assert_eq!(pre.line_and_column(0), (1, 1));
        assert_eq!(pre.line_and_column(1), (1, 2));
        assert_eq!(pre.line_and_column(4), (2, 1));
        assert_eq!(pre.line_and_column(7), (3, 1));
        assert_eq!(pre.line_and_column(5), (2, 2));
    }
}
