use xmlparser::{Stream, TextPos};

/// A position-addressable text cursor consumed by the [`Reader`].
///
/// The reader is written only against this trait, so it can backtrack over
/// any backing storage: it records `position()`, tries to recognize a
/// production and `seek`s back on failure.
///
/// Offsets are byte offsets into UTF-8 text, counts are in characters.
///
/// [`Reader`]: struct.Reader.html
pub trait Source {
    /// Returns the next `count` characters and moves the cursor past them.
    ///
    /// Returns an empty string when the cursor is at or beyond the end of
    /// the input.
    fn advance(&mut self, count: usize) -> &str;

    /// Returns the current offset.
    fn position(&self) -> usize;

    /// Moves the cursor to `offset`.
    ///
    /// Returns `false` and leaves the cursor untouched when the offset is
    /// out of range.
    fn seek(&mut self, offset: usize) -> bool;

    /// Calculates a human-readable position for `offset`.
    fn text_pos(&self, offset: usize) -> TextPos;

    /// Returns the next character and moves the cursor past it.
    fn next_char(&mut self) -> Option<char> {
        self.advance(1).chars().next()
    }

    /// Returns the next character without moving the cursor.
    fn peek_char(&mut self) -> Option<char> {
        let pos = self.position();
        let c = self.next_char();
        self.seek(pos);
        c
    }
}


/// A string-backed [`Source`].
///
/// [`Source`]: trait.Source.html
#[derive(Clone, Debug)]
pub struct StrSource<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> StrSource<'a> {
    /// Creates a source positioned at the start of `text`.
    pub fn new(text: &'a str) -> Self {
        StrSource { text, pos: 0 }
    }

    /// Creates a source positioned at `offset`.
    ///
    /// An offset that is not a valid position is ignored.
    pub fn with_offset(text: &'a str, offset: usize) -> Self {
        let mut s = Self::new(text);
        s.seek(offset);
        s
    }

    /// Returns the whole underlying text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Returns the total length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Checks that the underlying text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl<'a> From<&'a str> for StrSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl<'a> Source for StrSource<'a> {
    fn advance(&mut self, count: usize) -> &str {
        let tail = &self.text[self.pos..];
        let end = match tail.char_indices().nth(count) {
            Some((idx, _)) => idx,
            None if tail.chars().count() == count => tail.len(),
            None => return "",
        };

        self.pos += end;
        &tail[..end]
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, offset: usize) -> bool {
        if offset <= self.text.len() && self.text.is_char_boundary(offset) {
            self.pos = offset;
            true
        } else {
            false
        }
    }

    fn text_pos(&self, offset: usize) -> TextPos {
        Stream::from(self.text).gen_text_pos_from(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.text[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }
}
