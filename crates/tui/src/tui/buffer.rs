use thiserror::Error;

use crate::model::MAX_TITLE_LENGTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("titles are limited to {limit} characters")]
pub(crate) struct TitleTooLong {
    pub(crate) limit: usize,
}

/// Single-line title editor. The cursor is a byte offset on a char boundary.
#[derive(Debug, Clone)]
pub(crate) struct TitleBuffer {
    text: String,
    cursor: usize,
    limit: usize,
}

impl Default for TitleBuffer {
    fn default() -> Self {
        Self::with_limit(MAX_TITLE_LENGTH)
    }
}

impl TitleBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            limit,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.text
    }

    pub(crate) fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub(crate) fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replace the contents, truncating at the limit, and put the cursor at the end.
    pub(crate) fn set<T: Into<String>>(&mut self, value: T) {
        self.text = value
            .into()
            .chars()
            .filter(|ch| !ch.is_control())
            .take(self.limit)
            .collect();
        self.cursor = self.text.len();
    }

    pub(crate) fn insert_char(&mut self, ch: char) -> Result<(), TitleTooLong> {
        if ch.is_control() {
            return Ok(());
        }
        if self.char_count() >= self.limit {
            return Err(TitleTooLong { limit: self.limit });
        }
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
        Ok(())
    }

    pub(crate) fn backspace(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.drain(idx..self.cursor);
            self.cursor = idx;
        }
    }

    pub(crate) fn delete_char(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.text.drain(self.cursor..self.cursor + ch.len_utf8());
        }
    }

    pub(crate) fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub(crate) fn move_right(&mut self) {
        if let Some(ch) = self.text[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub(crate) fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Cursor position counted in characters, for placing the terminal cursor.
    pub(crate) fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }
}
