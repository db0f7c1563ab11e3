//! Byte offset to line/column conversion.

use serde::{Deserialize, Serialize};
use text_size::{TextRange, TextSize};

/// Zero-based line and character column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineCol {
    pub line: u32,
    /// Column counted in characters.
    pub col: u32,
}

impl LineCol {
    #[must_use]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

/// Line start table for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(size_of(offset + 1));
            }
        }
        Self {
            text: text.to_string(),
            line_starts,
        }
    }

    /// Number of lines, counting a trailing empty line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset, clamped to the text length.
    #[must_use]
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(size_of(self.text.len()));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = self.line_starts[line];
        let prefix = self
            .text
            .get(usize::from(start)..usize::from(offset))
            .unwrap_or_default();
        LineCol {
            line: count_of(line),
            col: count_of(prefix.chars().count()),
        }
    }

    /// Converts a line/column back to a byte offset.
    ///
    /// A column past the end of its line maps to the line end. Returns
    /// `None` for lines beyond the document.
    #[must_use]
    pub fn offset(&self, position: LineCol) -> Option<TextSize> {
        let line = position.line as usize;
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(size_of(self.text.len()), |next| *next - TextSize::from(1));
        let line_text = self
            .text
            .get(usize::from(start)..usize::from(end))
            .unwrap_or_default();
        let within = line_text
            .char_indices()
            .nth(position.col as usize)
            .map_or(line_text.len(), |(offset, _)| offset);
        Some(start + size_of(within))
    }

    /// Converts both ends of a range.
    #[must_use]
    pub fn range(&self, range: TextRange) -> (LineCol, LineCol) {
        (self.line_col(range.start()), self.line_col(range.end()))
    }
}

#[allow(clippy::cast_possible_truncation)]
fn size_of(offset: usize) -> TextSize {
    TextSize::from(offset as u32)
}

#[allow(clippy::cast_possible_truncation)]
fn count_of(value: usize) -> u32 {
    value as u32
}
