//! Line/column to byte offset mapping
//!
//! `proc-macro2` reports positions as a 1-based line and a 0-based column
//! counted in characters. Edits need byte offsets, so both the generator and
//! the applier go through [`SourceMap`] to agree on where a span lives.

use std::ops::Range;

const BOM: char = '\u{feff}';

/// Byte offsets of every line start in a source text
#[derive(Debug)]
pub struct SourceMap<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> SourceMap<'a> {
    pub fn new(text: &'a str) -> Self {
        // The parser drops a leading byte order mark before assigning columns.
        let first = if text.starts_with(BOM) {
            BOM.len_utf8()
        } else {
            0
        };

        let mut line_starts = vec![first];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of a 1-based line, excluding its line terminator
    pub fn line_range(&self, line: usize) -> Option<Range<usize>> {
        let index = line.checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        let end = if self.text[start..end].ends_with('\r') {
            end - 1
        } else {
            end
        };
        Some(start..end)
    }

    /// Byte offset of a 1-based line and 0-based character column
    ///
    /// A column equal to the line length maps to the end of the line.
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let range = self.line_range(line)?;
        let line_text = &self.text[range.clone()];
        if column == line_text.chars().count() {
            return Some(range.end);
        }
        line_text
            .char_indices()
            .nth(column)
            .map(|(byte, _)| range.start + byte)
    }

    /// Byte offset of a `proc-macro2` position
    pub fn offset_of(&self, position: proc_macro2::LineColumn) -> Option<usize> {
        self.offset(position.line, position.column)
    }
}
