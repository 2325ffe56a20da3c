use tower_lsp::lsp_types::*;

use crate::{
    definition::{Token, identifier_at},
    text_pos::{byte_offset_of_utf16_column, utf16_column_of_byte_offset},
};

/// Snapshot of a single open LIGO source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub uri: Url,
    /// Full source text, kept in sync with the client.
    pub text: String,
    /// Version as reported by the client.
    pub version: i32,
    /// Byte offset of each line start, rebuilt on every mutation.
    line_offsets: Vec<usize>,
}

impl Document {
    pub fn new(
        uri: Url,
        text: String,
        version: i32,
    ) -> Self {
        let line_offsets = Self::compute_line_offsets(&text);
        Self {
            uri,
            text,
            version,
            line_offsets,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Text of a 0-based line without its terminator.
    pub fn line_text(
        &self,
        line: usize,
    ) -> Option<&str> {
        let start = *self.line_offsets.get(line)?;
        let end = self.line_offsets.get(line + 1).copied().unwrap_or(self.text.len());
        let slice = &self.text[start..end];
        Some(slice.trim_end_matches('\n').trim_end_matches('\r'))
    }

    /// Byte offset into the whole text of an LSP position.
    pub fn offset_of(
        &self,
        pos: Position,
    ) -> Option<usize> {
        let line_start = *self.line_offsets.get(pos.line as usize)?;
        let line = self.line_text(pos.line as usize)?;
        Some(line_start + byte_offset_of_utf16_column(line, pos.character))
    }

    /// Identifier under (or right before) `pos` and its range on the line.
    pub fn word_at(
        &self,
        pos: Position,
    ) -> Option<(Token, Range)> {
        let line = self.line_text(pos.line as usize)?;
        let token = identifier_at(line, byte_offset_of_utf16_column(line, pos.character))?;
        let range = Range {
            start: Position {
                line: pos.line,
                character: utf16_column_of_byte_offset(line, token.start),
            },
            end: Position {
                line: pos.line,
                character: utf16_column_of_byte_offset(line, token.end),
            },
        };
        Some((token, range))
    }

    pub fn set_content(
        &mut self,
        text: String,
        version: i32,
    ) {
        self.text = text;
        self.version = version;
        self.line_offsets = Self::compute_line_offsets(&self.text);
    }

    /// Apply incremental or full-content changes in order.
    pub fn apply_changes(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) {
        for change in changes {
            if let Some(range) = change.range {
                if let (Some(start), Some(end)) = (self.offset_of(range.start), self.offset_of(range.end))
                    && start <= end
                {
                    self.text.replace_range(start..end, &change.text);
                    self.line_offsets = Self::compute_line_offsets(&self.text);
                }
            } else {
                self.text = change.text;
                self.line_offsets = Self::compute_line_offsets(&self.text);
            }
        }
        self.version = version;
    }

    fn compute_line_offsets(text: &str) -> Vec<usize> {
        let mut offsets = vec![0usize];
        for (i, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(i + 1);
            }
        }
        offsets
    }
}

#[cfg(test)]
#[path = "../../tests/src/document/text_document_tests.rs"]
mod tests;
