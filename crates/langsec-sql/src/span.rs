//! Conversion from the parser's line/column spans to byte offsets.

use langsec_core::Location;
use sqlparser::tokenizer::Span;

/// Byte offsets of line starts in the raw query, for span conversion.
pub(crate) struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    fn offset(&self, line: u64, column: u64) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let start = *self.line_starts.get(line as usize - 1)?;
        let offset = start + column as usize - 1;
        (offset <= self.len).then_some(offset)
    }

    /// Convert a parser span to a byte range. Empty spans yield `None`.
    pub(crate) fn location(&self, span: Span) -> Option<Location> {
        let start = self.offset(span.start.line, span.start.column)?;
        let end = self.offset(span.end.line, span.end.column)?;
        (start < end).then_some(Location { start, end })
    }
}
