//! Source text with precomputed line starts.
//!
//! Spans throughout the compiler are byte-based [`TextRange`]s; this type
//! resolves them to 1-based line/column pairs for rendering.

use rowan::{TextRange, TextSize};

/// Immutable program text plus an ordered table of line start offsets.
#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    path: Option<String>,
    line_starts: Vec<u32>,
}

impl SourceText {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = compute_line_starts(&text);
        Self {
            text,
            path: None,
            line_starts,
        }
    }

    pub fn with_path(text: impl Into<String>, path: impl Into<String>) -> Self {
        let mut source = Self::new(text);
        source.path = Some(path.into());
        source
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn len(&self) -> TextSize {
        TextSize::from(self.text.len() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based index of the line containing `offset`, by binary search.
    pub fn line_index(&self, offset: TextSize) -> usize {
        let offset = u32::from(offset);
        self.line_starts.partition_point(|&start| start <= offset) - 1
    }

    /// One-based `(line, column)` of `offset`. Columns count bytes.
    pub fn line_column(&self, offset: TextSize) -> (usize, usize) {
        let line = self.line_index(offset);
        let column = u32::from(offset) - self.line_starts[line];
        (line + 1, column as usize + 1)
    }

    /// The text of a zero-based line, without its line break.
    pub fn line(&self, index: usize) -> &str {
        let start = self.line_starts[index] as usize;
        let end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |&next| next as usize);
        self.text[start..end].trim_end_matches(['\n', '\r'])
    }

    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[std::ops::Range::<usize>::from(range)]
    }
}

fn compute_line_starts(text: &str) -> Vec<u32> {
    let mut starts = vec![0];
    for (i, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(i as u32 + 1);
        }
    }
    starts
}
