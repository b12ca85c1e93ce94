// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for templex.
//!
//! This module defines [`TemplexError`], the main error enum, and
//! [`SourceContext`] for showing the template line an error points at.
//!
//! # Error Categories
//!
//! - **I/O errors**: reading the template source or writing the output failed
//! - **Structural errors**: a `{{#for}}` block is never closed, or a
//!   `{{#end}}` has no block to close
//! - **Loader errors**: a named template could not be located or read
//!
//! Unresolved variable paths, empty loop targets and malformed tags are not
//! errors; they render as nothing (or as literal text, for malformed tags).

use std::fmt;
use thiserror::Error;

/// A few lines of template source around an error, with a caret under the
/// offending tag.
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Line number of the first entry in `lines` (1-indexed).
    pub first_line: usize,
    /// The source lines shown in the snippet.
    pub lines: Vec<String>,
    /// The line the error points at (1-indexed).
    pub error_line: usize,
    /// Characters before the caret on the error line.
    ///
    /// Token columns count bytes; this counts chars so the caret lines up
    /// under multibyte text.
    pub caret: usize,
}

impl SourceContext {
    /// Creates a source context from template source and a 1-indexed
    /// line and byte column, keeping 2 lines on either side.
    pub fn from_source(source: &str, line: usize, column: usize) -> Self {
        let first_line = line.saturating_sub(2).max(1);
        let lines: Vec<String> = source
            .lines()
            .skip(first_line - 1)
            .take(line + 3 - first_line)
            .map(str::to_string)
            .collect();
        let caret = line
            .checked_sub(first_line)
            .and_then(|offset| lines.get(offset))
            .map(|text| char_offset(text, column.saturating_sub(1)))
            .unwrap_or(0);

        Self {
            first_line,
            lines,
            error_line: line,
            caret,
        }
    }

    /// Formats the source snippet with line numbers and error indicator.
    ///
    /// ```text
    ///    3 | Tasks:
    ///    4 | {{#for .tasks}}
    ///      | ^
    ///    5 | - {{.__value__.name}}
    /// ```
    pub fn format_snippet(&self) -> String {
        let mut result = String::new();
        for (number, text) in (self.first_line..).zip(&self.lines) {
            result.push_str(&format!("{:4} | {}\n", number, text));
            if number == self.error_line {
                result.push_str(&format!("     | {}^\n", " ".repeat(self.caret)));
            }
        }
        result
    }
}

/// Number of chars in `text` that start before byte offset `bytes`.
fn char_offset(text: &str, bytes: usize) -> usize {
    text.char_indices().take_while(|(i, _)| *i < bytes).count()
}

impl fmt::Display for SourceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_snippet())
    }
}

/// The main error type for templex operations.
#[derive(Error, Debug)]
pub enum TemplexError {
    /// Reading the template source or writing rendered output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A loop block was opened and the input ended before its `{{#end}}`.
    #[error("Unexpected end of template: {tag} at line {line}, column {column} is never closed")]
    UnexpectedEnd {
        /// Raw text of the unclosed loop tag.
        tag: String,
        /// Line of the loop tag (1-indexed).
        line: usize,
        /// Column of the loop tag (1-indexed).
        column: usize,
    },

    /// A `{{#end}}` tag appeared with no open loop block.
    #[error("Unbalanced loop: {tag} at line {line}, column {column} has no matching loop")]
    UnbalancedLoop {
        /// Raw text of the stray end tag.
        tag: String,
        /// Line of the end tag (1-indexed).
        line: usize,
        /// Column of the end tag (1-indexed).
        column: usize,
    },

    /// Converting a serializable value into a context value failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A named template could not be found by the loader.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A template name was found but could not be read or is not allowed.
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl TemplexError {
    /// Returns the 1-indexed `(line, column)` of structural errors.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            TemplexError::UnexpectedEnd { line, column, .. }
            | TemplexError::UnbalancedLoop { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// Convenience type alias for Results with [`TemplexError`].
pub type Result<T> = std::result::Result<T, TemplexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_points_at_column() {
        let source = "one\ntwo {{#for .x}}\nthree";
        let ctx = SourceContext::from_source(source, 2, 5);
        let snippet = ctx.format_snippet();
        assert!(snippet.contains("   2 | two {{#for .x}}"));
        assert!(snippet.contains("     |     ^"));
        assert!(snippet.contains("   1 | one"));
        assert!(snippet.contains("   3 | three"));
    }

    #[test]
    fn caret_counts_chars_on_multibyte_lines() {
        // `{{#for` starts at byte column 10, after three 3-byte chars.
        let source = "标题\n调度在{{#for .tasks}}\n尾";
        let snippet = SourceContext::from_source(source, 2, 10).format_snippet();
        assert!(snippet.contains("   2 | 调度在{{#for .tasks}}\n     |    ^\n"));
    }

    #[test]
    fn snippet_near_start_and_end_of_source() {
        let snippet = SourceContext::from_source("only {{#end}}", 1, 6).format_snippet();
        assert_eq!(snippet, "   1 | only {{#end}}\n     |      ^\n");
    }

    #[test]
    fn position_only_for_structural_errors() {
        let err = TemplexError::UnbalancedLoop {
            tag: "{{#end}}".to_string(),
            line: 3,
            column: 7,
        };
        assert_eq!(err.position(), Some((3, 7)));
        assert!(err.to_string().contains("{{#end}}"));

        let io: TemplexError = std::io::Error::other("boom").into();
        assert_eq!(io.position(), None);
    }
}
