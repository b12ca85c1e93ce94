// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Token and statement types for templex templates.
//!
//! The lexer produces a flat sequence of [`Token`]s and the parser folds it
//! into a tree of [`Statement`]s. Both keep the original tag text: the path a
//! tag refers to is derived from that text when the statement is executed.
//!
//! # Tag Forms
//!
//! | Token | Example |
//! |-------|---------|
//! | [`TokenKind::Variable`] | `{{.tasks.first.started_at}}` |
//! | [`TokenKind::LoopBegin`] | `{{ #FOR .tasks }}` |
//! | [`TokenKind::LoopEnd`] | `{{#end}}` |

use std::fmt;

/// Position of a token in the template source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset of the first byte (0-indexed).
    pub offset: usize,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column in bytes (1-indexed).
    pub column: usize,
}

impl Span {
    /// Creates a span at the given location.
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// The span of the first byte of a template.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Verbatim text outside of any tag.
    Literal,
    /// A `{{.path}}` substitution tag.
    Variable,
    /// A `{{#for .path}}` tag opening a loop block.
    LoopBegin,
    /// A `{{#end}}` tag closing a loop block.
    LoopEnd,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Literal => "literal",
            TokenKind::Variable => "variable",
            TokenKind::LoopBegin => "loop-begin",
            TokenKind::LoopEnd => "loop-end",
        };
        f.write_str(name)
    }
}

/// A lexed token.
///
/// `raw` holds the exact source bytes: the whole tag including `{{` and `}}`
/// for tag tokens, the verbatim text for literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// The source bytes the token was lexed from.
    pub raw: Vec<u8>,
    /// Where the token starts.
    pub span: Span,
}

impl Token {
    /// Creates a token positioned at the start of the template.
    pub fn new(kind: TokenKind, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            span: Span::start(),
        }
    }

    /// Sets the token position.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The raw bytes as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

/// A node of the parsed statement tree.
///
/// The tree is immutable once parsed; rendering only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Write the bytes verbatim.
    Literal(Vec<u8>),
    /// Resolve the tag's path and write the value as text.
    Variable {
        /// Original tag text, e.g. `{{ .user.name }}`.
        raw: String,
        /// Where the tag was found.
        span: Span,
    },
    /// Run `body` once per element of the collection the tag's path names.
    ForLoop {
        /// Original loop-open tag text, e.g. `{{#for .tasks}}`.
        raw: String,
        /// Where the tag was found.
        span: Span,
        /// Statements executed for each iteration.
        body: Vec<Statement>,
    },
}

impl Statement {
    /// Builds a variable statement from its tag text.
    pub fn variable(raw: impl Into<String>) -> Self {
        Statement::Variable {
            raw: raw.into(),
            span: Span::start(),
        }
    }

    /// Builds a loop statement from its open-tag text and body.
    pub fn for_loop(raw: impl Into<String>, body: Vec<Statement>) -> Self {
        Statement::ForLoop {
            raw: raw.into(),
            span: Span::start(),
            body,
        }
    }

    /// Builds a literal statement.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Statement::Literal(bytes.into())
    }
}

// Frees nested loop bodies iteratively so drop depth stays constant.
impl Drop for Statement {
    fn drop(&mut self) {
        let Statement::ForLoop { body, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(body);
        while let Some(mut statement) = pending.pop() {
            if let Statement::ForLoop { body, .. } = &mut statement {
                pending.append(body);
            }
        }
    }
}

/// Strips `{{` and `}}` and surrounding spaces from tag text.
fn tag_interior(raw: &str) -> &str {
    let raw = raw.strip_prefix("{{").unwrap_or(raw);
    let raw = raw.strip_suffix("}}").unwrap_or(raw);
    raw.trim_matches(' ')
}

/// Derives the path of a `{{.path}}` tag: `{{ .a.b }}` gives `.a.b`.
pub fn variable_path(raw: &str) -> &str {
    tag_interior(raw)
}

/// Derives the path of a `{{#for .path}}` tag: `{{ #FOR .a }}` gives `.a`.
///
/// The `#for` keyword is matched case-insensitively.
pub fn loop_path(raw: &str) -> &str {
    let interior = tag_interior(raw);
    let Some(rest) = interior.strip_prefix('#') else {
        return interior;
    };
    match rest.get(..3) {
        Some(keyword) if keyword.eq_ignore_ascii_case("for") => rest[3..].trim_matches(' '),
        _ => interior,
    }
}
