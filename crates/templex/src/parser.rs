// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Parser from tokens to a statement tree.
//!
//! Each `LoopBegin` token opens a nested block that runs until its matching
//! `LoopEnd`; the block becomes the body of a [`Statement::ForLoop`]. End tags
//! are consumed without producing a statement. Open blocks are kept on an
//! explicit stack, so nesting depth is bounded by memory only.

use crate::ast::{Statement, Token, TokenKind};
use crate::error::{Result, TemplexError};

/// Parses a token sequence into statements.
///
/// # Errors
///
/// - [`TemplexError::UnexpectedEnd`] when a loop block is still open at the
///   end of the tokens.
/// - [`TemplexError::UnbalancedLoop`] when an end tag has no open loop.
///
/// # Example
///
/// ```rust
/// use templex::{lex, parse, Statement};
///
/// let tokens = lex("{{#for .xs}}-{{#end}}".as_bytes()).unwrap();
/// let statements = parse(&tokens).unwrap();
/// assert!(matches!(statements[0], Statement::ForLoop { .. }));
/// ```
pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>> {
    // Open loop tags, each with the statements of the block enclosing it.
    let mut open: Vec<(&Token, Vec<Statement>)> = Vec::new();
    let mut current = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Literal => current.push(Statement::Literal(token.raw.clone())),
            TokenKind::Variable => current.push(Statement::Variable {
                raw: token.text(),
                span: token.span,
            }),
            TokenKind::LoopBegin => open.push((token, std::mem::take(&mut current))),
            TokenKind::LoopEnd => {
                let Some((opener, enclosing)) = open.pop() else {
                    return Err(TemplexError::UnbalancedLoop {
                        tag: token.text(),
                        line: token.span.line,
                        column: token.span.column,
                    });
                };
                let body = std::mem::replace(&mut current, enclosing);
                current.push(Statement::ForLoop {
                    raw: opener.text(),
                    span: opener.span,
                    body,
                });
            }
        }
    }

    if let Some((opener, _)) = open.last() {
        return Err(TemplexError::UnexpectedEnd {
            tag: opener.text(),
            line: opener.span.line,
            column: opener.span.column,
        });
    }
    Ok(current)
}
