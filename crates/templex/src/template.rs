// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiled templates.
//!
//! A [`Template`] is the parsed statement tree of one template source plus a
//! SHA-256 hash of that source. It is immutable, `Send + Sync`, and can be
//! rendered any number of times, from any number of threads.

use crate::ast::Statement;
use crate::error::Result;
use crate::executor::Renderer;
use crate::lexer::Lexer;
use crate::parser::parse;
use crate::value::{TextCoercion, Value};
use sha2::{Digest, Sha256};
use std::io::{self, Read, Write};

/// Hex-encoded SHA-256 of a template source.
pub fn content_hash(source: &[u8]) -> String {
    format!("{:x}", Sha256::digest(source))
}

/// Passes bytes through while hashing them.
struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

/// A parsed template ready for rendering.
///
/// # Example
///
/// ```rust
/// use templex::{Template, Value};
/// use serde_json::json;
///
/// let template = Template::from_source("{{.count}} tasks").unwrap();
/// let out = template.render_to_string(&Value::from(json!({ "count": 3 }))).unwrap();
/// assert_eq!(out, "3 tasks");
/// ```
#[derive(Debug, Clone)]
pub struct Template {
    statements: Vec<Statement>,
    hash: String,
}

impl Template {
    /// Lexes and parses a template from a byte stream.
    ///
    /// # Errors
    ///
    /// Fails when reading `source` fails or the loop blocks are unbalanced.
    pub fn compile<R: Read>(source: R) -> Result<Self> {
        let mut reader = HashingReader {
            inner: source,
            hasher: Sha256::new(),
        };
        let tokens = Lexer::new(&mut reader).collect::<Result<Vec<_>>>()?;
        let statements = parse(&tokens)?;
        Ok(Self {
            statements,
            hash: format!("{:x}", reader.hasher.finalize()),
        })
    }

    /// Lexes and parses a template held in memory.
    pub fn from_source(source: &str) -> Result<Self> {
        Self::compile(source.as_bytes())
    }

    /// The parsed statement tree.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Hex-encoded SHA-256 of the source this template was compiled from.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Renders with the default [`Renderer`].
    pub fn render<W: Write + ?Sized>(&self, context: &Value, out: &mut W) -> Result<()> {
        Renderer::new().render(&self.statements, context, out)
    }

    /// Renders with a configured [`Renderer`].
    pub fn render_with<C: TextCoercion, W: Write + ?Sized>(
        &self,
        renderer: &Renderer<C>,
        context: &Value,
        out: &mut W,
    ) -> Result<()> {
        renderer.render(&self.statements, context, out)
    }

    /// Renders into a string, replacing invalid UTF-8 from the source.
    pub fn render_to_string(&self, context: &Value) -> Result<String> {
        let mut out = Vec::new();
        self.render(context, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplexError;

    #[test]
    fn hash_matches_source_hash() {
        let source = "Tasks: {{#for .tasks}}{{.__value__}} {{#end}}";
        let template = Template::from_source(source).unwrap();
        assert_eq!(template.hash(), content_hash(source.as_bytes()));
        assert_eq!(template.hash().len(), 64);
        assert_ne!(template.hash(), content_hash(b"other"));
    }

    #[test]
    fn compile_reports_unbalanced_blocks() {
        assert!(matches!(
            Template::from_source("{{#for .x}}"),
            Err(TemplexError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            Template::from_source("{{#end}}"),
            Err(TemplexError::UnbalancedLoop { .. })
        ));
    }

    #[test]
    fn templates_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
        assert_send_sync::<Value>();
    }
}
