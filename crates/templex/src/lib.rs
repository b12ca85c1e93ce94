// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! # templex
//!
//! A small text templating engine with a streaming lexer.
//!
//! Templates are plain text with two kinds of tags:
//!
//! - `{{.path.to.value}}` writes the value found at a dotted path
//! - `{{#for .path}} ... {{#end}}` repeats its body for every element of a
//!   list or entry of a map, binding `__value__` and `__key__`
//!
//! Everything else, including malformed tags, is copied to the output
//! byte for byte.
//!
//! ## Pipeline
//!
//! 1. [`Lexer`] turns a byte stream into [`Token`]s with a byte-at-a-time
//!    state machine ([`lexer::step`])
//! 2. [`parse`] builds a [`Statement`] tree, nesting loop bodies
//! 3. [`Renderer`] walks the tree against a context [`Value`], resolving
//!    paths with [`path::resolve`]
//!
//! ## Quick Start
//!
//! ```rust
//! use templex::{Template, Value};
//! use serde_json::json;
//!
//! let template = Template::from_source(
//!     "{{#for .tasks}}[{{.__key__}}:{{.__value__.name}}]{{#end}}",
//! ).unwrap();
//!
//! let ctx = Value::from(json!({ "tasks": [{ "name": "build" }, { "name": "test" }] }));
//! assert_eq!(template.render_to_string(&ctx).unwrap(), "[0:build][1:test]");
//! ```
//!
//! For named templates loaded from disk or memory with caching, see [`Engine`].

/// Token, span and statement types.
pub mod ast;
/// Template caching.
pub mod cache;
/// Named-template engine.
pub mod engine;
/// Error types and reporting.
pub mod error;
/// Statement execution.
pub mod executor;
/// Streaming lexer.
pub mod lexer;
/// Template source loading (filesystem, memory).
pub mod loader;
/// Statement tree parser.
pub mod parser;
/// Dotted path resolution.
pub mod path;
/// Compiled templates.
pub mod template;
/// Context values.
pub mod value;

pub use ast::{Span, Statement, Token, TokenKind};
pub use cache::{MemoryCache, TemplateCache};
pub use engine::Engine;
pub use error::{Result, SourceContext, TemplexError};
pub use executor::{render, RenderOptions, Renderer, Scope};
pub use lexer::{lex, Lexer};
#[cfg(feature = "filesystem")]
pub use loader::FileSystemLoader;
pub use loader::{LoadedTemplate, MemoryLoader, TemplateLoader};
pub use parser::parse;
pub use template::{content_hash, Template};
pub use value::{DefaultCoercion, Field, Record, Scalar, TextCoercion, Value};
