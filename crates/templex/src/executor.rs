// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Statement execution.
//!
//! The executor walks a parsed statement tree and writes the output to any
//! [`std::io::Write`] sink. Paths are resolved through a [`Scope`]: the
//! caller's context plus, inside a loop, an overlay holding the current
//! element (`__value__`) and its index or key (`__key__`).
//!
//! The caller's context is only ever read. Each iteration gets a fresh
//! overlay, so nested loops shadow the outer bindings and the outer bindings
//! are back in effect once the inner loop ends. Rendering the same statements
//! from several threads at once is fine.
//!
//! # Missing Data
//!
//! A variable whose path does not resolve renders as nothing. A loop whose
//! target does not resolve, or resolves to something other than a list or a
//! map, runs zero times. Only write errors fail a render.

use crate::ast::{loop_path, variable_path, Statement};
use crate::error::Result;
use crate::path::{resolve_segments, segments};
use crate::value::{DefaultCoercion, TextCoercion, Value};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::io::Write;

/// Names of the loop bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Name bound to the current element (default `__value__`).
    pub value_binding: String,
    /// Name bound to the current index or map key (default `__key__`).
    pub key_binding: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            value_binding: "__value__".to_string(),
            key_binding: "__key__".to_string(),
        }
    }
}

/// Loop bindings of the innermost iteration.
#[derive(Debug, Clone, Copy)]
struct Frame<'f> {
    value: &'f Value,
    key: &'f Value,
}

/// Path resolution environment: the base context and the innermost loop
/// overlay, if any.
///
/// `'a` is the lifetime of the base context, `'f` that of the loop bindings.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a, 'f> {
    base: &'a Value,
    options: &'a RenderOptions,
    frame: Option<Frame<'f>>,
}

impl<'a, 'f> Scope<'a, 'f> {
    /// A scope with no loop bindings.
    pub fn new(base: &'a Value, options: &'a RenderOptions) -> Self {
        Self {
            base,
            options,
            frame: None,
        }
    }

    /// A scope over the same base binding `value` and `key`. Any bindings of
    /// this scope are shadowed.
    pub fn push<'g>(&self, value: &'g Value, key: &'g Value) -> Scope<'a, 'g> {
        Scope {
            base: self.base,
            options: self.options,
            frame: Some(Frame { value, key }),
        }
    }

    fn bound(&self, first: Option<&str>) -> Option<&'f Value> {
        let frame = self.frame?;
        match first? {
            name if name == self.options.value_binding => Some(frame.value),
            name if name == self.options.key_binding => Some(frame.key),
            _ => None,
        }
    }

    /// Resolves a path, checking the loop bindings before the base context.
    pub fn resolve(&self, path: &str) -> Option<Cow<'_, Value>> {
        let mut parts = segments(path)?.peekable();
        if let Some(bound) = self.bound(parts.peek().copied()) {
            parts.next();
            return resolve_segments(bound, parts);
        }
        resolve_segments(self.base, parts)
    }

    /// Like [`Scope::resolve`], but the result does not borrow the loop
    /// bindings: values reached through them are cloned, values in the base
    /// context are borrowed.
    pub fn resolve_detached(&self, path: &str) -> Option<Cow<'a, Value>> {
        let mut parts = segments(path)?.peekable();
        if let Some(bound) = self.bound(parts.peek().copied()) {
            parts.next();
            return resolve_segments(bound, parts).map(|value| Cow::Owned(value.into_owned()));
        }
        resolve_segments(self.base, parts)
    }
}

/// One running loop: the collection, the current iteration and the position
/// inside the body.
struct Loop<'a, 't> {
    body: &'t [Statement],
    next: usize,
    target: Cow<'a, Value>,
    // Map keys in iteration order; empty for lists.
    keys: Vec<String>,
    index: usize,
    key: Value,
}

impl<'a, 't> Loop<'a, 't> {
    /// Starts a loop over `target`, or `None` when there is nothing to iterate.
    fn start(body: &'t [Statement], target: Cow<'a, Value>) -> Option<Self> {
        let keys = match target.as_ref() {
            Value::List(_) => Vec::new(),
            Value::Map(entries) => entries.keys().cloned().collect(),
            _ => return None,
        };
        let mut running = Loop {
            body,
            next: 0,
            target,
            keys,
            index: 0,
            key: Value::null(),
        };
        if running.len() == 0 {
            return None;
        }
        running.key = running.key_at(0);
        Some(running)
    }

    fn len(&self) -> usize {
        match self.target.as_ref() {
            Value::List(items) => items.len(),
            _ => self.keys.len(),
        }
    }

    fn key_at(&self, index: usize) -> Value {
        match self.target.as_ref() {
            Value::List(_) => Value::from(index),
            _ => Value::from(self.keys[index].as_str()),
        }
    }

    fn item(&self) -> Option<&Value> {
        match self.target.as_ref() {
            Value::List(items) => items.get(self.index),
            Value::Map(entries) => entries.get(self.keys.get(self.index)?),
            _ => None,
        }
    }

    /// Moves to the next iteration; `false` once the collection is exhausted.
    fn advance(&mut self) -> bool {
        self.index += 1;
        self.next = 0;
        if self.index >= self.len() {
            return false;
        }
        self.key = self.key_at(self.index);
        true
    }
}

/// Executes statements against a context.
///
/// The type parameter selects how resolved values become text.
///
/// # Example
///
/// ```rust
/// use templex::{lex, parse, Renderer, Value};
/// use serde_json::json;
///
/// let statements = parse(&lex("{{#for .xs}}<{{.__value__}}>{{#end}}".as_bytes()).unwrap()).unwrap();
/// let ctx = Value::from(json!({ "xs": [1, 2] }));
///
/// let mut out = Vec::new();
/// Renderer::new().render(&statements, &ctx, &mut out).unwrap();
/// assert_eq!(out, b"<1><2>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Renderer<C = DefaultCoercion> {
    options: RenderOptions,
    coercion: C,
}

impl Renderer {
    /// A renderer with default bindings and [`DefaultCoercion`].
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: TextCoercion> Renderer<C> {
    /// Replaces the text coercion.
    pub fn with_coercion<D: TextCoercion>(self, coercion: D) -> Renderer<D> {
        Renderer {
            options: self.options,
            coercion,
        }
    }

    /// Replaces the binding names.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// The binding names in use.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders `statements` against `context` into `out`.
    ///
    /// # Errors
    ///
    /// Fails only when writing to `out` fails.
    pub fn render<W: Write + ?Sized>(
        &self,
        statements: &[Statement],
        context: &Value,
        out: &mut W,
    ) -> Result<()> {
        let base = Scope::new(context, &self.options);
        let mut running: Vec<Loop<'_, '_>> = Vec::new();
        let mut next = 0;

        loop {
            let (body, position) = match running.last_mut() {
                Some(current) => (current.body, &mut current.next),
                None => (statements, &mut next),
            };
            let Some(statement) = body.get(*position) else {
                match running.last_mut() {
                    None => return Ok(()),
                    Some(current) => {
                        if !current.advance() {
                            running.pop();
                        }
                        continue;
                    }
                }
            };
            *position += 1;

            let scope = match running.last() {
                Some(current) => match current.item() {
                    Some(item) => base.push(item, &current.key),
                    None => base,
                },
                None => base,
            };

            match statement {
                Statement::Literal(bytes) => out.write_all(bytes)?,
                Statement::Variable { raw, span } => {
                    let path = variable_path(raw);
                    match scope.resolve(path) {
                        Some(value) => out.write_all(self.coercion.to_text(&value).as_bytes())?,
                        None => tracing::debug!("Path {} at {} not found, rendering nothing", path, span),
                    }
                }
                Statement::ForLoop { raw, span, body } => {
                    let path = loop_path(raw);
                    let Some(target) = scope.resolve_detached(path) else {
                        tracing::debug!("Loop target {} at {} not found, skipping loop", path, span);
                        continue;
                    };
                    if !matches!(target.as_ref(), Value::List(_) | Value::Map(_)) {
                        tracing::debug!(
                            "Loop target {} at {} is a {}, skipping loop",
                            path,
                            span,
                            target.kind()
                        );
                        continue;
                    }
                    if let Some(started) = Loop::start(body, target) {
                        running.push(started);
                    }
                }
            }
        }
    }
}

/// Renders `statements` against `context` with the default [`Renderer`].
pub fn render<W: Write + ?Sized>(statements: &[Statement], context: &Value, out: &mut W) -> Result<()> {
    Renderer::new().render(statements, context, out)
}
