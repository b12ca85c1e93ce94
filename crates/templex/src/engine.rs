// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Named-template rendering with caching.

use crate::cache::{MemoryCache, TemplateCache};
use crate::error::Result;
use crate::executor::{RenderOptions, Renderer};
use crate::loader::TemplateLoader;
use crate::template::{content_hash, Template};
use crate::value::{DefaultCoercion, TextCoercion, Value};
use std::io::Write;
use std::sync::Arc;

/// Template engine.
///
/// The engine is generic over the loader type `L`, allowing different
/// template loading strategies (filesystem, memory, etc.), and over the
/// text coercion `C` used when rendering variables.
///
/// Every compile loads the source again and reuses the cached template only
/// when the source hash is unchanged, so edited templates are picked up
/// without restarting.
///
/// # Examples
///
/// ```rust
/// use templex::{Engine, MemoryLoader, Value};
/// use serde_json::json;
///
/// let loader = MemoryLoader::new();
/// loader.add_template("hello", "Hello, {{.name}}!");
///
/// let engine = Engine::with_memory_cache(loader, 100);
/// let ctx = Value::from(json!({ "name": "World" }));
/// assert_eq!(engine.render_to_string("hello", &ctx).unwrap(), "Hello, World!");
/// ```
#[derive(Debug)]
pub struct Engine<L: TemplateLoader, C = DefaultCoercion> {
    loader: L,
    cache: Box<dyn TemplateCache>,
    renderer: Renderer<C>,
}

impl<L: TemplateLoader> Engine<L> {
    /// Creates a new engine with the given loader and cache.
    pub fn new(loader: L, cache: Box<dyn TemplateCache>) -> Self {
        Self {
            loader,
            cache,
            renderer: Renderer::new(),
        }
    }

    /// Creates a new engine with an in-memory LRU cache.
    pub fn with_memory_cache(loader: L, cache_size: usize) -> Self {
        Self::new(loader, Box::new(MemoryCache::new(cache_size)))
    }
}

impl<L: TemplateLoader, C: TextCoercion> Engine<L, C> {
    /// Replaces the loop binding names.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.renderer = self.renderer.with_options(options);
        self
    }

    /// Replaces the renderer, changing how variables are coerced to text.
    pub fn with_renderer<D: TextCoercion>(self, renderer: Renderer<D>) -> Engine<L, D> {
        Engine {
            loader: self.loader,
            cache: self.cache,
            renderer,
        }
    }

    /// The template loader.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The renderer used for every template.
    pub fn renderer(&self) -> &Renderer<C> {
        &self.renderer
    }

    /// Loads and compiles the template registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be found or read, or if its
    /// loop blocks are unbalanced.
    pub fn compile(&self, name: &str) -> Result<Arc<Template>> {
        let loaded = self.loader.load(name)?;
        let hash = content_hash(&loaded.source);

        if let Some(cached) = self.cache.get(name)? {
            if cached.hash() == hash {
                tracing::debug!("Cache hit for template '{}'", name);
                return Ok(cached);
            }
            tracing::debug!("Template '{}' changed, recompiling", name);
        }

        tracing::debug!("Compiling template '{}' from {}", name, loaded.path);
        let template = Arc::new(Template::compile(loaded.source.as_slice())?);
        self.cache.set(name, Arc::clone(&template))?;
        Ok(template)
    }

    /// Compiles and renders `name` into `out`.
    pub fn render<W: Write + ?Sized>(&self, name: &str, context: &Value, out: &mut W) -> Result<()> {
        self.compile(name)?.render_with(&self.renderer, context, out)
    }

    /// Compiles and renders `name` into a string.
    pub fn render_to_string(&self, name: &str, context: &Value) -> Result<String> {
        let mut out = Vec::new();
        self.render(name, context, &mut out)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Checks if a template is in the cache.
    pub fn cache_contains(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// Clears all cached templates.
    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }
}
