// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Compiled template caching.
//!
//! Caches hold [`Template`]s keyed by template name so that unchanged
//! sources are lexed and parsed only once. Staleness is decided by the
//! [`Engine`](crate::Engine), which compares the cached template's hash
//! with the hash of the freshly loaded source.
//!
//! # Cache Implementations
//!
//! - [`MemoryCache`]: In-memory LRU cache
//!
//! # Custom Caches
//!
//! Implement the [`TemplateCache`] trait to create custom caching strategies.

use crate::error::{Result, TemplexError};
use crate::template::Template;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Trait for compiled template caches.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait TemplateCache: Send + Sync + std::fmt::Debug {
    /// Retrieves a template from the cache.
    fn get(&self, key: &str) -> Result<Option<Arc<Template>>>;
    /// Stores a template in the cache.
    fn set(&self, key: &str, template: Arc<Template>) -> Result<()>;
    /// Removes a template from the cache.
    fn remove(&self, key: &str) -> Result<()>;
    /// Clears all cached templates.
    fn clear(&self) -> Result<()>;
    /// Checks if a key exists in the cache.
    fn contains_key(&self, key: &str) -> bool;
}

/// In-memory LRU (Least Recently Used) cache.
///
/// Stores compiled templates with automatic eviction of the least recently
/// used entry once the capacity is reached. Clones share the same storage.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use templex::{MemoryCache, Template, TemplateCache};
///
/// let cache = MemoryCache::new(100);
/// cache.set("hello", Arc::new(Template::from_source("hi").unwrap())).unwrap();
/// assert!(cache.contains_key("hello"));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryCache {
    cache: Arc<Mutex<LruCache<String, Arc<Template>>>>,
}

impl MemoryCache {
    /// Creates a new memory cache holding at most `capacity` templates.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Number of cached templates.
    pub fn len(&self) -> usize {
        self.peek().len()
    }

    /// Whether the cache holds no templates.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view that also looks through a poisoned lock.
    fn peek(&self) -> MutexGuard<'_, LruCache<String, Arc<Template>>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, Arc<Template>>>> {
        self.cache
            .lock()
            .map_err(|_| TemplexError::Cache("Failed to acquire cache lock".to_string()))
    }
}

impl TemplateCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Arc<Template>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, template: Arc<Template>) -> Result<()> {
        self.lock()?.put(key.to_string(), template);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.pop(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn contains_key(&self, key: &str) -> bool {
        self.peek().contains(key)
    }
}
