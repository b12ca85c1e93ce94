// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Template source loading.
//!
//! This module provides the [`TemplateLoader`] trait and implementations
//! for locating template sources by name.
//!
//! # Loader Implementations
//!
//! - [`FileSystemLoader`]: Loads templates from a root directory
//! - [`MemoryLoader`]: Loads templates from in-memory storage (testing, embedding)
//!
//! # Custom Loaders
//!
//! Implement [`TemplateLoader`] for other sources (network, database, etc.).

use crate::error::{Result, TemplexError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[cfg(feature = "filesystem")]
use std::path::{Component, Path, PathBuf};

/// A template source found by a loader.
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    /// The name the template was requested by.
    pub name: String,
    /// Where the source was found (a file path, or the name for memory loaders).
    pub path: String,
    /// The template source bytes.
    pub source: Vec<u8>,
}

/// Trait for locating and reading template sources.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait TemplateLoader: Send + Sync {
    /// Loads the template registered under `name`.
    ///
    /// # Errors
    ///
    /// [`TemplexError::TemplateNotFound`] when there is no such template,
    /// [`TemplexError::Resolution`] when it exists but cannot be read.
    fn load(&self, name: &str) -> Result<LoadedTemplate>;
}

/// Filesystem-based template loader.
///
/// Names are relative to the root directory. A name without an extension is
/// tried as given first, then with the configured extension (`tpl` by
/// default). Absolute names and names containing `..` are rejected.
///
/// # Examples
///
/// ```rust,ignore
/// use templex::FileSystemLoader;
///
/// let loader = FileSystemLoader::new("./templates").with_extension("txt");
/// let report = loader.load("reports/daily")?; // ./templates/reports/daily.txt
/// ```
#[cfg(feature = "filesystem")]
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
    extension: String,
}

#[cfg(feature = "filesystem")]
impl FileSystemLoader {
    /// Creates a loader rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            extension: "tpl".to_string(),
        }
    }

    /// Sets the extension tried for names given without one.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, name: &str) -> Result<Vec<PathBuf>> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(TemplexError::Resolution(format!(
                "Template name '{}' must be relative to the template root",
                name
            )));
        }

        let direct = self.root.join(relative);
        let mut candidates = vec![direct.clone()];
        if relative.extension().is_none() && !self.extension.is_empty() {
            candidates.push(direct.with_extension(&self.extension));
        }
        Ok(candidates)
    }
}

#[cfg(feature = "filesystem")]
impl TemplateLoader for FileSystemLoader {
    fn load(&self, name: &str) -> Result<LoadedTemplate> {
        let candidates = self.candidates(name)?;
        let Some(path) = candidates.into_iter().find(|p| p.is_file()) else {
            return Err(TemplexError::TemplateNotFound(name.to_string()));
        };

        tracing::debug!("Loading template '{}' from {}", name, path.display());
        let source = std::fs::read(&path).map_err(|e| {
            TemplexError::Resolution(format!("Cannot read '{}': {}", path.display(), e))
        })?;

        Ok(LoadedTemplate {
            name: name.to_string(),
            path: path.to_string_lossy().into_owned(),
            source,
        })
    }
}

/// Memory-based template loader.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    templates: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_templates<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HashMap<String, String>) -> R,
    {
        let mut templates = self
            .templates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut templates)
    }

    /// Adds or replaces a template.
    pub fn add_template(&self, name: &str, source: impl Into<String>) {
        let source = source.into();
        self.with_templates(|templates| {
            templates.insert(name.to_string(), source);
        });
    }

    /// Removes a template.
    pub fn remove_template(&self, name: &str) {
        self.with_templates(|templates| {
            templates.remove(name);
        });
    }

    /// Removes all templates.
    pub fn clear(&self) {
        self.with_templates(HashMap::clear);
    }

    /// Whether a template is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.with_templates(|templates| templates.contains_key(name))
    }
}

impl TemplateLoader for MemoryLoader {
    fn load(&self, name: &str) -> Result<LoadedTemplate> {
        let source = self
            .with_templates(|templates| templates.get(name).cloned())
            .ok_or_else(|| TemplexError::TemplateNotFound(name.to_string()))?;
        Ok(LoadedTemplate {
            name: name.to_string(),
            path: name.to_string(),
            source: source.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn memory_loader_round_trip() {
        let loader = MemoryLoader::new();
        loader.add_template("greeting", "Hello {{.name}}");
        assert!(loader.contains("greeting"));

        let loaded = loader.load("greeting").unwrap();
        assert_eq!(loaded.source, b"Hello {{.name}}");

        loader.remove_template("greeting");
        assert!(matches!(
            loader.load("greeting"),
            Err(TemplexError::TemplateNotFound(name)) if name == "greeting"
        ));
    }

    #[test]
    fn memory_loader_clones_share_storage() {
        let loader = MemoryLoader::new();
        let other = loader.clone();
        other.add_template("a", "x");
        assert!(loader.contains("a"));
        loader.clear();
        assert!(!other.contains("a"));
    }

    #[cfg(feature = "filesystem")]
    #[test]
    fn filesystem_loader_tries_extension() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("reports")).unwrap();
        fs::write(dir.path().join("reports/daily.tpl"), "daily").unwrap();
        fs::write(dir.path().join("plain.txt"), "plain").unwrap();

        let loader = FileSystemLoader::new(dir.path());
        assert_eq!(loader.load("reports/daily").unwrap().source, b"daily");
        assert_eq!(loader.load("reports/daily.tpl").unwrap().source, b"daily");
        assert_eq!(loader.load("plain.txt").unwrap().source, b"plain");
        assert!(matches!(
            loader.load("plain"),
            Err(TemplexError::TemplateNotFound(_))
        ));

        let txt = FileSystemLoader::new(dir.path()).with_extension(".txt");
        assert_eq!(txt.load("plain").unwrap().source, b"plain");
    }

    #[cfg(feature = "filesystem")]
    #[test]
    fn filesystem_loader_rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let loader = FileSystemLoader::new(dir.path());
        for name in ["../secret", "/etc/passwd", "a/../../b", ""] {
            assert!(
                matches!(loader.load(name), Err(TemplexError::Resolution(_))),
                "name {:?}",
                name
            );
        }
    }
}
