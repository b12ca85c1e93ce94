// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! templex CLI configuration.
//!
//! Configuration is loaded from `templex.toml` in the working directory, or
//! from an explicit `--config` path. Every section is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! [render]
//! value_binding = "item"
//! key_binding = "index"
//!
//! [templates]
//! dir = "templates"
//! extension = "tpl"
//!
//! [cache]
//! capacity = 100
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use templex::RenderOptions;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "templex.toml";

/// Main configuration structure loaded from `templex.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Loop binding names.
    #[serde(default)]
    pub render: RenderOptions,
    /// Where named templates are looked up.
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Compiled template cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Named template lookup configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplatesConfig {
    /// Directory containing templates (default: "templates").
    #[serde(default = "default_templates_dir")]
    pub dir: String,
    /// Extension tried for names given without one (default: "tpl").
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Compiled template cache configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Maximum number of compiled templates kept (default: 100).
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_extension() -> String {
    "tpl".to_string()
}

fn default_capacity() -> usize {
    100
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
            extension: default_extension(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, or from `templex.toml` in the
    /// current directory when no path is given.
    ///
    /// A missing `templex.toml` yields the default configuration; a missing
    /// explicit path is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => path,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if !default_path.exists() {
                    return Ok(Config::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Cannot read config file {}", config_path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", config_path.display()))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
