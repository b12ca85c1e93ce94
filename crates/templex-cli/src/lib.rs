// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! templex CLI library.
//!
//! This crate provides the command-line interface for the templex engine.
//!
//! # Usage
//!
//! This crate is primarily used through the `templex` binary:
//!
//! ```bash
//! templex render report.tpl --data data.json   # Render to stdout
//! templex check templates/*.tpl               # Validate loop blocks
//! templex tokens report.tpl                   # Dump the token stream
//! ```
//!
//! # Configuration
//!
//! Optional settings are read from `templex.toml` in the working directory,
//! or from the file given with `--config`.

/// CLI commands (render, check, tokens).
pub mod commands;
/// Configuration from `templex.toml`.
pub mod config;
