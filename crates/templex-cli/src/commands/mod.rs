// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `render`: Render a template with JSON or TOML data
//! - `check`: Validate templates without rendering
//! - `tokens`: Print the token stream of a template

/// Template validation command.
pub mod check;
/// Template rendering command.
pub mod render;
/// Token dump command.
pub mod tokens;
