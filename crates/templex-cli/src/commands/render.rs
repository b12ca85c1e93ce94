// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Render command: template plus data file to text.
//!
//! The template argument is a file path when such a file exists, otherwise a
//! template name looked up in the configured templates directory.

use crate::config::Config;
use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use templex::{Engine, FileSystemLoader, Renderer, Template, Value};

/// Runs the render command.
pub fn run(
    config: &Config,
    template: &str,
    data: Option<&str>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let context = load_data(data)?;

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create output file {}", path.display()))?;
            let mut out = BufWriter::new(file);
            render_to(config, template, &context, &mut out)?;
            out.flush()?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            render_to(config, template, &context, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

/// Renders `template` against `context` into `out`.
pub fn render_to<W: Write + ?Sized>(
    config: &Config,
    template: &str,
    context: &Value,
    out: &mut W,
) -> anyhow::Result<()> {
    let path = Path::new(template);
    if path.is_file() {
        tracing::debug!("Rendering template file {}", path.display());
        let file = File::open(path)
            .with_context(|| format!("Cannot open template {}", path.display()))?;
        let compiled = Template::compile(BufReader::new(file))
            .with_context(|| format!("Cannot compile template {}", path.display()))?;
        let renderer = Renderer::new().with_options(config.render.clone());
        compiled.render_with(&renderer, context, out)?;
        return Ok(());
    }

    let loader = FileSystemLoader::new(&config.templates.dir)
        .with_extension(&config.templates.extension);
    let engine = Engine::with_memory_cache(loader, config.cache.capacity)
        .with_options(config.render.clone());
    engine
        .render(template, context, out)
        .with_context(|| format!("Cannot render template '{}'", template))?;
    Ok(())
}

/// Loads the render context.
///
/// `None` gives an empty map, `-` reads JSON from stdin, a `.toml` file is
/// read as TOML and anything else as JSON.
pub fn load_data(data: Option<&str>) -> anyhow::Result<Value> {
    let Some(data) = data else {
        return Ok(Value::Map(Default::default()));
    };

    if data == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return parse_json(&content, "stdin");
    }

    let path = Path::new(data);
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read data file {}", path.display()))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        parse_toml(&content, data)
    } else {
        parse_json(&content, data)
    }
}

fn parse_json(content: &str, origin: &str) -> anyhow::Result<Value> {
    let json: serde_json::Value = serde_json::from_str(content)
        .with_context(|| format!("Invalid JSON data in {}", origin))?;
    Ok(Value::from(json))
}

fn parse_toml(content: &str, origin: &str) -> anyhow::Result<Value> {
    let json: serde_json::Value =
        toml::from_str(content).with_context(|| format!("Invalid TOML data in {}", origin))?;
    Ok(Value::from(json))
}
