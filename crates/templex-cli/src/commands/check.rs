// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Check command: compile templates and report structural errors.

use console::style;
use std::fs;
use std::path::Path;
use templex::{SourceContext, Template};

/// Runs the check command over every template path.
///
/// # Errors
///
/// Fails when at least one template cannot be read or compiled.
pub fn run(templates: &[String]) -> anyhow::Result<()> {
    let mut failed = 0;

    for template in templates {
        match check_file(Path::new(template)) {
            Ok(()) => println!("{} {}", style("ok").green(), template),
            Err(report) => {
                failed += 1;
                eprintln!("{} {}", style("error").red().bold(), report);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} templates failed", failed, templates.len());
    }
    Ok(())
}

/// Compiles one template file, returning a printable report on failure.
pub fn check_file(path: &Path) -> Result<(), String> {
    let source = fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    match Template::compile(source.as_slice()) {
        Ok(template) => {
            tracing::debug!(
                "{}: {} top-level statements",
                path.display(),
                template.statements().len()
            );
            Ok(())
        }
        Err(err) => {
            let mut report = format!("{}: {}", path.display(), err);
            if let Some((line, column)) = err.position() {
                let text = String::from_utf8_lossy(&source);
                report.push('\n');
                report.push_str(&SourceContext::from_source(&text, line, column).format_snippet());
            }
            Err(report)
        }
    }
}
