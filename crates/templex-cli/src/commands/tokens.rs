// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Tokens command: print the lexer output of a template.

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use templex::Lexer;

/// Runs the tokens command, writing to stdout.
pub fn run(template: &str) -> anyhow::Result<()> {
    let path = Path::new(template);
    let file =
        File::open(path).with_context(|| format!("Cannot open template {}", path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_tokens(BufReader::new(file), &mut out)?;
    out.flush()?;
    Ok(())
}

/// Writes one line per token: `line:column`, kind and the raw text quoted.
pub fn write_tokens<R: Read, W: Write + ?Sized>(source: R, out: &mut W) -> anyhow::Result<()> {
    for token in Lexer::new(source) {
        let token = token?;
        writeln!(out, "{}\t{}\t{:?}", token.span, token.kind, token.text())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_token() {
        let mut out = Vec::new();
        write_tokens("a{{.b}}\n{{#end}}".as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "1:1\tliteral\t\"a\"\n1:2\tvariable\t\"{{.b}}\"\n1:8\tliteral\t\"\\n\"\n2:1\tloop-end\t\"{{#end}}\"\n2:8\tliteral\t\"\"\n"
        );
    }
}
