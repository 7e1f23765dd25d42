//! `triage context`: show the source context a failure at `file:line` would get

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::context::extract_source_context;

/// Execute the context command
pub fn execute(file: &str, line: Option<u32>, root: &Path, json: bool) -> Result<bool> {
    let context = extract_source_context(file, line, root)
        .with_context(|| format!("No source context for {file} (is the path right?)"))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&context).context("Failed to serialize context")?
        );
        return Ok(true);
    }

    println!("{}", "Imports:".bold());
    if context.imports.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for import in &context.imports {
        println!("  {import}");
    }
    println!("\n{}", "Test code:".bold());
    println!("{}", context.test_code);
    Ok(true)
}
