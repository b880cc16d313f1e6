//! File processing logic for fixkit

use anyhow::{Context, Result};
use fixkit_core::TokenStream;
use fixkit_fixer::{RuleConfig, RuleRegistry};
use std::path::Path;
use tracing::debug;

use crate::output::EditInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// One entry per rule that changed the file
    pub edits: Vec<EditInfo>,
    /// Original source code
    pub old_source: String,
    /// New source code (only if a rule changed something)
    pub new_source: Option<String>,
}

/// Read a PHP file and run the selected rules over it
pub fn process_file(
    path: &Path,
    registry: &RuleRegistry,
    rules: &[&str],
    config: &RuleConfig,
) -> Result<ProcessResult> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    process_source(source_code, registry, rules, config)
        .with_context(|| format!("Failed to fix {}", path.display()))
}

/// Run the selected rules over already loaded source code
pub fn process_source(
    source_code: String,
    registry: &RuleRegistry,
    rules: &[&str],
    config: &RuleConfig,
) -> Result<ProcessResult> {
    let mut tokens = TokenStream::from_source(&source_code);
    let applied = registry.apply(&mut tokens, rules, config)?;
    let new_source = tokens.generate_code();

    // A rule may edit and later restore the same text
    if applied.is_empty() || new_source == source_code {
        return Ok(ProcessResult {
            edits: vec![],
            old_source: source_code,
            new_source: None,
        });
    }

    debug!(tokens = tokens.len(), rules = applied.len(), "source changed");

    let (line, column) = offset_to_line_column(&source_code, first_difference(&source_code, &new_source));
    let edits = applied
        .iter()
        .map(|name| EditInfo {
            rule: name.to_string(),
            line,
            column,
            message: registry
                .get(name)
                .map(|rule| rule.description().to_string())
                .unwrap_or_default(),
        })
        .collect();

    Ok(ProcessResult {
        edits,
        old_source: source_code,
        new_source: Some(new_source),
    })
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Byte offset of the first character that differs
fn first_difference(old: &str, new: &str) -> usize {
    old.char_indices()
        .zip(new.chars())
        .find(|((_, a), b)| a != b)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| old.len().min(new.len()))
}

/// Convert byte offset to line and column numbers (1-based)
fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}
