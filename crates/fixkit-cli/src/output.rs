//! Output formatting for fixkit
//!
//! Supports colored terminal text, JSON and unified diffs.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// A rule that changed a file
#[derive(Debug, Clone, Serialize)]
pub struct EditInfo {
    pub rule: String,
    /// Position of the first changed character in the file
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, edits: Vec<EditInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            edits,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            edits: Vec::new(),
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    /// Sum over files of the rules that changed them
    pub rules_applied: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    /// `check` or `fix`
    pub mode: &'static str,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report what would change, without touching the file
    pub fn report_check(&mut self, path: &Path, edits: Vec<EditInfo>, old_source: &str, new_source: &str) {
        self.count_changed(&edits);

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_diff(old_source, new_source);
                println!();
                for edit in &edits {
                    println!(
                        "  {} {} ({})",
                        "->".green(),
                        edit.rule,
                        edit.message.dimmed()
                    );
                }
                println!();
            }
            OutputFormat::Diff => {
                print!("{}", unified_diff(path, old_source, new_source));
            }
            OutputFormat::Json => {}
        }

        self.results.push(FileResult::success(path, edits));
    }

    /// Report a file after its fixes were written
    pub fn report_fix(&mut self, path: &Path, edits: Vec<EditInfo>) {
        self.count_changed(&edits);

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            let rules: Vec<&str> = edits.iter().map(|e| e.rule.as_str()).collect();
            println!(
                "  {} Applied {} rule(s): {}",
                "OK".green(),
                edits.len(),
                rules.join(", ")
            );
            println!();
        }

        self.results.push(FileResult::success(path, edits));
    }

    fn count_changed(&mut self, edits: &[EditInfo]) {
        self.summary.files_processed += 1;
        self.summary.files_with_changes += 1;
        self.summary.rules_applied += edits.len();
    }

    /// Report a file no rule changed
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.results.push(FileResult::success(path, vec![]));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format != OutputFormat::Json {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with changes: {}", self.summary.files_with_changes);
                println!("  Rules applied: {}", self.summary.rules_applied);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.rules_applied > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    mode: if check_mode { "check" } else { "fix" },
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            // Patch-compatible output carries no summary
            OutputFormat::Diff => {}
        }
        Ok(())
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print the changed lines of a file, colored
fn print_diff(old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        let line = line.trim_end_matches(['\n', '\r']);
        match change.tag() {
            ChangeTag::Delete => println!("  {}", format!("- {}", line).red()),
            ChangeTag::Insert => println!("  {}", format!("+ {}", line).green()),
            ChangeTag::Equal => {}
        }
    }
}

/// Unified diff (`diff -u` compatible) with three lines of context
pub fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let path_str = path.display().to_string();
    let diff = TextDiff::from_lines(old, new);

    let mut out = format!("--- a/{}\n+++ b/{}\n", path_str, path_str);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        out.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            out.push_str(&format!("{}{}", sign, change));
            if change.missing_newline() {
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::parse("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("diff"), Some(OutputFormat::Diff));
        assert_eq!(OutputFormat::parse("xml"), None);
    }

    #[test]
    fn test_unified_diff() {
        let old = "<?php\nswitch ($a) {\n    case 1;\n}\n";
        let new = "<?php\nswitch ($a) {\n    case 1:\n}\n";

        let diff = unified_diff(Path::new("src/Foo.php"), old, new);

        assert!(diff.starts_with("--- a/src/Foo.php\n+++ b/src/Foo.php\n@@ "));
        assert!(diff.contains("-    case 1;\n+    case 1:\n"));
        assert!(diff.contains(" switch ($a) {\n"));
    }

    #[test]
    fn test_unified_diff_without_trailing_newline() {
        let diff = unified_diff(Path::new("a.php"), "<?php $a;", "<?php $b;");
        assert!(diff.ends_with("+<?php $b;\n"));
    }

    #[test]
    fn test_reporter_summary() {
        let mut reporter = Reporter::new(OutputFormat::Json, false);
        let edit = EditInfo {
            rule: "switch_case_space".to_string(),
            line: 3,
            column: 11,
            message: "Removes extra spaces".to_string(),
        };

        reporter.report_check(Path::new("a.php"), vec![edit], "old", "new");
        reporter.report_skipped(Path::new("b.php"));
        reporter.report_error(Path::new("c.php"), "Failed to read file");

        let summary = reporter.summary();
        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_with_changes, 1);
        assert_eq!(summary.rules_applied, 1);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn test_json_serialization() {
        let output = JsonOutput {
            version: "0.1.0".to_string(),
            mode: "check",
            summary: Summary {
                files_processed: 10,
                files_with_changes: 3,
                rules_applied: 7,
                errors: 0,
            },
            files: vec![
                FileResult::success(
                    Path::new("test.php"),
                    vec![EditInfo {
                        rule: "no_duplicated_array_key".to_string(),
                        line: 15,
                        column: 5,
                        message: "Removes duplicated array keys".to_string(),
                    }],
                ),
                FileResult::error(Path::new("broken.php"), "Failed to read file".to_string()),
            ],
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"files_processed\":10"));
        assert!(json.contains("\"mode\":\"check\""));
        assert!(json.contains("\"rule\":\"no_duplicated_array_key\""));
        assert!(json.contains("\"error\":\"Failed to read file\""));
    }
}
