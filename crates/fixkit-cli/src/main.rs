//! fixkit CLI - token based PHP code fixer
//!
//! Runs the fixkit rules over PHP files in priority order, either
//! reporting what would change (`--check`, the default) or writing the
//! result (`--fix`). `--priorities` resolves a relation file instead.

mod config;
mod output;
mod priorities;
mod process;

use anyhow::Result;
use clap::Parser;
use colored::*;
use fixkit_fixer::{RuleConfig, RuleRegistry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use config::Config;
use output::{EditInfo, OutputFormat, Reporter};
use priorities::PriorityFile;
use process::{process_file, write_file};

#[derive(Parser)]
#[command(name = "fixkit")]
#[command(version)]
#[command(about = "Token based PHP code fixer")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present_any = ["list_rules", "priorities"])]
    paths: Vec<PathBuf>,

    /// Report what would change without writing (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Write fixes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Include risky rules in the default rule set
    #[arg(long)]
    allow_risky: bool,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .fixkit.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Resolve rule priorities from a relation file and exit
    #[arg(long, value_name = "FILE")]
    priorities: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Diagnostics go to stderr, only when `RUST_LOG` is set
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let registry = RuleRegistry::new();

    if cli.list_rules {
        list_rules(&registry, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(path) = &cli.priorities {
        let resolved = PriorityFile::load(path)?.resolve(&registry)?;
        priorities::print_priorities(&resolved, cli.json)?;
        return Ok(ExitCode::SUCCESS);
    }

    let (config, config_path) = load_config(&cli)?;

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::parse(format).ok_or_else(|| {
            anyhow::anyhow!("Invalid output format '{}'. Valid options: text, json, diff", format)
        })?
    };

    if let Some(path) = &config_path {
        if cli.verbose && output_format == OutputFormat::Text {
            println!("{}: {}", "Using config".bold(), path.display());
        }
    }

    let enabled_rules = config.effective_rules(&registry, &cli.rule, cli.allow_risky)?;
    if enabled_rules.is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }
    let rule_names: Vec<&str> = enabled_rules.iter().map(String::as_str).collect();
    let rule_config = config.rule_config();

    let fix_mode = cli.fix;
    let check_mode = !fix_mode;

    if cli.verbose && output_format == OutputFormat::Text {
        println!("{}: {}", "Mode".bold(), if fix_mode { "fix" } else { "check" });
        println!("{}: {}", "Rules".bold(), enabled_rules.join(", "));
        println!();
    }

    let (file_paths, missing_paths) = collect_files(&cli.paths, &config);
    info!(files = file_paths.len(), rules = rule_names.len(), "processing");

    // Process files in parallel
    let mut results: Vec<(&PathBuf, FileResult)> = file_paths
        .par_iter()
        .map(|path| (path, process_file_to_result(path, &registry, &rule_names, &rule_config)))
        .collect();

    // Sort results by path for deterministic output
    results.sort_by(|a, b| a.0.cmp(b.0));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        if output_format != OutputFormat::Json {
            eprintln!("{}: Path does not exist: {}", "Warning".yellow(), path.display());
        }
    }

    for (path, result) in results {
        report_result(path, result, fix_mode, &mut reporter)?;
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 || !missing_paths.is_empty() {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    if cli.no_config {
        return Ok((Config::default(), None));
    }
    if let Some(path) = &cli.config {
        return Ok((Config::load_path(path)?, Some(path.clone())));
    }
    Ok(match Config::load()? {
        Some((config, path)) => (config, Some(path)),
        None => (Config::default(), None),
    })
}

/// Expand the command line paths into PHP files, honoring excludes
fn collect_files(paths: &[PathBuf], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths = Vec::new();
    let mut missing_paths = Vec::new();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            {
                let file_path = entry.path();
                if config.should_exclude(file_path) {
                    debug!(path = %file_path.display(), "excluded");
                } else {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    (file_paths, missing_paths)
}

fn list_rules(registry: &RuleRegistry, json: bool) -> Result<()> {
    let mut rules = registry.list();
    rules.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));

    if json {
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{}", "Available rules:".bold());
    for rule in rules {
        let mut flags = Vec::new();
        if rule.is_risky {
            flags.push("risky".red().to_string());
        }
        if rule.is_configurable {
            flags.push("configurable".cyan().to_string());
        }
        if let Some(replacements) = &rule.deprecated_by {
            flags.push(format!("deprecated, use {}", replacements.join(", ")).yellow().to_string());
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", flags.join(", "))
        };
        println!(
            "  {} ({}) - {}{}",
            rule.name.green(),
            rule.priority,
            rule.description,
            flags
        );
    }
    Ok(())
}

/// Result of processing a single file (for parallel processing)
enum FileResult {
    NoChanges,
    HasChanges {
        edits: Vec<EditInfo>,
        old_source: String,
        new_source: String,
    },
    Error(String),
}

/// Process a file and return a result (no writes, suitable for parallel execution)
fn process_file_to_result(
    path: &Path,
    registry: &RuleRegistry,
    rules: &[&str],
    config: &RuleConfig,
) -> FileResult {
    match process_file(path, registry, rules, config) {
        Ok(result) => match result.new_source {
            Some(new_source) => FileResult::HasChanges {
                edits: result.edits,
                old_source: result.old_source,
                new_source,
            },
            None => FileResult::NoChanges,
        },
        Err(e) => FileResult::Error(format!("{:#}", e)),
    }
}

/// Report a file result and optionally write the fix
fn report_result(path: &Path, result: FileResult, fix_mode: bool, reporter: &mut Reporter) -> Result<()> {
    match result {
        FileResult::NoChanges => {
            reporter.report_skipped(path);
        }
        FileResult::HasChanges {
            edits,
            old_source,
            new_source,
        } => {
            if fix_mode {
                write_file(path, &new_source)?;
                reporter.report_fix(path, edits);
            } else {
                reporter.report_check(path, edits, &old_source, &new_source);
            }
        }
        FileResult::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}
