//! Configuration file support for fixkit
//!
//! Loads `.fixkit.toml` from the current directory or its parents.

use anyhow::{bail, Context, Result};
use fixkit_fixer::{ConfigValue, LineEnding, RuleConfig, RuleRegistry};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".fixkit.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rules: RulesConfig,
    pub whitespace: WhitespaceConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// If set, only these rules will run
    pub enabled: Option<Vec<String>>,
    /// Rules to exclude (applied after enabled)
    pub disabled: Vec<String>,
    /// Include risky rules when `enabled` is not given
    pub allow_risky: bool,
    /// `[rules.options.<rule>]` tables
    pub options: HashMap<String, HashMap<String, ConfigValue>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WhitespaceConfig {
    /// `"lf"` or `"crlf"`
    pub line_ending: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Glob patterns to exclude from processing
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text", "json" or "diff"
    pub format: Option<String>,
}

impl Config {
    /// Load config from `.fixkit.toml` searching from current directory upward
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        Self::load_from(std::env::current_dir()?)
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Compute the rules to run.
    ///
    /// Rules named on the command line win outright. Otherwise `enabled`
    /// selects the rules, defaulting to every rule that is neither risky
    /// (unless allowed) nor deprecated, and `disabled` is removed last.
    pub fn effective_rules(
        &self,
        registry: &RuleRegistry,
        cli_rules: &[String],
        allow_risky: bool,
    ) -> Result<Vec<String>> {
        let requested: Vec<String> = if !cli_rules.is_empty() {
            cli_rules.to_vec()
        } else if let Some(enabled) = &self.rules.enabled {
            enabled.clone()
        } else {
            let allow_risky = allow_risky || self.rules.allow_risky;
            registry
                .all()
                .iter()
                .filter(|rule| allow_risky || !rule.is_risky())
                .filter(|rule| !rule.capabilities().is_deprecated())
                .map(|rule| rule.name().to_string())
                .collect()
        };

        for name in requested.iter().chain(&self.rules.disabled) {
            if registry.get(name).is_none() {
                bail!("Unknown rule '{}'. Use --list-rules to see available rules.", name);
            }
        }

        let mut rules = Vec::new();
        for name in requested {
            if !rules.contains(&name) && (!cli_rules.is_empty() || !self.rules.disabled.contains(&name)) {
                rules.push(name);
            }
        }
        Ok(rules)
    }

    /// Whitespace settings and per-rule options for the rules
    pub fn rule_config(&self) -> RuleConfig {
        RuleConfig {
            line_ending: self
                .whitespace
                .line_ending
                .as_deref()
                .map(LineEnding::parse)
                .unwrap_or_default(),
            options: self.rules.options.clone(),
        }
    }

    /// Check if a path should be excluded based on config patterns
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.paths.exclude {
            if let Ok(glob_pattern) = glob::Pattern::new(pattern) {
                if glob_pattern.matches(&path_str) {
                    return true;
                }
                if let Some(file_name) = path.file_name() {
                    if glob_pattern.matches(&file_name.to_string_lossy()) {
                        return true;
                    }
                }
            }

            // `vendor/` excludes the directory at any depth
            if pattern.ends_with('/') {
                let dir_pattern = pattern.trim_end_matches('/');
                if path_str.contains(&format!("/{}/", dir_pattern))
                    || path_str.starts_with(&format!("{}/", dir_pattern))
                {
                    return true;
                }
            }
        }

        false
    }
}
