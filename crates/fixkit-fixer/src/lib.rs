//! fixkit-fixer: rewriting rules for fixkit
//!
//! Rules are thin clients of the [`fixkit_core`] token stream. This crate
//! provides the rule contract, the built-in rules, the registry that runs
//! them in priority order, and the resolver that derives priorities from
//! "must run before" relations.
//!
//! # Example
//!
//! ```
//! use fixkit_fixer::{RuleConfig, RuleRegistry};
//!
//! let registry = RuleRegistry::new();
//! let result = registry
//!     .fix_source("<?php $a = ['x' => 1, 'x' => 2];", &["no_duplicated_array_key"], &RuleConfig::default())
//!     .unwrap();
//! assert_eq!(result.code, "<?php $a = ['x' => 2];");
//! ```

pub mod config;
pub mod error;
pub mod priority;
pub mod registry;
pub mod relations;
pub mod rule;
pub mod rules;

pub use config::LineEnding;
pub use error::{ApplyError, PriorityError, RuleError};
pub use priority::PriorityResolver;
pub use registry::{FixResult, RuleInfo, RuleRegistry};
pub use rule::{Capabilities, ConfigValue, OptionType, Rule, RuleConfig, RuleOption};
