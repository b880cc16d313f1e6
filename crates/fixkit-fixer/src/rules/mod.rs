//! Built-in rules
//!
//! Each group holds rules for one area of PHP style. Rules are thin clients
//! of the navigation, analysis and edit layers in `fixkit_core`.

pub mod arrays;
pub mod braces;
pub mod class;
pub mod comments;
pub mod phpunit;
pub mod whitespace;
