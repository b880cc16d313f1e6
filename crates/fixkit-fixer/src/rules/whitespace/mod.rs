//! Whitespace rules

mod blank_line_after_opening_tag;

pub use blank_line_after_opening_tag::BlankLineAfterOpeningTagRule;
