//! `switch` statement rules

mod switch_case_semicolon_to_colon;
mod switch_case_space;

pub use switch_case_semicolon_to_colon::SwitchCaseSemicolonToColonRule;
pub use switch_case_space::SwitchCaseSpaceRule;
