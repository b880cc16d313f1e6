//! Class structure rules

mod promoted_constructor_property;

pub use promoted_constructor_property::PromotedConstructorPropertyRule;
