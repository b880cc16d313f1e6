//! Array literal rules

mod no_duplicated_array_key;

pub use no_duplicated_array_key::NoDuplicatedArrayKeyRule;
