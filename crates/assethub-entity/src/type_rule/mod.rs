//! Upload validation rule entity.

pub mod model;

pub use model::{TypeRule, TypeRuleInput, normalize_extension, normalize_extension_list};
