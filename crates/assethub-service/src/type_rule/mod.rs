//! Type rules: the enabled-rule store and upload validation.

pub mod source;
pub mod store;
pub mod validator;

pub use source::{FallbackRules, LiveRules, RuleSource};
pub use store::TypeRuleStore;
pub use validator::FileValidator;
