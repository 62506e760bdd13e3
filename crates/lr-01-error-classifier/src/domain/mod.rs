//! # Domain Layer
//!
//! Classification rules and the presentation projection of a classified
//! error.

mod display;
mod rules;

pub use display::ErrorDisplay;
pub use rules::{ClassificationRule, DEFAULT_RULES};
pub(crate) use rules::FALLBACK_MESSAGE;
