//! # autolearn Config
//!
//! Configuration management for autolearn: polling intervals, delays, the
//! storage namespace and the literal page markers the heuristics look for.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
