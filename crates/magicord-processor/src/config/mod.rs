//! Configuration module for the Magicord generator.
//!
//! This module provides figment-based configuration loading and validation
//! for the build-script driver: output directory, Cargo integration, and
//! logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config};
pub use schema::{GeneratorConfig, LogFormat, LogLevel, LogOutput, LoggingConfig};
pub use validation::validate_config;
