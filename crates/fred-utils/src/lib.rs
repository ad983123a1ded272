//! Shared utilities for the FRED agent workspace
//!
//! Logging setup and the small environment readers every crate's
//! `from_env` constructor builds on.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_flag, env_parse, env_var};
pub use logging::{LogFormat, init_tracing};
