//! Ambient utilities: configuration, errors and logging.

pub mod config;
pub mod errors;
pub mod logger;
