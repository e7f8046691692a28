//! fraudlens-common: Shared error type and configuration used across all FraudLens crates.

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{FraudlensError, Result};
