//! Shared types, errors, and configuration for Amortis.
//!
//! This crate provides common pieces used across the workspace:
//! - The money rounding policy
//! - Typed IDs for schedule owners
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, CacheConfig, EngineConfig, LoggingConfig};
pub use error::{AppError, AppResult};
