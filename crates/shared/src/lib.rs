//! Shared types, errors, and configuration for Cadence.
//!
//! This crate provides common types used across the workspace:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, EngineConfig, LoggingConfig, OverlayMatching};
pub use error::AppError;
