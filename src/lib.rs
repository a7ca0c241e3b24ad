//! Healthwatch
//!
//! Periodic health sampling, threshold classification, and automated
//! recovery for long-running services.

/// Build-time information (rustc, target, timestamp)
pub mod build_info;

/// Monitor configuration profiles
pub mod config;

/// Error types
pub mod error;

/// Health sampling, history, recovery, and scheduling
pub mod health;
