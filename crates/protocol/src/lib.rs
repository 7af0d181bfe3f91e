//! # pipeline-protocol
//!
//! Core data models for the onboarding pipeline.
//!
//! This crate defines all shared data structures used for:
//! - Onboarding document parsing (`onboarding.yaml`)
//! - Global settings (`pipeline.toml`)
//! - Pipeline metadata written by `pipeline --init`
//!
//! ## Modules
//!
//! - [`onboarding_models`]: Onboarding document, truststore, endpoints and steps
//! - [`config_models`]: Global configuration from `pipeline.toml`
//! - [`metadata_models`]: Pipeline metadata persisted as JSON
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, chrono and uuid
//! - Independent compilation: No dependencies on other pipeline crates

pub mod config_models;
pub mod metadata_models;
pub mod onboarding_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use metadata_models::*;
pub use onboarding_models::*;
