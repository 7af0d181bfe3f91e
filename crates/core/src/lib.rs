//! # pipeline-core
//!
//! Core logic for the onboarding pipeline.
//!
//! This crate provides:
//! - Shell command execution in normal, streaming ("call") and parallel modes
//! - Configuration loading from `pipeline.toml` and the onboarding document
//! - Onboarding validation
//! - Pipeline metadata initialization
//! - Truststore and certificate operations
//! - Sequential execution of onboarding steps
//!
//! ## Modules
//!
//! - [`executor`]: Command runner and the `CommandRunner` seam
//! - [`config`]: Configuration loading
//! - [`validate`]: Onboarding validation report
//! - [`init`]: Metadata initialization
//! - [`truststore`]: Certificate fetch, truststore backup and update
//! - [`engine`]: Step execution engine

pub mod config;
pub mod engine;
pub mod executor;
pub mod init;
pub mod truststore;
pub mod validate;
