//! Pipeline initialization (`pipeline --init`).
//!
//! Initialization loads and validates the onboarding document, then records
//! a metadata snapshot (`<metadata-dir>/metadata.json`) identifying this
//! pipeline with a fresh UUID.
//!
//! # Example
//!
//! ```no_run
//! use pipeline_core::init::{init_pipeline, InitOptions};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     root: PathBuf::from("."),
//!     onboarding_file: PathBuf::from("onboarding.yaml"),
//!     metadata_dir: PathBuf::from(".pipeline"),
//!     force: false,
//! };
//!
//! let metadata = init_pipeline(options).await?;
//! println!("Initialized pipeline {}", metadata.id);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;

pub use error::{InitError, InitResult};
pub use generator::{init_pipeline, load_metadata, InitOptions};
