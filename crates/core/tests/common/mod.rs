//! Common test utilities shared by the integration tests.
//!
//! - Test fixtures (PEM output, onboarding documents)
//! - A recording `CommandRunner`
//! - Custom assertions

pub mod assertions;
pub mod fixtures;
pub mod mock_runner;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_runner::*;
