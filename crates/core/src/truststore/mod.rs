//! Truststore operations.
//!
//! - `--fetch_certificates`: save the chain presented by each endpoint
//! - `--backup_truststore`: timestamped copy of the truststore
//! - `--update_truststore`: import PEM certificates with `keytool`
//!
//! External programs are run through a [`CommandRunner`](crate::executor::CommandRunner).

pub mod error;
pub mod ops;
pub mod pem;
pub mod target;

pub use error::{TruststoreError, TruststoreResult};
pub use ops::{
    backup_truststore, fetch_certificates, require_tool, update_truststore, FetchedCertificates,
    TruststoreSettings,
};
pub use pem::extract_pem_certificates;
pub use target::parse_target;
