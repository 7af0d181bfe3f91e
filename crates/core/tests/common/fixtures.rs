//! Test fixtures for creating sample documents and command output.

use pipeline_protocol::onboarding_models::Onboarding;

/// `openssl s_client -showcerts` output presenting a two certificate chain.
#[allow(dead_code)]
pub const S_CLIENT_CHAIN: &str = "CONNECTED(00000003)
depth=1 CN = Example Issuing CA
---
Certificate chain
 0 s:CN = api.example.com
   i:CN = Example Issuing CA
-----BEGIN CERTIFICATE-----
MIIBleafcertificate
-----END CERTIFICATE-----
 1 s:CN = Example Issuing CA
   i:CN = Example Root CA
-----BEGIN CERTIFICATE-----
MIIBintermediatecertificate
-----END CERTIFICATE-----
---
DONE
";

/// A PEM file holding the same two certificates.
#[allow(dead_code)]
pub const CHAIN_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIBleafcertificate
-----END CERTIFICATE-----
-----BEGIN CERTIFICATE-----
MIIBintermediatecertificate
-----END CERTIFICATE-----
";

/// Parse an onboarding document, panicking on malformed test input.
#[allow(dead_code)]
pub fn onboarding(yaml: &str) -> Onboarding {
    serde_yaml::from_str(yaml).expect("Test onboarding should parse")
}
