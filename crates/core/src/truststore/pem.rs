//! PEM certificate block extraction.

const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Return every certificate block in `text`, in order.
///
/// Each block runs from the BEGIN line to the END line inclusive and is
/// returned newline-terminated. Anything outside blocks (e.g. the
/// `openssl s_client` session summary) is ignored, as is a block that is
/// never terminated.
pub fn extract_pem_certificates(text: &str) -> Vec<String> {
    let mut certificates = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in text.lines().map(str::trim) {
        if line == BEGIN_CERTIFICATE {
            current = Some(vec![line]);
        } else if let Some(block) = current.as_mut() {
            block.push(line);
            if line == END_CERTIFICATE {
                certificates.push(block.join("\n") + "\n");
                current = None;
            }
        }
    }

    certificates
}
