//! Endpoint targets given on the command line (`-u/--url`).

use super::error::TruststoreError;
use super::error::TruststoreResult;
use pipeline_protocol::onboarding_models::Endpoint;
use pipeline_protocol::onboarding_models::DEFAULT_TLS_PORT;
use url::Url;

/// Parse `host`, `host:port` or `scheme://host[:port][/path]` into an endpoint.
///
/// Without a scheme the target is treated as HTTPS, so the default port is
/// 443. The endpoint alias is the host name.
pub fn parse_target(target: &str) -> TruststoreResult<Endpoint> {
    let trimmed = target.trim();
    let invalid = |reason: String| TruststoreError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    if trimmed.is_empty() {
        return Err(invalid("target is empty".to_string()));
    }

    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    }
    .map_err(|e| invalid(e.to_string()))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid("no host".to_string()))?;

    Ok(Endpoint {
        alias: host.to_string(),
        host: host.to_string(),
        port: url.port_or_known_default().unwrap_or(DEFAULT_TLS_PORT),
    })
}
