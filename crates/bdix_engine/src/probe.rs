use std::time::Duration;

use engine_logging::engine_debug;
use reqwest::StatusCode;

use crate::{FetchError, ProbeFailure, ProbeResult};

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Whole-request timeout for one probe. Kept short on purpose: the tool
    /// targets servers on the local exchange and favors fast feedback.
    pub timeout: Duration,
    /// Probes in flight at once. 1 means strictly sequential.
    pub concurrency: usize,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            concurrency: 1,
        }
    }
}

/// Prefixes `http://` unless the endpoint already names http or https.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim();
    if has_scheme(endpoint, "http://") || has_scheme(endpoint, "https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

fn has_scheme(endpoint: &str, scheme: &str) -> bool {
    endpoint
        .get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// Single reachability check. Implementations never fail: every error is an
/// `Unreachable` result.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    /// `url` is already normalized.
    async fn probe(&self, url: &str) -> ProbeResult;
}

#[derive(Debug, Clone)]
pub struct ReqwestProber {
    client: reqwest::Client,
}

impl ReqwestProber {
    pub fn new(settings: &ProbeSettings) -> Result<Self, FetchError> {
        // A redirect is not a 200, so it is never followed.
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for ReqwestProber {
    async fn probe(&self, url: &str) -> ProbeResult {
        let parsed = match reqwest::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(err) => {
                engine_debug!("Probe {} rejected: {}", url, err);
                return ProbeResult::Unreachable(ProbeFailure::InvalidUrl);
            }
        };

        match self.client.get(parsed).send().await {
            Ok(response) if response.status() == StatusCode::OK => ProbeResult::Reachable,
            Ok(response) => {
                let failure = ProbeFailure::HttpStatus(response.status().as_u16());
                engine_debug!("Probe {} unreachable: {}", url, failure);
                ProbeResult::Unreachable(failure)
            }
            Err(err) => {
                let failure = if err.is_timeout() {
                    ProbeFailure::Timeout
                } else {
                    ProbeFailure::Network
                };
                engine_debug!("Probe {} unreachable: {} ({})", url, failure, err);
                ProbeResult::Unreachable(failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_endpoint;

    #[test]
    fn bare_hosts_get_http_prefix() {
        assert_eq!(normalize_endpoint("srv1.example"), "http://srv1.example");
        assert_eq!(
            normalize_endpoint(" 10.16.100.244:8080/ "),
            "http://10.16.100.244:8080/"
        );
    }

    #[test]
    fn existing_scheme_is_kept() {
        assert_eq!(normalize_endpoint("http://a.example"), "http://a.example");
        assert_eq!(normalize_endpoint("https://b.example"), "https://b.example");
        assert_eq!(normalize_endpoint("HTTPS://c.example"), "HTTPS://c.example");
    }

    #[test]
    fn other_schemes_are_prefixed() {
        assert_eq!(
            normalize_endpoint("ftp://files.example"),
            "http://ftp://files.example"
        );
    }
}
