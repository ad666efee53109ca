use crate::constants::{DEFAULT_UPSTREAM_TIMEOUT_SECS, UPSTREAM_TIMEOUT_ENV};
use crate::error::{AppError, Result};
use crate::models::Capability;
use std::collections::HashMap;
use std::time::Duration;

/// Credentialed base endpoint of one capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Base URL without trailing slash
    pub url: String,
    pub client_id: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, client_id: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
        }
    }
}

/// Upstream endpoints for every configured capability
///
/// Capabilities without an endpoint are allowed; using one is a
/// configuration error at call time.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    endpoints: HashMap<Capability, Endpoint>,
    pub timeout: Duration,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        }
    }
}

impl UpstreamConfig {
    /// Read `{PREFIX}_URL` / `{PREFIX}_CLIENT_ID` for every capability
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        for capability in Capability::all() {
            let prefix = capability.env_prefix();
            if let Ok(url) = std::env::var(format!("{}_URL", prefix)) {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(AppError::Config(format!(
                        "{}_URL must start with http:// or https://, got: '{}'",
                        prefix, url
                    )));
                }
                let client_id = std::env::var(format!("{}_CLIENT_ID", prefix)).unwrap_or_default();
                config.endpoints.insert(capability, Endpoint::new(url, client_id));
            }
        }

        if let Ok(raw) = std::env::var(UPSTREAM_TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!("{} must be a number of seconds, got: '{}'", UPSTREAM_TIMEOUT_ENV, raw))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_endpoint(mut self, capability: Capability, endpoint: Endpoint) -> Self {
        self.endpoints.insert(capability, endpoint);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint for a capability, or a configuration error
    pub fn endpoint(&self, capability: Capability) -> Result<&Endpoint> {
        self.endpoints.get(&capability).ok_or_else(|| {
            AppError::Config(format!(
                "no endpoint configured for {} (set {}_URL)",
                capability,
                capability.env_prefix()
            ))
        })
    }

    /// Capabilities that have an endpoint, in declaration order
    pub fn configured(&self) -> Vec<Capability> {
        Capability::all()
            .into_iter()
            .filter(|c| self.endpoints.contains_key(c))
            .collect()
    }
}
