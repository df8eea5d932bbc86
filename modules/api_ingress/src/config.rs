use serde::{Deserialize, Serialize};

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// HTTP host configuration, read from `modules.api_ingress`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ApiIngressConfig {
    /// `host:port`; empty means use `server.host`/`server.port`.
    pub bind_addr: String,
    pub enable_docs: bool,
    pub cors_enabled: bool,
    pub request_timeout_secs: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            enable_docs: false,
            cors_enabled: false,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ApiIngressConfig {
    /// Address to bind, falling back to the server section.
    pub fn resolve_bind_addr(&self, host: &str, port: u16) -> String {
        if self.bind_addr.trim().is_empty() {
            format!("{host}:{port}")
        } else {
            self.bind_addr.clone()
        }
    }
}
