use serde::{Deserialize, Serialize};

/// Configuration for the signdesk module (`modules.signdesk`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignDeskConfig {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Hosted identity provider (GoTrue-compatible auth API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default = "default_provider_url")]
    pub provider_url: String,
    /// Sent as the `apikey` header on every provider call.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_url: default_provider_url(),
            api_key: String::new(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Session cookies and the redirect targets of the sign-in callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_access_cookie")]
    pub access_cookie: String,
    #[serde(default = "default_refresh_cookie")]
    pub refresh_cookie: String,
    /// PKCE verifier left by the browser client before the redirect.
    #[serde(default = "default_verifier_cookie")]
    pub verifier_cookie: String,
    #[serde(default = "default_true")]
    pub cookie_secure: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: i64,
    #[serde(default = "default_sign_in_path")]
    pub sign_in_path: String,
    #[serde(default = "default_post_login_path")]
    pub post_login_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_cookie: default_access_cookie(),
            refresh_cookie: default_refresh_cookie(),
            verifier_cookie: default_verifier_cookie(),
            cookie_secure: default_true(),
            max_age_secs: default_max_age_secs(),
            sign_in_path: default_sign_in_path(),
            post_login_path: default_post_login_path(),
        }
    }
}

fn default_provider_url() -> String {
    "http://localhost:9999/auth/v1".to_string()
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_access_cookie() -> String {
    "sd-access-token".to_string()
}

fn default_refresh_cookie() -> String {
    "sd-refresh-token".to_string()
}

fn default_verifier_cookie() -> String {
    "sd-code-verifier".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_age_secs() -> i64 {
    7 * 24 * 60 * 60
}

fn default_sign_in_path() -> String {
    "/sign-in".to_string()
}

fn default_post_login_path() -> String {
    "/jobs".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: SignDeskConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.session.access_cookie, "sd-access-token");
        assert_eq!(cfg.session.post_login_path, "/jobs");
        assert!(cfg.session.cookie_secure);
        assert_eq!(cfg.auth.timeout_secs, 10);
    }

    #[test]
    fn nested_overrides_apply() {
        let cfg: SignDeskConfig = serde_json::from_value(serde_json::json!({
            "auth": { "provider_url": "https://auth.example.com/auth/v1", "api_key": "k" },
            "session": { "cookie_secure": false }
        }))
        .unwrap();
        assert_eq!(cfg.auth.api_key, "k");
        assert!(!cfg.session.cookie_secure);
        assert_eq!(cfg.session.sign_in_path, "/sign-in");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<SignDeskConfig, _> =
            serde_json::from_value(serde_json::json!({ "session": { "cookie": "x" } }));
        assert!(res.is_err());
    }
}
