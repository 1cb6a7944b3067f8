use std::env;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://blog-app-1mfc.onrender.com/api/v1/blogs";
pub const DEFAULT_TENANT: &str = "myapp1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("URL {0:?} cannot be used as a base")]
    NotABase(String),
    #[error("tenant tag cannot be empty")]
    EmptyTenant,
}

/// Where the blog lives and which content partition this client works in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Collection root of the remote blog API (`{BASE}`).
    pub api_url: String,
    /// Tenant tag sent as `?app=` on every request and in write bodies.
    pub tenant: String,
    /// Public site root used to build share links (`{site}/blog/{id}`).
    pub site_url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            tenant: DEFAULT_TENANT.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
        }
    }
}

impl FrontendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        Self::new(
            read("LOGAXP_API_URL", DEFAULT_API_URL),
            read("LOGAXP_TENANT", DEFAULT_TENANT),
            read("LOGAXP_SITE_URL", DEFAULT_SITE_URL),
        )
    }

    pub fn new(
        api_url: impl Into<String>,
        tenant: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let tenant = tenant.into();
        if tenant.trim().is_empty() {
            return Err(ConfigError::EmptyTenant);
        }
        Ok(Self {
            api_url: normalize_base_url(api_url.into())?,
            tenant: tenant.trim().to_string(),
            site_url: normalize_base_url(site_url.into())?,
        })
    }
}

/// Adds a scheme when missing, strips trailing slashes and checks the result
/// parses as a base URL.
pub fn normalize_base_url(mut base: String) -> Result<String, ConfigError> {
    base = base.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    let parsed = Url::parse(&base).map_err(|err| ConfigError::InvalidUrl {
        url: base.clone(),
        reason: err.to_string(),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(ConfigError::NotABase(base));
    }
    Ok(base)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = FrontendConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, FrontendConfig::default());
    }

    #[test]
    fn overrides_are_read_and_normalized() {
        let vars: HashMap<&str, &str> = [
            ("LOGAXP_API_URL", "localhost:4000/api/v1/blogs/"),
            ("LOGAXP_TENANT", "  staging "),
            ("LOGAXP_SITE_URL", "   "),
        ]
        .into_iter()
        .collect();
        let config =
            FrontendConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.api_url, "http://localhost:4000/api/v1/blogs");
        assert_eq!(config.tenant, "staging");
        assert_eq!(config.site_url, DEFAULT_SITE_URL);
    }

    #[test]
    fn empty_tenant_is_rejected() {
        let err = FrontendConfig::new(DEFAULT_API_URL, " ", DEFAULT_SITE_URL).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTenant));
    }

    #[test]
    fn garbage_url_is_rejected() {
        assert!(normalize_base_url("http://exa mple.com".into()).is_err());
    }
}
