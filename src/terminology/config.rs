use std::env;
use std::time::Duration;

use crate::constants::DEFAULT_TERMINOLOGY_TIMEOUT_SECS;

pub const DEFAULT_TOKEN_URL: &str = "https://icdaccessmanagement.who.int/connect/token";
pub const DEFAULT_SEARCH_URL: &str = "https://id.who.int/icd/entity/search";
pub const DEFAULT_SCOPE: &str = "icdapi_access";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_API_VERSION: &str = "v2";

/// Connection settings for the ICD-11 API.
#[derive(Clone)]
pub struct TerminologyConfig {
    pub token_url: String,
    pub search_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: String,
    pub timeout: Duration,
    pub language: String,
    pub api_version: String,
}

impl std::fmt::Debug for TerminologyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminologyConfig")
            .field("token_url", &self.token_url)
            .field("search_url", &self.search_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "***"))
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .field("language", &self.language)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Default for TerminologyConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            search_url: DEFAULT_SEARCH_URL.to_string(),
            client_id: None,
            client_secret: None,
            scope: DEFAULT_SCOPE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TERMINOLOGY_TIMEOUT_SECS),
            language: DEFAULT_LANGUAGE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl TerminologyConfig {
    pub const ENV_TOKEN_URL: &'static str = "DRRECONCILE_ICD_TOKEN_URL";
    pub const ENV_SEARCH_URL: &'static str = "DRRECONCILE_ICD_SEARCH_URL";
    pub const ENV_CLIENT_ID: &'static str = "DRRECONCILE_ICD_CLIENT_ID";
    pub const ENV_CLIENT_SECRET: &'static str = "DRRECONCILE_ICD_CLIENT_SECRET";
    pub const ENV_SCOPE: &'static str = "DRRECONCILE_ICD_SCOPE";
    pub const ENV_TIMEOUT_SECS: &'static str = "DRRECONCILE_ICD_TIMEOUT_SECS";
    pub const ENV_LANGUAGE: &'static str = "DRRECONCILE_ICD_LANGUAGE";
    pub const ENV_API_VERSION: &'static str = "DRRECONCILE_ICD_API_VERSION";

    /// Reads `DRRECONCILE_ICD_*` overrides on top of the defaults.
    ///
    /// Unparseable timeouts fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout = env::var(Self::ENV_TIMEOUT_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            token_url: string_or(Self::ENV_TOKEN_URL, defaults.token_url),
            search_url: string_or(Self::ENV_SEARCH_URL, defaults.search_url),
            client_id: optional_string(Self::ENV_CLIENT_ID),
            client_secret: optional_string(Self::ENV_CLIENT_SECRET),
            scope: string_or(Self::ENV_SCOPE, defaults.scope),
            timeout,
            language: string_or(Self::ENV_LANGUAGE, defaults.language),
            api_version: string_or(Self::ENV_API_VERSION, defaults.api_version),
        }
    }

    pub fn with_credentials(mut self, client_id: &str, client_secret: &str) -> Self {
        self.client_id = Some(client_id.to_string());
        self.client_secret = Some(client_secret.to_string());
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

fn string_or(var_name: &str, default: String) -> String {
    optional_string(var_name).unwrap_or(default)
}

fn optional_string(var_name: &str) -> Option<String> {
    env::var(var_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
