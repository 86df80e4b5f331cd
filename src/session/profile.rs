/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 7/9/24
 ******************************************************************************/
use crate::application::models::provider::{Provider, ProviderInfo};
use crate::utils::deserialize::lenient_count;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

fn default_tier() -> String {
    "free".to_string()
}

fn default_provider() -> String {
    Provider::default().as_str().to_string()
}

fn default_key_source() -> String {
    "system_fallback".to_string()
}

/// Usage counters attached to a profile. `None` limits mean unlimited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    #[serde(default)]
    pub requests_today: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub daily_limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub messages_remaining: Option<u64>,
    #[serde(default)]
    pub has_api_key: bool,
    #[serde(default)]
    pub using_fallback: bool,
    #[serde(default = "default_key_source")]
    pub key_source: String,
}

impl Default for UsageSummary {
    fn default() -> Self {
        Self {
            requests_today: 0,
            daily_limit: None,
            messages_remaining: None,
            has_api_key: false,
            using_fallback: false,
            key_source: default_key_source(),
        }
    }
}

/// Display-only snapshot of the logged in user. Never used for
/// authorization decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_tier")]
    pub subscription_tier: String,
    #[serde(default = "default_provider")]
    pub preferred_provider: String,
    #[serde(default)]
    pub has_api_key: bool,
    #[serde(default)]
    pub usage: UsageSummary,
    #[serde(default)]
    pub provider_info: Option<ProviderInfo>,
}

impl UserProfile {
    pub fn new(username: &str) -> Self {
        Self {
            id: None,
            username: username.to_string(),
            email: None,
            subscription_tier: default_tier(),
            preferred_provider: default_provider(),
            has_api_key: false,
            usage: UsageSummary::default(),
            provider_info: None,
        }
    }

    /// Preferred provider, falling back to the default for unknown names.
    pub fn provider(&self) -> Provider {
        self.preferred_provider.parse().unwrap_or_default()
    }

    /// Reads a `user` object sent alongside tokens.
    ///
    /// A missing or non-string `username` is filled with `fallback`. A
    /// snapshot that still does not parse becomes `UserProfile::new(fallback)`.
    pub fn from_snapshot(user: Option<Value>, fallback: &str) -> Self {
        let Some(Value::Object(mut fields)) = user else {
            return Self::new(fallback);
        };
        if !fields.get("username").is_some_and(Value::is_string) {
            fields.insert("username".to_string(), Value::String(fallback.to_string()));
        }
        serde_json::from_value(Value::Object(fields)).unwrap_or_else(|e| {
            warn!("Ignoring unreadable profile snapshot: {}", e);
            Self::new(fallback)
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.has_api_key || self.usage.has_api_key
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.provider_info
            .clone()
            .unwrap_or_else(|| self.provider().info())
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"username\":\"{}\",\"subscription_tier\":\"{}\",\"preferred_provider\":\"{}\",\"requests_today\":{}}}",
            self.username, self.subscription_tier, self.preferred_provider, self.usage.requests_today
        )
    }
}
