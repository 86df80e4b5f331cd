use crate::utils::deserialize::lenient_count;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rough classification of a rejected call, for picking what to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The provider needs a user API key (402, or the backend says so).
    ApiKeyRequired,
    /// The provider account has no credits left (403).
    InsufficientCredits,
    /// Daily request limit hit (429).
    RateLimited,
    /// Monthly plan quota, e.g. PDF analyses, used up.
    QuotaExhausted,
    Other,
}

/// Body of a non-2xx response. Every field is optional; unknown fields
/// (such as per-field validation errors) land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub non_field_errors: Vec<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub used: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
    #[serde(default)]
    pub reset_date: Option<String>,
    #[serde(default)]
    pub upgrade_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub current_usage: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub daily_limit: Option<u64>,
    #[serde(default)]
    pub using_system_fallback: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Response text when it was not a JSON object.
    #[serde(skip)]
    pub raw: Option<String>,
}

impl ApiErrorBody {
    pub fn from_text(text: &str) -> Self {
        match serde_json::from_str::<ApiErrorBody>(text) {
            Ok(body) => body,
            Err(_) => ApiErrorBody {
                raw: Some(text.trim().to_string()).filter(|t| !t.is_empty()),
                ..Default::default()
            },
        }
    }

    /// Best human readable message the backend gave, if any.
    pub fn message(&self) -> Option<String> {
        if let Some(msg) = self
            .error
            .as_ref()
            .or(self.detail.as_ref())
            .or(self.non_field_errors.first())
            .or(self.message.as_ref())
        {
            return Some(msg.clone());
        }
        let field_error = self.extra.iter().find_map(|(field, value)| {
            let first = match value {
                Value::Array(items) => items.first()?.as_str()?,
                Value::String(s) => s.as_str(),
                _ => return None,
            };
            Some(format!("{field}: {first}"))
        });
        field_error.or_else(|| self.raw.clone())
    }

    pub fn kind(&self, status: StatusCode) -> ApiErrorKind {
        let error = self.error.as_deref().unwrap_or_default().to_ascii_lowercase();
        if error.contains("limit reached") {
            ApiErrorKind::QuotaExhausted
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            ApiErrorKind::RateLimited
        } else if status == StatusCode::PAYMENT_REQUIRED || error.contains("api key") {
            ApiErrorKind::ApiKeyRequired
        } else if status == StatusCode::FORBIDDEN {
            ApiErrorKind::InsufficientCredits
        } else {
            ApiErrorKind::Other
        }
    }
}

#[cfg(test)]
mod tests_api_error_body {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_precedence() {
        let body = ApiErrorBody::from_text(r#"{"detail": "Token is invalid", "message": "x"}"#);
        assert_eq!(body.message().as_deref(), Some("Token is invalid"));

        let body = ApiErrorBody::from_text(r#"{"non_field_errors": ["Bad login"]}"#);
        assert_eq!(body.message().as_deref(), Some("Bad login"));
    }

    #[test]
    fn test_field_errors_are_kept() {
        let body = ApiErrorBody::from_text(r#"{"username": ["already taken"]}"#);
        assert_eq!(body.message().as_deref(), Some("username: already taken"));
        assert!(body.extra.contains_key("username"));
    }

    #[test]
    fn test_non_json_body() {
        let body = ApiErrorBody::from_text("Bad Gateway");
        assert_eq!(body.raw.as_deref(), Some("Bad Gateway"));
        assert_eq!(body.message().as_deref(), Some("Bad Gateway"));
        assert_eq!(ApiErrorBody::from_text("  ").message(), None);
    }

    #[test]
    fn test_quota_fields() {
        let body = ApiErrorBody::from_text(
            r#"{"error": "PDF analysis limit reached", "used": 5, "limit": 5, "reset_date": "2025-06-01"}"#,
        );
        assert_eq!(body.used, Some(5));
        assert_eq!(body.limit, Some(5));
        assert_eq!(body.kind(StatusCode::FORBIDDEN), ApiErrorKind::QuotaExhausted);
    }

    #[test]
    fn test_kind_by_status() {
        let empty = ApiErrorBody::default();
        assert_eq!(empty.kind(StatusCode::TOO_MANY_REQUESTS), ApiErrorKind::RateLimited);
        assert_eq!(empty.kind(StatusCode::PAYMENT_REQUIRED), ApiErrorKind::ApiKeyRequired);
        assert_eq!(empty.kind(StatusCode::FORBIDDEN), ApiErrorKind::InsufficientCredits);
        assert_eq!(empty.kind(StatusCode::BAD_REQUEST), ApiErrorKind::Other);

        let key = ApiErrorBody::from_text(r#"{"error": "API key required for analysis"}"#);
        assert_eq!(key.kind(StatusCode::BAD_REQUEST), ApiErrorKind::ApiKeyRequired);
    }
}
