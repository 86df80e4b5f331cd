use crate::constants::DEFAULT_REGISTER_LEVEL;
use crate::error::AuthError;
use crate::session::profile::UserProfile;
use crate::storage::credentials::CredentialPair;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub(crate) username: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub(crate) refresh: &'a str,
}

#[derive(Default, Deserialize)]
pub struct TokenPayload {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl fmt::Debug for TokenPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPayload")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub tokens: Option<TokenPayload>,
    /// Display-only snapshot, kept raw until the login username is known.
    #[serde(default)]
    pub user: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// Validates the response into a full pair plus profile snapshot.
    /// Only the tokens can fail; the profile falls back to `username`.
    pub fn into_session(self, username: &str) -> Result<(CredentialPair, UserProfile), AuthError> {
        let tokens = self.tokens.unwrap_or_default();
        let (Some(access), Some(refresh)) = (non_empty(tokens.access), non_empty(tokens.refresh))
        else {
            return Err(AuthError::MissingTokens);
        };
        let profile = UserProfile::from_snapshot(self.user, username);
        Ok((CredentialPair { access, refresh }, profile))
    }
}

/// Answer of the refresh endpoint. Backends that rotate refresh tokens
/// also send a new `refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    #[serde(flatten)]
    pub tokens: TokenPayload,
}

impl RefreshResponse {
    pub fn access(&self) -> Option<&str> {
        self.tokens.access.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn rotated_refresh(&self) -> Option<&str> {
        self.tokens.refresh.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub level: String,
}

impl RegisterRequest {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            level: DEFAULT_REGISTER_LEVEL.to_string(),
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("level", &self.level)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl RegisterResponse {
    /// The created user, if the backend echoed one.
    pub fn profile(&self, username: &str) -> Option<UserProfile> {
        self.user
            .clone()
            .map(|user| UserProfile::from_snapshot(Some(user), username))
    }
}
