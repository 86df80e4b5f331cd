/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 8/9/24
 ******************************************************************************/

use crate::constants::{AUTHORIZATION_HEADER_KEY, BEARER_PREFIX};
use crate::error::{AppError, AuthError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::fmt;
use std::fmt::Display;
use tracing::debug;

/// Headers attached to an outgoing API request.
#[derive(Debug, Default)]
pub(crate) struct AuthHeaders {
    pub(crate) authorization: Option<String>,
}

impl AuthHeaders {
    /// Builds the header set for a request, optionally carrying a bearer
    /// token.
    ///
    /// # Arguments
    ///
    /// * `bearer` - The access token to send, or `None` for an anonymous
    ///   request.
    pub(crate) fn new(bearer: Option<&str>) -> Self {
        Self {
            authorization: bearer.map(|token| format!("{BEARER_PREFIX}{token}")),
        }
    }

    /// The token carried in the `Authorization` header, without the scheme.
    pub(crate) fn bearer_token(&self) -> Option<&str> {
        self.authorization
            .as_deref()
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
    }

    /// Converts the headers into a `HeaderMap` ready for reqwest.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Auth` when the stored token contains characters
    /// that are not valid in an HTTP header.
    pub(crate) fn to_header_map(&self) -> Result<HeaderMap, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(authorization) = &self.authorization {
            let mut value = HeaderValue::from_str(authorization).map_err(|_| {
                AppError::Auth(AuthError::Other(
                    "access token is not a valid header value".to_string(),
                ))
            })?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("authorization"), value);
        }
        debug!("Request headers: {}", self);
        Ok(headers)
    }
}

impl Display for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.authorization {
            Some(_) => write!(f, "{{\"{}\":\"Bearer [REDACTED]\"}}", AUTHORIZATION_HEADER_KEY),
            None => write!(f, "{{}}"),
        }
    }
}

#[cfg(test)]
mod tests_auth_headers {
    use super::*;

    #[test]
    fn test_bearer_header() {
        let headers = AuthHeaders::new(Some("abc.def"));
        let map = headers.to_header_map().unwrap();

        assert_eq!(map.get("authorization").unwrap(), "Bearer abc.def");
        assert!(map.get("authorization").unwrap().is_sensitive());
        assert_eq!(headers.bearer_token(), Some("abc.def"));
    }

    #[test]
    fn test_anonymous_headers() {
        let headers = AuthHeaders::new(None);
        assert!(headers.to_header_map().unwrap().is_empty());
        assert_eq!(headers.bearer_token(), None);
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let headers = AuthHeaders::new(Some("bad\ntoken"));
        assert!(headers.to_header_map().is_err());
    }

    #[test]
    fn test_display_redacts() {
        assert_eq!(
            AuthHeaders::new(Some("secret")).to_string(),
            "{\"Authorization\":\"Bearer [REDACTED]\"}"
        );
        assert_eq!(AuthHeaders::default().to_string(), "{}");
    }
}
