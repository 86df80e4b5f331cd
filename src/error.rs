/******************************************************************************
    Author: Joaquín Béjar García
    Email: jb@taunais.com
    Date: 12/5/25
 ******************************************************************************/
use crate::application::models::error_body::ApiErrorBody;
use reqwest::StatusCode;
use std::fmt::{Display, Formatter};
use std::{fmt, io};

/// Failures of the login / refresh exchanges.
#[derive(Debug)]
pub enum AuthError {
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    /// Login answered 400/401. The body carries the backend's reason.
    BadCredentials(ApiErrorBody),
    /// The backend answered 2xx but did not issue a full token pair.
    MissingTokens,
    NoRefreshToken,
    RefreshRejected(StatusCode),
    Unexpected(StatusCode),
    /// Any other non-2xx answer to an auth call, body kept.
    Rejected {
        status: StatusCode,
        body: ApiErrorBody,
    },
    Storage(String),
    Other(String),
}

impl AuthError {
    /// The backend's own explanation, when it sent one.
    pub fn backend_message(&self) -> Option<String> {
        match self {
            AuthError::BadCredentials(body) | AuthError::Rejected { body, .. } => body.message(),
            _ => None,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Network(e) => write!(f, "network error: {e}"),
            AuthError::Io(e) => write!(f, "io error: {e}"),
            AuthError::Json(e) => write!(f, "json error: {e}"),
            AuthError::BadCredentials(body) => match body.message() {
                Some(msg) => write!(f, "bad credentials: {msg}"),
                None => write!(f, "bad credentials"),
            },
            AuthError::MissingTokens => write!(f, "login response carried no tokens"),
            AuthError::NoRefreshToken => write!(f, "no refresh token stored"),
            AuthError::RefreshRejected(s) => write!(f, "token refresh rejected: {s}"),
            AuthError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
            AuthError::Rejected { status, body } => match body.message() {
                Some(msg) => write!(f, "request rejected {status}: {msg}"),
                None => write!(f, "request rejected {status}"),
            },
            AuthError::Storage(msg) => write!(f, "storage error: {msg}"),
            AuthError::Other(msg) => write!(f, "other error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e)
    }
}
impl From<io::Error> for AuthError {
    fn from(e: io::Error) -> Self {
        AuthError::Io(e)
    }
}
impl From<serde_json::Error> for AuthError {
    fn from(e: serde_json::Error) -> Self {
        AuthError::Json(e)
    }
}
impl From<AppError> for AuthError {
    fn from(e: AppError) -> Self {
        match e {
            AppError::Network(e) => AuthError::Network(e),
            AppError::Io(e) => AuthError::Io(e),
            AppError::Json(e) => AuthError::Json(e),
            AppError::Unexpected(s) => AuthError::Unexpected(s),
            AppError::Api { status, body } => AuthError::Rejected { status, body },
            AppError::Storage(msg) => AuthError::Storage(msg),
            AppError::Auth(e) => e,
            AppError::SessionExpired => AuthError::Other("session expired".to_string()),
            AppError::InvalidUpload(reason) => AuthError::Other(reason.to_string()),
        }
    }
}

/// Why a file was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadRejection {
    TooLarge { size: usize, limit: usize },
    UnsupportedType { file_name: String, mime: Option<String> },
}

impl Display for UploadRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UploadRejection::TooLarge { size, limit } => {
                write!(f, "file is {size} bytes, limit is {limit}")
            }
            UploadRejection::UnsupportedType { file_name, mime } => write!(
                f,
                "unsupported file type for {file_name} ({})",
                mime.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    /// The request never produced a response.
    Network(reqwest::Error),
    Io(io::Error),
    Json(serde_json::Error),
    Unexpected(StatusCode),
    /// Refresh failed after a 401; credentials were cleared and the user
    /// has to log in again.
    SessionExpired,
    /// Business-level rejection, body kept as the backend sent it.
    Api {
        status: StatusCode,
        body: ApiErrorBody,
    },
    Storage(String),
    /// The file was refused locally and never sent.
    InvalidUpload(UploadRejection),
    Auth(AuthError),
}

impl AppError {
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Auth(AuthError::Network(_)))
    }

    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            AppError::SessionExpired
                | AppError::Auth(AuthError::BadCredentials(_))
                | AppError::Auth(AuthError::NoRefreshToken)
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Api { status, .. }
            | AppError::Unexpected(status)
            | AppError::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Network(e) => write!(f, "network error: {e}"),
            AppError::Io(e) => write!(f, "io error: {e}"),
            AppError::Json(e) => write!(f, "json error: {e}"),
            AppError::Unexpected(s) => write!(f, "unexpected http status: {s}"),
            AppError::SessionExpired => write!(f, "session expired, login required"),
            AppError::Api { status, body } => match body.message() {
                Some(msg) => write!(f, "api error {status}: {msg}"),
                None => write!(f, "api error {status}"),
            },
            AppError::Storage(msg) => write!(f, "storage error: {msg}"),
            AppError::InvalidUpload(reason) => write!(f, "upload refused: {reason}"),
            AppError::Auth(e) => write!(f, "auth error: {e}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Network(e)
    }
}
impl From<io::Error> for AppError {
    fn from(e: io::Error) -> Self {
        AppError::Io(e)
    }
}
impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}
impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Network(e) => AppError::Network(e),
            AuthError::Io(e) => AppError::Io(e),
            AuthError::Json(e) => AppError::Json(e),
            AuthError::Storage(msg) => AppError::Storage(msg),
            AuthError::Rejected { status, body } => AppError::Api { status, body },
            other => AppError::Auth(other),
        }
    }
}
