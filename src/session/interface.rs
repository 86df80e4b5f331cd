use crate::error::{AppError, AuthError};
use crate::session::profile::UserProfile;
use crate::storage::credentials::CredentialStore;
use crate::transport::http_client::RequestBody;
use reqwest::{Method, Response};

/// Session lifecycle: `login → refresh* → logout`.
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError>;
    async fn refresh(&self) -> Result<(), AuthError>;
    fn logout(&self) -> Result<(), AppError>;
}

/// What the endpoint services need from a session.
#[async_trait::async_trait]
pub trait ApiSession: Send + Sync {
    /// Sends with the stored bearer token, refreshing and retrying once on 401.
    async fn authorized_request(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<Response, AppError>;

    /// Sends without credentials.
    async fn public_request(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<Response, AppError>;

    fn credential_store(&self) -> &CredentialStore;
}
