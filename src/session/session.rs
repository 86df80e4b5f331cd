/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 7/9/24
******************************************************************************/
use crate::application::models::error_body::ApiErrorBody;
use crate::config::Config;
use crate::constants::REGISTER_PATH;
use crate::error::{AppError, AuthError};
use crate::session::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse,
};
use crate::session::interface::{ApiSession, Authenticator};
use crate::session::profile::UserProfile;
use crate::storage::credentials::{CredentialPair, CredentialStore};
use crate::storage::slots::FileStore;
use crate::transport::http_client::{ApiHttpClient, RequestBody};
use anyhow::Context;
use reqwest::{Method, Response, StatusCode};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Authenticated access to the assistant backend.
///
/// Owns the HTTP client and the credential store. Every protected call goes
/// through [`Session::authorized_request`], which attaches the bearer token
/// and, on a 401, refreshes the token once and retries the call once.
pub struct Session {
    client: ApiHttpClient,
    config: Config,
    store: Arc<CredentialStore>,
    refresh_lock: Mutex<()>,
}

impl Session {
    pub fn new(config: Config, store: Arc<CredentialStore>) -> anyhow::Result<Self> {
        let client = ApiHttpClient::new(&config.rest_api.base_url, config.rest_api.timeout)?;
        Ok(Self {
            client,
            config,
            store,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Builds a session whose slots live in the configured file, or in
    /// memory when no storage path is set.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store = match config.storage.path.as_deref() {
            Some(path) => {
                let slots = FileStore::open(path)
                    .with_context(|| format!("Failed to open session storage at {path}"))?;
                CredentialStore::new(Box::new(slots))
            }
            None => CredentialStore::in_memory(),
        };
        Self::new(config, Arc::new(store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiHttpClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// True while a full credential pair is stored. Validity is only
    /// discovered by a failed request.
    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.credentials(), Ok(Some(_)))
    }

    pub fn credentials(&self) -> Result<Option<CredentialPair>, AppError> {
        self.store.credentials()
    }

    pub fn current_profile(&self) -> Result<Option<UserProfile>, AppError> {
        self.store.profile()
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        debug!("Authenticating user: {}", username);
        let body = RequestBody::json(&LoginRequest { username, password })?;
        let response = self
            .client
            .send(Method::POST, &self.config.rest_api.login_path, &body, None)
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            warn!("Login rejected for {}: {}", username, status);
            return Err(AuthError::BadCredentials(ApiErrorBody::from_text(&text)));
        }
        if !status.is_success() {
            warn!("Login failed for {} with unexpected status {}", username, status);
            return Err(AuthError::Rejected {
                status,
                body: ApiErrorBody::from_text(&text),
            });
        }

        let login: LoginResponse = serde_json::from_str(&text)?;
        let (pair, profile) = login.into_session(username).inspect_err(|_| {
            warn!("Login for {} succeeded but no token pair was issued", username);
        })?;

        self.store.store_login(&pair, &profile)?;
        info!("Authentication successful for {}", profile.username);
        Ok(profile)
    }

    /// Creates an account. Does not log in.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AppError> {
        let response: RegisterResponse = self.client.post_json(REGISTER_PATH, request).await?;
        info!("Registered user {}", request.username);
        Ok(response)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// Fails fast with `NoRefreshToken` when nothing is stored. Stored state
    /// is only written on success.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let Some(refresh_token) = self.store.refresh_token()? else {
            debug!("No refresh token stored");
            return Err(AuthError::NoRefreshToken);
        };

        let body = RequestBody::json(&RefreshRequest {
            refresh: &refresh_token,
        })?;
        let response = self
            .client
            .send(Method::POST, &self.config.rest_api.refresh_path, &body, None)
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Token refresh rejected with status {}", status);
            return Err(AuthError::RefreshRejected(status));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&response.text().await?)?;
        let Some(access) = refreshed.access() else {
            warn!("Token refresh answered {} without an access token", status);
            return Err(AuthError::MissingTokens);
        };

        let stored = match refreshed.rotated_refresh() {
            Some(rotated) => self.store.replace_pair(&CredentialPair::new(access, rotated))?,
            None => self.store.replace_access_token(access)?,
        };
        if !stored {
            warn!("Session was cleared while the refresh was in flight");
            return Err(AuthError::NoRefreshToken);
        }

        debug!("Access token refreshed");
        Ok(())
    }

    /// Refreshes unless another task already replaced `rejected` while we
    /// waited for the lock.
    async fn refresh_after(&self, rejected: Option<&str>) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;
        if let Some(current) = self.store.access_token()? {
            if Some(current.as_str()) != rejected {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(());
            }
        }
        self.refresh().await
    }

    /// Sends `method path` with the stored bearer token attached.
    ///
    /// A 401 triggers one refresh and one retry; the retry's response is
    /// returned whatever its status. When the refresh fails the credentials
    /// are cleared and `AppError::SessionExpired` is returned. Without a
    /// stored token the request goes out anonymously.
    #[instrument(skip(self, body))]
    pub async fn authorized_request(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<Response, AppError> {
        let token = self.store.access_token()?;
        let response = self
            .client
            .send(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        warn!("Got 401 from {}, attempting token refresh", path);
        match self.refresh_after(token.as_deref()).await {
            Ok(()) => {
                let fresh = self.store.access_token()?;
                info!("Retrying {} with refreshed token", path);
                self.client.send(method, path, body, fresh.as_deref()).await
            }
            Err(e) => {
                warn!("Token refresh failed: {}. Clearing session", e);
                self.store.clear()?;
                Err(AppError::SessionExpired)
            }
        }
    }

    /// Clears tokens and profile. Idempotent, no network call.
    pub fn logout(&self) -> Result<(), AppError> {
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Authenticator for Session {
    async fn login(&self, username: &str, password: &str) -> Result<UserProfile, AuthError> {
        Session::login(self, username, password).await
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        Session::refresh(self).await
    }

    fn logout(&self) -> Result<(), AppError> {
        Session::logout(self)
    }
}

#[async_trait::async_trait]
impl ApiSession for Session {
    async fn authorized_request(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<Response, AppError> {
        Session::authorized_request(self, method, path, body).await
    }

    async fn public_request(
        &self,
        method: Method,
        path: &str,
        body: &RequestBody,
    ) -> Result<Response, AppError> {
        self.client.send(method, path, body, None).await
    }

    fn credential_store(&self) -> &CredentialStore {
        &self.store
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"client\":{},\"config\":{},\"authenticated\":{}}}",
            self.client,
            self.config,
            self.is_authenticated()
        )
    }
}
