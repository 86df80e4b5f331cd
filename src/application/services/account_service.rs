use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    application::models::{
        account::{GroqSetupResponse, KeyTestResult, SetApiKeyRequest, SetApiKeyResponse},
        provider::Provider,
    },
    constants::{GROQ_SETUP_PATH, PROFILE_PATH, SET_API_KEY_PATH, TEST_OPENAI_KEY_PATH},
    error::AppError,
    session::{interface::ApiSession, profile::UserProfile},
    transport::http_client::{decode_response, RequestBody},
};

/// Profile and provider key endpoints.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Fetches the profile and refreshes the stored snapshot.
    async fn profile(&self) -> Result<UserProfile, AppError>;

    async fn set_api_key(
        &self,
        provider: Provider,
        api_key: &str,
        skip_test: bool,
    ) -> Result<SetApiKeyResponse, AppError>;

    async fn test_openai_key(&self, api_key: &str) -> Result<KeyTestResult, AppError>;

    async fn request_groq_setup(&self) -> Result<GroqSetupResponse, AppError>;
}

pub struct AccountServiceImpl<T: ApiSession> {
    session: Arc<T>,
}

impl<T: ApiSession> AccountServiceImpl<T> {
    pub fn new(session: Arc<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Arc<T> {
        self.session.clone()
    }
}

#[async_trait]
impl<T: ApiSession + 'static> AccountService for AccountServiceImpl<T> {
    async fn profile(&self) -> Result<UserProfile, AppError> {
        info!("Fetching profile");

        let response = self
            .session
            .authorized_request(Method::GET, PROFILE_PATH, &RequestBody::Empty)
            .await?;
        let profile: UserProfile = decode_response(response).await?;

        if !self.session.credential_store().update_profile(&profile)? {
            debug!("No session stored, profile snapshot not updated");
        }
        Ok(profile)
    }

    async fn set_api_key(
        &self,
        provider: Provider,
        api_key: &str,
        skip_test: bool,
    ) -> Result<SetApiKeyResponse, AppError> {
        info!("Saving {} API key", provider.display_name());

        let body = RequestBody::json(&SetApiKeyRequest {
            provider,
            api_key: api_key.to_string(),
            skip_test,
        })?;
        let response = self
            .session
            .authorized_request(Method::POST, SET_API_KEY_PATH, &body)
            .await?;
        let saved: SetApiKeyResponse = decode_response(response).await?;

        if !saved.success {
            warn!(
                "Backend refused the key: {}",
                saved.error.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(saved)
    }

    async fn test_openai_key(&self, api_key: &str) -> Result<KeyTestResult, AppError> {
        let response = self
            .session
            .authorized_request(
                Method::POST,
                TEST_OPENAI_KEY_PATH,
                &RequestBody::Json(json!({ "api_key": api_key })),
            )
            .await?;
        let result: KeyTestResult = decode_response(response).await?;

        debug!("Key test: {:?}", result.key_type);
        Ok(result)
    }

    async fn request_groq_setup(&self) -> Result<GroqSetupResponse, AppError> {
        let response = self
            .session
            .authorized_request(Method::POST, GROQ_SETUP_PATH, &RequestBody::Empty)
            .await?;
        decode_response(response).await
    }
}

#[cfg(test)]
mod tests_account_service {
    use super::*;
    use crate::application::services::test_support::logged_in_session;
    use crate::session::session::Session;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    fn create_service(session: Arc<Session>) -> AccountServiceImpl<Session> {
        AccountServiceImpl::new(session)
    }

    #[tokio::test]
    async fn test_profile_updates_snapshot() {
        setup_logger();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/profile/")
            .match_header("authorization", "Bearer access-1")
            .with_status(200)
            .with_body(
                json!({
                    "username": "ada",
                    "subscription_tier": "premium",
                    "preferred_provider": "openai",
                    "usage": {"requests_today": 4, "daily_limit": "∞", "has_api_key": true}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let session = logged_in_session(&server.url());
        let profile = create_service(session.clone())
            .profile()
            .await
            .unwrap();

        assert_eq!(profile.provider(), Provider::OpenAi);
        assert!(profile.has_api_key());
        assert_eq!(profile.usage.daily_limit, None);
        assert_eq!(session.current_profile().unwrap(), Some(profile));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/set-api-key/")
            .match_body(Matcher::Json(
                json!({"provider": "openai", "api_key": "sk-1", "skip_test": false}),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "provider": "openai",
                    "key_type": "pay_as_you_go",
                    "credit_balance": 12.5,
                    "test_result": {"success": true}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let service = create_service(logged_in_session(&server.url()));
        let saved = service
            .set_api_key(Provider::OpenAi, "sk-1", false)
            .await
            .unwrap();

        assert!(saved.success);
        assert_eq!(saved.credit_balance, Some(12.5));
        assert!(saved.test_result.unwrap().success);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_api_key_refused() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/set-api-key/")
            .with_status(400)
            .with_body(r#"{"success": false, "error": "insufficient_quota"}"#)
            .create_async()
            .await;

        let service = create_service(logged_in_session(&server.url()));
        let err = service
            .set_api_key(Provider::OpenAi, "sk-1", false)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "api error 400 Bad Request: insufficient_quota");
    }

    #[tokio::test]
    async fn test_openai_key_check() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/test-openai-key/")
            .match_body(Matcher::Json(json!({"api_key": "sk-2"})))
            .with_status(200)
            .with_body(r#"{"success": true, "key_type": "free_tier", "credit_balance": 0, "is_free_tier": true}"#)
            .create_async()
            .await;

        let service = create_service(logged_in_session(&server.url()));
        let result = service.test_openai_key("sk-2").await.unwrap();

        assert!(result.is_free_tier);
        assert!(result.low_balance());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_groq_setup() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/request-groq-setup/")
            .with_status(200)
            .with_body(r#"{"success": true, "instructions": "Visit console.groq.com\nCreate a key"}"#)
            .create_async()
            .await;

        let service = create_service(logged_in_session(&server.url()));
        let setup = service.request_groq_setup().await.unwrap();

        assert_eq!(setup.instruction_lines().len(), 2);
        mock.assert_async().await;
    }
}
