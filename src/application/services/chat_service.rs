use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    application::models::chat::{Ack, ChatReply, ChatRequest, Conversation, ConversationList},
    constants::{CHAT_PATH, CLEAR_MEMORY_PATH, CONVERSATIONS_PATH},
    error::AppError,
    session::interface::ApiSession,
    transport::http_client::{decode_response, RequestBody},
};

/// Chat endpoints.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Sends one prompt. 402/403/429 come back as `AppError::Api`.
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, AppError>;

    async fn conversations(&self) -> Result<Vec<Conversation>, AppError>;

    /// Drops the server-side conversation memory.
    async fn clear_memory(&self) -> Result<Ack, AppError>;
}

pub struct ChatServiceImpl<T: ApiSession> {
    session: Arc<T>,
}

impl<T: ApiSession> ChatServiceImpl<T> {
    pub fn new(session: Arc<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Arc<T> {
        self.session.clone()
    }
}

#[async_trait]
impl<T: ApiSession + 'static> ChatService for ChatServiceImpl<T> {
    async fn send_message(&self, request: &ChatRequest) -> Result<ChatReply, AppError> {
        info!("Sending chat message with model {}", request.model);

        let response = self
            .session
            .authorized_request(Method::POST, CHAT_PATH, &RequestBody::json(request)?)
            .await?;
        let reply: ChatReply = decode_response(response).await?;

        if !reply.success {
            warn!(
                "Provider rejected the chat: {}",
                reply.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(reply)
    }

    async fn conversations(&self) -> Result<Vec<Conversation>, AppError> {
        info!("Fetching conversations");

        let response = self
            .session
            .authorized_request(Method::GET, CONVERSATIONS_PATH, &RequestBody::Empty)
            .await?;
        let conversations = decode_response::<ConversationList>(response)
            .await?
            .into_vec();

        debug!("Fetched {} conversations", conversations.len());
        Ok(conversations)
    }

    async fn clear_memory(&self) -> Result<Ack, AppError> {
        let response = self
            .session
            .authorized_request(Method::POST, CLEAR_MEMORY_PATH, &RequestBody::Empty)
            .await?;
        let ack: Ack = decode_response::<Option<Ack>>(response)
            .await?
            .unwrap_or_default();

        info!(
            "Server memory cleared: {}",
            ack.message.as_deref().unwrap_or("ok")
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests_chat_service {
    use super::*;
    use crate::application::models::error_body::ApiErrorKind;
    use crate::application::models::provider::Provider;
    use crate::application::services::test_support::logged_in_session;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    fn create_service(server: &Server) -> ChatServiceImpl<crate::session::session::Session> {
        ChatServiceImpl::new(logged_in_session(&server.url()))
    }

    #[tokio::test]
    async fn test_send_message() {
        setup_logger();
        let mut server = Server::new_async().await;
        let request = ChatRequest::new("Explain ownership", "rust", "beginner", Provider::Groq);
        let mock = server
            .mock("POST", "/ai-chat/")
            .match_header("authorization", "Bearer access-1")
            .match_body(Matcher::Json(serde_json::to_value(&request).unwrap()))
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "response": "Each value has one owner.",
                    "costs": {"estimated_user_cost": 0, "provider": "groq"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let reply = create_service(&server).send_message(&request).await.unwrap();

        assert!(reply.success);
        assert_eq!(reply.text(), Some("Each value has one owner."));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limited() {
        setup_logger();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ai-chat/")
            .with_status(429)
            .with_body(r#"{"error": "Daily limit exceeded", "current_usage": 20, "daily_limit": 20}"#)
            .create_async()
            .await;

        let request = ChatRequest::new("hi", "general", "beginner", Provider::Groq);
        let err = create_service(&server)
            .send_message(&request)
            .await
            .unwrap_err();

        match err {
            AppError::Api { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body.kind(status), ApiErrorKind::RateLimited);
                assert_eq!(body.current_usage, Some(20));
                assert_eq!(body.daily_limit, Some(20));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_key_required() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ai-chat/")
            .with_status(402)
            .with_body(r#"{"error": "API key required", "suggestion": "Add a key in your profile"}"#)
            .create_async()
            .await;

        let request = ChatRequest::new("hi", "general", "beginner", Provider::OpenAi);
        let err = create_service(&server)
            .send_message(&request)
            .await
            .unwrap_err();

        match err {
            AppError::Api { status, body } => {
                assert_eq!(body.kind(status), ApiErrorKind::ApiKeyRequired);
                assert_eq!(body.suggestion.as_deref(), Some("Add a key in your profile"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_conversations() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/conversations/")
            .match_header("authorization", "Bearer access-1")
            .with_status(200)
            .with_body(r#"[{"id": 1, "prompt": "hi", "response": "hello"}]"#)
            .create_async()
            .await;

        let conversations = create_service(&server).conversations().await.unwrap();

        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].response.as_deref(), Some("hello"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_clear_memory() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/clear-memory/")
            .with_status(200)
            .with_body(r#"{"success": true, "message": "Memory cleared"}"#)
            .create_async()
            .await;

        let ack = create_service(&server).clear_memory().await.unwrap();

        assert_eq!(ack.message.as_deref(), Some("Memory cleared"));
        mock.assert_async().await;
    }
}
