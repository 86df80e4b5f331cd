/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 13/5/25
******************************************************************************/
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::Provider;
use crate::session::profile::UsageSummary;

/// One chat turn sent to `/ai-chat/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub prompt: String,
    pub subject: String,
    pub difficulty: String,
    pub model: String,
}

impl ChatRequest {
    /// Builds a request using the default model of `provider`.
    pub fn new(prompt: &str, subject: &str, difficulty: &str, provider: Provider) -> Self {
        Self {
            prompt: prompt.to_string(),
            subject: subject.to_string(),
            difficulty: difficulty.to_string(),
            model: provider.default_model().to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

/// Cost breakdown attached to a reply.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChatCosts {
    #[serde(default)]
    pub estimated_user_cost: f64,
    #[serde(default)]
    pub your_service_fee: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub token_info: Option<Value>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub using_system_key: bool,
    #[serde(default)]
    pub key_source: Option<String>,
}

impl ChatCosts {
    /// Free when flagged so or when the estimated cost is zero.
    pub fn is_free(&self) -> bool {
        self.is_free || self.estimated_user_cost == 0.0
    }
}

/// Answer of `/ai-chat/`.
///
/// A 2xx answer can still carry `success: false` with an `error` and a
/// `suggestion` when the provider rejected the call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
    #[serde(default)]
    pub costs: Option<ChatCosts>,
    #[serde(default)]
    pub usage: Option<UsageSummary>,
    #[serde(default)]
    pub using_system_fallback: bool,
}

impl ChatReply {
    /// The assistant text, from `response` or else `answer`.
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().or(self.answer.as_deref())
    }

    pub fn using_system_key(&self) -> bool {
        self.using_system_fallback
            || self.costs.as_ref().is_some_and(|c| c.using_system_key)
    }
}

/// A stored exchange from `/conversations/`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// The backend answers either a bare list or `{"conversations": [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ConversationList {
    Wrapped { conversations: Vec<Conversation> },
    Bare(Vec<Conversation>),
}

impl ConversationList {
    pub fn into_vec(self) -> Vec<Conversation> {
        match self {
            ConversationList::Wrapped { conversations } => conversations,
            ConversationList::Bare(conversations) => conversations,
        }
    }
}

/// Generic `{success, message}` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}
