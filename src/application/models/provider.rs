/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 13/5/25
******************************************************************************/
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// AI providers the backend can route a chat to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Groq,
    OpenAi,
    Anthropic,
    Gemini,
    Ollama,
}

/// Descriptive data about a provider, as shown next to the key settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub free_tokens: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub models: Vec<String>,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Groq,
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::Ollama,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Groq => "groq",
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::Ollama => "ollama",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Groq => "Groq",
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic Claude",
            Provider::Gemini => "Google Gemini",
            Provider::Ollama => "Ollama",
        }
    }

    /// Model requested when the caller does not pick one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq => "llama-3.1-8b-instant",
            Provider::OpenAi => "gpt-3.5-turbo",
            Provider::Anthropic => "claude-3-haiku",
            Provider::Gemini => "gemini-pro",
            Provider::Ollama => "llama2",
        }
    }

    pub fn info(&self) -> ProviderInfo {
        let (is_free, free_tokens, link, models): (bool, &str, &str, &[&str]) = match self {
            Provider::Groq => (
                true,
                "5,000,000 tokens/month (FREE)",
                "https://console.groq.com/keys",
                &[],
            ),
            Provider::OpenAi => (
                false,
                "No free tier - Pay-as-you-go",
                "https://platform.openai.com/api-keys",
                &["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo"],
            ),
            Provider::Anthropic => (
                false,
                "No free tier - Pay-as-you-go",
                "https://console.anthropic.com/",
                &["claude-3-opus", "claude-3-sonnet", "claude-3-haiku"],
            ),
            Provider::Gemini => (
                true,
                "60 requests/minute (FREE)",
                "https://makersuite.google.com/app/apikey",
                &[],
            ),
            Provider::Ollama => (
                true,
                "Local models - Unlimited",
                "https://ollama.com/",
                &[],
            ),
        };
        ProviderInfo {
            name: self.display_name().to_string(),
            is_free,
            free_tokens: free_tokens.to_string(),
            link: Some(link.to_string()),
            models: models.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| format!("unknown provider: {s}"))
    }
}
