/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 13/5/25
******************************************************************************/
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::provider::Provider;

/// Body of `/set-api-key/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetApiKeyRequest {
    pub provider: Provider,
    pub api_key: String,
    pub skip_test: bool,
}

/// Result of validating a provider key. Returned by `/test-openai-key/`
/// and embedded in `/set-api-key/` answers.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyTestResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub credit_balance: Option<f64>,
    #[serde(default)]
    pub is_free_tier: bool,
    #[serde(default)]
    pub error: Option<Value>,
}

impl KeyTestResult {
    pub fn is_pay_as_you_go(&self) -> bool {
        self.key_type.as_deref() == Some("pay_as_you_go")
    }

    /// Paid key with less than one dollar left, or a free key that is spent.
    pub fn low_balance(&self) -> bool {
        let balance = self.credit_balance.unwrap_or_default();
        match self.key_type.as_deref() {
            Some("pay_as_you_go") => balance <= 1.0,
            Some("free_tier") => balance <= 0.01,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SetApiKeyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default)]
    pub key_type: Option<String>,
    #[serde(default)]
    pub credit_balance: Option<f64>,
    #[serde(default)]
    pub test_result: Option<KeyTestResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroqSetupResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GroqSetupResponse {
    pub fn instruction_lines(&self) -> Vec<&str> {
        self.instructions
            .as_deref()
            .map(|text| text.lines().filter(|l| !l.trim().is_empty()).collect())
            .unwrap_or_default()
    }
}
