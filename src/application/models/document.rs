/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 13/5/25
******************************************************************************/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::deserialize::lenient_timestamp;

/// An uploaded document as listed by `/documents/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Document {
    pub id: u64,
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preview: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<Document>,
}

impl DocumentList {
    pub fn total_size(&self) -> u64 {
        self.documents.iter().map(|d| d.file_size).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub document: Document,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct AnalyzeRequest<'a> {
    pub(crate) document_id: u64,
    pub(crate) question: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<u64>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub using_system_key: bool,
}

/// Answer of `/analyze-document/`. `formatted_analysis` is passed through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentAnalysis {
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub summary: Option<AnalysisSummary>,
    #[serde(default)]
    pub formatted_analysis: Option<Value>,
}

impl DocumentAnalysis {
    /// True when the backend formatted the answer as a reply to a question
    /// rather than a summary.
    pub fn is_question_answer(&self) -> bool {
        self.formatted_analysis
            .as_ref()
            .and_then(|f| f.get("type"))
            .and_then(Value::as_str)
            == Some("question_answer")
    }
}
