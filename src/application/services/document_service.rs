use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    application::models::{
        chat::Ack,
        document::{AnalyzeRequest, Document, DocumentAnalysis, DocumentList, UploadResponse},
    },
    constants::{ANALYZE_DOCUMENT_PATH, DEFAULT_ANALYSIS_QUESTION, DOCUMENTS_PATH, UPLOAD_DOCUMENT_PATH},
    error::AppError,
    session::interface::ApiSession,
    transport::http_client::{decode_response, FileUpload, RequestBody},
};

/// Document upload and analysis endpoints.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Uploads a file as the multipart field `file`. Files that fail
    /// [`FileUpload::validate`] are refused without a request.
    async fn upload(&self, file: FileUpload) -> Result<Document, AppError>;

    async fn list(&self) -> Result<Vec<Document>, AppError>;

    async fn delete(&self, id: u64) -> Result<(), AppError>;

    /// Asks a question about a document. A blank question asks for a
    /// summary.
    async fn analyze(&self, id: u64, question: &str) -> Result<DocumentAnalysis, AppError>;
}

pub struct DocumentServiceImpl<T: ApiSession> {
    session: Arc<T>,
}

impl<T: ApiSession> DocumentServiceImpl<T> {
    pub fn new(session: Arc<T>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> Arc<T> {
        self.session.clone()
    }
}

#[async_trait]
impl<T: ApiSession + 'static> DocumentService for DocumentServiceImpl<T> {
    async fn upload(&self, file: FileUpload) -> Result<Document, AppError> {
        file.validate().inspect_err(|e| warn!("{}", e))?;
        info!("Uploading document {} ({} bytes)", file.file_name, file.bytes.len());

        let response = self
            .session
            .authorized_request(Method::POST, UPLOAD_DOCUMENT_PATH, &RequestBody::File(file))
            .await?;
        let uploaded: UploadResponse = decode_response(response).await?;

        debug!("Document stored with id {}", uploaded.document.id);
        Ok(uploaded.document)
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        let response = self
            .session
            .authorized_request(Method::GET, DOCUMENTS_PATH, &RequestBody::Empty)
            .await?;
        let list: DocumentList = decode_response(response).await?;

        debug!("Listed {} documents", list.documents.len());
        Ok(list.documents)
    }

    async fn delete(&self, id: u64) -> Result<(), AppError> {
        let path = format!("{DOCUMENTS_PATH}{id}/delete/");
        info!("Deleting document {}", id);

        let response = self
            .session
            .authorized_request(Method::DELETE, &path, &RequestBody::Empty)
            .await?;
        decode_response::<Option<Ack>>(response).await?;
        Ok(())
    }

    async fn analyze(&self, id: u64, question: &str) -> Result<DocumentAnalysis, AppError> {
        let question = match question.trim() {
            "" => DEFAULT_ANALYSIS_QUESTION,
            q => q,
        };
        info!("Analyzing document {}", id);

        let body = RequestBody::json(&AnalyzeRequest {
            document_id: id,
            question,
        })?;
        let response = self
            .session
            .authorized_request(Method::POST, ANALYZE_DOCUMENT_PATH, &body)
            .await?;
        decode_response(response).await
    }
}
