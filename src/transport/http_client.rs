use crate::application::models::error_body::ApiErrorBody;
use crate::constants::{ALLOWED_UPLOAD_EXTENSIONS, ALLOWED_UPLOAD_MIME_TYPES, MAX_UPLOAD_BYTES};
use crate::error::{AppError, UploadRejection};
use crate::transport::headers::AuthHeaders;
use anyhow::Context;
use reqwest::{header, multipart, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::io;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// A file sent as one multipart field.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl FileUpload {
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes,
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: &str) -> Self {
        self.mime = Some(mime.to_string());
        self
    }

    /// Checks size and type before anything is sent. The type passes when
    /// either the MIME type or the file extension is on the allow-list.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::InvalidUpload(UploadRejection::TooLarge {
                size: self.bytes.len(),
                limit: MAX_UPLOAD_BYTES,
            }));
        }

        let mime_allowed = self.mime.as_deref().is_some_and(|mime| {
            let essence = mime.split(';').next().unwrap_or_default().trim();
            ALLOWED_UPLOAD_MIME_TYPES
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(essence))
        });
        let extension_allowed = self
            .file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| {
                ALLOWED_UPLOAD_EXTENSIONS
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            });

        if mime_allowed || extension_allowed {
            Ok(())
        } else {
            Err(AppError::InvalidUpload(UploadRejection::UnsupportedType {
                file_name: self.file_name.clone(),
                mime: self.mime.clone(),
            }))
        }
    }

    fn to_form(&self) -> Result<multipart::Form, AppError> {
        let mut part = multipart::Part::bytes(self.bytes.clone()).file_name(self.file_name.clone());
        if let Some(mime) = self.mime.as_deref().filter(|m| !m.trim().is_empty()) {
            part = part.mime_str(mime).map_err(|e| {
                AppError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid mime type {mime}: {e}"),
                ))
            })?;
        }
        Ok(multipart::Form::new().part(self.field.clone(), part))
    }
}

/// Request payload. Kept owned and cloneable so a request can be rebuilt
/// for the retry after a token refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    File(FileUpload),
}

impl RequestBody {
    pub fn json<B: Serialize>(body: &B) -> Result<Self, AppError> {
        Ok(RequestBody::Json(serde_json::to_value(body)?))
    }
}

/// Represents the HTTP client for interacting with the assistant API.
#[derive(Debug, Clone)]
pub struct ApiHttpClient {
    client: Client,
    base_url: String,
}

impl ApiHttpClient {
    /// Creates a new instance of the ApiHttpClient.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL for the API, e.g. `https://host/api`.
    /// * `timeout` - Per-request timeout in seconds.
    ///
    /// # Returns
    ///
    /// A Result containing the ApiHttpClient instance or an error.
    pub fn new(base_url: &str, timeout: u64) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Sends a request and hands back the raw response, whatever its status.
    ///
    /// Only a failure to get any response at all is an error
    /// (`AppError::Network`).
    #[instrument(skip(self, body, bearer))]
    pub async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: &RequestBody,
        bearer: Option<&str>,
    ) -> Result<Response, AppError> {
        let url = self.url(endpoint);
        let headers = AuthHeaders::new(bearer).to_header_map()?;
        debug!("Sending {} request to {}", method, url);

        let mut request = self.client.request(method.clone(), &url).headers(headers);
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::File(upload) => request.multipart(upload.to_form()?),
        };

        match request.send().await {
            Ok(response) => {
                debug!("Response Status: {}", response.status());
                Ok(response)
            }
            Err(e) => {
                error!("Failed to send {} request: {:?}", method, e);
                Err(AppError::Network(e))
            }
        }
    }

    /// GET against a public endpoint, decoding the body.
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned + Debug>(&self, endpoint: &str) -> Result<T, AppError> {
        let response = self
            .send(Method::GET, endpoint, &RequestBody::Empty, None)
            .await?;
        decode_response(response).await
    }

    /// POST against a public endpoint, decoding the body.
    #[instrument(skip(self, body))]
    pub async fn post_json<T: DeserializeOwned + Debug, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let response = self
            .send(Method::POST, endpoint, &RequestBody::json(body)?, None)
            .await?;
        decode_response(response).await
    }
}

impl fmt::Display for ApiHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{\"base_url\":\"{}\"}}", self.base_url)
    }
}

/// Decodes a 2xx body into `T`; anything else becomes `AppError::Api` with
/// the body kept as sent. An empty 2xx body decodes as JSON `null`.
pub async fn decode_response<T: DeserializeOwned + Debug>(response: Response) -> Result<T, AppError> {
    let status = response.status();
    let body_text = response.text().await?;

    debug!("Response Status: {}", status);

    if status.is_success() {
        let text = if body_text.trim().is_empty() {
            "null"
        } else {
            body_text.as_str()
        };
        let body: T = serde_json::from_str(text)?;
        Ok(body)
    } else {
        error!("API request failed. Status: {}, Body: {}", status, body_text);
        Err(AppError::Api {
            status,
            body: ApiErrorBody::from_text(&body_text),
        })
    }
}
