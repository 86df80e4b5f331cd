/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 7/9/24
******************************************************************************/

pub(crate) const AUTHORIZATION_HEADER_KEY: &str = "Authorization";
pub(crate) const BEARER_PREFIX: &str = "Bearer ";

/// Storage slot holding the access token.
pub const ACCESS_TOKEN_SLOT: &str = "access_token";
/// Storage slot holding the refresh token.
pub const REFRESH_TOKEN_SLOT: &str = "refresh_token";
/// Storage slot holding the serialized user profile snapshot.
pub const USER_PROFILE_SLOT: &str = "user";

pub(crate) const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub(crate) const DEFAULT_LOGIN_PATH: &str = "/login/";
pub(crate) const DEFAULT_REFRESH_PATH: &str = "/token/refresh/";
pub(crate) const DEFAULT_REST_TIMEOUT: u64 = 30;

pub(crate) const REGISTER_PATH: &str = "/register/";
pub(crate) const PROFILE_PATH: &str = "/profile/";
pub(crate) const SET_API_KEY_PATH: &str = "/set-api-key/";
pub(crate) const TEST_OPENAI_KEY_PATH: &str = "/test-openai-key/";
pub(crate) const GROQ_SETUP_PATH: &str = "/request-groq-setup/";
pub(crate) const CHAT_PATH: &str = "/ai-chat/";
pub(crate) const CONVERSATIONS_PATH: &str = "/conversations/";
pub(crate) const CLEAR_MEMORY_PATH: &str = "/clear-memory/";
pub(crate) const DOCUMENTS_PATH: &str = "/documents/";
pub(crate) const UPLOAD_DOCUMENT_PATH: &str = "/upload-document/";
pub(crate) const ANALYZE_DOCUMENT_PATH: &str = "/analyze-document/";
pub(crate) const PLANS_PATH: &str = "/plans/";
pub(crate) const CHECKOUT_PATH: &str = "/create-checkout/";
pub(crate) const CANCEL_SUBSCRIPTION_PATH: &str = "/cancel-subscription/";

pub(crate) const DEFAULT_ANALYSIS_QUESTION: &str = "Summarize this document";
pub(crate) const DEFAULT_REGISTER_LEVEL: &str = "beginner";

/// Largest document accepted for upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;
pub const ALLOWED_UPLOAD_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/msword",
    "image/jpeg",
    "image/png",
    "image/jpg",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "text/csv",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];
/// Checked when the MIME type is missing or not listed.
pub const ALLOWED_UPLOAD_EXTENSIONS: &[&str] = &[
    "pdf", "docx", "txt", "doc", "jpg", "jpeg", "png", "xlsx", "xls", "csv", "ppt", "pptx",
];
