pub mod account;
pub mod billing;
pub mod chat;
pub mod document;
pub mod error_body;
pub mod provider;
