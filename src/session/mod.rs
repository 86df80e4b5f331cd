pub mod auth;
pub mod interface;
pub mod profile;
pub mod session;
