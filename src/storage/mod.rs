pub mod config;

pub mod credentials;

pub mod slots;

pub(crate) mod utils;
