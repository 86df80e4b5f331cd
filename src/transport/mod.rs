pub(crate) mod headers;

pub mod http_client;
