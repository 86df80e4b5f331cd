pub(crate) mod deserialize;
pub mod logger;
