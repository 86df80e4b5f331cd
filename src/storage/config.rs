use serde::Deserialize;
use std::fmt;

/// Where the session slots are persisted. `None` keeps them in memory only.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    pub path: Option<String>,
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{{\"path\":\"{}\"}}", path),
            None => write!(f, "{{\"path\":null}}"),
        }
    }
}
