pub mod account_service;
pub mod billing_service;
pub mod chat_service;
pub mod document_service;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::{Config, Credentials, RestApiConfig};
    use crate::session::profile::UserProfile;
    use crate::session::session::Session;
    use crate::storage::config::StorageConfig;
    use crate::storage::credentials::CredentialPair;
    use std::sync::Arc;

    pub(crate) fn test_config(base_url: &str) -> Config {
        Config {
            credentials: Credentials {
                username: "ada".to_string(),
                password: "pw".to_string(),
            },
            rest_api: RestApiConfig {
                base_url: base_url.to_string(),
                timeout: 5,
                login_path: "/login/".to_string(),
                refresh_path: "/token/refresh/".to_string(),
            },
            storage: StorageConfig { path: None },
        }
    }

    /// In-memory session already holding `access-1` / `refresh-1`.
    pub(crate) fn logged_in_session(base_url: &str) -> Arc<Session> {
        let session = Session::from_config(test_config(base_url)).unwrap();
        session
            .store()
            .store_login(
                &CredentialPair::new("access-1", "refresh-1"),
                &UserProfile::new("ada"),
            )
            .unwrap();
        Arc::new(session)
    }
}
