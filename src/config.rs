use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH, DEFAULT_REST_TIMEOUT,
};
use crate::storage::config::StorageConfig;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub rest_api: RestApiConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    pub timeout: u64,
    pub login_path: String,
    pub refresh_path: String,
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"username\":\"{}\",\"password\":\"[REDACTED]\"}}",
            self.username
        )
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"credentials\":{},\"rest_api\":{},\"storage\":{}}}",
            self.credentials, self.rest_api, self.storage
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{},\"login_path\":\"{}\",\"refresh_path\":\"{}\"}}",
            self.base_url, self.timeout, self.login_path, self.refresh_path
        )
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            credentials: Credentials {
                username: get_env_or_default("ASSISTANT_USERNAME", String::from("default_username")),
                password: get_env_or_default("ASSISTANT_PASSWORD", String::from("default_password")),
            },
            rest_api: RestApiConfig {
                base_url: get_env_or_default(
                    "ASSISTANT_REST_BASE_URL",
                    String::from(DEFAULT_BASE_URL),
                ),
                timeout: get_env_or_default("ASSISTANT_REST_TIMEOUT", DEFAULT_REST_TIMEOUT),
                login_path: get_env_or_default(
                    "ASSISTANT_LOGIN_PATH",
                    String::from(DEFAULT_LOGIN_PATH),
                ),
                refresh_path: get_env_or_default(
                    "ASSISTANT_REFRESH_PATH",
                    String::from(DEFAULT_REFRESH_PATH),
                ),
            },
            storage: StorageConfig {
                path: env::var("ASSISTANT_STORAGE_PATH")
                    .ok()
                    .filter(|p| !p.trim().is_empty()),
            },
        }
    }
}
