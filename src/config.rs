use std::env;

use crate::Result;

#[derive(Clone)]
pub struct AppConfig {
    pub db_url: String,
    pub db_ns: String,
    pub db_name: String,
    pub db_user: Option<String>,
    pub db_password: Option<String>,
    pub storage_dir: String,
    pub bind_host: String,
    pub port: u16,
    pub youtube_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_url: env::var("DB_URL")?,
            db_ns: env::var("DB_NS")?,
            db_name: env::var("DB_NAME")?,
            db_user: env::var("DB_USER").ok(),
            db_password: env::var("DB_PASSWORD").ok(),
            storage_dir: env::var("STORAGE_DIR").unwrap_or_else(|_| "uploads".to_string()),
            bind_host: env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .unwrap_or(8080),
            youtube_api_key: env::var("YOUTUBE_API_KEY").ok(),
        })
    }
}
