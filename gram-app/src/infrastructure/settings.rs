use anyhow::{Context, Result, anyhow};

use crate::application::Collections;

#[derive(Debug, Clone)]
pub struct Settings {
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub user_collection_id: String,
    pub post_collection_id: String,
    pub saves_collection_id: String,
    pub bucket_id: String,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let endpoint = get_required("GRAM_ENDPOINT").context("GRAM_ENDPOINT is required")?;
        let project_id = get_required("GRAM_PROJECT_ID").context("GRAM_PROJECT_ID is required")?;

        let database_id =
            std::env::var("GRAM_DATABASE_ID").unwrap_or_else(|_| "default".to_string());
        let user_collection_id =
            std::env::var("GRAM_USER_COLLECTION_ID").unwrap_or_else(|_| "users".to_string());
        let post_collection_id =
            std::env::var("GRAM_POST_COLLECTION_ID").unwrap_or_else(|_| "posts".to_string());
        let saves_collection_id =
            std::env::var("GRAM_SAVES_COLLECTION_ID").unwrap_or_else(|_| "saves".to_string());
        let bucket_id = std::env::var("GRAM_BUCKET_ID").unwrap_or_else(|_| "media".to_string());
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            endpoint,
            project_id,
            database_id,
            user_collection_id,
            post_collection_id,
            saves_collection_id,
            bucket_id,
            log_level,
        })
    }

    pub fn collections(&self) -> Collections {
        Collections {
            users: self.user_collection_id.clone(),
            posts: self.post_collection_id.clone(),
            saves: self.saves_collection_id.clone(),
        }
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}
