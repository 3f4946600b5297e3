use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::domain::error::DomainError;

/// Документ коллекции: серверные метаданные плюс произвольные поля.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

/// Предикатный язык запросов к коллекции.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(&'static str, String),
    Search(&'static str, String),
    OrderAsc(&'static str),
    OrderDesc(&'static str),
    Limit(u32),
    CursorAfter(String),
}

impl Query {
    /// Сериализует предикат в JSON-параметр `queries[]`.
    pub fn to_param(&self) -> String {
        let value = match self {
            Self::Equal(attribute, value) => {
                json!({ "method": "equal", "attribute": attribute, "values": [value] })
            }
            Self::Search(attribute, term) => {
                json!({ "method": "search", "attribute": attribute, "values": [term] })
            }
            Self::OrderAsc(attribute) => {
                json!({ "method": "orderAsc", "attribute": attribute })
            }
            Self::OrderDesc(attribute) => {
                json!({ "method": "orderDesc", "attribute": attribute })
            }
            Self::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
            Self::CursorAfter(id) => json!({ "method": "cursorAfter", "values": [id] }),
        };
        value.to_string()
    }
}

#[async_trait]
pub trait Documents: Send + Sync {
    /// `data` обязан быть JSON-объектом.
    async fn create(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, DomainError>;

    async fn get(&self, collection_id: &str, document_id: &str)
    -> Result<Option<Document>, DomainError>;

    async fn list(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, DomainError>;

    async fn update(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, DomainError>;

    /// `Ok(false)`, если документа уже нет.
    async fn delete(&self, collection_id: &str, document_id: &str) -> Result<bool, DomainError>;
}
