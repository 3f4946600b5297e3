//! Преобразование документов бэкенда в доменные записи.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::backend::documents::Document;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, normalize_tags};
use crate::domain::saved::SavedRecord;
use crate::domain::user::User;

#[derive(Debug, Deserialize)]
struct UserRecordDto {
    #[serde(rename = "accountId")]
    account_id: String,
    name: String,
    #[serde(default)]
    username: String,
    email: String,
    #[serde(rename = "imageUrl")]
    image_url: String,
    #[serde(rename = "imageId", default)]
    image_id: Option<String>,
    #[serde(default)]
    bio: String,
}

#[derive(Debug, Deserialize)]
struct PostRecordDto {
    creator: String,
    caption: String,
    #[serde(rename = "imageUrl")]
    image_url: String,
    #[serde(rename = "imageId")]
    image_id: String,
    #[serde(default)]
    location: String,
    #[serde(default, deserialize_with = "canonical_tags")]
    tags: Vec<String>,
    #[serde(default)]
    likes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SavedRecordDto {
    user: String,
    post: String,
}

/// Исторически поле тегов встречается и строкой, и массивом;
/// канонизируем в упорядоченный список на каждой границе.
fn canonical_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let tags = match &value {
        Value::String(raw) => normalize_tags(raw),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(normalize_tags)
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

fn malformed(what: &str, err: serde_json::Error) -> DomainError {
    DomainError::OperationFailed(format!("malformed {what} document: {err}"))
}

pub(crate) fn user_from_document(document: Document) -> Result<User, DomainError> {
    let Document {
        id,
        created_at,
        data,
        ..
    } = document;
    let dto: UserRecordDto =
        serde_json::from_value(Value::Object(data)).map_err(|err| malformed("user", err))?;

    User::new(
        id,
        dto.account_id,
        dto.name,
        dto.username,
        dto.email,
        dto.image_url,
        dto.image_id.filter(|file_id| !file_id.is_empty()),
        dto.bio,
        created_at,
    )
}

pub(crate) fn post_from_document(document: Document) -> Result<Post, DomainError> {
    let Document {
        id,
        created_at,
        updated_at,
        data,
    } = document;
    let dto: PostRecordDto =
        serde_json::from_value(Value::Object(data)).map_err(|err| malformed("post", err))?;

    Post::new(
        id,
        dto.creator,
        dto.caption,
        dto.image_id,
        dto.image_url,
        dto.location,
        dto.tags,
        dto.likes,
        created_at,
        updated_at,
    )
}

pub(crate) fn saved_from_document(document: Document) -> Result<SavedRecord, DomainError> {
    let Document {
        id,
        created_at,
        data,
        ..
    } = document;
    let dto: SavedRecordDto =
        serde_json::from_value(Value::Object(data)).map_err(|err| malformed("saved", err))?;

    SavedRecord::new(id, dto.user, dto.post, created_at)
}
