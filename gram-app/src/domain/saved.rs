use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Закладка: связь many-to-many между пользователем и постом.
/// Удаляется независимо от поста, на который ссылается.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedRecord {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    pub created_at: DateTime<Utc>,
}

impl SavedRecord {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        post_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        let user_id = user_id.into();
        let post_id = post_id.into();
        if id.trim().is_empty() || user_id.trim().is_empty() || post_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "saved_record",
                message: "ids must not be empty",
            });
        }
        Ok(Self {
            id,
            user_id,
            post_id,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::SavedRecord;

    #[test]
    fn new_rejects_empty_ids() {
        assert!(SavedRecord::new("", "u1", "p1", Utc::now()).is_err());
        assert!(SavedRecord::new("s1", "", "p1", Utc::now()).is_err());
        assert!(SavedRecord::new("s1", "u1", "", Utc::now()).is_err());
        assert!(SavedRecord::new("s1", "u1", "p1", Utc::now()).is_ok());
    }
}
