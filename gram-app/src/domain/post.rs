use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub creator_id: String,
    pub caption: String,
    pub location: String,
    /// Сырая строка тегов; канонизируется в `Vec<String>` через
    /// [`normalize_tags`] перед записью.
    pub tags: String,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.creator_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "creator_id",
                message: "must not be empty",
            });
        }
        validate_caption(&self.caption)?;
        validate_location(&self.location)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub post_id: String,
    pub caption: String,
    pub location: String,
    pub tags: String,
    /// Текущее изображение поста; без нового файла переиспользуется как есть.
    pub image_id: String,
    pub image_url: String,
}

impl UpdatePostRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.post_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "post_id",
                message: "must not be empty",
            });
        }
        validate_caption(&self.caption)?;
        validate_location(&self.location)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub creator_id: String,
    pub caption: String,
    pub image_id: String,
    pub image_url: String,
    pub location: String,
    pub tags: Vec<String>,
    /// Идентификаторы пользователей, лайкнувших пост.
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        creator_id: impl Into<String>,
        caption: impl Into<String>,
        image_id: impl Into<String>,
        image_url: impl Into<String>,
        location: impl Into<String>,
        tags: Vec<String>,
        likes: Vec<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "id",
                message: "must not be empty",
            });
        }
        let creator_id = creator_id.into();
        if creator_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "creator_id",
                message: "must not be empty",
            });
        }

        let image_id = image_id.into();
        let image_url = image_url.into();
        // ссылка на файл и URL задаются только парой
        if image_id.is_empty() != image_url.is_empty() {
            return Err(DomainError::Validation {
                field: "image",
                message: "file id and url must be set together",
            });
        }

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            creator_id,
            caption: caption.into(),
            image_id,
            image_url,
            location: location.into(),
            tags,
            likes,
            created_at,
            updated_at,
        })
    }

    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

/// Канонизирует сырую строку тегов: убирает все пробелы, режет по запятым
/// и отбрасывает пустые фрагменты, сохраняя исходный порядок.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn validate_caption(caption: &str) -> Result<(), DomainError> {
    let len = caption.chars().count();
    if len < 5 || len > 2200 {
        return Err(DomainError::Validation {
            field: "caption",
            message: "must be 5..2200 chars",
        });
    }
    Ok(())
}

fn validate_location(location: &str) -> Result<(), DomainError> {
    let len = location.chars().count();
    if len < 1 || len > 1000 {
        return Err(DomainError::Validation {
            field: "location",
            message: "must be 1..1000 chars",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::{CreatePostRequest, DomainError, Post, UpdatePostRequest, normalize_tags};

    #[test]
    fn normalize_tags_strips_spaces_and_splits_on_commas() {
        assert_eq!(normalize_tags("a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn normalize_tags_drops_empty_fragments_and_keeps_order() {
        assert_eq!(normalize_tags("art,,travel, ,food"), vec!["art", "travel", "food"]);
        assert_eq!(normalize_tags(""), Vec::<String>::new());
        assert_eq!(normalize_tags(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn create_request_rejects_short_caption() {
        let req = sample_create("1234", "somewhere");
        let err = req.validate().expect_err("caption must be rejected");
        assert_validation_field(err, "caption");
    }

    #[test]
    fn create_request_accepts_caption_bounds() {
        assert!(sample_create(&"a".repeat(5), "somewhere").validate().is_ok());
        assert!(sample_create(&"a".repeat(2200), "somewhere").validate().is_ok());
        assert!(sample_create(&"a".repeat(2201), "somewhere").validate().is_err());
    }

    #[test]
    fn create_request_rejects_empty_and_oversized_location() {
        let err = sample_create("valid caption", "")
            .validate()
            .expect_err("location must be rejected");
        assert_validation_field(err, "location");

        let err = sample_create("valid caption", &"x".repeat(1001))
            .validate()
            .expect_err("location must be rejected");
        assert_validation_field(err, "location");
    }

    #[test]
    fn update_request_applies_same_rules() {
        let req = UpdatePostRequest {
            post_id: "p1".to_string(),
            caption: "1234".to_string(),
            location: "somewhere".to_string(),
            tags: String::new(),
            image_id: "img1".to_string(),
            image_url: "http://example.com/img1".to_string(),
        };

        let err = req.validate().expect_err("caption must be rejected");
        assert_validation_field(err, "caption");
    }

    #[test]
    fn post_new_rejects_partial_image_pair() {
        let now = Utc::now();
        let err = Post::new(
            "p1",
            "u1",
            "valid caption",
            "img1",
            "",
            "somewhere",
            vec![],
            vec![],
            now,
            now,
        )
        .expect_err("partial image pair must fail");
        assert_validation_field(err, "image");
    }

    #[test]
    fn post_new_rejects_updated_before_created() {
        let updated_at = Utc::now();
        let created_at = updated_at + Duration::seconds(1);

        let err = Post::new(
            "p1",
            "u1",
            "valid caption",
            "img1",
            "http://example.com/img1",
            "somewhere",
            vec![],
            vec![],
            created_at,
            updated_at,
        )
        .expect_err("updated_at < created_at must fail");
        assert_validation_field(err, "updated_at");
    }

    #[test]
    fn is_liked_by_checks_membership() {
        let now = Utc::now();
        let post = Post::new(
            "p1",
            "u1",
            "valid caption",
            "img1",
            "http://example.com/img1",
            "somewhere",
            vec![],
            vec!["u2".to_string()],
            now,
            now,
        )
        .expect("post must be valid");

        assert!(post.is_liked_by("u2"));
        assert!(!post.is_liked_by("u1"));
    }

    fn sample_create(caption: &str, location: &str) -> CreatePostRequest {
        CreatePostRequest {
            creator_id: "u1".to_string(),
            caption: caption.to_string(),
            location: location.to_string(),
            tags: String::new(),
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
