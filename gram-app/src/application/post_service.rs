use serde_json::json;
use tracing::info;

use crate::application::Collections;
use crate::application::media::ImageSaga;
use crate::application::records::{post_from_document, saved_from_document};
use crate::backend::documents::{Documents, Query};
use crate::backend::storage::{FileUpload, Storage};
use crate::backend::unique_id;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest, normalize_tags};
use crate::domain::saved::SavedRecord;

const RECENT_POSTS_LIMIT: u32 = 20;
const EXPLORE_PAGE_SIZE: u32 = 9;

pub struct PostService<B> {
    backend: B,
    collections: Collections,
}

impl<B: Documents + Storage> PostService<B> {
    pub fn new(backend: B, collections: Collections) -> Self {
        Self {
            backend,
            collections,
        }
    }

    /// Создаёт пост: загрузка файла → URL → запись документа.
    ///
    /// При сбое записи документа уже загруженный файл удаляется —
    /// осиротевших объектов в хранилище не остаётся.
    pub async fn create_post(
        &self,
        req: CreatePostRequest,
        file: Option<FileUpload>,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let file = file.ok_or(DomainError::Validation {
            field: "file",
            message: "must contain at least one attachment",
        })?;

        let mut saga = ImageSaga::new(&self.backend);
        let image = saga.stage(file).await?;

        let tags = normalize_tags(&req.tags);
        let data = json!({
            "creator": req.creator_id,
            "caption": req.caption,
            "imageUrl": image.url,
            "imageId": image.file_id,
            "location": req.location,
            "tags": tags,
            "likes": [],
        });

        let document = match self
            .backend
            .create(&self.collections.posts, &unique_id(), data)
            .await
        {
            Ok(document) => document,
            Err(err) => {
                saga.abort(&image).await;
                return Err(err);
            }
        };
        saga.commit(None).await;

        let post = post_from_document(document)?;
        info!(post_id = %post.id, "post created");
        Ok(post)
    }

    /// Обновляет пост. Новый файл (если есть) загружается до записи;
    /// прежний файл удаляется только после успешного обновления документа.
    /// Без нового файла ссылка на изображение переиспользуется как есть.
    pub async fn update_post(
        &self,
        req: UpdatePostRequest,
        file: Option<FileUpload>,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;
        let tags = normalize_tags(&req.tags);

        let Some(file) = file else {
            let data = json!({
                "caption": req.caption,
                "imageUrl": req.image_url,
                "imageId": req.image_id,
                "location": req.location,
                "tags": tags,
            });
            let document = self
                .backend
                .update(&self.collections.posts, &req.post_id, data)
                .await?;
            return post_from_document(document);
        };

        let mut saga = ImageSaga::new(&self.backend);
        let image = saga.stage(file).await?;

        let data = json!({
            "caption": req.caption,
            "imageUrl": image.url,
            "imageId": image.file_id,
            "location": req.location,
            "tags": tags,
        });

        let document = match self
            .backend
            .update(&self.collections.posts, &req.post_id, data)
            .await
        {
            Ok(document) => document,
            Err(err) => {
                saga.abort(&image).await;
                return Err(err);
            }
        };

        let replaced = (!req.image_id.is_empty()).then_some(req.image_id.as_str());
        saga.commit(replaced).await;

        let post = post_from_document(document)?;
        info!(post_id = %post.id, "post updated");
        Ok(post)
    }

    /// Удаляет документ поста, затем связанный файл.
    pub async fn delete_post(&self, post_id: &str, image_id: &str) -> Result<(), DomainError> {
        if post_id.trim().is_empty() || image_id.trim().is_empty() {
            return Err(DomainError::NotFound(
                "post id and image id are required".to_string(),
            ));
        }

        let deleted = self
            .backend
            .delete(&self.collections.posts, post_id)
            .await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post id: {post_id}")));
        }

        self.backend.delete_file(image_id).await?;
        info!(post_id = %post_id, "post deleted");
        Ok(())
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, DomainError> {
        let document = self
            .backend
            .get(&self.collections.posts, post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        post_from_document(document)
    }

    /// Последние посты для главной ленты.
    pub async fn recent_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.list_posts(&[
            Query::OrderDesc("$createdAt"),
            Query::Limit(RECENT_POSTS_LIMIT),
        ])
        .await
    }

    /// Страница ленты «обзор» с курсорной пагинацией.
    pub async fn explore_posts(&self, cursor: Option<String>) -> Result<Vec<Post>, DomainError> {
        let mut queries = vec![
            Query::OrderDesc("$updatedAt"),
            Query::Limit(EXPLORE_PAGE_SIZE),
        ];
        if let Some(cursor) = cursor {
            queries.push(Query::CursorAfter(cursor));
        }
        self.list_posts(&queries).await
    }

    /// Полнотекстовый поиск по подписи.
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>, DomainError> {
        self.list_posts(&[Query::Search("caption", term.to_string())])
            .await
    }

    pub async fn user_posts(&self, user_id: &str) -> Result<Vec<Post>, DomainError> {
        self.list_posts(&[
            Query::Equal("creator", user_id.to_string()),
            Query::OrderDesc("$createdAt"),
        ])
        .await
    }

    /// Посты, лайкнутые пользователем (равенство по списковому атрибуту —
    /// проверка членства на стороне бэкенда).
    pub async fn liked_posts(&self, user_id: &str) -> Result<Vec<Post>, DomainError> {
        self.list_posts(&[
            Query::Equal("likes", user_id.to_string()),
            Query::OrderDesc("$createdAt"),
        ])
        .await
    }

    /// Перезаписывает список лайков поста целиком; вызывающая сторона
    /// передаёт уже изменённый список.
    pub async fn like_post(&self, post_id: &str, likes: Vec<String>) -> Result<Post, DomainError> {
        let data = json!({ "likes": likes });
        let document = self
            .backend
            .update(&self.collections.posts, post_id, data)
            .await?;
        post_from_document(document)
    }

    pub async fn save_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> Result<SavedRecord, DomainError> {
        let data = json!({ "user": user_id, "post": post_id });
        let document = self
            .backend
            .create(&self.collections.saves, &unique_id(), data)
            .await?;
        saved_from_document(document)
    }

    pub async fn delete_saved_post(&self, record_id: &str) -> Result<(), DomainError> {
        let deleted = self
            .backend
            .delete(&self.collections.saves, record_id)
            .await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("saved record id: {record_id}")));
        }
        Ok(())
    }

    /// Закладки пользователя; посты по ним разрешаются отдельно,
    /// висячие ссылки — поведение внешней системы.
    pub async fn saved_records(&self, user_id: &str) -> Result<Vec<SavedRecord>, DomainError> {
        let list = self
            .backend
            .list(
                &self.collections.saves,
                &[
                    Query::Equal("user", user_id.to_string()),
                    Query::OrderDesc("$createdAt"),
                ],
            )
            .await?;
        list.documents
            .into_iter()
            .map(saved_from_document)
            .collect()
    }

    async fn list_posts(&self, queries: &[Query]) -> Result<Vec<Post>, DomainError> {
        let list = self
            .backend
            .list(&self.collections.posts, queries)
            .await?;
        list.documents.into_iter().map(post_from_document).collect()
    }
}
