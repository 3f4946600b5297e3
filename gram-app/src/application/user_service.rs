use serde_json::json;
use tracing::info;

use crate::application::Collections;
use crate::application::media::ImageSaga;
use crate::application::records::user_from_document;
use crate::backend::documents::{Documents, Query};
use crate::backend::storage::{FileUpload, Storage};
use crate::domain::error::DomainError;
use crate::domain::user::{UpdateProfileRequest, User};

pub struct UserService<B> {
    backend: B,
    collections: Collections,
}

impl<B: Documents + Storage> UserService<B> {
    pub fn new(backend: B, collections: Collections) -> Self {
        Self {
            backend,
            collections,
        }
    }

    /// Список пользователей, новые первыми.
    pub async fn get_users(&self, limit: Option<u32>) -> Result<Vec<User>, DomainError> {
        let mut queries = vec![Query::OrderDesc("$createdAt")];
        if let Some(limit) = limit {
            queries.push(Query::Limit(limit));
        }

        let list = self
            .backend
            .list(&self.collections.users, &queries)
            .await?;
        list.documents.into_iter().map(user_from_document).collect()
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User, DomainError> {
        let document = self
            .backend
            .get(&self.collections.users, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        user_from_document(document)
    }

    /// Обновляет профиль. Дисциплина загрузки/отката та же, что у постов;
    /// имя и биография перезаписываются всегда.
    pub async fn update_profile(
        &self,
        req: UpdateProfileRequest,
        file: Option<FileUpload>,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        let Some(file) = file else {
            let data = json!({
                "name": req.name,
                "bio": req.bio,
                "imageUrl": req.image_url,
                "imageId": req.image_id,
            });
            let document = self
                .backend
                .update(&self.collections.users, &req.user_id, data)
                .await?;
            return user_from_document(document);
        };

        let mut saga = ImageSaga::new(&self.backend);
        let image = saga.stage(file).await?;

        let data = json!({
            "name": req.name,
            "bio": req.bio,
            "imageUrl": image.url,
            "imageId": image.file_id,
        });

        let document = match self
            .backend
            .update(&self.collections.users, &req.user_id, data)
            .await
        {
            Ok(document) => document,
            Err(err) => {
                saga.abort(&image).await;
                return Err(err);
            }
        };

        // у аватара по инициалам файла нет — удалять нечего
        saga.commit(req.image_id.as_deref()).await;

        let user = user_from_document(document)?;
        info!(user_id = %user.id, "profile updated");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{Map, Value, json};

    use super::UserService;
    use crate::application::Collections;
    use crate::backend::documents::{Document, DocumentList, Documents, Query};
    use crate::backend::storage::{FileUpload, Storage};
    use crate::domain::error::DomainError;
    use crate::domain::user::UpdateProfileRequest;

    #[derive(Clone, Default)]
    struct FakeBackend {
        documents: Arc<Mutex<HashMap<String, Vec<Document>>>>,
        list_queries: Arc<Mutex<Vec<(String, Vec<Query>)>>>,
        fail_update_document: Arc<Mutex<bool>>,
        uploads: Arc<Mutex<Vec<String>>>,
        deleted_files: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        fn insert(&self, collection_id: &str, document: Document) {
            self.documents
                .lock()
                .expect("documents mutex poisoned")
                .entry(collection_id.to_string())
                .or_default()
                .push(document);
        }

        fn deleted_files(&self) -> Vec<String> {
            self.deleted_files
                .lock()
                .expect("deleted_files mutex poisoned")
                .clone()
        }
    }

    fn data_object(data: Value) -> Map<String, Value> {
        match data {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[async_trait]
    impl Documents for FakeBackend {
        async fn create(
            &self,
            collection_id: &str,
            document_id: &str,
            data: Value,
        ) -> Result<Document, DomainError> {
            let now = Utc::now();
            let document = Document {
                id: document_id.to_string(),
                created_at: now,
                updated_at: now,
                data: data_object(data),
            };
            self.insert(collection_id, document.clone());
            Ok(document)
        }

        async fn get(
            &self,
            collection_id: &str,
            document_id: &str,
        ) -> Result<Option<Document>, DomainError> {
            Ok(self
                .documents
                .lock()
                .expect("documents mutex poisoned")
                .get(collection_id)
                .and_then(|docs| docs.iter().find(|doc| doc.id == document_id).cloned()))
        }

        async fn list(
            &self,
            collection_id: &str,
            queries: &[Query],
        ) -> Result<DocumentList, DomainError> {
            self.list_queries
                .lock()
                .expect("list_queries mutex poisoned")
                .push((collection_id.to_string(), queries.to_vec()));
            let documents = self
                .documents
                .lock()
                .expect("documents mutex poisoned")
                .get(collection_id)
                .cloned()
                .unwrap_or_default();
            Ok(DocumentList {
                total: documents.len() as u64,
                documents,
            })
        }

        async fn update(
            &self,
            collection_id: &str,
            document_id: &str,
            data: Value,
        ) -> Result<Document, DomainError> {
            if *self
                .fail_update_document
                .lock()
                .expect("fail_update_document mutex poisoned")
            {
                return Err(DomainError::OperationFailed(
                    "document update rejected".to_string(),
                ));
            }

            let mut documents = self.documents.lock().expect("documents mutex poisoned");
            let document = documents
                .get_mut(collection_id)
                .and_then(|docs| docs.iter_mut().find(|doc| doc.id == document_id))
                .ok_or_else(|| DomainError::NotFound(format!("document {document_id}")))?;

            for (key, value) in data_object(data) {
                document.data.insert(key, value);
            }
            document.updated_at = Utc::now();
            Ok(document.clone())
        }

        async fn delete(
            &self,
            _collection_id: &str,
            _document_id: &str,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[async_trait]
    impl Storage for FakeBackend {
        async fn create_file(&self, _file: FileUpload) -> Result<String, DomainError> {
            let mut uploads = self.uploads.lock().expect("uploads mutex poisoned");
            let file_id = format!("file-{}", uploads.len() + 1);
            uploads.push(file_id.clone());
            Ok(file_id)
        }

        async fn delete_file(&self, file_id: &str) -> Result<(), DomainError> {
            self.deleted_files
                .lock()
                .expect("deleted_files mutex poisoned")
                .push(file_id.to_string());
            Ok(())
        }

        fn file_preview_url(&self, file_id: &str) -> Result<String, DomainError> {
            Ok(format!("http://files.local/{file_id}/preview"))
        }

        fn file_view_url(&self, file_id: &str) -> Result<String, DomainError> {
            Ok(format!("http://files.local/{file_id}/view"))
        }
    }

    fn collections() -> Collections {
        Collections {
            users: "users".to_string(),
            posts: "posts".to_string(),
            saves: "saves".to_string(),
        }
    }

    fn service(backend: FakeBackend) -> UserService<FakeBackend> {
        UserService::new(backend, collections())
    }

    fn seed_user(backend: &FakeBackend, user_id: &str, image_id: Option<&str>) {
        let now = Utc::now();
        backend.insert(
            "users",
            Document {
                id: user_id.to_string(),
                created_at: now,
                updated_at: now,
                data: data_object(json!({
                    "accountId": "acc-1",
                    "name": "Jo",
                    "username": "jo1",
                    "email": "jo@x.com",
                    "imageUrl": "http://avatars.local/jo",
                    "imageId": image_id,
                    "bio": "old bio",
                })),
            },
        );
    }

    fn update_request(user_id: &str, image_id: Option<&str>) -> UpdateProfileRequest {
        UpdateProfileRequest {
            user_id: user_id.to_string(),
            name: "Joanna".to_string(),
            username: "jo1".to_string(),
            email: "jo@x.com".to_string(),
            bio: "new bio".to_string(),
            image_id: image_id.map(str::to_string),
            image_url: "http://avatars.local/jo".to_string(),
        }
    }

    fn sample_file() -> FileUpload {
        FileUpload {
            filename: "avatar.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[tokio::test]
    async fn update_profile_without_file_touches_no_storage() {
        let backend = FakeBackend::default();
        seed_user(&backend, "u1", Some("ava-old"));
        let service = service(backend.clone());

        let user = service
            .update_profile(update_request("u1", Some("ava-old")), None)
            .await
            .expect("update must succeed");

        assert_eq!(user.name, "Joanna");
        assert_eq!(user.bio, "new bio");
        assert_eq!(user.image_id.as_deref(), Some("ava-old"));

        assert!(backend.uploads.lock().expect("uploads mutex poisoned").is_empty());
        assert!(backend.deleted_files().is_empty());
    }

    #[tokio::test]
    async fn update_profile_with_file_replaces_old_avatar() {
        let backend = FakeBackend::default();
        seed_user(&backend, "u1", Some("ava-old"));
        let service = service(backend.clone());

        let user = service
            .update_profile(update_request("u1", Some("ava-old")), Some(sample_file()))
            .await
            .expect("update must succeed");

        assert_eq!(user.image_id.as_deref(), Some("file-1"));
        assert_eq!(backend.deleted_files(), vec!["ava-old".to_string()]);
    }

    #[tokio::test]
    async fn update_profile_with_file_keeps_initials_avatar_untouched() {
        let backend = FakeBackend::default();
        seed_user(&backend, "u1", None);
        let service = service(backend.clone());

        let user = service
            .update_profile(update_request("u1", None), Some(sample_file()))
            .await
            .expect("update must succeed");

        assert_eq!(user.image_id.as_deref(), Some("file-1"));
        // прежнего файла не было — удалений нет
        assert!(backend.deleted_files().is_empty());
    }

    #[tokio::test]
    async fn update_profile_write_failure_rolls_back_new_avatar() {
        let backend = FakeBackend::default();
        seed_user(&backend, "u1", Some("ava-old"));
        *backend
            .fail_update_document
            .lock()
            .expect("fail_update_document mutex poisoned") = true;
        let service = service(backend.clone());

        let err = service
            .update_profile(update_request("u1", Some("ava-old")), Some(sample_file()))
            .await
            .expect_err("must fail");
        assert!(matches!(err, DomainError::OperationFailed(_)));

        assert_eq!(backend.deleted_files(), vec!["file-1".to_string()]);
    }

    #[tokio::test]
    async fn get_users_orders_by_creation_and_applies_limit() {
        let backend = FakeBackend::default();
        let service = service(backend.clone());

        service
            .get_users(Some(10))
            .await
            .expect("list must succeed");
        service.get_users(None).await.expect("list must succeed");

        let recorded = backend
            .list_queries
            .lock()
            .expect("list_queries mutex poisoned")
            .clone();
        assert_eq!(
            recorded[0].1,
            vec![Query::OrderDesc("$createdAt"), Query::Limit(10)]
        );
        assert_eq!(recorded[1].1, vec![Query::OrderDesc("$createdAt")]);
    }

    #[tokio::test]
    async fn get_user_returns_not_found_when_missing() {
        let backend = FakeBackend::default();
        let service = service(backend);

        let err = service.get_user("u404").await.expect_err("must fail");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
