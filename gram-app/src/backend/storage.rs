use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Содержимое загружаемого файла вместе с метаданными.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Загружает файл и возвращает идентификатор в хранилище.
    async fn create_file(&self, file: FileUpload) -> Result<String, DomainError>;

    async fn delete_file(&self, file_id: &str) -> Result<(), DomainError>;

    /// URL предпросмотра; строится синхронно по идентификатору.
    fn file_preview_url(&self, file_id: &str) -> Result<String, DomainError>;

    /// URL полного просмотра файла.
    fn file_view_url(&self, file_id: &str) -> Result<String, DomainError>;
}
