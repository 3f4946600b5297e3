use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Нарушено ограничение формы; сеть при этом не вызывается.
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    /// Сбой записи в хранилище файлов или получения URL файла.
    #[error("upload failed: {0}")]
    Upload(String),

    /// Бэкенд отклонил регистрацию или вход.
    #[error("auth rejected: {0}")]
    Auth(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    /// Общий сбой бэкенда при работе с документами.
    #[error("operation failed: {0}")]
    OperationFailed(String),
}
