//! Контракт внешнего Backend-as-a-Service: аккаунты, документная БД,
//! файловое хранилище. Сам бэкенд не реализуется — только потребляется.

pub mod accounts;
pub mod documents;
pub mod http;
pub mod storage;

pub use accounts::{Account, Accounts, Session};
pub use documents::{Document, DocumentList, Documents, Query};
pub use http::HttpBackend;
pub use storage::{FileUpload, Storage};

/// Генерирует уникальный идентификатор для create-вызовов:
/// hex-метка времени в микросекундах плюс случайный хвост.
pub fn unique_id() -> String {
    let micros = chrono::Utc::now().timestamp_micros().max(0);
    let tail: u32 = rand::random();
    format!("{micros:x}{tail:08x}")
}
