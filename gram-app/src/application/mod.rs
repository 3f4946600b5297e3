//! Сервисы приложения: оркестрация многошаговых мутаций поверх
//! контракта бэкенда, с компенсацией при частичном сбое.

mod auth_service;
mod media;
mod post_service;
mod records;
mod user_service;

pub use auth_service::{AuthService, SessionState};
pub use post_service::PostService;
pub use user_service::UserService;

/// Идентификаторы коллекций документной БД, с которыми работают сервисы.
#[derive(Debug, Clone)]
pub struct Collections {
    pub users: String,
    pub posts: String,
    pub saves: String,
}
