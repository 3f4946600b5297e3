//! Клиентская библиотека социальной ленты поверх внешнего
//! Backend-as-a-Service (аккаунты, документная БД, файловое хранилище).
//!
//! Сам бэкенд не реализуется: он скрыт за трейтами
//! [`backend::Accounts`], [`backend::Documents`] и [`backend::Storage`],
//! для которых есть одна HTTP-реализация ([`backend::HttpBackend`]).
//! Библиотека отвечает за клиентскую часть:
//! - валидация форм до любого сетевого вызова (`domain`);
//! - многошаговые мутации с компенсацией при частичном сбое
//!   (`application`): загрузка файла → получение URL → запись документа
//!   → откат;
//! - синхронизация состояния представления (`sync`): debounce,
//!   клиентская фильтрация, явное состояние загрузки.

pub mod application;
pub mod backend;
pub mod domain;
pub mod infrastructure;
pub mod routes;
pub mod sync;

pub use application::{AuthService, PostService, SessionState, UserService};
pub use domain::error::DomainError;
pub use domain::post::{CreatePostRequest, Post, UpdatePostRequest, normalize_tags};
pub use domain::saved::SavedRecord;
pub use domain::user::{SigninRequest, SignupRequest, UpdateProfileRequest, User};
