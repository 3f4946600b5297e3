use async_trait::async_trait;

use crate::domain::error::DomainError;

/// Учётная запись на стороне бэкенда (не путать с документом пользователя).
#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Эфемерная сессия: создаётся при входе, уничтожается при выходе.
/// Клиент хранит только непрозрачный `secret`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub secret: String,
}

#[async_trait]
pub trait Accounts: Send + Sync {
    async fn create_account(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, DomainError>;

    /// Текущая учётная запись; `None`, если сессия отсутствует или истекла.
    async fn get_account(&self) -> Result<Option<Account>, DomainError>;

    async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError>;

    /// `session_id` может быть литералом `"current"`.
    async fn delete_session(&self, session_id: &str) -> Result<(), DomainError>;

    /// URL аватара по инициалам; строится синхронно, без сетевого вызова.
    fn initials_avatar_url(&self, name: &str) -> String;
}
