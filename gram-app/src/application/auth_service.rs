use serde_json::json;
use tracing::info;

use crate::application::Collections;
use crate::application::records::user_from_document;
use crate::backend::accounts::{Accounts, Session};
use crate::backend::documents::{Documents, Query};
use crate::backend::unique_id;
use crate::domain::error::DomainError;
use crate::domain::user::{SigninRequest, SignupRequest, User};

/// Явно передаваемое состояние аутентификации вместо глобального
/// контекста: load/refresh/clear управляются вызывающей стороной.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    user: Option<User>,
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn clear(&mut self) {
        self.user = None;
    }
}

pub struct AuthService<B> {
    backend: B,
    collections: Collections,
}

impl<B: Accounts + Documents> AuthService<B> {
    pub fn new(backend: B, collections: Collections) -> Self {
        Self {
            backend,
            collections,
        }
    }

    /// Регистрация: учётная запись на бэкенде, затем документ пользователя
    /// с аватаром по инициалам.
    pub async fn sign_up(&self, req: SignupRequest) -> Result<User, DomainError> {
        let req = req.validate()?;

        let account = self
            .backend
            .create_account(&unique_id(), &req.email, &req.password, &req.name)
            .await?;

        let avatar_url = self.backend.initials_avatar_url(&account.name);
        let data = json!({
            "accountId": account.id,
            "name": account.name,
            "email": account.email,
            "username": req.username,
            "imageUrl": avatar_url,
            "bio": "",
        });

        let document = self
            .backend
            .create(&self.collections.users, &unique_id(), data)
            .await?;

        let user = user_from_document(document)?;
        info!(user_id = %user.id, "user signed up");
        Ok(user)
    }

    pub async fn sign_in(&self, req: SigninRequest) -> Result<Session, DomainError> {
        let req = req.validate()?;
        let session = self
            .backend
            .create_email_session(&req.email, &req.password)
            .await?;
        info!(session_id = %session.id, "session created");
        Ok(session)
    }

    /// Завершает текущую сессию на бэкенде.
    pub async fn sign_out(&self) -> Result<(), DomainError> {
        self.backend.delete_session("current").await?;
        info!("session destroyed");
        Ok(())
    }

    /// Документ пользователя, привязанный к текущей учётной записи;
    /// `None`, если сессии нет или документ не найден.
    pub async fn current_user(&self) -> Result<Option<User>, DomainError> {
        let Some(account) = self.backend.get_account().await? else {
            return Ok(None);
        };

        let list = self
            .backend
            .list(
                &self.collections.users,
                &[Query::Equal("accountId", account.id.clone())],
            )
            .await?;

        match list.documents.into_iter().next() {
            Some(document) => Ok(Some(user_from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Перечитывает текущего пользователя в переданное состояние;
    /// возвращает итоговый флаг аутентификации.
    pub async fn refresh(&self, state: &mut SessionState) -> Result<bool, DomainError> {
        match self.current_user().await? {
            Some(user) => {
                state.user = Some(user);
                Ok(true)
            }
            None => {
                state.clear();
                Ok(false)
            }
        }
    }
}
