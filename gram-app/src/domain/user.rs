use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let name = normalize_name(&self.name)?;
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Self {
            name,
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub user_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub bio: String,
    /// Текущий аватар: идентификатор файла (если аватар загружался) и URL.
    pub image_id: Option<String>,
    pub image_url: String,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "user_id",
                message: "must not be empty",
            });
        }
        let name = normalize_name(&self.name)?;
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        Ok(Self {
            name,
            username,
            email,
            ..self
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    /// URL аватара; при регистрации генерируется по инициалам,
    /// поэтому присутствует всегда.
    pub image_url: String,
    /// Идентификатор файла аватара; есть только после явной загрузки.
    pub image_id: Option<String>,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        image_url: impl Into<String>,
        image_id: Option<String>,
        bio: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "id",
                message: "must not be empty",
            });
        }
        let account_id = account_id.into();
        if account_id.trim().is_empty() {
            return Err(DomainError::Validation {
                field: "account_id",
                message: "must not be empty",
            });
        }

        Ok(Self {
            id,
            account_id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            image_url: image_url.into(),
            image_id,
            bio: bio.into(),
            created_at,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    if name.chars().count() < 2 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be at least 2 chars",
        });
    }
    Ok(name.to_string())
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    if username.chars().count() < 2 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be at least 2 chars",
        });
    }
    Ok(username.to_string())
}

pub(crate) fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < 8 {
        return Err(DomainError::Validation {
            field: "password",
            message: "must be at least 8 chars",
        });
    }
    Ok(())
}
