use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::backend::accounts::{Account, Accounts, Session};
use crate::backend::documents::{Document, DocumentList, Documents, Query};
use crate::backend::storage::{FileUpload, Storage};
use crate::backend::unique_id;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
struct CreateAccountRequestDto<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    email: &'a str,
    password: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateSessionRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateDocumentRequestDto<'a> {
    #[serde(rename = "documentId")]
    document_id: &'a str,
    data: &'a Value,
}

#[derive(Debug, Serialize)]
struct UpdateDocumentRequestDto<'a> {
    data: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    #[serde(rename = "$id")]
    id: String,
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SessionDto {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId")]
    account_id: String,
    #[serde(default)]
    secret: String,
}

#[derive(Debug, Deserialize)]
struct DocumentDto {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "$createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    data: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct DocumentListDto {
    total: i64,
    documents: Vec<DocumentDto>,
}

#[derive(Debug, Deserialize)]
struct FileDto {
    #[serde(rename = "$id")]
    id: String,
}

impl From<AccountDto> for Account {
    fn from(value: AccountDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

impl From<SessionDto> for Session {
    fn from(value: SessionDto) -> Self {
        Self {
            id: value.id,
            account_id: value.account_id,
            secret: value.secret,
        }
    }
}

impl From<DocumentDto> for Document {
    fn from(value: DocumentDto) -> Self {
        Self {
            id: value.id,
            created_at: value.created_at,
            updated_at: value.updated_at,
            data: value.data,
        }
    }
}

impl From<DocumentListDto> for DocumentList {
    fn from(value: DocumentListDto) -> Self {
        Self {
            total: value.total.max(0) as u64,
            documents: value.documents.into_iter().map(Document::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-реализация контракта бэкенда поверх его REST API.
///
/// Хранит секрет сессии после `create_email_session` и автоматически
/// подставляет его в последующие запросы.
pub struct HttpBackend {
    endpoint: String,
    project_id: String,
    database_id: String,
    bucket_id: String,
    client: Client,
    session: Arc<RwLock<Option<String>>>,
}

impl HttpBackend {
    /// Создаёт клиент с таймаутами подключения и запроса.
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
        bucket_id: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build reqwest client");

        Self {
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            database_id: database_id.into(),
            bucket_id: bucket_id.into(),
            client,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Устанавливает секрет сессии вручную (например, загруженный с диска).
    pub fn set_session(&self, secret: impl Into<String>) {
        if let Ok(mut guard) = self.session.write() {
            *guard = Some(secret.into());
        }
    }

    /// Возвращает текущий секрет сессии, если он установлен.
    pub fn session_secret(&self) -> Option<String> {
        self.session.read().ok().and_then(|guard| guard.clone())
    }

    /// Сбрасывает сохранённый секрет сессии.
    pub fn clear_session(&self) {
        if let Ok(mut guard) = self.session.write() {
            *guard = None;
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn documents_path(&self, collection_id: &str) -> String {
        format!(
            "/databases/{}/collections/{collection_id}/documents",
            self.database_id
        )
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, self.endpoint_url(path))
            .header("X-Project-Id", &self.project_id);
        if let Some(secret) = self.session_secret() {
            request = request.bearer_auth(secret);
        }
        request
    }

    async fn decode_error(response: reqwest::Response) -> DomainError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .message
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        error_from_status(status, message)
    }

    /// универсальный helper для запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
    ) -> Result<TRes, DomainError>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let response = self
            .request(method, path)
            .json(body)
            .send()
            .await
            .map_err(error_from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        response.json::<TRes>().await.map_err(error_from_reqwest)
    }
}

fn error_from_status(status: reqwest::StatusCode, message: String) -> DomainError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            DomainError::Auth(message)
        }
        reqwest::StatusCode::NOT_FOUND => DomainError::NotFound(message),
        _ => DomainError::OperationFailed(message),
    }
}

fn error_from_reqwest(err: reqwest::Error) -> DomainError {
    if let Some(status) = err.status() {
        return error_from_status(status, format!("http status {status}"));
    }
    DomainError::OperationFailed(err.to_string())
}

/// Сбои записи в хранилище файлов поднимаются как ошибки загрузки.
fn into_upload_error(err: DomainError) -> DomainError {
    match err {
        DomainError::OperationFailed(message) => DomainError::Upload(message),
        other => other,
    }
}

#[async_trait]
impl Accounts for HttpBackend {
    async fn create_account(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, DomainError> {
        let payload = CreateAccountRequestDto {
            user_id: account_id,
            email,
            password,
            name,
        };
        let dto: AccountDto = self
            .send_json(Method::POST, "/account", &payload)
            .await
            .map_err(|err| match err {
                DomainError::OperationFailed(message) => DomainError::Auth(message),
                other => other,
            })?;
        Ok(dto.into())
    }

    async fn get_account(&self) -> Result<Option<Account>, DomainError> {
        let response = self
            .request(Method::GET, "/account")
            .send()
            .await
            .map_err(error_from_reqwest)?;

        // отсутствие валидной сессии — не ошибка
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let dto = response
            .json::<AccountDto>()
            .await
            .map_err(error_from_reqwest)?;
        Ok(Some(dto.into()))
    }

    async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DomainError> {
        let payload = CreateSessionRequestDto { email, password };
        let dto: SessionDto = self
            .send_json(Method::POST, "/account/sessions/email", &payload)
            .await
            .map_err(|err| match err {
                DomainError::OperationFailed(message) => DomainError::Auth(message),
                other => other,
            })?;

        let session = Session::from(dto);
        self.set_session(session.secret.clone());
        Ok(session)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), DomainError> {
        let response = self
            .request(Method::DELETE, &format!("/account/sessions/{session_id}"))
            .send()
            .await
            .map_err(error_from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        if session_id == "current" {
            self.clear_session();
        }
        Ok(())
    }

    fn initials_avatar_url(&self, name: &str) -> String {
        let base = self.endpoint_url("/avatars/initials");
        match reqwest::Url::parse_with_params(
            &base,
            &[("name", name), ("project", self.project_id.as_str())],
        ) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{base}?project={}", self.project_id),
        }
    }
}

#[async_trait]
impl Documents for HttpBackend {
    async fn create(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, DomainError> {
        let payload = CreateDocumentRequestDto {
            document_id,
            data: &data,
        };
        let dto: DocumentDto = self
            .send_json(Method::POST, &self.documents_path(collection_id), &payload)
            .await?;
        Ok(dto.into())
    }

    async fn get(
        &self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Option<Document>, DomainError> {
        let path = format!("{}/{document_id}", self.documents_path(collection_id));
        let response = self
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(error_from_reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let dto = response
            .json::<DocumentDto>()
            .await
            .map_err(error_from_reqwest)?;
        Ok(Some(dto.into()))
    }

    async fn list(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList, DomainError> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|query| ("queries[]", query.to_param()))
            .collect();

        let response = self
            .request(Method::GET, &self.documents_path(collection_id))
            .query(&params)
            .send()
            .await
            .map_err(error_from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }

        let dto = response
            .json::<DocumentListDto>()
            .await
            .map_err(error_from_reqwest)?;
        Ok(dto.into())
    }

    async fn update(
        &self,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Document, DomainError> {
        let payload = UpdateDocumentRequestDto { data: &data };
        let path = format!("{}/{document_id}", self.documents_path(collection_id));
        let dto: DocumentDto = self.send_json(Method::PATCH, &path, &payload).await?;
        Ok(dto.into())
    }

    async fn delete(&self, collection_id: &str, document_id: &str) -> Result<bool, DomainError> {
        let path = format!("{}/{document_id}", self.documents_path(collection_id));
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(error_from_reqwest)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(true)
    }
}

#[async_trait]
impl Storage for HttpBackend {
    async fn create_file(&self, file: FileUpload) -> Result<String, DomainError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|err| DomainError::Upload(err.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", unique_id())
            .part("file", part);

        let path = format!("/storage/buckets/{}/files", self.bucket_id);
        let response = self
            .request(Method::POST, &path)
            .multipart(form)
            .send()
            .await
            .map_err(|err| into_upload_error(error_from_reqwest(err)))?;
        if !response.status().is_success() {
            return Err(into_upload_error(Self::decode_error(response).await));
        }

        let dto = response
            .json::<FileDto>()
            .await
            .map_err(|err| into_upload_error(error_from_reqwest(err)))?;
        Ok(dto.id)
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), DomainError> {
        let path = format!("/storage/buckets/{}/files/{file_id}", self.bucket_id);
        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(error_from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(())
    }

    fn file_preview_url(&self, file_id: &str) -> Result<String, DomainError> {
        if file_id.trim().is_empty() {
            return Err(DomainError::Upload("file id is empty".to_string()));
        }
        Ok(format!(
            "{}?width=2000&height=2000&gravity=top&quality=100&project={}",
            self.endpoint_url(&format!(
                "/storage/buckets/{}/files/{file_id}/preview",
                self.bucket_id
            )),
            self.project_id
        ))
    }

    fn file_view_url(&self, file_id: &str) -> Result<String, DomainError> {
        if file_id.trim().is_empty() {
            return Err(DomainError::Upload("file id is empty".to_string()));
        }
        Ok(format!(
            "{}?project={}",
            self.endpoint_url(&format!(
                "/storage/buckets/{}/files/{file_id}/view",
                self.bucket_id
            )),
            self.project_id
        ))
    }
}
