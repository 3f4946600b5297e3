use tracing::warn;

use crate::backend::storage::{FileUpload, Storage};
use crate::domain::error::DomainError;

/// Состояния последовательности «загрузка → URL → запись документа».
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SagaState {
    Uploading,
    Resolving,
    Writing,
    RollingBack,
    Done,
    Failed,
}

/// Загруженный файл с уже разрешённым URL предпросмотра.
#[derive(Debug, Clone)]
pub(crate) struct StagedImage {
    pub(crate) file_id: String,
    pub(crate) url: String,
}

/// Сага загрузки изображения с явной таблицей компенсаций:
///
/// | шаг                  | сбой шага → компенсация            |
/// |----------------------|------------------------------------|
/// | `Uploading`          | нечего компенсировать              |
/// | `Resolving`          | удалить только что загруженный файл |
/// | `Writing` (`abort`)  | удалить только что загруженный файл |
/// | `Writing` (`commit`) | удалить замещённый старый файл      |
///
/// Шаги строго последовательны; перезапусков нет — вызывающая сторона
/// решает, повторять ли операцию.
pub(crate) struct ImageSaga<'a, S: Storage> {
    storage: &'a S,
    state: SagaState,
}

impl<'a, S: Storage> ImageSaga<'a, S> {
    pub(crate) fn new(storage: &'a S) -> Self {
        Self {
            storage,
            state: SagaState::Uploading,
        }
    }

    /// Загружает файл и разрешает URL предпросмотра.
    ///
    /// Если URL получить не удалось, загруженный файл удаляется —
    /// осиротевших объектов в хранилище не остаётся.
    pub(crate) async fn stage(&mut self, file: FileUpload) -> Result<StagedImage, DomainError> {
        self.state = SagaState::Uploading;
        let file_id = match self.storage.create_file(file).await {
            Ok(file_id) => file_id,
            Err(err) => {
                self.state = SagaState::Failed;
                return Err(err);
            }
        };

        self.state = SagaState::Resolving;
        match self.storage.file_preview_url(&file_id) {
            Ok(url) if !url.is_empty() => {
                self.state = SagaState::Writing;
                Ok(StagedImage { file_id, url })
            }
            Ok(_) => {
                self.delete_staged(&file_id).await;
                Err(DomainError::Upload("resolved an empty file url".to_string()))
            }
            Err(err) => {
                self.delete_staged(&file_id).await;
                Err(err)
            }
        }
    }

    /// Компенсация после неудачной записи документа: удаляет новый файл,
    /// не трогая прежний файл и документ.
    pub(crate) async fn abort(&mut self, staged: &StagedImage) {
        self.delete_staged(&staged.file_id).await;
    }

    /// Фиксация после успешной записи документа: выводит из оборота
    /// замещённый файл, если он был.
    pub(crate) async fn commit(&mut self, replaced: Option<&str>) {
        if let Some(old_file_id) = replaced {
            if let Err(err) = self.storage.delete_file(old_file_id).await {
                warn!(file_id = %old_file_id, error = %err, "failed to delete replaced file");
            }
        }
        self.state = SagaState::Done;
    }

    pub(crate) fn state(&self) -> SagaState {
        self.state
    }

    async fn delete_staged(&mut self, file_id: &str) {
        self.state = SagaState::RollingBack;
        if let Err(err) = self.storage.delete_file(file_id).await {
            warn!(file_id = %file_id, error = %err, "failed to delete staged file");
        }
        self.state = SagaState::Failed;
    }
}
