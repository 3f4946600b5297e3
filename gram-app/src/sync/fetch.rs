use crate::domain::error::DomainError;

/// Явное состояние асинхронной загрузки вместо связки булевых флагов.
/// Повторных попыток нет: из `Failed` выводит только новый запрос.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Pending,
    Failed(String),
    Succeeded(T),
}

impl<T> FetchState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T, DomainError>> for FetchState<T> {
    fn from(result: Result<T, DomainError>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FetchState;
    use crate::domain::error::DomainError;

    #[test]
    fn pending_has_no_value() {
        let state: FetchState<i32> = FetchState::Pending;
        assert!(state.is_pending());
        assert!(state.value().is_none());
    }

    #[test]
    fn result_maps_into_succeeded_or_failed() {
        let ok: FetchState<i32> = Ok(7).into();
        assert_eq!(ok.value(), Some(&7));

        let err: FetchState<i32> =
            Err::<i32, _>(DomainError::OperationFailed("backend down".to_string())).into();
        assert!(err.is_failed());
        match err {
            FetchState::Failed(message) => assert!(message.contains("backend down")),
            _ => panic!("expected FetchState::Failed"),
        }
    }
}
