use thiserror::Error;

use super::entities::PersonId;

pub type StoreResult<T> = Result<T, StoreError>;

/// Every way a store operation can be refused. None of them leave the in-memory collection in a
/// partially updated state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("name can't be empty")]
    EmptyName,

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("a person named {0:?} already exists")]
    DuplicateName(String),

    #[error("no person with id or name \"{0}\"")]
    NotFound(PersonId),

    #[error("failed to persist people: {0:#}")]
    Persistence(#[source] anyhow::Error),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyName | StoreError::InvalidDate(_) | StoreError::DuplicateName(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}
