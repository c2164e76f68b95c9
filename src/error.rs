//! Error types shared by the scoring core and its storage adapters.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A student or intervention id did not resolve
    #[error("{entity} not found with ID: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Request rejected before any state changed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Capability check denied the caller
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn student_not_found(id: impl ToString) -> Self {
        Error::NotFound {
            entity: "Student",
            id: id.to_string(),
        }
    }

    pub fn intervention_not_found(id: impl ToString) -> Self {
        Error::NotFound {
            entity: "Intervention",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
