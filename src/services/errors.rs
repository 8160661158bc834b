use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Error type used by service layer functions.
///
/// Every variant is a distinct terminal outcome for the request; nothing is
/// retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Requested record, draft or file was not found.
    #[error("not found")]
    NotFound,
    /// Submitted form data failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The draft referenced a category that does not exist.
    #[error("category {0} does not exist")]
    CategoryUnresolved(String),
    /// The store rejected a write.
    #[error("failed to persist product")]
    Persistence,
    /// The record was persisted but its picture could not be written.
    #[error("product {product_id} was saved but picture {picture} could not be stored")]
    UploadTransfer { product_id: String, picture: String },
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::Validation(val.to_string())
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
