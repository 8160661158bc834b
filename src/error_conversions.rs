//! Error conversion glue between the domain and the store.
//!
//! The domain layer must not depend on repository error types, so the
//! conversion lives here instead of next to `TypeConstraintError`.

use pushkind_common::repository::errors::RepositoryError;

use crate::domain::types::TypeConstraintError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}
