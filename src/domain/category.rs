use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName};

/// Category referenced by products; its lifecycle is independent of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
}

/// Data required to insert or replace a [`Category`].
///
/// The store assigns an identifier when `id` is `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCategory {
    pub id: Option<CategoryId>,
    pub name: CategoryName,
}

impl NewCategory {
    pub fn new(name: CategoryName) -> Self {
        Self { id: None, name }
    }
}
