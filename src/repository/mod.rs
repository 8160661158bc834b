use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId};

pub mod category;
pub mod product;
#[cfg(test)]
pub mod test;

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers and blocking tasks.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List every product in a stable order (name, then id).
    fn list_products(&self) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: &ProductId) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities.
pub trait ProductWriter {
    /// Insert a product, or replace the stored one with the same id.
    ///
    /// A fresh identifier is assigned when `product.id` is `None`.
    fn save_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Delete a product by id, returning the number of removed rows.
    fn delete_product(&self, id: &ProductId) -> RepositoryResult<usize>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List all categories ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: &CategoryId) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    /// Insert a category, or rename the stored one with the same id.
    fn save_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Delete a category, detaching the products that referenced it.
    fn delete_category(&self, id: &CategoryId) -> RepositoryResult<usize>;
}

/// Generates a store identifier for a record saved without one.
pub(crate) fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
