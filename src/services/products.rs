use crate::domain::product::Product;
use crate::domain::types::ProductId;
use crate::repository::{ProductReader, ProductWriter};

use super::{ServiceError, ServiceResult};

/// Retrieves a single product by id without any projection applied.
pub fn show_product<R>(id: &str, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader,
{
    let product_id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    match repo.get_product_by_id(&product_id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {product_id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Deletes the product `id`.
///
/// Looks the product up first so that an unknown id is reported as
/// `NotFound` instead of silently deleting nothing.
pub fn delete_product<R>(id: &str, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    let product = show_product(id, repo)?;

    match repo.delete_product(&product.id) {
        Ok(_) => {
            log::info!("Deleted product {} ({})", product.id, product.name);
            Ok(product)
        }
        Err(e) => {
            log::error!("Failed to delete product {}: {e}", product.id);
            Err(ServiceError::Persistence)
        }
    }
}
