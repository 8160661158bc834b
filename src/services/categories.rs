use crate::domain::category::Category;
use crate::forms::categories::AddCategoryFormPayload;
use crate::repository::{CategoryReader, CategoryWriter};

use super::{ServiceError, ServiceResult};

/// Lists every category, used to fill the category select of the product form.
pub fn show_categories<R>(repo: &R) -> ServiceResult<Vec<Category>>
where
    R: CategoryReader,
{
    match repo.list_categories() {
        Ok(categories) => Ok(categories),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn add_category<R>(payload: AddCategoryFormPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryWriter,
{
    let category = payload.into_new_category();
    match repo.save_category(&category) {
        Ok(saved) => {
            log::info!("Created category {} ({})", saved.id, saved.name);
            Ok(saved)
        }
        Err(e) => {
            log::error!("Failed to create category: {e}");
            Err(ServiceError::Persistence)
        }
    }
}
