use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::category::Category;
use crate::domain::types::{
    CategoryId, CategoryName, PictureName, ProductId, ProductName, ProductPrice,
};

/// Back-reference from a product to the category it belongs to.
///
/// The name is denormalized for display; the category itself is owned by the
/// category store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: CategoryName,
}

impl From<Category> for CategoryRef {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
        }
    }
}

/// A committed catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub price: ProductPrice,
    /// Set on the first save and preserved by later edits.
    pub created_at: Option<NaiveDateTime>,
    pub category: Option<CategoryRef>,
    /// Generated file name of the uploaded picture, if one was ever uploaded.
    pub picture: Option<PictureName>,
}

/// Information required to insert or replace a [`Product`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    /// `None` asks the store to assign a fresh identifier.
    pub id: Option<ProductId>,
    pub name: ProductName,
    pub price: ProductPrice,
    pub created_at: NaiveDateTime,
    pub category: Option<CategoryRef>,
    pub picture: Option<PictureName>,
}
