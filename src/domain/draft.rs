use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::types::{
    CategoryId, PictureName, ProductId, ProductName, ProductPrice,
};

/// Uncommitted product held per session between showing and submitting the
/// product form.
///
/// Fields are loosely typed because a fresh draft is empty and a rejected
/// submission never reaches it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductDraft {
    /// Present when the draft edits a stored product.
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Option<f64>,
    pub created_at: Option<NaiveDateTime>,
    pub category_id: Option<CategoryId>,
    pub picture: Option<PictureName>,
}

impl ProductDraft {
    /// Whether the draft will create a new product rather than edit one.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl From<Product> for ProductDraft {
    fn from(product: Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.into_inner(),
            price: Some(product.price.get()),
            created_at: product.created_at,
            category_id: product.category.map(|c| c.id),
            picture: product.picture,
        }
    }
}

/// A draft whose submitted fields passed validation and that has been
/// released from its session. Consumed by the commit step.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub id: Option<ProductId>,
    pub name: ProductName,
    pub price: ProductPrice,
    pub created_at: Option<NaiveDateTime>,
    pub category_id: Option<CategoryId>,
    pub picture: Option<PictureName>,
}
