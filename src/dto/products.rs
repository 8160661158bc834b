use serde::Serialize;

use crate::domain::product::Product;

/// Flat product view shared by the JSON API and the templates.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub created_at: Option<String>,
    pub category_id: Option<String>,
    pub category_name: Option<String>,
    pub picture: Option<String>,
    pub picture_url: Option<String>,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        let picture = value.picture.map(|p| p.into_inner());
        Self {
            id: value.id.into_inner(),
            name: value.name.into_inner(),
            price: value.price.get(),
            created_at: value
                .created_at
                .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
            category_id: value.category.as_ref().map(|c| c.id.to_string()),
            category_name: value.category.map(|c| c.name.into_inner()),
            picture_url: picture.as_ref().map(|p| format!("/uploads/img/{p}")),
            picture,
        }
    }
}
