use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::category::Category as DomainCategory;
use crate::domain::product::{CategoryRef, Product as DomainProduct};
use crate::domain::types::{PictureName, ProductId, ProductName, ProductPrice, TypeConstraintError};
use crate::models::category::Category;

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub created_at: Option<NaiveDateTime>,
    pub category_id: Option<String>,
    pub picture: Option<String>,
}

/// Insertable/replaceable form of [`Product`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct NewProduct<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub price: f64,
    pub created_at: Option<NaiveDateTime>,
    pub category_id: Option<&'a str>,
    pub picture: Option<&'a str>,
}

/// A product row joined with its (optional) category row.
pub type ProductWithCategory = (Product, Option<Category>);

impl TryFrom<ProductWithCategory> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from((product, category): ProductWithCategory) -> Result<Self, Self::Error> {
        let category = category
            .map(|c| DomainCategory::try_from(c).map(CategoryRef::from))
            .transpose()?;

        Ok(Self {
            id: ProductId::new(product.id)?,
            name: ProductName::new(product.name)?,
            price: ProductPrice::new(product.price)?,
            created_at: product.created_at,
            category,
            picture: product.picture.map(PictureName::new).transpose()?,
        })
    }
}
