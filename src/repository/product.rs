use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::ProductId;
use crate::models::category::Category as DbCategory;
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct};
use crate::repository::{DieselRepository, ProductReader, ProductWriter, generate_id};

impl ProductReader for DieselRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        let items = products::table
            .left_join(categories::table)
            .select((DbProduct::as_select(), Option::<DbCategory>::as_select()))
            .order((products::name.asc(), products::id.asc()))
            .load::<(DbProduct, Option<DbCategory>)>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_product_by_id(&self, id: &ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        let product = products::table
            .left_join(categories::table)
            .filter(products::id.eq(id.as_str()))
            .select((DbProduct::as_select(), Option::<DbCategory>::as_select()))
            .first::<(DbProduct, Option<DbCategory>)>(&mut conn)
            .optional()?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }
}

impl ProductWriter for DieselRepository {
    fn save_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let id = match &product.id {
            Some(id) => id.as_str().to_string(),
            None => generate_id(),
        };

        let row = DbNewProduct {
            id: &id,
            name: product.name.as_str(),
            price: product.price.get(),
            created_at: Some(product.created_at),
            category_id: product.category.as_ref().map(|c| c.id.as_str()),
            picture: product.picture.as_ref().map(|p| p.as_str()),
        };

        let mut conn = self.conn()?;
        diesel::insert_into(products::table)
            .values(&row)
            .on_conflict(products::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)?;

        Ok(Product {
            id: ProductId::new(id)?,
            name: product.name.clone(),
            price: product.price,
            created_at: Some(product.created_at),
            category: product.category.clone(),
            picture: product.picture.clone(),
        })
    }

    fn delete_product(&self, id: &ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let affected =
            diesel::delete(products::table.filter(products::id.eq(id.as_str()))).execute(&mut conn)?;

        Ok(affected)
    }
}
