use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::CategoryId;
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::repository::{CategoryReader, CategoryWriter, DieselRepository, generate_id};

impl CategoryReader for DieselRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let items = categories::table
            .order((categories::name.asc(), categories::id.asc()))
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;

        Ok(items)
    }

    fn get_category_by_id(&self, id: &CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id.as_str()))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }
}

impl CategoryWriter for DieselRepository {
    fn save_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        use crate::schema::categories;

        let id = match &category.id {
            Some(id) => id.as_str().to_string(),
            None => generate_id(),
        };
        let row = DbNewCategory {
            id: &id,
            name: category.name.as_str(),
        };

        let mut conn = self.conn()?;
        diesel::insert_into(categories::table)
            .values(&row)
            .on_conflict(categories::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)?;

        Ok(Category {
            id: CategoryId::new(id)?,
            name: category.name.clone(),
        })
    }

    fn delete_category(&self, id: &CategoryId) -> RepositoryResult<usize> {
        use crate::schema::{categories, products};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::update(products::table.filter(products::category_id.eq(id.as_str())))
                .set(products::category_id.eq(None::<String>))
                .execute(conn)?;

            diesel::delete(categories::table.filter(categories::id.eq(id.as_str()))).execute(conn)
        })?;

        Ok(affected)
    }
}
