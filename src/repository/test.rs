use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{CategoryId, ProductId};
use crate::repository::{CategoryReader, CategoryWriter, ProductReader, ProductWriter};

/// Simple in-memory repository used for unit tests.
///
/// Products keep insertion order; identifiers are assigned sequentially.
#[derive(Default)]
pub struct TestRepository {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    next_id: AtomicUsize,
    fail_saves: AtomicBool,
    fail_reads: AtomicBool,
    saves: AtomicUsize,
}

impl TestRepository {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products: Mutex::new(products),
            categories: Mutex::new(categories),
            ..Default::default()
        }
    }

    /// Makes every subsequent `save_*` call fail.
    pub fn failing_saves(self) -> Self {
        self.fail_saves.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every subsequent read fail.
    pub fn failing_reads(self) -> Self {
        self.fail_reads.store(true, Ordering::SeqCst);
        self
    }

    /// Number of `save_product` calls that reached the store.
    pub fn save_calls(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> String {
        format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn unavailable() -> RepositoryError {
        diesel::result::Error::BrokenTransactionManager.into()
    }

    fn check_reads(&self) -> RepositoryResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(Self::unavailable())
        } else {
            Ok(())
        }
    }
}

impl ProductReader for TestRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        self.check_reads()?;
        Ok(self.products.lock().unwrap().clone())
    }

    fn get_product_by_id(&self, id: &ProductId) -> RepositoryResult<Option<Product>> {
        self.check_reads()?;
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }
}

impl ProductWriter for TestRepository {
    fn save_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }

        let id = match &product.id {
            Some(id) => id.clone(),
            None => ProductId::new(self.next_id())?,
        };
        let saved = Product {
            id,
            name: product.name.clone(),
            price: product.price,
            created_at: Some(product.created_at),
            category: product.category.clone(),
            picture: product.picture.clone(),
        };

        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == saved.id) {
            Some(existing) => *existing = saved.clone(),
            None => products.push(saved.clone()),
        }
        Ok(saved)
    }

    fn delete_product(&self, id: &ProductId) -> RepositoryResult<usize> {
        let mut products = self.products.lock().unwrap();
        let before = products.len();
        products.retain(|p| &p.id != id);
        Ok(before - products.len())
    }
}

impl CategoryReader for TestRepository {
    fn list_categories(&self) -> RepositoryResult<Vec<Category>> {
        self.check_reads()?;
        Ok(self.categories.lock().unwrap().clone())
    }

    fn get_category_by_id(&self, id: &CategoryId) -> RepositoryResult<Option<Category>> {
        self.check_reads()?;
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }
}

impl CategoryWriter for TestRepository {
    fn save_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let id = match &category.id {
            Some(id) => id.clone(),
            None => CategoryId::new(self.next_id())?,
        };
        let saved = Category {
            id,
            name: category.name.clone(),
        };
        let mut categories = self.categories.lock().unwrap();
        categories.retain(|c| c.id != saved.id);
        categories.push(saved.clone());
        Ok(saved)
    }

    fn delete_category(&self, id: &CategoryId) -> RepositoryResult<usize> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| &c.id != id);
        Ok(before - categories.len())
    }
}
