//! Domain entities and value objects shared by the store and service layers.

pub mod category;
pub mod draft;
pub mod product;
pub mod types;
