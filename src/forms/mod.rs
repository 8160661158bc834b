pub mod categories;
pub mod listing;
pub mod products;
