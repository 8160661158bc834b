pub mod errors;

pub use errors::{ServiceError, ServiceResult};

pub mod categories;
pub mod drafts;
pub mod listing;
pub mod products;
pub mod uploads;
