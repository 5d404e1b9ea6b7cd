pub mod demo;
pub mod error;
pub mod handlers;
pub mod types;

pub use demo::DemoCatalog;
pub use error::ApiError;
pub use handlers::*;
pub use types::*;
