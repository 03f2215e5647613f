//! Product records and the rules applied to the collection.

pub mod model;
pub mod repository;
pub mod service;

pub use model::{Product, ProductDocument, RequestedId};
pub use repository::ProductRepository;
pub use service::ProductService;
