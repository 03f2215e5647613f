//! Service layer for the product catalog.
//! - `storage` reads and writes whole JSON documents.
//! - `file` applies the store failure policy on top of it.
//! - `product` holds the record model and the list/create/update/delete rules.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod file;
pub mod product;
