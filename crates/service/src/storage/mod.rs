//! Storage abstractions for service layer
//!
//! Contains the whole-document JSON file accessor shared by file-backed stores.

pub mod json_document_store;
