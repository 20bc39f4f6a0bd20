//! MongoDB backend.

mod document;
mod handler;
mod repository;

pub use handler::MongoHandler;
pub use repository::{COLLECTION_NAME, MongoScanInfosRepository};
