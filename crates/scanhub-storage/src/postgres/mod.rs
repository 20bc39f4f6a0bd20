//! PostgreSQL backend.

mod handler;
mod repository;

pub use handler::PostgresHandler;
pub use repository::PostgresScanInfosRepository;
