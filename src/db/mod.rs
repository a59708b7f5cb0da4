pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

pub use error::StoreError;
pub use store::ExpenseStore;
