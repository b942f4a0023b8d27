pub mod config;
pub mod db;
pub mod entry;
pub mod error;
pub mod hour;
pub mod local_time;
pub mod model;
pub mod resolver;
pub mod response;
pub mod store;
pub mod summary;

pub use error::SlotError;
pub use store::{SlotStore, StoreError};
