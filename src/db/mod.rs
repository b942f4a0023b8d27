//! SQLite storage collaborator.
//!
//! - `repo`: SQL-only functions over a [`Pool`], one per query or insert.
//! - `store`: [`SqliteStore`], the [`crate::store::SlotStore`] implementation
//!   built on `repo`.
//!
//! The `(station_id, utc_time)` unique keys in the migrations are what keep a
//! slot from receiving the same card twice.

pub mod repo;
mod store;

pub use repo::*;
pub use store::SqliteStore;
