//! SQLite backend for the Terencio scope store.
//!
//! Provides [`SqliteScopeStorage`], a durable key/value implementation of
//! [`terencio_core::persist::ScopeStorage`] on a single SQLite file.

mod encode;
mod schema;
mod storage;

pub mod error;

pub use error::{Error, Result};
pub use storage::SqliteScopeStorage;

#[cfg(test)]
mod tests;
