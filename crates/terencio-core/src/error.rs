//! Error types for `terencio-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The durable backend behind a [`ScopeStorage`](crate::persist::ScopeStorage)
  /// failed to read or write.
  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn storage<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
