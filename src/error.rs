//! Error taxonomy for the data layer.

/// Errors surfaced by cache, hydration and request operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// An object was used before `import_data` hydrated it, or another
  /// caller-side contract was broken. Fatal to the operation, not retryable.
  #[error("precondition violated: {0}")]
  Precondition(String),

  /// The transport succeeded but the document carried no `data`.
  #[error("resource not found")]
  NotFound,

  /// A write operation received a non-success HTTP status.
  #[error("http error {status}")]
  Http { status: u16 },

  /// The resource object does not declare the expected relationship.
  #[error("relationship '{name}' missing")]
  RelationshipMissing { name: String },

  /// A URL could not be constructed from the route table.
  #[error("routing error: {0}")]
  Route(String),

  /// The persistent store could not be opened at construction time.
  #[error("cache storage unavailable: {0}")]
  StorageUnavailable(String),

  #[error("cache storage error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("config error: {0}")]
  Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
