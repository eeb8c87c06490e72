//! Persistent, multi-store resource cache.
//!
//! Three partitions back the domain contract: `elements` holds single
//! resources keyed by type+id, `lists` holds ordered member-key sequences
//! keyed by request URL, and `indexes` maps each element to the lists that
//! contain it so removal can cascade.

mod resource;
mod store;

pub use resource::{CachedResource, ResourceCache};
pub use store::{CacheStore, Partition};

use serde::{Deserialize, Serialize};

/// How long a subtype's entries stay cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheExpiry {
  /// Never read from or written to the cache.
  NoCache,
  #[default]
  Hour,
  Day,
  /// Practically forever: thirty days.
  Forever,
}

impl CacheExpiry {
  /// Time-to-live in milliseconds as stored alongside each entry.
  pub fn to_millis(self) -> u64 {
    match self {
      CacheExpiry::NoCache => 0,
      CacheExpiry::Hour => 60 * 60 * 1000,
      CacheExpiry::Day => 24 * 60 * 60 * 1000,
      CacheExpiry::Forever => 30 * 24 * 60 * 60 * 1000,
    }
  }
}
