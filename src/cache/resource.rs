//! Domain-level resource cache over the three store partitions.

use sha2::{Digest, Sha256};
use tracing::debug;

use super::store::{CacheStore, Partition};
use crate::error::Result;
use crate::jsonapi::{ResourceKey, ResourceObject};

use serde::{Deserialize, Serialize};

/// The payload stored per element: the resource object plus the side-loaded
/// resources that were visible when it was cached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedResource {
  pub data: ResourceObject,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub included: Option<Vec<ResourceObject>>,
}

/// Resource cache built from the `elements`, `lists` and `indexes`
/// partitions.
///
/// Lists store ordered member keys, not inlined payloads; the reverse index
/// records, per element, every cached list that references it so removal can
/// cascade.
pub struct ResourceCache {
  store: CacheStore,
}

impl ResourceCache {
  pub fn new(store: CacheStore) -> Self {
    Self { store }
  }

  /// Stable fixed-length key for a list URL.
  fn list_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
  }

  pub fn get_element(&self, key: &ResourceKey) -> Result<Option<CachedResource>> {
    self.store.get(Partition::Elements, &key.composite())
  }

  /// Unconditional upsert of a single element.
  pub fn add_element(
    &self,
    key: &ResourceKey,
    data: ResourceObject,
    ttl_millis: u64,
    included: Option<Vec<ResourceObject>>,
  ) -> Result<()> {
    let payload = CachedResource { data, included };
    self.store.set(Partition::Elements, &key.composite(), &payload, ttl_millis)
  }

  /// Resolve a cached list into its member payloads, in stored order.
  ///
  /// A list referencing a missing or expired member is treated as a full
  /// cache miss: the stale list entry is dropped and `None` is returned so
  /// the caller refetches, rather than surfacing a partially-empty sequence.
  pub fn get_list(&self, list_url: &str) -> Result<Option<Vec<CachedResource>>> {
    let list_key = Self::list_key(list_url);

    let member_keys: Option<Vec<ResourceKey>> = self.store.get(Partition::Lists, &list_key)?;
    let member_keys = match member_keys {
      Some(keys) => keys,
      None => return Ok(None),
    };

    let mut members = Vec::with_capacity(member_keys.len());
    for key in &member_keys {
      match self.get_element(key)? {
        Some(member) => members.push(member),
        None => {
          debug!(list_url, member = %key.composite(), "cached list member missing, invalidating list");
          self.store.delete(Partition::Lists, &list_key)?;
          return Ok(None);
        }
      }
    }

    Ok(Some(members))
  }

  /// Cache a full collection: every element payload, the ordered member-key
  /// sequence, and the reverse index linking each member back to this list.
  pub fn add_list(
    &self,
    list_url: &str,
    resources: &[ResourceObject],
    ttl_millis: u64,
    included: Option<&[ResourceObject]>,
  ) -> Result<()> {
    let list_key = Self::list_key(list_url);

    let mut member_keys: Vec<ResourceKey> = Vec::with_capacity(resources.len());
    for resource in resources {
      let key = resource.key();
      // Membership is conceptually a set; order is kept for pagination
      // reproducibility.
      if !member_keys.contains(&key) {
        member_keys.push(key.clone());
      }
      self.add_element(&key, resource.clone(), ttl_millis, included.map(|side| side.to_vec()))?;
    }

    self.store.set(Partition::Lists, &list_key, &member_keys, ttl_millis)?;

    for key in &member_keys {
      self.index_list_for(key, &list_key, ttl_millis)?;
    }

    Ok(())
  }

  /// Reflect a newly created element in an already-cached list without a
  /// refetch: append its key to the (possibly new) sequence, store the
  /// element, update the reverse index.
  pub fn add_new_element_to_list(
    &self,
    list_url: &str,
    resource: ResourceObject,
    ttl_millis: u64,
    included: Option<Vec<ResourceObject>>,
  ) -> Result<()> {
    let list_key = Self::list_key(list_url);
    let key = resource.key();

    let mut member_keys: Vec<ResourceKey> = self
      .store
      .get(Partition::Lists, &list_key)?
      .unwrap_or_default();
    if !member_keys.contains(&key) {
      member_keys.push(key.clone());
    }
    self.store.set(Partition::Lists, &list_key, &member_keys, ttl_millis)?;

    self.add_element(&key, resource, ttl_millis, included)?;
    self.index_list_for(&key, &list_key, ttl_millis)
  }

  /// Remove an element and cascade it out of every cached list referencing
  /// it. Each list rewrite is all-or-nothing; an error aborts the cascade and
  /// the caller retries.
  pub fn remove_element(&self, key: &ResourceKey) -> Result<()> {
    let composite = key.composite();
    let list_keys: Option<Vec<String>> = self.store.get(Partition::Indexes, &composite)?;

    if let Some(list_keys) = list_keys {
      self.store.delete(Partition::Indexes, &composite)?;

      for list_key in &list_keys {
        let member_keys: Option<Vec<ResourceKey>> = self.store.get(Partition::Lists, list_key)?;

        if let Some(member_keys) = member_keys {
          let remaining: Vec<ResourceKey> =
            member_keys.into_iter().filter(|member| member != key).collect();
          self.store.set(Partition::Lists, list_key, &remaining, 0)?;
        }
      }

      debug!(element = %composite, lists = list_keys.len(), "cascaded element removal");
    }

    self.store.delete(Partition::Elements, &composite)
  }

  /// Empty all three partitions.
  pub fn clear(&self) -> Result<()> {
    self.store.clear_all()
  }

  fn index_list_for(&self, key: &ResourceKey, list_key: &str, ttl_millis: u64) -> Result<()> {
    let composite = key.composite();
    let mut list_keys: Vec<String> = self
      .store
      .get(Partition::Indexes, &composite)?
      .unwrap_or_default();

    if !list_keys.iter().any(|existing| existing == list_key) {
      list_keys.push(list_key.to_string());
      self.store.set(Partition::Indexes, &composite, &list_keys, ttl_millis)?;
    }

    Ok(())
  }
}
