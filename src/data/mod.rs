//! Hydrated domain objects with lazy relationship resolution.
//!
//! A domain object wraps one JSON:API resource object. Relationships resolve
//! on first access: inline linkage is matched against the side-loaded
//! `included` array, anything else goes through the request handler via the
//! relationship's `related` link. Resolved children are memoized per object
//! under their relationship name and only refreshed through
//! [`ResourceData::clean_children`].

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::trace;

use crate::cache::{CacheExpiry, CachedResource};
use crate::error::{Error, Result};
use crate::factory::ObjectFactory;
use crate::handler::RequestHandler;
use crate::jsonapi::{Linkage, Relationship, ResourceLinkage, ResourceObject};
use crate::pluralize::Pluralizer;
use crate::transport::HttpTransport;

/// Static description of a domain-object subtype: its resource name, the
/// route it is served under, and its cache policy. Registered per subtype
/// instead of derived from runtime type names.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
  pub name: &'static str,
  pub route: &'static str,
  pub cache_expiry: CacheExpiry,
}

/// Derive the relationship key for a descriptor name: lowercase, one leading
/// underscore stripped, pluralized on request.
pub fn relationship_name(descriptor_name: &str, plural: bool) -> String {
  let mut name = descriptor_name.to_lowercase();
  if name.starts_with('_') {
    name.remove(0);
  }

  if plural {
    Pluralizer::plural(&name)
  } else {
    name
  }
}

/// A memoized, resolved relationship target.
#[derive(Debug, Clone)]
enum ResolvedChild {
  Single(CachedResource),
  Many(Vec<CachedResource>),
}

/// Minimal editable projection of a domain object, used by write paths.
#[derive(Debug, Clone, Default)]
pub struct FormState {
  pub id: Option<String>,
  pub fields: Map<String, Value>,
}

/// Base state shared by every domain object.
#[derive(Debug, Clone)]
pub struct ResourceData {
  resource_type: String,
  id: Option<String>,
  data: Option<ResourceObject>,
  included: Vec<ResourceObject>,
  children: HashMap<String, ResolvedChild>,
}

impl ResourceData {
  pub fn new(descriptor: &ResourceDescriptor) -> Self {
    Self {
      resource_type: relationship_name(descriptor.name, false),
      id: None,
      data: None,
      included: Vec::new(),
      children: HashMap::new(),
    }
  }

  /// Hydrate from a raw resource object, retaining the side-load array for
  /// local relationship resolution. Overwrites any prior state; this is the
  /// only way `id` and `type` become defined.
  pub fn import(&mut self, data: ResourceObject, included: Option<Vec<ResourceObject>>) {
    self.resource_type = data.resource_type.clone();
    self.id = Some(data.id.clone());
    self.included = included.unwrap_or_default();
    self.data = Some(data);
  }

  pub fn resource_type(&self) -> &str {
    &self.resource_type
  }

  /// Fails if accessed before hydration.
  pub fn id(&self) -> Result<&str> {
    self
      .id
      .as_deref()
      .ok_or_else(|| Error::Precondition("id accessed before import_data".to_string()))
  }

  /// The resource's `self` link. Fails if accessed before hydration.
  pub fn self_link(&self) -> Result<&str> {
    self
      .data
      .as_ref()
      .and_then(|data| data.link("self"))
      .ok_or_else(|| Error::Precondition("self link accessed before import_data".to_string()))
  }

  pub fn raw(&self) -> Option<&ResourceObject> {
    self.data.as_ref()
  }

  /// A named resource-level link.
  pub fn link(&self, name: &str) -> Option<&str> {
    self.data.as_ref().and_then(|data| data.link(name))
  }

  /// The `related` URL of the relationship derived from a descriptor name.
  pub fn relationship_link(&self, descriptor_name: &str, plural: bool) -> Option<&str> {
    let name = relationship_name(descriptor_name, plural);
    self
      .data
      .as_ref()?
      .relationships
      .get(&name)?
      .links
      .as_ref()?
      .related
      .as_deref()
  }

  /// Drop one memoized relationship, or all of them. The only sanctioned
  /// invalidation path for resolved children.
  pub fn clean_children(&mut self, name: Option<&str>) {
    match name {
      Some(name) => {
        self.children.remove(name);
      }
      None => self.children.clear(),
    }
  }

  fn relationship(&self, name: &str) -> Result<Relationship> {
    let data = self
      .data
      .as_ref()
      .ok_or_else(|| Error::Precondition("relationships accessed before import_data".to_string()))?;

    data
      .relationships
      .get(name)
      .cloned()
      .ok_or_else(|| Error::RelationshipMissing {
        name: name.to_string(),
      })
  }

  fn find_included(&self, linkage: &ResourceLinkage) -> Option<ResourceObject> {
    self
      .included
      .iter()
      .find(|resource| {
        resource.resource_type == linkage.resource_type && resource.id == linkage.id
      })
      .cloned()
  }

  fn retained_included(&self) -> Option<Vec<ResourceObject>> {
    if self.included.is_empty() {
      None
    } else {
      Some(self.included.clone())
    }
  }

  /// Resolve a to-one relationship to a hydrated child, memoizing the result.
  ///
  /// Resolution order: memoized value, inline linkage against `included`,
  /// then the relationship's `related` URL through the request handler.
  pub async fn get_child<C, H>(&mut self, handler: &RequestHandler<H>) -> Result<C>
  where
    C: DataObject,
    H: HttpTransport,
  {
    let name = relationship_name(C::descriptor().name, false);

    if let Some(ResolvedChild::Single(cached)) = self.children.get(&name) {
      let cached = cached.clone();
      return Self::hydrate_child(cached).await;
    }

    let relationship = self.relationship(&name)?;

    if let Some(Linkage::Single(linkage)) = &relationship.data {
      if let Some(found) = self.find_included(linkage) {
        trace!(relationship = %name, "resolved child from included");
        let cached = CachedResource {
          data: found,
          included: self.retained_included(),
        };
        self.children.insert(name, ResolvedChild::Single(cached.clone()));
        return Self::hydrate_child(cached).await;
      }
    }

    let url = relationship
      .links
      .and_then(|links| links.related)
      .ok_or_else(|| Error::RelationshipMissing { name: name.clone() })?;

    // The related URL's trailing segment doubles as the child id.
    let id = url.rsplit('/').next().unwrap_or_default().to_string();
    let cached = handler
      .get_single_raw::<C>(&id, Some(&url), Some(C::descriptor().cache_expiry), false)
      .await?;

    self.children.insert(name, ResolvedChild::Single(cached.clone()));
    Self::hydrate_child(cached).await
  }

  /// Hydrate one resolved child and run its post-hydration hook, the same
  /// way the request handler does after a fetch.
  async fn hydrate_child<C: DataObject>(cached: CachedResource) -> Result<C> {
    let mut object: C = ObjectFactory::create(Some(cached.data), cached.included);
    object.load(false).await?;
    Ok(object)
  }

  /// Resolve a to-many relationship to hydrated children, memoizing the
  /// result. Same resolution order as [`ResourceData::get_child`]; falls
  /// back to the `related` URL whenever any inline member is not present in
  /// `included`.
  pub async fn get_children<C, H>(
    &mut self,
    handler: &RequestHandler<H>,
    max_results: Option<u32>,
  ) -> Result<Vec<C>>
  where
    C: DataObject,
    H: HttpTransport,
  {
    let name = relationship_name(C::descriptor().name, true);

    if let Some(ResolvedChild::Many(cached)) = self.children.get(&name) {
      let cached = cached.clone();
      return Self::hydrate_children(cached).await;
    }

    let relationship = self.relationship(&name)?;

    if let Some(Linkage::Many(linkages)) = &relationship.data {
      let found: Vec<ResourceObject> = linkages
        .iter()
        .filter_map(|linkage| self.find_included(linkage))
        .collect();

      if found.len() == linkages.len() {
        trace!(relationship = %name, count = found.len(), "resolved children from included");
        let cached: Vec<CachedResource> = found
          .into_iter()
          .map(|data| CachedResource {
            data,
            included: self.retained_included(),
          })
          .collect();
        self.children.insert(name, ResolvedChild::Many(cached.clone()));
        return Self::hydrate_children(cached).await;
      }
    }

    let url = relationship
      .links
      .and_then(|links| links.related)
      .ok_or_else(|| Error::RelationshipMissing { name: name.clone() })?;

    let cached = handler
      .get_list_raw::<C>(&url, Some(C::descriptor().cache_expiry), max_results)
      .await?;

    self.children.insert(name, ResolvedChild::Many(cached.clone()));
    Self::hydrate_children(cached).await
  }

  async fn hydrate_children<C: DataObject>(cached: Vec<CachedResource>) -> Result<Vec<C>> {
    let mut objects = Vec::with_capacity(cached.len());
    for member in cached {
      objects.push(Self::hydrate_child(member).await?);
    }
    Ok(objects)
  }
}

/// One hydrated JSON:API resource of a concrete subtype.
///
/// Subtypes embed a [`ResourceData`] and extend [`DataObject::import_data`]
/// to lift typed attributes out of the raw payload.
#[async_trait]
pub trait DataObject: Send + Sized {
  fn descriptor() -> &'static ResourceDescriptor;

  /// A fresh, un-hydrated instance.
  fn new() -> Self;

  fn base(&self) -> &ResourceData;
  fn base_mut(&mut self) -> &mut ResourceData;

  /// Hydrate from a raw resource object. Idempotent; re-import overwrites
  /// prior state. Subtype overrides call through to
  /// [`ResourceData::import`].
  fn import_data(&mut self, data: ResourceObject, included: Option<Vec<ResourceObject>>) {
    self.base_mut().import(data, included);
  }

  /// Post-hydration hook, run after every hydration: fetches, cache hits,
  /// and lazy child resolution alike. Subtypes override this to prefetch
  /// relationships; the base object resolves everything lazily, so the
  /// default does nothing.
  ///
  /// `load_children` has no base-level cascade: resolved children are
  /// memoized as raw payloads, and a child object is constructed fresh (and
  /// loaded) on each access, so there are no live child instances to
  /// re-load. Overrides that prefetch relationships use the flag to decide
  /// whether to do so.
  async fn load(&mut self, _load_children: bool) -> Result<()> {
    Ok(())
  }

  fn resource_type(&self) -> &str {
    self.base().resource_type()
  }

  fn id(&self) -> Result<&str> {
    self.base().id()
  }

  fn self_link(&self) -> Result<&str> {
    self.base().self_link()
  }

  /// The minimal editable projection: id only; subtypes add their fields.
  fn create_form_state(&self) -> FormState {
    FormState {
      id: self.base().id.clone(),
      fields: Map::new(),
    }
  }

  /// Build a JSON:API write payload from an edited form state. The id
  /// round-trips: the state's id wins, falling back to the object's own.
  fn create_json_api_from_state(&self, state: &FormState) -> Value {
    let mut data = json!({
      "type": self.resource_type(),
      "attributes": {},
    });

    if let Some(id) = state.id.as_deref().or(self.base().id.as_deref()) {
      data["id"] = json!(id);
    }

    json!({ "data": data, "meta": {} })
  }
}
