//! Construction of domain objects from raw resource payloads.

use crate::data::DataObject;
use crate::jsonapi::{Document, ResourceObject};

/// Builds domain-object subtype instances and hydrates them.
pub struct ObjectFactory;

impl ObjectFactory {
  /// A subtype instance, hydrated when `data` is supplied and un-hydrated
  /// otherwise.
  pub fn create<T: DataObject>(
    data: Option<ResourceObject>,
    included: Option<Vec<ResourceObject>>,
  ) -> T {
    let mut object = T::new();

    if let Some(data) = data {
      object.import_data(data, included);
    }

    object
  }

  /// One instance per primary resource in the document, single or array.
  /// `included` overrides the document's own side-load array when supplied.
  pub fn create_list<T: DataObject>(
    document: Document,
    included: Option<Vec<ResourceObject>>,
  ) -> Vec<T> {
    let included = included.or(document.included.clone());

    document
      .data_as_vec()
      .into_iter()
      .map(|resource| Self::create(Some(resource), included.clone()))
      .collect()
  }
}
