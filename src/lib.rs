//! Cache-first client data layer for JSON:API backends.
//!
//! The crate hydrates JSON:API documents into typed domain objects with lazy
//! relationship resolution, backed by a persistent multi-store cache keyed by
//! resource type+id. Cached lists store member keys, not payloads, and a
//! reverse index lets element removal cascade through every list that
//! references it.
//!
//! The [`handler::RequestHandler`] is the single entry point: it checks the
//! cache, fetches and paginates on a miss, hydrates through the
//! [`factory::ObjectFactory`], and populates the cache for the next caller.

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod factory;
pub mod handler;
pub mod jsonapi;
pub mod pluralize;
pub mod routing;
pub mod transport;

pub use cache::{CacheExpiry, CacheStore, CachedResource, ResourceCache};
pub use config::Config;
pub use data::{DataObject, FormState, ResourceData, ResourceDescriptor};
pub use error::{Error, Result};
pub use factory::ObjectFactory;
pub use handler::RequestHandler;
pub use jsonapi::{Document, ResourceKey, ResourceObject};
pub use routing::{Route, RouteTable};
pub use transport::{FileUpload, HttpTransport, ReqwestTransport, TokenProvider};
