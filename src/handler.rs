//! Cache-aware request orchestration: the single entry point reconciling the
//! resource cache, pagination and the HTTP transport.

use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::cache::{CacheExpiry, CacheStore, CachedResource, ResourceCache};
use crate::config::Config;
use crate::data::{relationship_name, DataObject};
use crate::error::{Error, Result};
use crate::factory::ObjectFactory;
use crate::jsonapi::{Document, PrimaryData, ResourceKey, ResourceObject};
use crate::routing::RouteTable;
use crate::transport::{
  ApiRequest, EnvToken, FileUpload, HttpTransport, RequestBody, ReqwestTransport,
};

/// Orchestrates get/list/create/update/delete operations with cache-first
/// semantics. Constructed once at startup and passed by reference; there is
/// no global instance.
pub struct RequestHandler<T: HttpTransport = ReqwestTransport> {
  transport: T,
  cache: ResourceCache,
  routes: RouteTable,
}

impl RequestHandler<ReqwestTransport> {
  /// Wire a ready handler from configuration: reqwest transport with the
  /// configured token variable, persistent cache store, route table on the
  /// configured API base URL.
  pub fn from_config(config: &Config) -> Result<Self> {
    let store = match &config.cache.path {
      Some(path) => CacheStore::open(path)?,
      None => CacheStore::open_default(&config.application_name)?,
    };

    let transport = ReqwestTransport::new(Arc::new(EnvToken::new(config.token_variable())));

    Ok(Self::new(
      transport,
      ResourceCache::new(store),
      RouteTable::new(config.api.url.clone()),
    ))
  }
}

impl<T: HttpTransport> RequestHandler<T> {
  pub fn new(transport: T, cache: ResourceCache, routes: RouteTable) -> Self {
    Self {
      transport,
      cache,
      routes,
    }
  }

  pub fn routes(&self) -> &RouteTable {
    &self.routes
  }

  pub fn routes_mut(&mut self) -> &mut RouteTable {
    &mut self.routes
  }

  pub fn cache(&self) -> &ResourceCache {
    &self.cache
  }

  fn key_for<D: DataObject>(id: &str) -> ResourceKey {
    ResourceKey::new(relationship_name(D::descriptor().name, false), id)
  }

  /// An endpoint override always wins over the route table.
  fn generate_url<D: DataObject>(&self, endpoint: Option<&str>, id: Option<&str>) -> Result<String> {
    match endpoint {
      Some(endpoint) => Ok(endpoint.to_string()),
      None => self.routes.api_endpoint(D::descriptor().route, id, None),
    }
  }

  async fn fetch_document(&self, url: &str) -> Result<Document> {
    let response = self.transport.send(ApiRequest::get(url)).await?;

    match response.json() {
      Ok(document) => Ok(document),
      Err(_) if !response.ok() => Err(Error::Http {
        status: response.status,
      }),
      Err(error) => Err(error),
    }
  }

  /// Fetch one resource, cache-first. A cache hit bypasses the network
  /// entirely.
  pub async fn get_single_raw<D: DataObject>(
    &self,
    id: &str,
    endpoint: Option<&str>,
    cache: Option<CacheExpiry>,
    skip_cache: bool,
  ) -> Result<CachedResource> {
    let expiry = cache.unwrap_or(D::descriptor().cache_expiry);
    let key = Self::key_for::<D>(id);

    if !skip_cache {
      if let Some(hit) = self.cache.get_element(&key)? {
        debug!(key = %key.composite(), "cache hit");
        return Ok(hit);
      }
    }

    let url = self.generate_url::<D>(endpoint, Some(id))?;
    let document = self.fetch_document(&url).await?;

    let data = match document.data {
      Some(PrimaryData::Single(resource)) => resource,
      Some(PrimaryData::Multiple(resources)) => {
        resources.into_iter().next().ok_or(Error::NotFound)?
      }
      None => return Err(Error::NotFound),
    };

    if expiry != CacheExpiry::NoCache {
      self
        .cache
        .add_element(&key, data.clone(), expiry.to_millis(), document.included.clone())?;
    }

    Ok(CachedResource {
      data,
      included: document.included,
    })
  }

  /// Fetch and hydrate one resource.
  pub async fn get_single<D: DataObject>(
    &self,
    id: &str,
    endpoint: Option<&str>,
    cache: Option<CacheExpiry>,
    skip_cache: bool,
  ) -> Result<D> {
    let cached = self.get_single_raw::<D>(id, endpoint, cache, skip_cache).await?;

    let mut object: D = ObjectFactory::create(Some(cached.data), cached.included);
    object.load(false).await?;
    Ok(object)
  }

  /// Fetch and hydrate a collection by route, with query parameters appended
  /// to the resolved URL.
  pub async fn get_list<D: DataObject>(
    &self,
    endpoint: Option<&str>,
    cache: Option<CacheExpiry>,
    max_results: Option<u32>,
    query: &[(&str, &str)],
  ) -> Result<Vec<D>> {
    let mut url = self.generate_url::<D>(endpoint, None)?;

    if !query.is_empty() {
      let mut parsed = url::Url::parse(&url)
        .map_err(|e| Error::Route(format!("invalid url '{}': {}", url, e)))?;
      for (key, value) in query {
        parsed.query_pairs_mut().append_pair(key, value);
      }
      url = parsed.to_string();
    }

    self.get_list_from_url::<D>(&url, cache, max_results).await
  }

  /// Fetch a collection's raw member payloads, cache-first, paginating under
  /// the page budget on a miss.
  pub async fn get_list_raw<D: DataObject>(
    &self,
    url: &str,
    cache: Option<CacheExpiry>,
    max_results: Option<u32>,
  ) -> Result<Vec<CachedResource>> {
    let expiry = cache.unwrap_or(D::descriptor().cache_expiry);

    if expiry != CacheExpiry::NoCache {
      if let Some(members) = self.cache.get_list(url)? {
        debug!(url, members = members.len(), "list cache hit");
        return Ok(members);
      }
    }

    let (data, included) = self.fetch_all_pages(url, max_results).await?;

    if data.is_empty() {
      return Ok(Vec::new());
    }

    if expiry != CacheExpiry::NoCache {
      self
        .cache
        .add_list(url, &data, expiry.to_millis(), included.as_deref())?;
    }

    Ok(
      data
        .into_iter()
        .map(|resource| CachedResource {
          data: resource,
          included: included.clone(),
        })
        .collect(),
    )
  }

  /// Fetch and hydrate a collection from an explicit URL.
  pub async fn get_list_from_url<D: DataObject>(
    &self,
    url: &str,
    cache: Option<CacheExpiry>,
    max_results: Option<u32>,
  ) -> Result<Vec<D>> {
    let members = self.get_list_raw::<D>(url, cache, max_results).await?;

    let mut objects = Vec::with_capacity(members.len());
    for member in members {
      let mut object: D = ObjectFactory::create(Some(member.data), member.included);
      object.load(false).await?;
      objects.push(object);
    }

    Ok(objects)
  }

  /// Follow `links.next` from page 1, merging `data` and `included` in page
  /// order. Budget: `None` stops after page 1, `Some(0)` is unbounded,
  /// `Some(n)` fetches at most n additional pages.
  async fn fetch_all_pages(
    &self,
    url: &str,
    max_results: Option<u32>,
  ) -> Result<(Vec<ResourceObject>, Option<Vec<ResourceObject>>)> {
    let mut merged = Vec::new();
    let mut included = Vec::new();
    let mut additional_pages = 0u32;
    let mut next_url = Some(url.to_string());

    while let Some(current) = next_url.take() {
      trace!(url = %current, "fetching page");
      let document = self.fetch_document(&current).await?;

      let Document {
        data,
        included: page_included,
        links,
      } = document;

      match data {
        Some(PrimaryData::Single(resource)) => merged.push(resource),
        Some(PrimaryData::Multiple(resources)) => merged.extend(resources),
        None => {}
      }
      if let Some(page_included) = page_included {
        included.extend(page_included);
      }

      let next = links.and_then(|links| links.next);
      next_url = match (next, max_results) {
        (Some(next), Some(0)) => Some(next),
        (Some(next), Some(budget)) if additional_pages < budget => {
          additional_pages += 1;
          Some(next)
        }
        _ => None,
      };
    }

    let included = if included.is_empty() {
      None
    } else {
      Some(included)
    };

    Ok((merged, included))
  }

  /// Create a resource. The cached result is either appended to an
  /// already-cached list (`append_to_list`) or upserted standalone.
  pub async fn post<D: DataObject>(
    &self,
    json_api: Value,
    file: Option<FileUpload>,
    append_to_list: Option<&str>,
  ) -> Result<D> {
    let url = self.generate_url::<D>(None, None)?;
    self.write::<D>(Method::POST, url, json_api, file, append_to_list).await
  }

  /// Update a resource; the target id comes from the payload's `data.id`.
  pub async fn patch<D: DataObject>(
    &self,
    json_api: Value,
    file: Option<FileUpload>,
    append_to_list: Option<&str>,
  ) -> Result<D> {
    let id = json_api["data"]["id"]
      .as_str()
      .ok_or_else(|| Error::Precondition("patch payload missing data.id".to_string()))?
      .to_string();

    let url = self.generate_url::<D>(None, Some(&id))?;
    self.write::<D>(Method::PATCH, url, json_api, file, append_to_list).await
  }

  async fn write<D: DataObject>(
    &self,
    method: Method,
    url: String,
    json_api: Value,
    file: Option<FileUpload>,
    append_to_list: Option<&str>,
  ) -> Result<D> {
    let body = match file {
      Some(file) => RequestBody::Multipart {
        payload: json_api,
        file,
      },
      None => RequestBody::Json(json_api),
    };

    let response = self
      .transport
      .send(ApiRequest::with_body(method, url, body))
      .await?;

    // The cache is left untouched on failure.
    if !response.ok() {
      return Err(Error::Http {
        status: response.status,
      });
    }

    let document: Document = response.json()?;
    let data = match document.data {
      Some(PrimaryData::Single(resource)) => resource,
      Some(PrimaryData::Multiple(resources)) => {
        resources.into_iter().next().ok_or(Error::NotFound)?
      }
      None => return Err(Error::NotFound),
    };

    let expiry = D::descriptor().cache_expiry;
    if expiry != CacheExpiry::NoCache {
      match append_to_list {
        Some(list_url) => self.cache.add_new_element_to_list(
          list_url,
          data.clone(),
          expiry.to_millis(),
          document.included.clone(),
        )?,
        None => self.cache.add_element(
          &Self::key_for::<D>(&data.id),
          data.clone(),
          expiry.to_millis(),
          document.included.clone(),
        )?,
      }
    }

    let mut object: D = ObjectFactory::create(Some(data), document.included);
    object.load(false).await?;
    Ok(object)
  }

  /// Delete a resource. Returns false on a non-success response; on success
  /// the cached element is removed (skipped for no-cache subtypes).
  pub async fn delete<D: DataObject>(&self, id: &str) -> Result<bool> {
    let url = self.generate_url::<D>(None, Some(id))?;

    let response = self
      .transport
      .send(ApiRequest {
        method: Method::DELETE,
        url,
        body: None,
      })
      .await?;

    if !response.ok() {
      return Ok(false);
    }

    if D::descriptor().cache_expiry != CacheExpiry::NoCache {
      self.cache.remove_element(&Self::key_for::<D>(id))?;
    }

    Ok(true)
  }
}

#[cfg(test)]
pub(crate) mod testing {
  use super::*;
  use async_trait::async_trait;
  use crate::transport::HttpResponse;

  /// Transport for tests that must not touch the network.
  pub struct UnreachableTransport;

  #[async_trait]
  impl HttpTransport for UnreachableTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
      panic!("unexpected network request to {}", request.url);
    }
  }

  pub fn offline_handler() -> RequestHandler<UnreachableTransport> {
    RequestHandler::new(
      UnreachableTransport,
      ResourceCache::new(CacheStore::open_in_memory().unwrap()),
      RouteTable::new("http://offline.invalid"),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::data::fixtures::{Article, Author, Comment, Draft};
  use crate::routing::Route;
  use httpmock::prelude::*;
  use serde_json::json;

  async fn handler(server: &MockServer) -> RequestHandler<ReqwestTransport> {
    let transport = ReqwestTransport::new(Arc::new(crate::transport::NoToken));
    let cache = ResourceCache::new(CacheStore::open_in_memory().unwrap());
    let mut routes = RouteTable::new(server.base_url());
    routes.add("authors", Route::api("/authors/:id", 1.0));
    routes.add("articles", Route::api("/articles", 1.0));
    routes.add("comments", Route::api("/comments", 1.0));
    routes.add("drafts", Route::api("/drafts/:id", 1.0));
    RequestHandler::new(transport, cache, routes)
  }

  #[tokio::test]
  async fn test_single_fetch_then_cache_hit() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/authors/42");
        then.status(200).json_body(json!({
          "data": {"type": "author", "id": "42", "attributes": {"email": "a@b.c"}}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let author: Author = handler.get_single("42", None, None, false).await.unwrap();
    assert_eq!(author.id().unwrap(), "42");
    assert_eq!(author.email.as_deref(), Some("a@b.c"));

    // Second call with default cache settings issues zero network calls.
    let author: Author = handler.get_single("42", None, None, false).await.unwrap();
    assert_eq!(author.id().unwrap(), "42");

    mock.assert_hits_async(1).await;
  }

  #[tokio::test]
  async fn test_skip_cache_refetches() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/authors/42");
        then.status(200).json_body(json!({
          "data": {"type": "author", "id": "42"}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let _: Author = handler.get_single("42", None, None, false).await.unwrap();
    let _: Author = handler.get_single("42", None, None, true).await.unwrap();

    mock.assert_hits_async(2).await;
  }

  #[tokio::test]
  async fn test_missing_data_is_not_found() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/authors/99");
        then.status(404).json_body(json!({"errors": []}));
      })
      .await;

    let handler = handler(&server).await;

    let result = handler.get_single::<Author>("99", None, None, false).await;
    assert!(matches!(result, Err(Error::NotFound)));
  }

  #[tokio::test]
  async fn test_pagination_merges_in_order() {
    let server = MockServer::start_async().await;
    let page_two_url = server.url("/v1.0/articles-p2");

    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles");
        then.status(200).json_body(json!({
          "data": [
            {"type": "article", "id": "a"},
            {"type": "article", "id": "b"}
          ],
          "links": {"next": page_two_url}
        }));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles-p2");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "c"}]
        }));
      })
      .await;

    let handler = handler(&server).await;

    let articles: Vec<Article> = handler.get_list(None, None, Some(0), &[]).await.unwrap();
    let ids: Vec<&str> = articles.iter().map(|a| a.id().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
  }

  #[tokio::test]
  async fn test_pagination_budget_none_stops_after_first_page() {
    let server = MockServer::start_async().await;
    let page_two_url = server.url("/v1.0/articles-p2");

    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "a"}],
          "links": {"next": page_two_url}
        }));
      })
      .await;
    let page_two = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles-p2");
        then.status(200).json_body(json!({"data": []}));
      })
      .await;

    let handler = handler(&server).await;

    let articles: Vec<Article> = handler.get_list(None, None, None, &[]).await.unwrap();
    assert_eq!(articles.len(), 1);
    page_two.assert_hits_async(0).await;
  }

  #[tokio::test]
  async fn test_pagination_budget_caps_additional_pages() {
    let server = MockServer::start_async().await;
    let page_two_url = server.url("/v1.0/articles-p2");
    let page_three_url = server.url("/v1.0/articles-p3");

    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "a"}],
          "links": {"next": page_two_url}
        }));
      })
      .await;
    let page_two = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles-p2");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "b"}],
          "links": {"next": page_three_url}
        }));
      })
      .await;
    let page_three = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles-p3");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "c"}]
        }));
      })
      .await;

    let handler = handler(&server).await;

    let articles: Vec<Article> = handler.get_list(None, None, Some(1), &[]).await.unwrap();
    let ids: Vec<&str> = articles.iter().map(|a| a.id().unwrap()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    page_two.assert_hits_async(1).await;
    page_three.assert_hits_async(0).await;
  }

  #[tokio::test]
  async fn test_list_cache_hit_skips_network() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "a"}]
        }));
      })
      .await;

    let handler = handler(&server).await;

    let _: Vec<Article> = handler.get_list(None, None, None, &[]).await.unwrap();
    let articles: Vec<Article> = handler.get_list(None, None, None, &[]).await.unwrap();
    assert_eq!(articles.len(), 1);

    mock.assert_hits_async(1).await;
  }

  #[tokio::test]
  async fn test_empty_list_is_not_cached() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/articles");
        then.status(200).json_body(json!({"data": []}));
      })
      .await;

    let handler = handler(&server).await;

    let first: Vec<Article> = handler.get_list(None, None, None, &[]).await.unwrap();
    let second: Vec<Article> = handler.get_list(None, None, None, &[]).await.unwrap();
    assert!(first.is_empty());
    assert!(second.is_empty());

    mock.assert_hits_async(2).await;
  }

  #[tokio::test]
  async fn test_query_parameters_appended() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/v1.0/articles")
          .query_param("sort", "title");
        then.status(200).json_body(json!({
          "data": [{"type": "article", "id": "a"}]
        }));
      })
      .await;

    let handler = handler(&server).await;

    let articles: Vec<Article> = handler
      .get_list(None, None, None, &[("sort", "title")])
      .await
      .unwrap();
    assert_eq!(articles.len(), 1);

    mock.assert_hits_async(1).await;
  }

  #[tokio::test]
  async fn test_post_upserts_standalone_element() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/v1.0/comments");
        then.status(201).json_body(json!({
          "data": {"type": "comment", "id": "7"}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let comment: Comment = handler
      .post(json!({"data": {"type": "comment", "attributes": {}}}), None, None)
      .await
      .unwrap();
    assert_eq!(comment.id().unwrap(), "7");

    let key = crate::jsonapi::ResourceKey::new("comment", "7");
    assert!(handler.cache().get_element(&key).unwrap().is_some());
  }

  #[tokio::test]
  async fn test_post_appends_to_cached_list() {
    let server = MockServer::start_async().await;
    let list_url = server.url("/v1.0/comments");

    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/comments");
        then.status(200).json_body(json!({
          "data": [{"type": "comment", "id": "1"}]
        }));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/v1.0/comments");
        then.status(201).json_body(json!({
          "data": {"type": "comment", "id": "2"}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let _: Vec<Comment> = handler.get_list(None, None, None, &[]).await.unwrap();
    let _: Comment = handler
      .post(
        json!({"data": {"type": "comment", "attributes": {}}}),
        None,
        Some(&list_url),
      )
      .await
      .unwrap();

    let members = handler.cache().get_list(&list_url).unwrap().unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.data.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
  }

  #[tokio::test]
  async fn test_post_with_file_sends_multipart_parts() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when
          .method(POST)
          .path("/v1.0/comments")
          .body_includes("name=\"payload\"")
          .body_includes("name=\"file\"")
          .body_includes("filename=\"notes.txt\"")
          .body_includes("attachment body");
        then.status(201).json_body(json!({
          "data": {"type": "comment", "id": "8"}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let file = FileUpload {
      file_name: "notes.txt".to_string(),
      content_type: Some("text/plain".to_string()),
      bytes: b"attachment body".to_vec(),
    };
    let comment: Comment = handler
      .post(
        json!({"data": {"type": "comment", "attributes": {}}}),
        Some(file),
        None,
      )
      .await
      .unwrap();
    assert_eq!(comment.id().unwrap(), "8");

    mock.assert_hits_async(1).await;
  }

  #[tokio::test]
  async fn test_post_error_carries_status_and_leaves_cache_untouched() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(POST).path("/v1.0/comments");
        then.status(422).json_body(json!({"errors": []}));
      })
      .await;

    let handler = handler(&server).await;

    let result = handler
      .post::<Comment>(json!({"data": {"type": "comment"}}), None, None)
      .await;
    assert!(matches!(result, Err(Error::Http { status: 422 })));
  }

  #[tokio::test]
  async fn test_patch_updates_cached_element() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(PATCH).path("/v1.0/authors/42");
        then.status(200).json_body(json!({
          "data": {"type": "author", "id": "42", "attributes": {"email": "new@b.c"}}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let author: Author = handler
      .patch(json!({"data": {"type": "author", "id": "42"}}), None, None)
      .await
      .unwrap();
    assert_eq!(author.email.as_deref(), Some("new@b.c"));

    let cached = handler
      .cache()
      .get_element(&crate::jsonapi::ResourceKey::new("author", "42"))
      .unwrap()
      .unwrap();
    assert_eq!(cached.data.attributes["email"], "new@b.c");
  }

  #[tokio::test]
  async fn test_patch_without_id_is_precondition_violation() {
    let server = MockServer::start_async().await;
    let handler = handler(&server).await;

    let result = handler
      .patch::<Author>(json!({"data": {"type": "author"}}), None, None)
      .await;
    assert!(matches!(result, Err(Error::Precondition(_))));
  }

  #[tokio::test]
  async fn test_delete_removes_cached_element() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/authors/42");
        then.status(200).json_body(json!({
          "data": {"type": "author", "id": "42"}
        }));
      })
      .await;
    server
      .mock_async(|when, then| {
        when.method(DELETE).path("/v1.0/authors/42");
        then.status(204);
      })
      .await;

    let handler = handler(&server).await;

    let _: Author = handler.get_single("42", None, None, false).await.unwrap();
    assert!(handler.delete::<Author>("42").await.unwrap());

    let key = crate::jsonapi::ResourceKey::new("author", "42");
    assert!(handler.cache().get_element(&key).unwrap().is_none());
  }

  #[tokio::test]
  async fn test_delete_failure_returns_false() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(DELETE).path("/v1.0/drafts/1");
        then.status(403);
      })
      .await;

    let handler = handler(&server).await;

    assert!(!handler.delete::<Draft>("1").await.unwrap());
  }

  #[tokio::test]
  async fn test_child_resolution_through_related_link() {
    let server = MockServer::start_async().await;
    let related_url = server.url("/v1.0/authors/3");

    server
      .mock_async(|when, then| {
        when.method(GET).path("/v1.0/authors/3");
        then.status(200).json_body(json!({
          "data": {"type": "author", "id": "3", "attributes": {"email": "a@b.c"}}
        }));
      })
      .await;

    let handler = handler(&server).await;

    let resource = serde_json::from_value(json!({
      "type": "article",
      "id": "9",
      "relationships": {
        "author": {"links": {"related": related_url}}
      }
    }))
    .unwrap();

    let mut article: Article = ObjectFactory::create(Some(resource), None);
    let author = article.author(&handler).await.unwrap();
    assert_eq!(author.email.as_deref(), Some("a@b.c"));
  }
}
