//! Route table mapping logical resource kinds to URL templates.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One logical route: an API endpoint template, an optional in-app URL, and
/// the API version the endpoint lives under.
#[derive(Debug, Clone, Default)]
pub struct Route {
  /// API endpoint template; `:`-prefixed segments are substituted
  /// positionally (first placeholder = primary id, second = child id).
  pub endpoint: Option<String>,
  /// In-app URL for UI routing.
  pub url: Option<String>,
  pub version: Option<f64>,
}

impl Route {
  pub fn api(endpoint: impl Into<String>, version: f64) -> Self {
    Self {
      endpoint: Some(endpoint.into()),
      url: None,
      version: Some(version),
    }
  }
}

/// Registry of routes plus the API base URL, constructed once at startup and
/// shared by reference.
pub struct RouteTable {
  api_url: String,
  routes: HashMap<&'static str, Route>,
}

impl RouteTable {
  pub fn new(api_url: impl Into<String>) -> Self {
    Self {
      api_url: api_url.into(),
      routes: HashMap::new(),
    }
  }

  pub fn add(&mut self, key: &'static str, route: Route) -> &mut Self {
    self.routes.insert(key, route);
    self
  }

  pub fn get(&self, key: &str) -> Result<&Route> {
    self
      .routes
      .get(key)
      .ok_or_else(|| Error::Route(format!("unknown route '{}'", key)))
  }

  /// In-app link for a route.
  pub fn link(&self, key: &str) -> Result<&str> {
    self
      .get(key)?
      .url
      .as_deref()
      .ok_or_else(|| Error::Route(format!("route '{}' has no url", key)))
  }

  /// Full API URL for a route: base URL + `vMAJOR.MINOR` segment +
  /// placeholder-substituted endpoint template.
  pub fn api_endpoint(&self, key: &str, id: Option<&str>, child_id: Option<&str>) -> Result<String> {
    let route = self.get(key)?;

    let endpoint = route
      .endpoint
      .as_deref()
      .ok_or_else(|| Error::Route(format!("route '{}' is not an API endpoint", key)))?;
    let version = route
      .version
      .ok_or_else(|| Error::Route(format!("route '{}' has no API version", key)))?;

    let mut response = self.api_url.clone();
    if !response.ends_with('/') {
      response.push('/');
    }
    response.push_str(&format_api_version(version));
    response.push_str(&substitute(endpoint, id, child_id)?);

    Ok(response)
  }
}

/// `1` -> `v1.0`, `2.5` -> `v2.5`. Integer versions get a `.0` minor.
fn format_api_version(version: f64) -> String {
  if version.fract() == 0.0 {
    format!("v{}.0", version as i64)
  } else {
    format!("v{}", version)
  }
}

fn substitute(template: &str, id: Option<&str>, child_id: Option<&str>) -> Result<String> {
  let mut response = String::new();
  let mut parent_id_used = false;

  for segment in template.split('/') {
    if segment.is_empty() {
      continue;
    }

    if !response.ends_with('/') {
      response.push('/');
    }

    if let Some(stripped) = segment.strip_prefix(':') {
      let value = if !parent_id_used {
        parent_id_used = true;
        id
      } else {
        child_id
      };

      match value {
        Some(value) => response.push_str(value),
        None => {
          return Err(Error::Route(format!(
            "no id supplied for placeholder ':{}' in '{}'",
            stripped, template
          )))
        }
      }
    } else {
      response.push_str(segment);
    }
  }

  Ok(response)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn table() -> RouteTable {
    let mut table = RouteTable::new("https://api.example.com");
    table.add("users", Route::api("/users/:id", 1.0));
    table.add("articles", Route::api("/articles", 1.0));
    table.add(
      "article-comments",
      Route::api("/articles/:articleId/comments/:commentId", 2.5),
    );
    table.add(
      "profile",
      Route {
        endpoint: None,
        url: Some("/profile".to_string()),
        version: None,
      },
    );
    table
  }

  #[test]
  fn test_endpoint_with_id() {
    let url = table().api_endpoint("users", Some("42"), None).unwrap();
    assert_eq!(url, "https://api.example.com/v1.0/users/42");
  }

  #[test]
  fn test_endpoint_without_placeholders() {
    let url = table().api_endpoint("articles", None, None).unwrap();
    assert_eq!(url, "https://api.example.com/v1.0/articles");
  }

  #[test]
  fn test_fractional_version_kept() {
    let url = table()
      .api_endpoint("article-comments", Some("7"), Some("3"))
      .unwrap();
    assert_eq!(url, "https://api.example.com/v2.5/articles/7/comments/3");
  }

  #[test]
  fn test_missing_placeholder_id_is_fatal() {
    assert!(table().api_endpoint("users", None, None).is_err());
    assert!(table().api_endpoint("article-comments", Some("7"), None).is_err());
  }

  #[test]
  fn test_unknown_route() {
    assert!(table().get("nope").is_err());
  }

  #[test]
  fn test_link_route() {
    assert_eq!(table().link("profile").unwrap(), "/profile");
    assert!(table().link("users").is_err());
  }

  #[test]
  fn test_base_url_trailing_slash_normalized() {
    let mut table = RouteTable::new("https://api.example.com/");
    table.add("articles", Route::api("articles", 1.0));
    let url = table.api_endpoint("articles", None, None).unwrap();
    assert_eq!(url, "https://api.example.com/v1.0/articles");
  }
}
