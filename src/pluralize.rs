//! Naive English pluralization used to derive relationship key names.

/// Singular/plural heuristics matching the backend's relationship naming.
///
/// These are intentionally naive: they only need to agree with the server's
/// own transform, not with English at large.
pub struct Pluralizer;

impl Pluralizer {
  /// `category` -> `categories`, `post` -> `posts`, `news` -> `news`.
  pub fn plural(name: &str) -> String {
    let lower = name.to_lowercase();

    if lower.ends_with('y') {
      format!("{}ies", &name[..name.len() - 1])
    } else if lower.ends_with('s') {
      name.to_string()
    } else {
      format!("{}s", name)
    }
  }

  /// `categories` -> `category`, `addresses` -> `address`, `posts` -> `post`.
  pub fn singular(name: &str) -> String {
    let lower = name.to_lowercase();

    if lower.ends_with("ies") {
      format!("{}y", &name[..name.len() - 3])
    } else if lower.ends_with("sses") {
      name[..name.len() - 2].to_string()
    } else if lower.ends_with("ses") || name.ends_with('s') {
      name[..name.len() - 1].to_string()
    } else {
      name.to_string()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plural_y_to_ies() {
    assert_eq!(Pluralizer::plural("category"), "categories");
  }

  #[test]
  fn test_plural_appends_s() {
    assert_eq!(Pluralizer::plural("post"), "posts");
  }

  #[test]
  fn test_plural_trailing_s_unchanged() {
    assert_eq!(Pluralizer::plural("news"), "news");
  }

  #[test]
  fn test_singular_ies_to_y() {
    assert_eq!(Pluralizer::singular("categories"), "category");
  }

  #[test]
  fn test_singular_sses() {
    assert_eq!(Pluralizer::singular("addresses"), "address");
  }

  #[test]
  fn test_singular_trailing_s() {
    assert_eq!(Pluralizer::singular("posts"), "post");
  }

  #[test]
  fn test_singular_no_change() {
    assert_eq!(Pluralizer::singular("person"), "person");
  }
}
