// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dotted-path navigation and typed extraction for serde_json::Value
// role: extension/serde_json
// outputs: JsonPluck trait for walking nested objects like "commit.author.email"
// invariants: No panics; a missing segment yields None; typed extraction failures yield None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::de::DeserializeOwned;

/// Walk nested JSON objects via dotted paths.
pub trait JsonPluck {
  /// Borrow the value at `path`, or `None` when any segment is absent.
  fn pluck(&self, path: &str) -> Option<&serde_json::Value>;

  /// Deserialize the value at `path` as `T`, or `None` on absence or type mismatch.
  fn pluck_as<T>(&self, path: &str) -> Option<T>
  where
    T: DeserializeOwned,
  {
    self.pluck(path).and_then(|v| serde_json::from_value(v.clone()).ok())
  }
}

impl JsonPluck for serde_json::Value {
  fn pluck(&self, path: &str) -> Option<&serde_json::Value> {
    if path.is_empty() {
      return Some(self);
    }

    let mut cur = self;

    for segment in path.split('.') {
      cur = cur.get(segment)?;
    }

    Some(cur)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pluck_top_level_and_nested() {
    let v = serde_json::json!({
      "sha": "abc",
      "commit": { "author": { "email": "a@example.com" } }
    });

    assert_eq!(v.pluck("sha").and_then(|x| x.as_str()), Some("abc"));
    assert_eq!(
      v.pluck_as::<String>("commit.author.email").as_deref(),
      Some("a@example.com")
    );
    assert!(v.pluck("commit.committer.email").is_none());
    assert!(v.pluck("").is_some());
  }

  #[test]
  fn pluck_as_type_mismatch_is_none() {
    let v = serde_json::json!({ "n": "not-a-number" });
    assert_eq!(v.pluck_as::<i64>("n"), None);
  }
}
