// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Age-bounded on-disk JSON response cache keyed by (category, md5 of URL)
// role: storage/response-cache
// inputs: Cache root directory; request URLs; per-category max ages in seconds
// outputs: Cached serde_json::Value bodies; files under <root>/<category>/<md5-hex>
// side_effects: Creates category directories; writes/overwrites cache files
// invariants:
// - max_age == 0 never hits, even when a file exists
// - An entry at or past its max age is treated as absent
// - A malformed cache file is a miss, never an error
// - store overwrites any previous entry at the same key
// errors: lookup is infallible (miss on any fault); store surfaces IO errors with path context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

/// Flat file cache for raw JSON API responses.
///
/// One file per request, named by the md5 hex of the full URL, grouped into
/// category directories so volatile listings and immutable lookups can carry
/// different expiry policies. No locking: concurrent runs may race on the same
/// file, and the last writer wins.
#[derive(Debug, Clone)]
pub struct ResponseCache {
  root: PathBuf,
}

impl ResponseCache {
  pub fn new<P: Into<PathBuf>>(root: P) -> Self {
    Self { root: root.into() }
  }

  fn entry_path(&self, category: &str, url: &str) -> PathBuf {
    let digest = md5::compute(url.as_bytes());
    self.root.join(category).join(format!("{:x}", digest))
  }

  /// Return the cached body for `url` when present, fresher than `max_age`
  /// seconds, and parseable as JSON. Anything else is a miss.
  pub fn lookup(&self, category: &str, url: &str, max_age: u64) -> Option<serde_json::Value> {
    if max_age == 0 {
      return None;
    }

    let path = self.entry_path(category, url);
    let age = file_age_secs(&path)?;

    if age >= max_age {
      return None;
    }

    let raw = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&raw).ok()
  }

  /// Write `body` for `url`, creating the category directory if needed and
  /// overwriting any prior entry.
  pub fn store(&self, category: &str, url: &str, body: &serde_json::Value) -> Result<()> {
    let path = self.entry_path(category, url);

    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("creating cache dir {}", dir.display()))?;
    }

    let raw = serde_json::to_vec(body)?;
    std::fs::write(&path, raw).with_context(|| format!("writing cache entry {}", path.display()))?;

    Ok(())
  }
}

/// Age of a file in whole seconds, or `None` when it does not exist
/// (or the platform clock misbehaves).
fn file_age_secs(path: &Path) -> Option<u64> {
  let modified = std::fs::metadata(path).ok()?.modified().ok()?;
  let age = SystemTime::now().duration_since(modified).ok()?;
  Some(age.as_secs())
}
