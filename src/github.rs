// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Blocking GitHub REST client: URL building with optional client credentials, cached GETs
// role: client/github-api
// inputs: EffectiveConfig (org base, credentials, cache settings); repo names and logins
// outputs: Parsed serde_json::Value bodies from the contributors and commits endpoints
// side_effects: Network GETs; cache files written under the configured cache root
// invariants:
// - client_id/client_secret appear in URLs only when both are configured
// - A cached GET never hits the network on a fresh entry; an uncached GET always does
// - Non-2xx GitHub responses are errors (fail-fast), not silently empty
// errors: Transport, status, and decode failures propagate with the URL in context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};

use crate::cache::ResponseCache;
use crate::cli::EffectiveConfig;

/// Cache category for the volatile per-repo contributor listings.
pub const CONTRIBUTORS_CACHE: &str = "repocontributors";
/// Cache category for the effectively immutable commit lookups.
pub const EMAIL_CACHE: &str = "email";

/// The two read operations this tool needs from GitHub. A trait seam so the
/// aggregator can be exercised against an in-memory fake.
pub trait GithubApi {
  /// `GET {org_base}/{repo}/contributors`
  fn repo_contributors(&self, repo: &str) -> Result<serde_json::Value>;

  /// `GET {org_base}/{repo}/commits?author={login}` (first page only)
  fn commits_by_author(&self, repo: &str, login: &str) -> Result<serde_json::Value>;
}

pub struct HttpGithubApi {
  agent: ureq::Agent,
  org_base: String,
  client_id: Option<String>,
  client_secret: Option<String>,
  cache: Option<ResponseCache>,
  repos_cache_age: u64,
  email_cache_age: u64,
}

impl HttpGithubApi {
  pub fn new(cfg: &EffectiveConfig) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder().build().into();

    let cache = cfg
      .cache_enabled
      .then(|| ResponseCache::new(cfg.cache_dir.clone()));

    Self {
      agent,
      org_base: cfg.org_base.clone(),
      client_id: cfg.client_id.clone(),
      client_secret: cfg.client_secret.clone(),
      cache,
      repos_cache_age: cfg.repos_cache_age,
      email_cache_age: cfg.email_cache_age,
    }
  }

  /// Join the org base with `path` and append client credentials (when both
  /// are configured) followed by caller params, percent-encoded.
  fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<String> {
    let joined = format!("{}/{}", self.org_base.trim_end_matches('/'), path);
    let mut url = url::Url::parse(&joined).with_context(|| format!("invalid API URL {}", joined))?;

    {
      let mut pairs = url.query_pairs_mut();

      if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
        pairs.append_pair("client_id", id);
        pairs.append_pair("client_secret", secret);
      }

      for (k, v) in params {
        pairs.append_pair(k, v);
      }
    }

    // An empty pair set leaves a dangling '?'
    if url.query() == Some("") {
      url.set_query(None);
    }

    Ok(url.into())
  }

  fn fetch(&self, url: &str) -> Result<serde_json::Value> {
    let mut resp = self
      .agent
      .get(url)
      .header("Accept", "application/vnd.github+json")
      .header("User-Agent", "contributor-badges")
      .call()
      .with_context(|| format!("GET {}", url))?;

    resp
      .body_mut()
      .read_json::<serde_json::Value>()
      .with_context(|| format!("decoding response from {}", url))
  }

  /// Cached GET: serve a fresh cache entry when one exists, otherwise fetch
  /// live and write the body back. `cache = None` bypasses the cache entirely.
  fn get_json(&self, path: &str, params: &[(&str, &str)], cache: Option<(&str, u64)>) -> Result<serde_json::Value> {
    let url = self.api_url(path, params)?;

    if let (Some(store), Some((category, max_age))) = (&self.cache, cache) {
      if let Some(hit) = store.lookup(category, &url, max_age) {
        return Ok(hit);
      }

      let body = self.fetch(&url)?;
      store.store(category, &url, &body)?;

      return Ok(body);
    }

    self.fetch(&url)
  }
}

impl GithubApi for HttpGithubApi {
  fn repo_contributors(&self, repo: &str) -> Result<serde_json::Value> {
    self.get_json(
      &format!("{}/contributors", repo),
      &[],
      Some((CONTRIBUTORS_CACHE, self.repos_cache_age)),
    )
  }

  fn commits_by_author(&self, repo: &str, login: &str) -> Result<serde_json::Value> {
    self.get_json(
      &format!("{}/commits", repo),
      &[("author", login)],
      Some((EMAIL_CACHE, self.email_cache_age)),
    )
  }
}
