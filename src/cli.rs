use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

/// Repositories scanned when no `--repo` override is given; all live under
/// the organization namespace in `--org-base`.
pub const DEFAULT_REPOS: &[&str] = &[
  "airmozilla",
  "amo-validator",
  "app-validator",
  "badges.mozilla.org",
  "basket",
  "basket-client",
  "bedrock",
  "django-badger",
  "django-browserid",
  "elasticutils",
  "elmo",
  "firefox-flicks",
  "fireplace",
  "fjord",
  "funfactory",
  "high-fidelity",
  "input.mozilla.org",
  "KitchenSink",
  "kitsune",
  "kuma",
  "mozillians",
  "nocturnal",
  "playdoh",
  "playdoh-docs",
  "remo",
  "scrumbugz",
  "SocialShare",
  "socorro",
  "solitude",
  "unicode-slugify",
  "webdev-bootcamp",
  "webdev-contributors",
  "zamboni",
];

pub const DEFAULT_ORG_BASE: &str = "https://api.github.com/repos/mozilla";
pub const DEFAULT_BADGES_BASE: &str = "https://badges.mozilla.org/en-US/badges/badge";

const DEFAULT_REPOS_CACHE_AGE: u64 = 60 * 60;
const DEFAULT_EMAIL_CACHE_AGE: u64 = 60 * 60 * 24 * 7;

#[derive(Parser, Debug)]
#[command(
    name = "contributor-badges",
    version,
    about = "Tally GitHub contributions across an org's repos and award contributor badges",
    long_about = None
)]
pub struct Cli {
  /// Repository to scan (repeatable); defaults to the built-in list
  #[arg(long = "repo")]
  pub repos: Vec<String>,

  /// Base URL for repository API calls, one org namespace deep
  #[arg(long, default_value = DEFAULT_ORG_BASE)]
  pub org_base: String,

  /// Base URL of the badge service
  #[arg(long, default_value = DEFAULT_BADGES_BASE)]
  pub badges_base: String,

  /// Root directory for the response cache
  #[arg(long, default_value = "cache")]
  pub cache_dir: PathBuf,

  /// Disable the response cache; every request goes to the network
  #[arg(long)]
  pub no_cache: bool,

  /// Print the flat "login, count, repos" report instead of the grouped one
  #[arg(long)]
  pub flat: bool,

  /// Aggregate and report only; never contact the badge service
  #[arg(long)]
  pub skip_awards: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeAuth {
  pub username: String,
  pub password: String,
}

/// Validated run configuration, merged from CLI flags and environment.
/// Built once at startup and passed by reference to the components that
/// need it.
#[derive(Debug, Serialize)]
pub struct EffectiveConfig {
  pub repos: Vec<String>,
  pub org_base: String,
  pub badges_base: String,
  pub cache_dir: PathBuf,
  pub cache_enabled: bool,
  pub client_id: Option<String>,
  pub client_secret: Option<String>,
  pub repos_cache_age: u64,
  pub email_cache_age: u64,
  pub badge_auth: Option<BadgeAuth>,
  pub flat: bool,
  pub skip_awards: bool,
}

/// Read an env var, treating absence and whitespace-only values as unset.
fn env_nonempty(name: &str) -> Option<String> {
  match std::env::var(name) {
    Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
    _ => None,
  }
}

/// Read a seconds value from the environment, falling back to `default`.
/// A present-but-unparseable value is a startup error, not a silent default.
fn env_age(name: &str, default: u64) -> Result<u64> {
  match env_nonempty(name) {
    Some(raw) => raw
      .parse::<u64>()
      .with_context(|| format!("{} must be a number of seconds, got {:?}", name, raw)),
    None => Ok(default),
  }
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.org_base.trim_end_matches('/').is_empty() {
    bail!("--org-base must not be empty");
  }

  let repos = if cli.repos.is_empty() {
    DEFAULT_REPOS.iter().map(|r| r.to_string()).collect()
  } else {
    cli.repos
  };

  // GitHub client credentials only count when both halves are present.
  let client_id = env_nonempty("GITHUB_CLIENT_ID");
  let client_secret = env_nonempty("GITHUB_CLIENT_SECRET");
  let (client_id, client_secret) = match (client_id, client_secret) {
    (Some(id), Some(secret)) => (Some(id), Some(secret)),
    _ => (None, None),
  };

  let repos_cache_age = env_age("GITHUB_REPOS_CACHE_AGE", DEFAULT_REPOS_CACHE_AGE)?;
  let email_cache_age = env_age("GITHUB_EMAIL_CACHE_AGE", DEFAULT_EMAIL_CACHE_AGE)?;

  let badge_auth = match (
    env_nonempty("BADGES_VALET_USERNAME"),
    env_nonempty("BADGES_VALET_PASSWORD"),
  ) {
    (Some(username), Some(password)) => Some(BadgeAuth { username, password }),
    _ => None,
  };

  Ok(EffectiveConfig {
    repos,
    org_base: cli.org_base.trim_end_matches('/').to_string(),
    badges_base: cli.badges_base.trim_end_matches('/').to_string(),
    cache_dir: cli.cache_dir,
    cache_enabled: !cli.no_cache,
    client_id,
    client_secret,
    repos_cache_age,
    email_cache_age,
    badge_auth,
    flat: cli.flat,
    skip_awards: cli.skip_awards,
  })
}
