// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fold per-repo contributor listings into a ContributorSet and resolve emails from first commits
// role: core/aggregation
// inputs: GithubApi implementation; ordered repo list
// outputs: ContributorSet keyed by login with summed counts, ordered repo lists, optional emails
// side_effects: Progress lines on stdout; lookup diagnostics on stderr
// invariants:
// - A login's total is the exact sum of its contributions value across every listing it appears in
// - Repo lists preserve first-seen order, duplicates included when configuration repeats a name
// - An email, once set, is never overwritten
// - Email lookup failures never abort the run; a malformed contributor listing does
// errors: Listing decode and fetch errors propagate; commit-lookup faults degrade to diagnostics
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ext::serde_json::JsonPluck;
use crate::github::GithubApi;

#[derive(Debug, Clone, Serialize)]
pub struct Contributor {
  pub username: String,
  pub contributions: u64,
  pub repos: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
}

/// Accumulator for the whole scan, keyed by login. An explicit value that the
/// pipeline passes along rather than a process-wide map.
#[derive(Debug, Default)]
pub struct ContributorSet {
  map: BTreeMap<String, Contributor>,
}

impl ContributorSet {
  /// Fold one listing entry in: sum the count and append the repo name.
  /// Returns the (possibly new) contributor for follow-up email resolution.
  pub fn record(&mut self, login: &str, contributions: u64, repo: &str) -> &mut Contributor {
    let contributor = self.map.entry(login.to_string()).or_insert_with(|| Contributor {
      username: login.to_string(),
      contributions: 0,
      repos: Vec::new(),
      email: None,
    });

    contributor.contributions += contributions;
    contributor.repos.push(repo.to_string());

    contributor
  }

  pub fn get(&self, login: &str) -> Option<&Contributor> {
    self.map.get(login)
  }

  /// Contributors in login order.
  pub fn iter(&self) -> impl Iterator<Item = &Contributor> {
    self.map.values()
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

/// One entry of a `/contributors` listing; GitHub sends more fields, which
/// deserialization ignores.
#[derive(Debug, Deserialize)]
struct ListingEntry {
  login: String,
  contributions: u64,
}

/// Outcome of inspecting a `/commits?author=` page for an email address.
/// "No commits" and "response shape we do not understand" are kept apart so
/// the two get distinct diagnostics.
#[derive(Debug, PartialEq, Eq)]
pub enum EmailLookup {
  Found(String),
  NoCommits,
  Malformed,
}

/// Read `commit.author.email` from the first entry of a commits page.
pub fn extract_author_email(commits: &serde_json::Value) -> EmailLookup {
  let Some(entries) = commits.as_array() else {
    return EmailLookup::Malformed;
  };

  let Some(first) = entries.first() else {
    return EmailLookup::NoCommits;
  };

  match first.pluck_as::<String>("commit.author.email") {
    Some(email) => EmailLookup::Found(email),
    None => EmailLookup::Malformed,
  }
}

/// Scan every configured repo and build the contributor set.
///
/// Per repo: fetch the contributor listing (cached, short TTL), fold each
/// entry, and for contributors without an email yet, look one up from their
/// first commit in that repo (cached, long TTL). Lookup faults leave the
/// email unset; the contributor still counts.
pub fn scan_repos(api: &dyn GithubApi, repos: &[String]) -> Result<ContributorSet> {
  let mut set = ContributorSet::default();

  for repo in repos {
    println!("Fetching contributors for {}", repo);

    let listing = api.repo_contributors(repo)?;
    let entries: Vec<ListingEntry> = serde_json::from_value(listing)
      .with_context(|| format!("unexpected contributors payload for {}", repo))?;

    for entry in entries {
      let contributor = set.record(&entry.login, entry.contributions, repo);

      if contributor.email.is_some() {
        continue;
      }

      println!("Fetching email for {}", entry.login);

      match api.commits_by_author(repo, &entry.login) {
        Ok(commits) => match extract_author_email(&commits) {
          EmailLookup::Found(email) => contributor.email = Some(email),
          EmailLookup::NoCommits => {
            eprintln!("No commits found for {} in {}", entry.login, repo);
          }
          EmailLookup::Malformed => {
            eprintln!("Unexpected commits payload for {} in {}", entry.login, repo);
          }
        },
        Err(err) => {
          eprintln!("Commit lookup failed for {} in {}: {:#}", entry.login, repo, err);
        }
      }
    }
  }

  Ok(set)
}
