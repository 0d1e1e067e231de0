use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::aggregate::{Contributor, ContributorSet};
use crate::util;

/// Contribution thresholds, highest first. Display bucketing stops at the
/// first met threshold; badge eligibility (see `badges`) deliberately does
/// not, and the two policies are kept separate.
pub const COMMIT_LEVELS: [u64; 5] = [100, 50, 25, 10, 1];

/// Group contributors under the highest threshold their total meets.
/// A contributor below every threshold lands in no bucket (but stays in the
/// flat set for badge purposes).
pub fn bucket_by_level(set: &ContributorSet) -> BTreeMap<u64, Vec<&Contributor>> {
  let mut buckets: BTreeMap<u64, Vec<&Contributor>> = BTreeMap::new();

  for contributor in set.iter() {
    for level in COMMIT_LEVELS {
      if contributor.contributions >= level {
        buckets.entry(level).or_default().push(contributor);
        break;
      }
    }
  }

  buckets
}

fn header_line() -> String {
  format!("Contributor report generated {}\n", util::now_rfc3339())
}

/// Grouped report: a banner per non-empty level, highest first, one
/// `login <email>` line per contributor.
pub fn render_by_level(set: &ContributorSet) -> String {
  let buckets = bucket_by_level(set);
  let mut out = header_line();

  for level in COMMIT_LEVELS {
    let Some(group) = buckets.get(&level) else { continue };

    writeln!(out, "========== {}+ ==========", level).expect("write to string");

    for contributor in group {
      match &contributor.email {
        Some(email) => writeln!(out, "{} <{}>", contributor.username, email),
        None => writeln!(out, "{}", contributor.username),
      }
      .expect("write to string");
    }
  }

  out
}

/// Flat report: `login, count, repo repo ...` per contributor, login order.
pub fn render_flat(set: &ContributorSet) -> String {
  let mut out = header_line();

  for contributor in set.iter() {
    writeln!(
      out,
      "{}, {}, {}",
      contributor.username,
      contributor.contributions,
      contributor.repos.join(" ")
    )
    .expect("write to string");
  }

  out
}
