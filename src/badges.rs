// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Map contributors to badge slugs and submit batched award POSTs to the badge service
// role: client/badge-awards
// inputs: ContributorSet; badge service base URL and basic-auth credentials
// outputs: One POST per badge slug; AwardOutcome per badge; progress lines on stdout
// side_effects: Uncached POSTs to the badge service
// invariants:
// - Contributors without an email are skipped with a diagnostic, never POSTed
// - Every met threshold badge applies, not just the highest (distinct from display bucketing)
// - A failed award for one badge never blocks the remaining badges
// errors: award surfaces non-200 responses with status and raw body; award_all prints and continues
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use once_cell::sync::Lazy;

use crate::aggregate::ContributorSet;

// Everyone with an email gets these two: anyone who landed a commit almost
// certainly forked and opened a pull request, and the source data cannot
// tell us otherwise. An approximation carried from the original tool, not
// verified activity.
pub const FORK_BADGE: &str = "webdev-fork-a-repo";
pub const PULL_REQUEST_BADGE: &str = "webdev-submit-a-pull-request";

/// Threshold badges, ascending. Unlike the display levels, ALL met
/// thresholds award.
pub static COMMIT_BADGES: Lazy<Vec<(u64, &'static str)>> = Lazy::new(|| {
  vec![
    (1, "webdev-1-pull-request-merged"),
    (10, "webdev-10-pull-requests-merged"),
    (25, "webdev-25-pull-requests-merged"),
    (50, "webdev-50-pull-requests-merged"),
    (100, "webdev-100-pull-requests-merged"),
  ]
});

/// Per-badge outcome parsed from the award service response.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AwardOutcome {
  pub awarded: Vec<String>,
  pub already_awarded: Vec<String>,
  pub failed: Vec<(String, String)>,
}

/// Group badge slugs with the emails they should be awarded to, built fresh
/// from current contributor state. Contributors lacking an email are skipped
/// entirely with a diagnostic.
pub fn collect_badges(set: &ContributorSet) -> BTreeMap<&'static str, Vec<String>> {
  let mut assignments: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

  for contributor in set.iter() {
    let Some(email) = &contributor.email else {
      eprintln!("No email found for {}", contributor.username);
      continue;
    };

    assignments.entry(FORK_BADGE).or_default().push(email.clone());
    assignments.entry(PULL_REQUEST_BADGE).or_default().push(email.clone());

    for (threshold, slug) in COMMIT_BADGES.iter() {
      if contributor.contributions >= *threshold {
        assignments.entry(*slug).or_default().push(email.clone());
      }
    }
  }

  assignments
}

/// Split an award response into awarded / already-awarded / failed emails.
/// `successes` keys are awards; `errors` entries with the literal
/// `ALREADYAWARDED` sentinel are old news, anything else is a real failure.
pub fn parse_award_response(body: &serde_json::Value) -> AwardOutcome {
  let mut outcome = AwardOutcome::default();

  if let Some(successes) = body.get("successes").and_then(|v| v.as_object()) {
    outcome.awarded = successes.keys().cloned().collect();
  }

  if let Some(errors) = body.get("errors").and_then(|v| v.as_object()) {
    for (email, reason) in errors {
      let reason = reason.as_str().unwrap_or_default();

      if reason == "ALREADYAWARDED" {
        outcome.already_awarded.push(email.clone());
      } else {
        outcome.failed.push((email.clone(), reason.to_string()));
      }
    }
  }

  outcome
}

pub struct BadgeClient {
  agent: ureq::Agent,
  base: String,
  authorization: String,
}

impl BadgeClient {
  pub fn new(base: &str, username: &str, password: &str) -> Self {
    // Non-200 award responses carry a useful body, so keep them as responses
    // instead of transport errors.
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .http_status_as_error(false)
      .build()
      .into();

    let token = BASE64.encode(format!("{}:{}", username, password));

    Self {
      agent,
      base: base.trim_end_matches('/').to_string(),
      authorization: format!("Basic {}", token),
    }
  }

  /// `POST {base}/{slug}/awards` with the full email list and an empty
  /// description. No retry; the caller decides what a failure means.
  pub fn award(&self, slug: &str, emails: &[String]) -> Result<AwardOutcome> {
    let url = format!("{}/{}/awards", self.base, slug);

    let mut resp = self
      .agent
      .post(&url)
      .header("Authorization", self.authorization.as_str())
      .send_json(serde_json::json!({ "emails": emails, "description": "" }))
      .with_context(|| format!("POST {}", url))?;

    let status = resp.status().as_u16();

    if status != 200 {
      let body = resp.body_mut().read_to_string().unwrap_or_default();
      bail!("awarding badge {} failed (status {}): {}", slug, status, body);
    }

    let body = resp
      .body_mut()
      .read_json::<serde_json::Value>()
      .with_context(|| format!("decoding award response for {}", slug))?;

    Ok(parse_award_response(&body))
  }
}

/// Submit one award call per badge, printing outcomes as we go. An error for
/// one badge is reported and does not block the next.
pub fn award_all(client: &BadgeClient, assignments: &BTreeMap<&'static str, Vec<String>>) {
  for (slug, emails) in assignments {
    println!("Awarding the {} badge.", slug);

    match client.award(slug, emails) {
      Ok(outcome) => {
        if !outcome.awarded.is_empty() {
          println!("Badge awarded to: {}", outcome.awarded.join(", "));
        }
        if !outcome.already_awarded.is_empty() {
          println!("Badge had already been awarded to: {}", outcome.already_awarded.join(", "));
        }
        for (email, reason) in &outcome.failed {
          println!("Error awarding badge to {}: {}", email, reason);
        }
      }
      Err(err) => {
        eprintln!("{:#}", err);
      }
    }
  }
}
