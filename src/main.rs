use anyhow::Result;
use clap::Parser;

mod aggregate;
mod badges;
mod cache;
mod cli;
mod ext;
mod github;
mod levels;
mod util;

use crate::cli::{Cli, normalize};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI + environment into one validated config
  let cfg = normalize(cli)?;

  // Phase 2: tally contributions per contributor across the configured repos
  let api = github::HttpGithubApi::new(&cfg);
  let contributors = aggregate::scan_repos(&api, &cfg.repos)?;

  // Phase 3: report
  if cfg.flat {
    print!("{}", levels::render_flat(&contributors));
  } else {
    print!("{}", levels::render_by_level(&contributors));
  }

  // Phase 4: badge awards (optional path)
  if cfg.skip_awards {
    return Ok(());
  }

  let Some(auth) = &cfg.badge_auth else {
    println!("You must set BADGES_VALET_USERNAME and BADGES_VALET_PASSWORD for awarding badges.");
    return Ok(());
  };

  let assignments = badges::collect_badges(&contributors);
  let client = badges::BadgeClient::new(&cfg.badges_base, &auth.username, &auth.password);
  badges::award_all(&client, &assignments);

  Ok(())
}
