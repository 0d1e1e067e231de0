// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small shared helpers: timestamp formatting and man page rendering
// role: utilities/helpers
// inputs: clap CommandFactory; system clock
// outputs: RFC3339 strings; troff man page text
// invariants: now_rfc3339 is second-precision with Z suffix for UTC offsets
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use clap::CommandFactory;

/// Current local time as a second-precision RFC3339 string.
pub fn now_rfc3339() -> String {
  Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
