//! Terminal rendering helpers

use chrono::{DateTime, Utc};
use std::io::IsTerminal;

/// Link `text` to `url`: an OSC 8 hyperlink on a terminal, `text <url>` otherwise
pub fn hyperlink(url: &str, text: &str) -> String {
  render_link(url, text, std::io::stdout().is_terminal())
}

fn render_link(url: &str, text: &str, ansi: bool) -> String {
  if ansi {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, text)
  } else {
    format!("{} <{}>", text, url)
  }
}

/// Coarse relative age such as "3 days ago"
pub fn humanize_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let seconds = (now - then).num_seconds();
  if seconds < 0 {
    return "in the future".to_string();
  }

  const MINUTE: i64 = 60;
  const HOUR: i64 = 60 * MINUTE;
  const DAY: i64 = 24 * HOUR;
  const MONTH: i64 = 30 * DAY;
  const YEAR: i64 = 365 * DAY;

  let (count, unit) = match seconds {
    s if s < MINUTE => return "just now".to_string(),
    s if s < HOUR => (s / MINUTE, "minute"),
    s if s < DAY => (s / HOUR, "hour"),
    s if s < MONTH => (s / DAY, "day"),
    s if s < YEAR => (s / MONTH, "month"),
    s => (s / YEAR, "year"),
  };

  if count == 1 {
    format!("a {} ago", unit).replace("a hour", "an hour")
  } else {
    format!("{} {}s ago", count, unit)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::ts;

  #[test]
  fn test_humanize_age() {
    let now = ts(1_000_000_000);
    assert_eq!(humanize_age(ts(1_000_000_000 - 5), now), "just now");
    assert_eq!(humanize_age(ts(1_000_000_000 - 90), now), "a minute ago");
    assert_eq!(humanize_age(ts(1_000_000_000 - 3_600), now), "an hour ago");
    assert_eq!(humanize_age(ts(1_000_000_000 - 3 * 86_400), now), "3 days ago");
    assert_eq!(humanize_age(ts(1_000_000_000 - 65 * 86_400), now), "2 months ago");
    assert_eq!(humanize_age(ts(1_000_000_000 - 800 * 86_400), now), "2 years ago");
    assert_eq!(humanize_age(ts(1_000_000_000 + 10), now), "in the future");
  }

  #[test]
  fn test_render_link() {
    assert_eq!(
      render_link("https://example.com/pr/1", "PR #1", false),
      "PR #1 <https://example.com/pr/1>"
    );
    let ansi = render_link("https://example.com/pr/1", "PR #1", true);
    assert!(ansi.starts_with("\x1b]8;;https://example.com/pr/1\x1b\\PR #1"));
  }
}
