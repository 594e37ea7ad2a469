//! Tag version parsing
//!
//! Release tags come in many shapes: `v1.2.3`, `1.2.3-rc.1`, `tool@v2.0.0`, and the looser
//! forms used by Python-style projects (`1.2`, `1.2.0rc1`, `2.0a1`, `1.0.dev3`). Only the
//! distinction between a pre-release and a final release matters to the window resolver,
//! but the parsed version also breaks ties between tags on the same commit.

use regex::Regex;
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Loose numeric version with optional pre/post/dev segments
static LOOSE_VERSION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?ix)^
      (?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?(?:\.\d+)*
      (?:[-_.]?(?P<pre>a|b|c|rc|alpha|beta|pre|preview)[-_.]?(?P<pre_n>\d+)?)?
      (?:[-_.]?(?:post|rev|r)[-_.]?\d*)?
      (?:[-_.]?(?P<dev>dev)[-_.]?(?P<dev_n>\d+)?)?
      (?:\+[a-z0-9.]+)?
    $",
  )
  .unwrap_or_else(|e| panic!("invalid version pattern: {e}"))
});

/// A version parsed from a tag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVersion {
  /// Normalized semantic version (loose forms are mapped onto semver)
  pub version: Version,
}

impl TagVersion {
  /// Parse a tag name into a version
  ///
  /// Supports:
  /// - `v1.2.3`, `V1.2.3`, `1.2.3-beta.1` (semver)
  /// - `name@v1.2.3` (monorepo style prefix)
  /// - `1.2`, `1.2.0rc1`, `2.0a1`, `1.0.dev3`, `1.0.post1` (loose)
  pub fn parse(tag_name: &str) -> Option<Self> {
    let raw = match tag_name.rsplit_once('@') {
      Some((_, version)) => version,
      None => tag_name,
    };
    let raw = raw.strip_prefix(['v', 'V']).unwrap_or(raw);

    if let Ok(version) = Version::parse(raw) {
      return Some(Self { version });
    }

    Self::parse_loose(raw)
  }

  fn parse_loose(raw: &str) -> Option<Self> {
    let caps = LOOSE_VERSION.captures(raw)?;
    let number = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u64>().ok()).unwrap_or(0);

    let mut version = Version::new(number("major"), number("minor"), number("patch"));

    let pre = match (caps.name("pre"), caps.name("dev")) {
      (Some(kind), _) => Some(format!("{}.{}", kind.as_str().to_lowercase(), number("pre_n"))),
      (None, Some(_)) => Some(format!("dev.{}", number("dev_n"))),
      (None, None) => None,
    };
    if let Some(pre) = pre {
      version.pre = Prerelease::new(&pre).ok()?;
    }

    Some(Self { version })
  }

  /// True for alpha/beta/rc/dev style versions
  pub fn is_prerelease(&self) -> bool {
    !self.version.pre.is_empty()
  }
}

impl PartialOrd for TagVersion {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for TagVersion {
  fn cmp(&self, other: &Self) -> Ordering {
    self.version.cmp(&other.version)
  }
}
