use crate::error::{DeployError, Result};
use std::fmt;

/// A release tag of the form `v<major>.<minor>.<patch>[-<pre>[.<n>]]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticTag {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Pre-release identifier, e.g. "rc"
    pub pre_release: Option<String>,
    /// Pre-release iteration; 1 when the tag carries no explicit number
    pub pre_increment: u32,
}

impl SemanticTag {
    /// Create a plain release tag
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticTag {
            major,
            minor,
            patch,
            pre_release: None,
            pre_increment: 1,
        }
    }

    /// Parse a tag such as "v1.2.3", "v1.2.3-rc" or "v1.2.3-rc.4"
    ///
    /// The leading `v` is stripped and the rest split on `.` and `-`. Exactly
    /// three, four or five components are accepted.
    pub fn parse(tag: &str) -> Result<Self> {
        let unknown = || DeployError::unknown_tag_format(tag);

        let clean_tag = tag.strip_prefix('v').unwrap_or(tag);
        let parts: Vec<&str> = clean_tag.split(|c: char| c == '.' || c == '-').collect();

        let number = |part: &str| part.parse::<u32>().map_err(|_| unknown());

        let (major, minor, patch) = match parts.len() {
            3..=5 => (number(parts[0])?, number(parts[1])?, number(parts[2])?),
            _ => return Err(unknown()),
        };

        let pre_release = match parts.get(3) {
            Some(pre) if pre.is_empty() => return Err(unknown()),
            Some(pre) => Some(pre.to_string()),
            None => None,
        };

        let pre_increment = match parts.get(4) {
            Some(n) => number(n)?,
            None => 1,
        };

        Ok(SemanticTag {
            major,
            minor,
            patch,
            pre_release,
            pre_increment,
        })
    }

    /// Inspect the two `git describe` outputs for the release tag pattern.
    ///
    /// `described` is the full describe output (possibly with a
    /// `-<distance>-g<sha>` suffix), `nearest` the same query with
    /// `--abbrev=0`. Identical outputs mean HEAD already sits on a tag and
    /// `None` is returned.
    pub fn from_describe(described: &str, nearest: &str) -> Result<Option<Self>> {
        if described == nearest {
            return Ok(None);
        }
        Self::parse(nearest).map(Some)
    }

    /// Whether this tag is a pre-release build
    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }
}

impl fmt::Display for SemanticTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
            if self.pre_increment > 1 {
                write!(f, ".{}", self.pre_increment)?;
            }
        }
        Ok(())
    }
}
