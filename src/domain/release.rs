//! Next-release computation for production tags.
//!
//! Increments are plain arithmetic over the parsed tag. Only the `rc`
//! pre-release convention is produced.

use crate::domain::tag::SemanticTag;
use crate::error::{DeployError, Result};
use std::fmt;
use std::str::FromStr;

/// The kind of release to cut from the current tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseKind {
    Major,
    Minor,
    Patch,
    RcMajor,
    RcMinor,
    Rc,
}

impl ReleaseKind {
    /// All kinds in presentation order
    pub const ALL: [ReleaseKind; 6] = [
        ReleaseKind::Major,
        ReleaseKind::Minor,
        ReleaseKind::Patch,
        ReleaseKind::RcMajor,
        ReleaseKind::RcMinor,
        ReleaseKind::Rc,
    ];

    /// The key used on the command line
    pub fn key(&self) -> &'static str {
        match self {
            ReleaseKind::Major => "major",
            ReleaseKind::Minor => "minor",
            ReleaseKind::Patch => "patch",
            ReleaseKind::RcMajor => "rcmajor",
            ReleaseKind::RcMinor => "rcminor",
            ReleaseKind::Rc => "rc",
        }
    }
}

impl FromStr for ReleaseKind {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self> {
        ReleaseKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| DeployError::unknown_release_type(s))
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The next tags reachable from a given tag, keyed by release kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTagSet {
    entries: Vec<(ReleaseKind, String)>,
}

impl CandidateTagSet {
    /// Iterate candidates in presentation order
    pub fn iter(&self) -> impl Iterator<Item = (ReleaseKind, &str)> {
        self.entries.iter().map(|(kind, tag)| (*kind, tag.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, kind: ReleaseKind) -> Option<&str> {
        self.iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, tag)| tag)
    }

    /// Keys in presentation order, e.g. for prompts and error messages
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(kind, _)| kind.key()).collect()
    }

    /// Resolve the user's chosen key into the concrete tag
    ///
    /// A key that is not part of this set (including `rc` for a tag without a
    /// pre-release) is an unknown release type.
    pub fn resolve(&self, key: &str) -> Result<&str> {
        let kind: ReleaseKind = key.parse()?;
        self.get(kind)
            .ok_or_else(|| DeployError::unknown_release_type(key))
    }
}

impl SemanticTag {
    /// Compute every candidate next tag.
    ///
    /// `rc` is offered only when the current tag is itself a pre-release. The
    /// first release candidate carries no number, so the `.N` suffix is only
    /// written when the next increment is above 1.
    ///
    /// # Returns
    /// * `Err(UnknownTagFormat)` - If a component is already at `u32::MAX`
    pub fn candidates(&self) -> Result<CandidateTagSet> {
        let (major, minor, patch) = (self.major, self.minor, self.patch);
        let bump = |n: u32| {
            n.checked_add(1)
                .ok_or_else(|| DeployError::unknown_tag_format(self.to_string()))
        };
        let (next_major, next_minor) = (bump(major)?, bump(minor)?);

        let mut entries = vec![
            (ReleaseKind::Major, format!("v{}.0.0", next_major)),
            (ReleaseKind::Minor, format!("v{}.{}.0", major, next_minor)),
            (ReleaseKind::Patch, format!("v{}.{}.{}", major, minor, bump(patch)?)),
            (ReleaseKind::RcMajor, format!("v{}.0.0-rc", next_major)),
            (ReleaseKind::RcMinor, format!("v{}.{}.0-rc", major, next_minor)),
        ];

        if self.is_pre_release() {
            let next = bump(self.pre_increment)?;
            let suffix = if next > 1 {
                format!(".{}", next)
            } else {
                String::new()
            };
            entries.push((
                ReleaseKind::Rc,
                format!("v{}.{}.{}-rc{}", major, minor, patch, suffix),
            ));
        }

        Ok(CandidateTagSet { entries })
    }
}
