//! Semantic versions as this project publishes them.
//!
//! Only two shapes exist on the registry: `X.Y.Z` for stable and LTS releases,
//! and `X.Y.Z-<alpha|beta>.N` for the canary and beta channels.

use crate::error::{ReleaseError, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pre-release identifier used by the pre-release channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrereleaseId {
    /// Nightly canary builds
    Alpha,
    /// Weekly beta builds
    Beta,
}

impl FromStr for PrereleaseId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "alpha" => Ok(PrereleaseId::Alpha),
            "beta" => Ok(PrereleaseId::Beta),
            other => Err(ReleaseError::malformed(other)),
        }
    }
}

impl fmt::Display for PrereleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrereleaseId::Alpha => write!(f, "alpha"),
            PrereleaseId::Beta => write!(f, "beta"),
        }
    }
}

/// Pre-release segment, e.g. `beta.3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Prerelease {
    pub identifier: PrereleaseId,
    pub number: u64,
}

impl Prerelease {
    pub fn new(identifier: PrereleaseId, number: u64) -> Self {
        Prerelease { identifier, number }
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.identifier, self.number)
    }
}

/// Semantic version representation
///
/// Ordering compares `major`, `minor` and `patch` numerically. A release sorts
/// above every pre-release of the same core. Two pre-releases of the same core
/// are only comparable when they carry the same identifier, so `partial_cmp`
/// returns `None` for e.g. `3.1.0-alpha.4` vs `3.1.0-beta.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<Prerelease>,
}

/// Largest accepted number in any version segment. Keeps every increment
/// within `u64`.
const MAX_SEGMENT: u64 = u32::MAX as u64;

fn parse_number(part: &str, input: &str) -> Result<u64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ReleaseError::malformed(input));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(ReleaseError::malformed(input));
    }
    part.parse::<u64>()
        .ok()
        .filter(|n| *n <= MAX_SEGMENT)
        .ok_or_else(|| ReleaseError::malformed(input))
}

impl SemanticVersion {
    /// Create a release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Create a pre-release version
    pub fn prerelease(
        major: u64,
        minor: u64,
        patch: u64,
        identifier: PrereleaseId,
        number: u64,
    ) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: Some(Prerelease::new(identifier, number)),
        }
    }

    /// Parse `X.Y.Z` or `X.Y.Z-<alpha|beta>.N`
    pub fn parse(input: &str) -> Result<Self> {
        let (core, pre) = match input.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (input, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(ReleaseError::malformed(input));
        }

        let major = parse_number(parts[0], input)?;
        let minor = parse_number(parts[1], input)?;
        let patch = parse_number(parts[2], input)?;

        let prerelease = match pre {
            Some(pre) => {
                let (identifier, number) = pre
                    .split_once('.')
                    .ok_or_else(|| ReleaseError::malformed(input))?;
                let identifier = identifier
                    .parse::<PrereleaseId>()
                    .map_err(|_| ReleaseError::malformed(input))?;
                Some(Prerelease::new(identifier, parse_number(number, input)?))
            }
            None => None,
        };

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// Whether this is a stable release (no pre-release segment)
    pub fn is_release(&self) -> bool {
        self.prerelease.is_none()
    }

    /// Pre-release identifier, if any
    pub fn identifier(&self) -> Option<PrereleaseId> {
        self.prerelease.map(|p| p.identifier)
    }

    /// Two versions are in the same cycle when major and minor match
    pub fn same_cycle(&self, other: &SemanticVersion) -> bool {
        self.front() == other.front()
    }

    /// The `(major, minor)` pair identifying this version's cycle
    pub fn front(&self) -> (u64, u64) {
        (self.major, self.minor)
    }

    /// Next patch release. A pre-release is promoted to its own core instead.
    pub fn next_patch(&self) -> Self {
        if self.prerelease.is_some() {
            return SemanticVersion::new(self.major, self.minor, self.patch);
        }
        SemanticVersion::new(self.major, self.minor, self.patch + 1)
    }

    /// Next minor release. `X.Y.0-pre` is promoted to `X.Y.0`.
    pub fn next_minor(&self) -> Self {
        if self.prerelease.is_some() && self.patch == 0 {
            return SemanticVersion::new(self.major, self.minor, 0);
        }
        SemanticVersion::new(self.major, self.minor + 1, 0)
    }

    /// Next major release. `X.0.0-pre` is promoted to `X.0.0`.
    pub fn next_major(&self) -> Self {
        if self.prerelease.is_some() && self.minor == 0 && self.patch == 0 {
            return SemanticVersion::new(self.major, 0, 0);
        }
        SemanticVersion::new(self.major + 1, 0, 0)
    }

    /// Next pre-release on `identifier`.
    ///
    /// Increments the counter when already on that identifier, switches to
    /// `identifier.0` on the same core when on another one, and starts
    /// `identifier.0` on the next patch when this is a release.
    pub fn next_prerelease(&self, identifier: PrereleaseId) -> Self {
        match self.prerelease {
            Some(pre) if pre.identifier == identifier => SemanticVersion::prerelease(
                self.major,
                self.minor,
                self.patch,
                identifier,
                pre.number + 1,
            ),
            Some(_) => {
                SemanticVersion::prerelease(self.major, self.minor, self.patch, identifier, 0)
            }
            None => {
                SemanticVersion::prerelease(self.major, self.minor, self.patch + 1, identifier, 0)
            }
        }
    }

    /// First pre-release of the next minor line
    pub fn pre_minor(&self, identifier: PrereleaseId) -> Self {
        SemanticVersion::prerelease(self.major, self.minor + 1, 0, identifier, 0)
    }

    /// First pre-release of the next major line
    pub fn pre_major(&self, identifier: PrereleaseId) -> Self {
        SemanticVersion::prerelease(self.major + 1, 0, 0, identifier, 0)
    }
}

impl FromStr for SemanticVersion {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let core = (self.major, self.minor, self.patch).cmp(&(
            other.major,
            other.minor,
            other.patch,
        ));
        if core != Ordering::Equal {
            return Some(core);
        }

        match (self.prerelease, other.prerelease) {
            (None, None) => Some(Ordering::Equal),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(_), None) => Some(Ordering::Less),
            (Some(a), Some(b)) if a.identifier == b.identifier => Some(a.number.cmp(&b.number)),
            (Some(_), Some(_)) => None,
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}
