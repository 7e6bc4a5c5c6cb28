use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// A release train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Stable releases, published as `latest`
    Release,
    /// Long-term-support line cut from a past stable release
    Lts,
    /// Weekly pre-releases
    Beta,
    /// Nightly pre-releases (`alpha` identifier)
    Canary,
    /// Patch release of a historical `release-<major>-<minor>` line
    Bugfix { major: u64, minor: u64 },
}

impl Channel {
    /// Parse a channel name as given on the command line
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "release" => Ok(Channel::Release),
            "lts" => Ok(Channel::Lts),
            "beta" => Ok(Channel::Beta),
            "canary" => Ok(Channel::Canary),
            other => parse_bugfix_line(other)
                .ok_or_else(|| ReleaseError::UnresolvedChannel(other.to_string())),
        }
    }

    /// Registry distribution tag used when none is given explicitly
    pub fn default_dist_tag(&self) -> String {
        match self {
            Channel::Release => "latest".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_bugfix(&self) -> bool {
        matches!(self, Channel::Bugfix { .. })
    }
}

fn parse_bugfix_line(name: &str) -> Option<Channel> {
    let captures = Regex::new(r"^release-(\d+)-(\d+)$")
        .ok()
        .and_then(|re| re.captures(name))?;

    let major = captures.get(1)?.as_str().parse::<u64>().ok()?;
    let minor = captures.get(2)?.as_str().parse::<u64>().ok()?;

    Some(Channel::Bugfix { major, minor })
}

impl FromStr for Channel {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Channel::parse(s)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Release => write!(f, "release"),
            Channel::Lts => write!(f, "lts"),
            Channel::Beta => write!(f, "beta"),
            Channel::Canary => write!(f, "canary"),
            Channel::Bugfix { major, minor } => write!(f, "release-{}-{}", major, minor),
        }
    }
}
