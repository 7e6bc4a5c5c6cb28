use super::channel::Channel;
use super::version::SemanticVersion;
use std::fmt;

/// The git branch a release is expected to be cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchExpectation {
    /// A fixed branch such as `master`, `release` or `beta`
    Named(String),
    /// `lts-<major>-<minor>`
    Lts { major: u64, minor: u64 },
    /// `release-<major>-<minor>`
    Release { major: u64, minor: u64 },
}

impl BranchExpectation {
    /// Determine the branch a channel publishes from.
    ///
    /// LTS branches are named after the current version's line and bugfix
    /// lines after their own; everything else follows the distribution tag
    /// (`canary` from `master`, `latest` from `release`, any other tag from
    /// the branch of the same name).
    pub fn for_channel(channel: Channel, dist_tag: &str, current: &SemanticVersion) -> Self {
        match channel {
            Channel::Lts => BranchExpectation::Lts {
                major: current.major,
                minor: current.minor,
            },
            Channel::Bugfix { major, minor } => BranchExpectation::Release { major, minor },
            _ => match dist_tag {
                "canary" => BranchExpectation::Named("master".to_string()),
                "latest" => BranchExpectation::Named("release".to_string()),
                other => BranchExpectation::Named(other.to_string()),
            },
        }
    }

    /// Expected branch name
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Check a branch name against this expectation
    pub fn matches(&self, branch: &str) -> bool {
        self.name() == branch
    }
}

impl fmt::Display for BranchExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchExpectation::Named(name) => write!(f, "{}", name),
            BranchExpectation::Lts { major, minor } => write!(f, "lts-{}-{}", major, minor),
            BranchExpectation::Release { major, minor } => {
                write!(f, "release-{}-{}", major, minor)
            }
        }
    }
}
