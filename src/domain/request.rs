use super::channel::Channel;
use super::version::SemanticVersion;
use crate::error::{ReleaseError, Result};

/// A validated request to cut a release on a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    channel: Channel,
    bump_major: bool,
    bump_minor: bool,
    current_version: SemanticVersion,
    force: bool,
}

impl ReleaseRequest {
    /// Validate and build a request.
    ///
    /// Historical lines only take patch releases, and major and minor bumps
    /// are mutually exclusive.
    pub fn new(
        channel: Channel,
        bump_major: bool,
        bump_minor: bool,
        current_version: SemanticVersion,
        force: bool,
    ) -> Result<Self> {
        if channel.is_bugfix() && (bump_major || bump_minor) {
            return Err(ReleaseError::BugfixBumpNotAllowed);
        }
        if bump_major && bump_minor {
            return Err(ReleaseError::ConflictingBumpFlags);
        }

        Ok(ReleaseRequest {
            channel,
            bump_major,
            bump_minor,
            current_version,
            force,
        })
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn bump_major(&self) -> bool {
        self.bump_major
    }

    pub fn bump_minor(&self) -> bool {
        self.bump_minor
    }

    pub fn current_version(&self) -> &SemanticVersion {
        &self.current_version
    }

    pub fn force(&self) -> bool {
        self.force
    }
}
