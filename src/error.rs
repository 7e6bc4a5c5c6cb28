use thiserror::Error;

/// Unified error type for release-train operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Malformed version: '{0}' - expected X.Y.Z or X.Y.Z-<alpha|beta>.N")]
    MalformedVersion(String),

    #[error("Cannot bump both major and minor versions simultaneously")]
    ConflictingBumpFlags,

    #[error("Cannot bump major or minor version of a past release")]
    BugfixBumpNotAllowed,

    #[error("Channel must be one of release|beta|canary|lts|release-<major>-<minor>. Received '{0}'")]
    UnresolvedChannel(String),

    #[error("Git working tree is not clean\n\nStatus:\n{status}")]
    UncleanWorkingTree { status: String },

    #[error("Local git branch is not in sync with origin branch\n\nStatus:\n{status}")]
    BranchNotSynced { status: String },

    #[error("Expected to publish tag '{dist_tag}' from the git branch '{expected}', but found '{found}'\n\nStatus:\n{status}")]
    BranchMismatch {
        dist_tag: String,
        expected: String,
        found: String,
        status: String,
    },

    #[error("{0} is missing in environment variables")]
    MissingCredential(String),

    #[error("Registry rejected the credential: {0}")]
    CredentialRejected(String),

    #[error("Failed to publish {tarball}: {message}")]
    Publish { tarball: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Command `{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in release-train
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a malformed version error
    pub fn malformed(input: impl Into<String>) -> Self {
        ReleaseError::MalformedVersion(input.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaseError::Manifest(msg.into())
    }

    /// Create a command failure carrying the command line and its output
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        ReleaseError::Command {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether this error is one of the working-tree guard conditions
    pub fn is_guard_failure(&self) -> bool {
        matches!(
            self,
            ReleaseError::UncleanWorkingTree { .. }
                | ReleaseError::BranchNotSynced { .. }
                | ReleaseError::BranchMismatch { .. }
        )
    }
}
