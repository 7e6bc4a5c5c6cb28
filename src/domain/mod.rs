//! Domain logic - pure release rules independent of git, npm or the terminal

pub mod branch;
pub mod channel;
pub mod history;
pub mod request;
pub mod version;

pub use branch::BranchExpectation;
pub use channel::Channel;
pub use history::VersionHistory;
pub use request::ReleaseRequest;
pub use version::{Prerelease, PrereleaseId, SemanticVersion};
