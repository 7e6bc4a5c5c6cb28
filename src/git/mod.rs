//! Git operations abstraction layer
//!
//! The release pipeline reads the working-tree status before anything
//! happens and, once a version is resolved, records it as a release commit
//! and tag pushed to the remote. Both go through the [Repository] trait:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2`
//!   crate, reading status through the `git` executable
//! - [mock::MockRepository]: a mock implementation for testing
//!
//! ```rust
//! # use release_train::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> release_train::Result<()> {
//! let status = repo.status_text()?;
//! println!("{}", status.lines().next().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::PathBuf;

/// Common git operation trait for abstraction
pub trait Repository {
    /// Human-readable `git status` output.
    ///
    /// The first line is `On branch <name>`; the guard looks for
    /// `nothing to commit` and `Your branch is up to date with` lines.
    fn status_text(&self) -> Result<String>;

    /// Name of the checked-out branch
    fn current_branch(&self) -> Result<String>;

    /// Stage exactly `paths` and commit them on the current branch.
    ///
    /// Other changes in the working tree stay out of the commit. Returns the
    /// new commit id.
    fn commit_files(&self, paths: &[PathBuf], message: &str) -> Result<String>;

    /// Create an annotated tag on HEAD
    fn create_tag(&self, name: &str, message: &str) -> Result<()>;

    /// Push a branch and a tag to `remote`
    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()>;
}
