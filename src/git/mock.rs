use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::cell::RefCell;
use std::path::PathBuf;

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    status: String,
    branch: String,
    commits: RefCell<Vec<String>>,
    committed_files: RefCell<Vec<PathBuf>>,
    tags: RefCell<Vec<String>>,
    pushes: RefCell<Vec<(String, String, String)>>,
}

impl MockRepository {
    /// Create a mock whose `git status` prints `status`.
    ///
    /// The current branch is taken from its `On branch` line.
    pub fn new(status: impl Into<String>) -> Self {
        let status = status.into();
        let branch = status
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("On branch "))
            .unwrap_or_default()
            .to_string();

        MockRepository {
            status,
            branch,
            commits: RefCell::new(Vec::new()),
            committed_files: RefCell::new(Vec::new()),
            tags: RefCell::new(Vec::new()),
            pushes: RefCell::new(Vec::new()),
        }
    }

    /// Status of a clean, up-to-date checkout of `branch`
    pub fn clean(branch: &str) -> Self {
        Self::new(format!(
            "On branch {branch}\nYour branch is up to date with 'origin/{branch}'.\n\nnothing to commit, working tree clean\n"
        ))
    }

    /// Commit messages recorded so far
    pub fn commits(&self) -> Vec<String> {
        self.commits.borrow().clone()
    }

    /// Files staged by every commit so far
    pub fn committed_files(&self) -> Vec<PathBuf> {
        self.committed_files.borrow().clone()
    }

    /// Tags created so far
    pub fn tags(&self) -> Vec<String> {
        self.tags.borrow().clone()
    }

    /// Pushes as `(remote, branch, tag)`
    pub fn pushes(&self) -> Vec<(String, String, String)> {
        self.pushes.borrow().clone()
    }
}

impl Repository for MockRepository {
    fn status_text(&self) -> Result<String> {
        Ok(self.status.clone())
    }

    fn current_branch(&self) -> Result<String> {
        if self.branch.is_empty() {
            return Err(ReleaseError::config("HEAD is detached"));
        }
        Ok(self.branch.clone())
    }

    fn commit_files(&self, paths: &[PathBuf], message: &str) -> Result<String> {
        self.committed_files.borrow_mut().extend_from_slice(paths);
        let mut commits = self.commits.borrow_mut();
        commits.push(message.to_string());
        Ok(format!("{:040x}", commits.len()))
    }

    fn create_tag(&self, name: &str, _message: &str) -> Result<()> {
        self.tags.borrow_mut().push(name.to_string());
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()> {
        self.pushes
            .borrow_mut()
            .push((remote.to_string(), branch.to_string(), tag.to_string()));
        Ok(())
    }
}
