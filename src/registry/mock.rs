use crate::error::{ReleaseError, Result};
use crate::registry::Registry;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Mock registry for testing without network access
///
/// Publishing succeeds unless a failure was queued for the archive with
/// [MockRegistry::fail_next]. Every attempt is recorded.
#[derive(Default)]
pub struct MockRegistry {
    versions: HashMap<String, Vec<String>>,
    failures: RefCell<HashMap<String, VecDeque<String>>>,
    attempts: RefCell<Vec<(String, Option<String>)>>,
    published: RefCell<Vec<String>>,
}

impl MockRegistry {
    /// Create an empty mock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the published versions of a package
    pub fn with_versions(mut self, package: impl Into<String>, versions: &[&str]) -> Self {
        self.versions.insert(
            package.into(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Make the next publish attempt of `tarball` fail with `message`
    pub fn fail_next(&self, tarball: impl Into<String>, message: impl Into<String>) {
        self.failures
            .borrow_mut()
            .entry(tarball.into())
            .or_default()
            .push_back(message.into());
    }

    /// Every attempt as `(tarball, otp)`, in order
    pub fn attempts(&self) -> Vec<(String, Option<String>)> {
        self.attempts.borrow().clone()
    }

    /// Archives that were published successfully
    pub fn published(&self) -> Vec<String> {
        self.published.borrow().clone()
    }
}

impl Registry for MockRegistry {
    fn publish(&self, tarball: &Path, _dist_tag: &str, otp: Option<&str>) -> Result<()> {
        let key = tarball.display().to_string();
        self.attempts
            .borrow_mut()
            .push((key.clone(), otp.map(str::to_string)));

        let failure = self
            .failures
            .borrow_mut()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match failure {
            Some(message) => Err(ReleaseError::Publish {
                tarball: key,
                message,
            }),
            None => {
                self.published.borrow_mut().push(key);
                Ok(())
            }
        }
    }

    fn published_versions(&self, package: &str) -> Result<Vec<String>> {
        Ok(self.versions.get(package).cloned().unwrap_or_default())
    }
}
