//! Working-tree checks run before anything is versioned or published.
//!
//! The guard reads `git status` output and compares it against the branch
//! the channel is expected to publish from. Each finding is fatal unless the
//! run is forced, in which case every finding is reported as a warning.

use crate::domain::BranchExpectation;
use crate::error::{ReleaseError, Result};
use std::fmt;

/// Facts extracted from `git status` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
    pub clean: bool,
    pub synced: bool,
    /// First line of the status, used to name a detached HEAD
    pub head: String,
    pub raw: String,
}

impl StatusReport {
    /// Parse `git status` text.
    ///
    /// The first line is `On branch <name>`. A line starting with
    /// `nothing to commit` marks a clean tree and one starting with
    /// `Your branch is up to date with` marks a synced branch.
    pub fn parse(status: &str) -> Self {
        let head = status.lines().next().unwrap_or_default().trim().to_string();
        let branch = head
            .strip_prefix("On branch ")
            .map(|name| name.trim().to_string());

        let clean = status
            .lines()
            .any(|line| line.starts_with("nothing to commit"));
        let synced = status
            .lines()
            .any(|line| line.starts_with("Your branch is up to date with"));

        StatusReport {
            branch,
            clean,
            synced,
            head,
            raw: status.to_string(),
        }
    }

    /// Branch name as shown to the user
    pub fn found_branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(&self.head)
    }
}

/// A failed working-tree check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardFinding {
    /// Uncommitted or untracked changes
    UncleanWorkingTree,
    /// Local branch is behind, ahead of, or diverged from its upstream
    BranchNotSynced,
    /// Publishing from a branch other than the channel's
    BranchMismatch {
        dist_tag: String,
        expected: String,
        found: String,
    },
}

impl GuardFinding {
    /// Escalate to the matching fatal error
    pub fn into_error(self, status: &str) -> ReleaseError {
        let status = status.to_string();
        match self {
            GuardFinding::UncleanWorkingTree => ReleaseError::UncleanWorkingTree { status },
            GuardFinding::BranchNotSynced => ReleaseError::BranchNotSynced { status },
            GuardFinding::BranchMismatch {
                dist_tag,
                expected,
                found,
            } => ReleaseError::BranchMismatch {
                dist_tag,
                expected,
                found,
                status,
            },
        }
    }

    /// What `--force` is ignoring
    pub fn override_note(&self) -> &'static str {
        match self {
            GuardFinding::UncleanWorkingTree => "ignoring unclean git working tree",
            GuardFinding::BranchNotSynced => "ignoring unsynced git branch",
            GuardFinding::BranchMismatch { .. } => "ignoring unexpected branch",
        }
    }
}

impl fmt::Display for GuardFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardFinding::UncleanWorkingTree => {
                write!(f, "Local git branch has uncommitted changes")
            }
            GuardFinding::BranchNotSynced => {
                write!(f, "Local git branch is not in sync with origin branch")
            }
            GuardFinding::BranchMismatch {
                dist_tag,
                expected,
                found,
            } => write!(
                f,
                "Expected to publish tag '{}' from the git branch '{}', but found '{}'",
                dist_tag, expected, found
            ),
        }
    }
}

/// Outcome of the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Findings present, overridden by `--force`
    Warn,
    Fail,
}

/// Every finding for one status snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardReport {
    pub findings: Vec<GuardFinding>,
    pub forced: bool,
    pub status: StatusReport,
}

impl GuardReport {
    pub fn verdict(&self) -> Verdict {
        match (self.findings.is_empty(), self.forced) {
            (true, _) => Verdict::Pass,
            (false, true) => Verdict::Warn,
            (false, false) => Verdict::Fail,
        }
    }

    /// Findings reported as warnings (empty unless forced)
    pub fn warnings(&self) -> &[GuardFinding] {
        if self.forced {
            &self.findings
        } else {
            &[]
        }
    }

    /// Warnings to print, or the first finding as a fatal error
    pub fn into_result(self) -> Result<Vec<GuardFinding>> {
        if self.forced {
            return Ok(self.findings);
        }
        match self.findings.into_iter().next() {
            Some(finding) => Err(finding.into_error(&self.status.raw)),
            None => Ok(Vec::new()),
        }
    }
}

/// Checks the working tree against a channel's branch expectation
#[derive(Debug, Clone)]
pub struct ReleaseGuard {
    expected: BranchExpectation,
    dist_tag: String,
    force: bool,
}

impl ReleaseGuard {
    pub fn new(expected: BranchExpectation, dist_tag: impl Into<String>, force: bool) -> Self {
        ReleaseGuard {
            expected,
            dist_tag: dist_tag.into(),
            force,
        }
    }

    /// Run all three checks; none short-circuits the others
    pub fn evaluate(&self, status: &str) -> GuardReport {
        let status = StatusReport::parse(status);
        let mut findings = Vec::new();

        if !status.clean {
            findings.push(GuardFinding::UncleanWorkingTree);
        }

        if !status.synced {
            findings.push(GuardFinding::BranchNotSynced);
        }

        if !self.expected.matches(status.found_branch()) {
            findings.push(GuardFinding::BranchMismatch {
                dist_tag: self.dist_tag.clone(),
                expected: self.expected.name(),
                found: status.found_branch().to_string(),
            });
        }

        GuardReport {
            findings,
            forced: self.force,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_BETA: &str = "On branch beta\n\
        Your branch is up to date with 'origin/beta'.\n\
        \n\
        nothing to commit, working tree clean\n";

    const DIRTY_BETA: &str = "On branch beta\n\
        Your branch is up to date with 'origin/beta'.\n\
        \n\
        Changes not staged for commit:\n\
        \tmodified:   packages/store/package.json\n";

    const BEHIND_MASTER: &str = "On branch master\n\
        Your branch is behind 'origin/master' by 2 commits, and can be fast-forwarded.\n\
        \n\
        nothing to commit, working tree clean\n";

    fn beta_guard(force: bool) -> ReleaseGuard {
        ReleaseGuard::new(BranchExpectation::Named("beta".to_string()), "beta", force)
    }

    #[test]
    fn test_parse_status() {
        let status = StatusReport::parse(CLEAN_BETA);
        assert_eq!(status.branch.as_deref(), Some("beta"));
        assert!(status.clean);
        assert!(status.synced);
    }

    #[test]
    fn test_parse_detached_head() {
        let status = StatusReport::parse("HEAD detached at v3.9.2\nnothing to commit\n");
        assert_eq!(status.branch, None);
        assert_eq!(status.found_branch(), "HEAD detached at v3.9.2");
    }

    #[test]
    fn test_clean_synced_expected_branch_passes() {
        let report = beta_guard(false).evaluate(CLEAN_BETA);
        assert_eq!(report.verdict(), Verdict::Pass);
        assert!(report.warnings().is_empty());
        assert!(report.into_result().unwrap().is_empty());
    }

    #[test]
    fn test_dirty_tree_fails_without_force() {
        let report = beta_guard(false).evaluate(DIRTY_BETA);
        assert_eq!(report.verdict(), Verdict::Fail);
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, ReleaseError::UncleanWorkingTree { .. }));
        assert!(err.to_string().contains("Changes not staged for commit"));
    }

    #[test]
    fn test_dirty_tree_warns_with_force() {
        let report = beta_guard(true).evaluate(DIRTY_BETA);
        assert_eq!(report.verdict(), Verdict::Warn);
        let warnings = report.into_result().unwrap();
        assert_eq!(warnings, vec![GuardFinding::UncleanWorkingTree]);
        assert!(warnings[0].to_string().contains("uncommitted changes"));
    }

    #[test]
    fn test_forced_run_reports_every_finding() {
        let dirty_unsynced_master = "On branch master\n\
            Your branch is ahead of 'origin/master' by 1 commit.\n\
            Untracked files:\n\
            \tscratch.txt\n";
        let report = beta_guard(true).evaluate(dirty_unsynced_master);
        assert_eq!(report.findings.len(), 3);
        assert!(matches!(
            &report.findings[2],
            GuardFinding::BranchMismatch { found, expected, .. } if found == "master" && expected == "beta"
        ));
    }

    #[test]
    fn test_unsynced_branch_fails() {
        let guard = ReleaseGuard::new(
            BranchExpectation::Named("master".to_string()),
            "canary",
            false,
        );
        let err = guard.evaluate(BEHIND_MASTER).into_result().unwrap_err();
        assert!(matches!(err, ReleaseError::BranchNotSynced { .. }));
    }

    #[test]
    fn test_branch_mismatch_fails() {
        let guard = ReleaseGuard::new(BranchExpectation::Lts { major: 3, minor: 8 }, "lts", false);
        let err = guard.evaluate(CLEAN_BETA).into_result().unwrap_err();
        match err {
            ReleaseError::BranchMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "lts-3-8");
                assert_eq!(found, "beta");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_first_finding_wins_without_force() {
        let err = beta_guard(false)
            .evaluate("On branch master\nChanges to be committed:\n")
            .into_result()
            .unwrap_err();
        assert!(matches!(err, ReleaseError::UncleanWorkingTree { .. }));
    }
}
