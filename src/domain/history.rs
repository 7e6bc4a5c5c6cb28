use super::version::{PrereleaseId, SemanticVersion};
use std::collections::HashSet;
use tracing::debug;

/// Every version already published to the registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionHistory {
    versions: HashSet<SemanticVersion>,
}

impl VersionHistory {
    /// Build a history from published version strings.
    ///
    /// Entries that are not `X.Y.Z[-alpha|beta.N]` are skipped: the registry
    /// carries years of versions and one odd entry must not block resolution.
    pub fn from_versions<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let versions = versions
            .into_iter()
            .filter_map(|raw| match SemanticVersion::parse(raw.as_ref().trim()) {
                Ok(version) => Some(version),
                Err(e) => {
                    debug!("skipping published version: {}", e);
                    None
                }
            })
            .collect();

        VersionHistory { versions }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn contains(&self, version: &SemanticVersion) -> bool {
        self.versions.contains(version)
    }

    /// Highest stable release
    pub fn latest_release(&self) -> Option<SemanticVersion> {
        self.versions
            .iter()
            .filter(|v| v.is_release())
            .max_by_key(|v| (v.major, v.minor, v.patch))
            .copied()
    }

    /// Highest pre-release carrying `identifier`
    pub fn latest_prerelease(&self, identifier: PrereleaseId) -> Option<SemanticVersion> {
        self.versions
            .iter()
            .filter_map(|v| match v.prerelease {
                Some(pre) if pre.identifier == identifier => {
                    Some((v, (v.major, v.minor, v.patch, pre.number)))
                }
                _ => None,
            })
            .max_by_key(|(_, key)| *key)
            .map(|(v, _)| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_release_ignores_prereleases() {
        let history = VersionHistory::from_versions(["3.26.0", "3.27.0-beta.0", "3.25.4"]);
        assert_eq!(history.latest_release(), Some(SemanticVersion::new(3, 26, 0)));
    }

    #[test]
    fn test_latest_release_none() {
        let history = VersionHistory::from_versions(["3.27.0-alpha.0"]);
        assert_eq!(history.latest_release(), None);
    }

    #[test]
    fn test_latest_prerelease_by_identifier() {
        let history = VersionHistory::from_versions([
            "3.27.0-alpha.0",
            "3.28.0-alpha.4",
            "3.28.0-alpha.10",
            "3.27.0-beta.3",
        ]);
        assert_eq!(
            history.latest_prerelease(PrereleaseId::Alpha),
            Some(SemanticVersion::prerelease(3, 28, 0, PrereleaseId::Alpha, 10))
        );
        assert_eq!(
            history.latest_prerelease(PrereleaseId::Beta),
            Some(SemanticVersion::prerelease(3, 27, 0, PrereleaseId::Beta, 3))
        );
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let history =
            VersionHistory::from_versions(["3.26.0", "not-a-version", "3.1.0-rc.1", "2.0"]);
        assert_eq!(history.len(), 1);
        assert!(history.contains(&SemanticVersion::new(3, 26, 0)));
    }

    #[test]
    fn test_duplicates_collapse() {
        let history = VersionHistory::from_versions(["3.26.0", "3.26.0", " 3.26.0 "]);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_empty_history() {
        let history = VersionHistory::from_versions(Vec::<String>::new());
        assert!(history.is_empty());
        assert_eq!(history.latest_prerelease(PrereleaseId::Beta), None);
    }
}
