use crate::domain::{PrereleaseId, SemanticVersion, VersionHistory};

/// Determine the next nightly alpha from the published history.
///
/// Each channel's front is the `(major, minor)` of its highest published
/// version. When the alpha front is ahead of both the release and the beta
/// fronts, an alpha cycle is still in progress and its counter is bumped.
/// Otherwise that cycle has been promoted, and a new one starts two minors
/// above the current release, leaving `release + 1` to the beta in flight.
///
/// A missing beta front counts as equal to the release front. With no
/// release at all, the new cycle is based on the beta front, or `0.0`.
pub fn next_alpha(history: &VersionHistory) -> SemanticVersion {
    let release = history.latest_release().map(|v| v.front());
    let beta = history
        .latest_prerelease(PrereleaseId::Beta)
        .map(|v| v.front());
    let beta_front = beta.or(release);

    if let Some(alpha) = history.latest_prerelease(PrereleaseId::Alpha) {
        let alpha_front = Some(alpha.front());
        if alpha_front > release && alpha_front > beta_front {
            return alpha.next_prerelease(PrereleaseId::Alpha);
        }
    }

    let (major, minor) = release.or(beta).unwrap_or((0, 0));
    SemanticVersion::prerelease(major, minor + 2, 0, PrereleaseId::Alpha, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(versions: &[&str]) -> String {
        next_alpha(&VersionHistory::from_versions(versions)).to_string()
    }

    #[test]
    fn test_existing_alpha_returns_next_prerelease() {
        assert_eq!(
            resolve(&["3.26.0", "3.27.0-alpha.0", "3.27.0-beta.0", "3.28.0-alpha.4"]),
            "3.28.0-alpha.5"
        );
    }

    #[test]
    fn test_beta_ahead_of_stale_alpha_starts_new_cycle() {
        assert_eq!(
            resolve(&["3.27.0-alpha.0", "3.27.0-beta.0", "3.28.0", "3.29.0-beta.0"]),
            "3.30.0-alpha.0"
        );
    }

    #[test]
    fn test_release_only_starts_cycle_two_minors_ahead() {
        assert_eq!(resolve(&["3.26.0", "3.27.0-alpha.0", "3.27.0"]), "3.29.0-alpha.0");
    }

    #[test]
    fn test_alpha_matching_beta_starts_new_cycle() {
        assert_eq!(
            resolve(&["3.28.0", "3.29.0-alpha.2", "3.29.0-beta.0"]),
            "3.30.0-alpha.0"
        );
    }

    #[test]
    fn test_patch_of_previous_release_is_irrelevant() {
        assert_eq!(
            resolve(&["3.28.0", "3.29.0-alpha.2", "3.28.1", "3.29.0-beta.0"]),
            "3.30.0-alpha.0"
        );
    }

    #[test]
    fn test_all_fronts_on_same_minor() {
        assert_eq!(
            resolve(&["3.27.0-alpha.0", "3.27.0-beta.0", "3.27.0"]),
            "3.29.0-alpha.0"
        );
    }

    #[test]
    fn test_older_patch_releases_do_not_move_fronts() {
        let base = ["3.26.0", "3.27.0-alpha.0", "3.27.0-beta.0", "3.28.0-alpha.4"];
        let mut extended = base.to_vec();
        extended.extend(["3.24.7", "3.25.3", "2.18.5"]);
        assert_eq!(resolve(&base), resolve(&extended));
    }

    #[test]
    fn test_alpha_ahead_of_release_but_behind_beta_is_stale() {
        assert_eq!(
            resolve(&["3.26.0", "3.27.0-alpha.3", "3.28.0-beta.0"]),
            "3.28.0-alpha.0"
        );
    }

    #[test]
    fn test_alpha_ahead_without_beta() {
        assert_eq!(resolve(&["3.26.0", "3.28.0-alpha.1"]), "3.28.0-alpha.2");
    }

    #[test]
    fn test_no_release_yet() {
        assert_eq!(resolve(&["0.1.0-alpha.3"]), "0.1.0-alpha.4");
        assert_eq!(resolve(&["1.0.0-beta.2"]), "1.2.0-alpha.0");
        assert_eq!(resolve(&[]), "0.2.0-alpha.0");
    }

    #[test]
    fn test_malformed_entries_do_not_block_resolution() {
        assert_eq!(
            resolve(&["3.28.0", "garbage", "3.29.0-rc.1", "3.30.0-alpha.1"]),
            "3.30.0-alpha.2"
        );
    }

    #[test]
    fn test_deterministic_regardless_of_order() {
        let forward = ["3.26.0", "3.27.0-alpha.0", "3.27.0-beta.0", "3.28.0-alpha.4"];
        let mut reversed = forward;
        reversed.reverse();
        assert_eq!(resolve(&forward), resolve(&reversed));
    }

    #[test]
    fn test_oversized_entries_are_skipped() {
        assert_eq!(
            resolve(&["3.18446744073709551615.0", "3.27.0"]),
            "3.29.0-alpha.0"
        );
        assert_eq!(
            resolve(&["4294967295.4294967295.0"]),
            "4294967295.4294967297.0-alpha.0"
        );
    }
}
