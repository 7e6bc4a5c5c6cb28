use crate::domain::{Channel, PrereleaseId, ReleaseRequest, SemanticVersion};

/// Next version for a manually published channel.
///
/// Version bumps only ever originate on the canary line; other channels
/// pick them up as releases flow through the cycle:
///
/// - `release` / `lts`: a new patch, or the first release of a line cut from
///   a previous beta (`X.Y.0-beta.N` → `X.Y.0`). The bump flags re-release
///   as a new major or minor.
/// - `beta`: the next weekly beta, or the first beta cut from a canary.
///   The bump flags start the first beta of an upcoming major or minor.
/// - `canary`: the next nightly alpha, or with a bump flag the first alpha
///   of an upcoming major or minor.
/// - bugfix lines: patch only, enforced by [`ReleaseRequest::new`].
pub fn next_version(request: &ReleaseRequest) -> SemanticVersion {
    let current = request.current_version();

    match request.channel() {
        Channel::Release | Channel::Lts => {
            if request.bump_major() {
                current.next_major()
            } else if request.bump_minor() {
                current.next_minor()
            } else {
                current.next_patch()
            }
        }
        Channel::Beta => next_prerelease(request, PrereleaseId::Beta),
        Channel::Canary => next_prerelease(request, PrereleaseId::Alpha),
        Channel::Bugfix { .. } => current.next_patch(),
    }
}

fn next_prerelease(request: &ReleaseRequest, identifier: PrereleaseId) -> SemanticVersion {
    let current = request.current_version();

    if request.bump_major() {
        current.pre_major(identifier)
    } else if request.bump_minor() {
        current.pre_minor(identifier)
    } else {
        current.next_prerelease(identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    fn resolve(channel: Channel, current: &str, major: bool, minor: bool) -> String {
        let current = SemanticVersion::parse(current).unwrap();
        let request = ReleaseRequest::new(channel, major, minor, current, false).unwrap();
        next_version(&request).to_string()
    }

    #[test]
    fn test_release_patch() {
        assert_eq!(resolve(Channel::Release, "3.9.2", false, false), "3.9.3");
    }

    #[test]
    fn test_release_bump_minor() {
        assert_eq!(resolve(Channel::Release, "3.9.2", false, true), "3.10.0");
    }

    #[test]
    fn test_release_bump_major() {
        assert_eq!(resolve(Channel::Release, "3.9.2", true, false), "4.0.0");
    }

    #[test]
    fn test_release_cut_from_beta() {
        assert_eq!(resolve(Channel::Release, "3.10.0-beta.4", false, false), "3.10.0");
    }

    #[test]
    fn test_release_rejects_both_bumps() {
        let current = SemanticVersion::new(3, 9, 2);
        assert!(matches!(
            ReleaseRequest::new(Channel::Release, true, true, current, false),
            Err(ReleaseError::ConflictingBumpFlags)
        ));
    }

    #[test]
    fn test_lts_patch() {
        assert_eq!(resolve(Channel::Lts, "3.8.4", false, false), "3.8.5");
    }

    #[test]
    fn test_beta_weekly() {
        assert_eq!(resolve(Channel::Beta, "3.10.0-beta.1", false, false), "3.10.0-beta.2");
    }

    #[test]
    fn test_beta_cut_from_canary() {
        assert_eq!(resolve(Channel::Beta, "3.11.0-alpha.7", false, false), "3.11.0-beta.0");
    }

    #[test]
    fn test_beta_seeded_at_new_minor() {
        assert_eq!(resolve(Channel::Beta, "3.10.0-beta.5", false, true), "3.11.0-beta.0");
    }

    #[test]
    fn test_beta_seeded_at_new_major() {
        assert_eq!(resolve(Channel::Beta, "3.10.0-beta.5", true, false), "4.0.0-beta.0");
    }

    #[test]
    fn test_canary_nightly() {
        assert_eq!(resolve(Channel::Canary, "3.11.0-alpha.7", false, false), "3.11.0-alpha.8");
    }

    #[test]
    fn test_canary_seeded_at_new_minor() {
        assert_eq!(resolve(Channel::Canary, "3.11.0-alpha.7", false, true), "3.12.0-alpha.0");
    }

    #[test]
    fn test_canary_seeded_at_new_major() {
        assert_eq!(resolve(Channel::Canary, "3.11.0-alpha.7", true, false), "4.0.0-alpha.0");
    }

    #[test]
    fn test_bugfix_patch() {
        let channel = Channel::Bugfix { major: 3, minor: 8 };
        assert_eq!(resolve(channel, "3.8.4", false, false), "3.8.5");
    }

    #[test]
    fn test_bugfix_rejects_major_regardless_of_version() {
        let channel = Channel::Bugfix { major: 3, minor: 8 };
        for current in ["3.8.4", "0.0.1", "4.0.0-beta.1"] {
            let current = SemanticVersion::parse(current).unwrap();
            assert!(matches!(
                ReleaseRequest::new(channel, true, false, current, false),
                Err(ReleaseError::BugfixBumpNotAllowed)
            ));
        }
    }
}
