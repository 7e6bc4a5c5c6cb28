//! Package registry abstraction
//!
//! Publishing goes through the [Registry] trait so the retry logic can be
//! exercised without a network. Credentials come from a [CredentialSource]:
//! an interactive one-time-password prompt for manual releases, or the
//! environment token for automated ones.
//!
//! - [npm::NpmRegistry]: shells out to the `npm` client
//! - [mock::MockRegistry]: scripted outcomes for tests

pub mod mock;
pub mod npm;

pub use mock::MockRegistry;
pub use npm::NpmRegistry;

use crate::error::{ReleaseError, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Operations release-train needs from a package registry
pub trait Registry {
    /// Publish one archive under `dist_tag`, with a one-time password when
    /// the registry enforces two-factor authentication
    fn publish(&self, tarball: &Path, dist_tag: &str, otp: Option<&str>) -> Result<()>;

    /// Every version of `package` already on the registry
    fn published_versions(&self, package: &str) -> Result<Vec<String>>;
}

/// Supplies the credential attached to publish attempts
pub trait CredentialSource {
    /// Credential for the first attempt
    fn initial(&mut self) -> Result<Option<String>>;

    /// Replacement after the registry rejected the current credential
    fn refresh(&mut self, rejection: &ReleaseError) -> Result<Option<String>>;
}

/// Credential supplied by the environment, e.g. `NODE_AUTH_TOKEN` read by
/// the registry client itself. It cannot be refreshed.
#[derive(Debug, Clone)]
pub struct EnvironmentCredential {
    variable: String,
}

impl EnvironmentCredential {
    /// Fails with `MissingCredential` when the variable is unset or empty
    pub fn require(variable: impl Into<String>) -> Result<Self> {
        let variable = variable.into();
        match std::env::var(&variable) {
            Ok(value) if !value.is_empty() => Ok(EnvironmentCredential { variable }),
            _ => Err(ReleaseError::MissingCredential(variable)),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }
}

impl CredentialSource for EnvironmentCredential {
    fn initial(&mut self) -> Result<Option<String>> {
        Ok(None)
    }

    fn refresh(&mut self, rejection: &ReleaseError) -> Result<Option<String>> {
        Err(ReleaseError::CredentialRejected(format!(
            "{} was rejected: {}",
            self.variable, rejection
        )))
    }
}

/// Whether registry output says the credential is missing or stale.
///
/// The registry signals this with an `E401` (unauthorized) or `EOTP`
/// (one-time password required or expired) error code. Only whole words
/// count, so a path such as `/builds/EOTP-runner` does not match.
pub fn is_auth_failure(output: &str) -> bool {
    output
        .split(|c: char| c.is_whitespace() || c == ':' || c == ',')
        .any(|word| word == "E401" || word == "EOTP")
}

/// Whether a publish attempt was refused because of its credential
fn rejected_credential(error: &ReleaseError) -> bool {
    matches!(error, ReleaseError::Publish { message, .. } if is_auth_failure(message))
}

/// Publish archives in order.
///
/// An auth failure fetches a fresh credential and retries the same archive
/// until it succeeds or fails for another reason. Any other failure aborts
/// the run; archives already published stay published.
pub fn publish_all<R, C>(
    registry: &R,
    tarballs: &[PathBuf],
    dist_tag: &str,
    credentials: &mut C,
) -> Result<Vec<PathBuf>>
where
    R: Registry + ?Sized,
    C: CredentialSource + ?Sized,
{
    let mut otp = credentials.initial()?;
    let mut published = Vec::with_capacity(tarballs.len());

    for tarball in tarballs {
        loop {
            match registry.publish(tarball, dist_tag, otp.as_deref()) {
                Ok(()) => {
                    info!("published {} as {}", tarball.display(), dist_tag);
                    published.push(tarball.clone());
                    break;
                }
                Err(e) if rejected_credential(&e) => {
                    warn!("credential rejected for {}, requesting a new one", tarball.display());
                    otp = credentials.refresh(&e)?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(published)
}

/// Parse the registry's version listing.
///
/// Accepts a JSON array of strings, a single JSON string (the registry's
/// answer when only one version exists), or one version per line.
pub fn parse_version_list(text: &str) -> Result<Vec<String>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') || trimmed.starts_with('"') {
        let value: serde_json::Value = serde_json::from_str(trimmed)?;
        return match value {
            serde_json::Value::String(single) => Ok(vec![single]),
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()),
            other => Err(ReleaseError::manifest(format!(
                "unexpected version listing: {}",
                other
            ))),
        };
    }

    Ok(trimmed
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedCredentials {
        tokens: Vec<&'static str>,
        refreshes: usize,
    }

    impl CredentialSource for ScriptedCredentials {
        fn initial(&mut self) -> Result<Option<String>> {
            Ok(Some(self.tokens.remove(0).to_string()))
        }

        fn refresh(&mut self, _rejection: &ReleaseError) -> Result<Option<String>> {
            self.refreshes += 1;
            Ok(Some(self.tokens.remove(0).to_string()))
        }
    }

    fn tarballs(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_is_auth_failure() {
        assert!(is_auth_failure("npm ERR! code E401\nnpm ERR! Unable to authenticate"));
        assert!(is_auth_failure("npm ERR! code EOTP"));
        assert!(!is_auth_failure("npm ERR! code E403 forbidden"));
        assert!(!is_auth_failure("npm ERR! code EPUBLISHCONFLICT"));
        assert!(is_auth_failure("npm error code E401"));
        assert!(!is_auth_failure("ENOENT: no such file /builds/EOTP-runner/a.tgz"));
        assert!(!is_auth_failure("exit code 1"));
    }

    #[test]
    fn test_auth_code_in_archive_path_is_not_retried() {
        let registry = MockRegistry::new();
        registry.fail_next("/builds/EOTP-runner/a.tgz", "exit code 1\nStdout: \nStderr: ");
        let mut credentials = ScriptedCredentials {
            tokens: vec!["111111", "222222"],
            refreshes: 0,
        };

        let err = publish_all(
            &registry,
            &tarballs(&["/builds/EOTP-runner/a.tgz"]),
            "beta",
            &mut credentials,
        )
        .unwrap_err();

        assert!(matches!(err, ReleaseError::Publish { .. }));
        assert_eq!(credentials.refreshes, 0);
        assert_eq!(registry.attempts().len(), 1);
    }

    #[test]
    fn test_non_publish_error_is_not_retried() {
        let err = ReleaseError::command("npm publish a.tgz", "npm ERR! code EOTP");
        assert!(!rejected_credential(&err));
    }

    #[test]
    fn test_publish_all_success() {
        let registry = MockRegistry::new();
        let mut credentials = ScriptedCredentials {
            tokens: vec!["111111"],
            refreshes: 0,
        };
        let archives = tarballs(&["a-1.0.0.tgz", "b-1.0.0.tgz"]);
        let published = publish_all(&registry, &archives, "beta", &mut credentials).unwrap();
        assert_eq!(published, archives);
        assert_eq!(
            registry.attempts(),
            vec![
                ("a-1.0.0.tgz".to_string(), Some("111111".to_string())),
                ("b-1.0.0.tgz".to_string(), Some("111111".to_string())),
            ]
        );
    }

    #[test]
    fn test_auth_failure_retries_same_archive_with_new_credential() {
        let registry = MockRegistry::new();
        registry.fail_next("b-1.0.0.tgz", "npm ERR! code EOTP");
        registry.fail_next("b-1.0.0.tgz", "npm ERR! code E401");
        let mut credentials = ScriptedCredentials {
            tokens: vec!["111111", "222222", "333333"],
            refreshes: 0,
        };
        let archives = tarballs(&["a-1.0.0.tgz", "b-1.0.0.tgz", "c-1.0.0.tgz"]);

        let published = publish_all(&registry, &archives, "latest", &mut credentials).unwrap();

        assert_eq!(published.len(), 3);
        assert_eq!(credentials.refreshes, 2);
        let attempts = registry.attempts();
        assert_eq!(attempts.len(), 5);
        assert_eq!(attempts[1].0, "b-1.0.0.tgz");
        assert_eq!(attempts[2], ("b-1.0.0.tgz".to_string(), Some("222222".to_string())));
        assert_eq!(attempts[4], ("c-1.0.0.tgz".to_string(), Some("333333".to_string())));
    }

    #[test]
    fn test_other_failure_aborts_remaining_archives() {
        let registry = MockRegistry::new();
        registry.fail_next("b-1.0.0.tgz", "npm ERR! code E403 forbidden");
        let mut credentials = ScriptedCredentials {
            tokens: vec!["111111"],
            refreshes: 0,
        };
        let archives = tarballs(&["a-1.0.0.tgz", "b-1.0.0.tgz", "c-1.0.0.tgz"]);

        let err = publish_all(&registry, &archives, "latest", &mut credentials).unwrap_err();

        assert!(err.to_string().contains("E403"));
        assert_eq!(registry.published(), vec!["a-1.0.0.tgz".to_string()]);
        assert_eq!(registry.attempts().len(), 2);
    }

    #[test]
    fn test_environment_credential_cannot_refresh() {
        let registry = MockRegistry::new();
        registry.fail_next("a-1.0.0.tgz", "npm ERR! code E401");
        let mut credentials = EnvironmentCredential {
            variable: "NODE_AUTH_TOKEN".to_string(),
        };
        let err = publish_all(&registry, &tarballs(&["a-1.0.0.tgz"]), "alpha", &mut credentials)
            .unwrap_err();
        assert!(matches!(err, ReleaseError::CredentialRejected(_)));
    }

    #[test]
    fn test_parse_version_list_json_array() {
        let versions = parse_version_list("[\n  \"3.26.0\",\n  \"3.27.0-alpha.0\"\n]\n").unwrap();
        assert_eq!(versions, vec!["3.26.0", "3.27.0-alpha.0"]);
    }

    #[test]
    fn test_parse_version_list_single_string() {
        assert_eq!(parse_version_list("\"0.1.0\"").unwrap(), vec!["0.1.0"]);
    }

    #[test]
    fn test_parse_version_list_lines() {
        let versions = parse_version_list("3.26.0\n\n3.27.0\n").unwrap();
        assert_eq!(versions, vec!["3.26.0", "3.27.0"]);
    }

    #[test]
    fn test_parse_version_list_rejects_malformed_json() {
        assert!(parse_version_list("[").is_err());
        assert!(parse_version_list("\"unterminated").is_err());
    }
}
