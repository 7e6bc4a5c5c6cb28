use crate::error::{ReleaseError, Result};
use crate::exec::CommandRunner;
use crate::registry::{parse_version_list, Registry};
use std::path::Path;

/// Registry client backed by the `npm` executable
pub struct NpmRegistry {
    runner: CommandRunner,
    npm: String,
}

impl NpmRegistry {
    pub fn new(runner: CommandRunner, npm: impl Into<String>) -> Self {
        NpmRegistry {
            runner,
            npm: npm.into(),
        }
    }

    /// Command line for publishing one archive
    pub fn publish_command(&self, tarball: &Path, dist_tag: &str, otp: Option<&str>) -> String {
        let mut cmd = format!(
            "{} publish {} --tag={} --access=public",
            self.npm,
            tarball.display(),
            dist_tag
        );
        if let Some(otp) = otp {
            cmd.push_str(&format!(" --otp={}", otp));
        }
        cmd
    }
}

impl Registry for NpmRegistry {
    fn publish(&self, tarball: &Path, dist_tag: &str, otp: Option<&str>) -> Result<()> {
        let cmd = self.publish_command(tarball, dist_tag, otp);
        // the command line carries the one-time password; keep only the output
        self.runner.run(&cmd).map_err(|e| ReleaseError::Publish {
            tarball: tarball.display().to_string(),
            message: match e {
                ReleaseError::Command { message, .. } => message,
                other => other.to_string(),
            },
        })?;
        Ok(())
    }

    fn published_versions(&self, package: &str) -> Result<Vec<String>> {
        let output = self
            .runner
            .run(&format!("{} view {} versions --json", self.npm, package))?;
        parse_version_list(&output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> NpmRegistry {
        NpmRegistry::new(CommandRunner::new(std::env::temp_dir()), "npm")
    }

    #[test]
    fn test_publish_command_without_otp() {
        let cmd = registry().publish_command(Path::new("/p/ember-data-3.28.0.tgz"), "latest", None);
        assert_eq!(
            cmd,
            "npm publish /p/ember-data-3.28.0.tgz --tag=latest --access=public"
        );
    }

    #[test]
    fn test_publish_command_with_otp() {
        let cmd = registry().publish_command(Path::new("a.tgz"), "beta", Some("123456"));
        assert!(cmd.ends_with("--tag=beta --access=public --otp=123456"));
    }

    #[test]
    fn test_publish_failure_keeps_registry_output() {
        let registry = NpmRegistry::new(
            CommandRunner::new(std::env::temp_dir()),
            "echo 'npm ERR! code EOTP' >&2; false",
        );
        let err = registry
            .publish(Path::new("a.tgz"), "beta", None)
            .unwrap_err();
        match &err {
            ReleaseError::Publish { message, .. } => {
                assert!(crate::registry::is_auth_failure(message))
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_publish_failure_hides_otp() {
        let registry = NpmRegistry::new(CommandRunner::new(std::env::temp_dir()), "false #");
        let err = registry
            .publish(Path::new("/tmp/a.tgz"), "beta", Some("654321"))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("/tmp/a.tgz"));
        assert!(text.contains("exit code 1"));
        assert!(!text.contains("654321"));
        assert!(!text.contains("--otp"));
    }

    #[test]
    fn test_published_versions_from_client_output() {
        let registry = NpmRegistry::new(
            CommandRunner::new(std::env::temp_dir()),
            "printf '[\"3.26.0\",\"3.27.0-beta.0\"]'; true",
        );
        let versions = registry.published_versions("ember-data").unwrap();
        assert_eq!(versions, vec!["3.26.0", "3.27.0-beta.0"]);
    }
}
