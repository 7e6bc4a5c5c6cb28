use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents the complete configuration for release-train.
///
/// Locates the project's manifests, the credential used by automated runs,
/// and the shell commands wrapped by the pipeline stages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// File holding the authoritative project version
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Directory containing one sub-directory per package
    #[serde(default = "default_packages_dir")]
    pub packages_dir: String,

    /// Registry package whose published versions drive the nightly alpha
    #[serde(default = "default_package_name")]
    pub package_name: String,

    /// Environment variable that must hold the registry token in CI
    #[serde(default = "default_credential_env")]
    pub credential_env: String,

    /// Git remote releases are pushed to
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub commands: CommandsConfig,
}

fn default_version_file() -> String {
    "lerna.json".to_string()
}

fn default_packages_dir() -> String {
    "packages".to_string()
}

fn default_package_name() -> String {
    "ember-data".to_string()
}

fn default_credential_env() -> String {
    "NODE_AUTH_TOKEN".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Shell commands run by the pipeline stages.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommandsConfig {
    #[serde(default = "default_smoke_test")]
    pub smoke_test: String,

    /// Commands removing build output before packing
    #[serde(default = "default_clean")]
    pub clean: Vec<String>,

    #[serde(default = "default_install")]
    pub install: String,

    /// Registry client executable
    #[serde(default = "default_npm")]
    pub npm: String,
}

fn default_smoke_test() -> String {
    "yarn run lint:js && yarn run test".to_string()
}

fn default_clean() -> Vec<String> {
    vec!["rm -rf packages/*/dist packages/*/tmp packages/*/node_modules node_modules".to_string()]
}

fn default_install() -> String {
    "yarn install".to_string()
}

fn default_npm() -> String {
    "npm".to_string()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            smoke_test: default_smoke_test(),
            clean: default_clean(),
            install: default_install(),
            npm: default_npm(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version_file: default_version_file(),
            packages_dir: default_packages_dir(),
            package_name: default_package_name(),
            credential_env: default_credential_env(),
            remote: default_remote(),
            commands: CommandsConfig::default(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Lookup order:
/// 1. Custom path provided as parameter
/// 2. `releasetrain.toml` in current directory
/// 3. `<config dir>/.releasetrain.toml`
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| ReleaseError::config(format!("cannot read {}: {}", path, e)))?
    } else if Path::new("./releasetrain.toml").exists() {
        fs::read_to_string("./releasetrain.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(".releasetrain.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| ReleaseError::config(e.to_string()))
}
