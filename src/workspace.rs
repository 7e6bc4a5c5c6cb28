//! The multi-package project being released.
//!
//! The project version lives in `lerna.json`; each directory under
//! `packages/` holds one `package.json`. All packages are released together
//! at the same version, and internal dependencies are pinned exactly so
//! consumers always get a set published together.

use crate::config::Config;
use crate::domain::SemanticVersion;
use crate::error::{ReleaseError, Result};
use crate::exec::CommandRunner;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEPENDENCY_SECTIONS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// The fields of `package.json` the release process reads
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }
}

/// A package directory and its manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub dir: PathBuf,
    pub manifest: PackageManifest,
}

impl Package {
    pub fn is_publishable(&self) -> bool {
        !self.manifest.private
    }
}

/// Archive name produced by `npm pack`: `@scope/name` at `1.2.3` packs to
/// `scope-name-1.2.3.tgz`
pub fn tarball_name(package_name: &str, version: &str) -> String {
    let name = package_name.replacen('@', "", 1).replacen('/', "-", 1);
    format!("{}-{}.tgz", name, version)
}

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    version_file: PathBuf,
    packages_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, config: &Config) -> Self {
        let root = root.into();
        Workspace {
            version_file: root.join(&config.version_file),
            packages_dir: root.join(&config.packages_dir),
            root,
        }
    }

    /// Version recorded in the version file
    pub fn current_version(&self) -> Result<SemanticVersion> {
        let value = read_json(&self.version_file)?;
        let version = value
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ReleaseError::manifest(format!(
                    "{} has no \"version\" field",
                    self.version_file.display()
                ))
            })?;
        SemanticVersion::parse(version)
    }

    /// All packages, sorted by directory name
    pub fn packages(&self) -> Result<Vec<Package>> {
        let mut dirs: Vec<PathBuf> = fs::read_dir(&self.packages_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.join("package.json").is_file())
            .collect();
        dirs.sort();

        dirs.into_iter()
            .map(|dir| -> Result<Package> {
                let manifest_path = dir.join("package.json");
                let text = fs::read_to_string(&manifest_path)?;
                let manifest: PackageManifest = serde_json::from_str(&text).map_err(|e| {
                    ReleaseError::manifest(format!("{}: {}", manifest_path.display(), e))
                })?;
                Ok(Package { dir, manifest })
            })
            .collect()
    }

    /// Write `version` into the version file and every package manifest,
    /// pinning dependencies on sibling packages to exactly that version.
    ///
    /// Returns the files that were rewritten.
    pub fn set_version(&self, version: &str) -> Result<Vec<PathBuf>> {
        let packages = self.packages()?;
        let internal: HashSet<&str> = packages
            .iter()
            .map(|p| p.manifest.name.as_str())
            .collect();

        let mut written = Vec::new();

        let mut root = read_json(&self.version_file)?;
        set_field(&mut root, "version", version, &self.version_file)?;
        write_json(&self.version_file, &root)?;
        written.push(self.version_file.clone());

        for package in &packages {
            let path = package.dir.join("package.json");
            let mut manifest = read_json(&path)?;
            set_field(&mut manifest, "version", version, &path)?;

            for section in DEPENDENCY_SECTIONS {
                if let Some(deps) = manifest.get_mut(section).and_then(Value::as_object_mut) {
                    for (name, range) in deps.iter_mut() {
                        if internal.contains(name.as_str()) {
                            *range = Value::String(version.to_string());
                        }
                    }
                }
            }

            write_json(&path, &manifest)?;
            written.push(path);
        }

        debug!("stamped {} with {}", written.len(), version);
        Ok(written)
    }

    /// Archives `npm pack` leaves in the project root for publishable packages
    pub fn tarball_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .packages()?
            .iter()
            .filter(|p| p.is_publishable())
            .map(|p| {
                self.root
                    .join(tarball_name(&p.manifest.name, &p.manifest.version))
            })
            .collect())
    }

    /// Pack every publishable package into the project root.
    ///
    /// `npm pack` skips `prepublishOnly`, so it is run explicitly first. That
    /// puts it ahead of `prepublish`/`prepare`, which is flagged when a
    /// package defines both.
    pub fn pack_all(&self, runner: &CommandRunner, npm: &str) -> Result<()> {
        for package in self.packages()?.iter().filter(|p| p.is_publishable()) {
            let manifest = &package.manifest;
            if manifest.has_script("prepublishOnly") {
                if manifest.has_script("prepublish") || manifest.has_script("prepare") {
                    warn!(
                        "{} has both a 'prepublishOnly' and either 'prepare' or 'prepublish' scripts; running prepublishOnly first",
                        manifest.name
                    );
                }
                runner.run_in(&package.dir, &format!("{} run prepublishOnly", npm))?;
            }
            runner.run(&format!("{} pack {}", npm, package.dir.display()))?;
        }
        Ok(())
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .map_err(|e| ReleaseError::manifest(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

fn set_field(value: &mut Value, key: &str, field: &str, path: &Path) -> Result<()> {
    let object = value.as_object_mut().ok_or_else(|| {
        ReleaseError::manifest(format!("{} is not a JSON object", path.display()))
    })?;
    object.insert(key.to_string(), Value::String(field.to_string()));
    Ok(())
}
