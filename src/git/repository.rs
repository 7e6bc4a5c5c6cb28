use crate::error::{ReleaseError, Result};
use crate::exec::CommandRunner;
use git2::Repository as Git2Repo;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    workdir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("cannot release from a bare repository"))?;

        Ok(Git2Repository { repo, workdir })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Path relative to the working directory, as the index expects
    fn relative(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }
        if let Ok(rel) = path.strip_prefix(&self.workdir) {
            return Ok(rel.to_path_buf());
        }

        let canonical = path.canonicalize()?;
        let workdir = self.workdir.canonicalize()?;
        canonical
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                ReleaseError::config(format!("{} is outside the repository", path.display()))
            })
    }
}

fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }

            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }
        }

        git2::Cred::default()
    });

    callbacks.push_update_reference(|refname, status| match status {
        Some(status) => Err(git2::Error::from_str(&format!(
            "Push rejected for {}: {}",
            refname, status
        ))),
        None => Ok(()),
    });

    callbacks
}

impl super::Repository for Git2Repository {
    fn status_text(&self) -> Result<String> {
        CommandRunner::new(&self.workdir).run("git status")
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::config("HEAD is detached"));
        }
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::config("branch name is not valid UTF-8"))
    }

    fn commit_files(&self, paths: &[PathBuf], message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            index.add_path(&self.relative(path)?)?;
        }
        index.write()?;

        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        debug!("created commit {}", oid);
        Ok(oid.to_string())
    }

    fn create_tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.repo.head()?.peel_to_commit()?;
        let signature = self.repo.signature()?;
        self.repo
            .tag(name, head.as_object(), &signature, message, false)?;
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, tag: &str) -> Result<()> {
        let mut remote = self.repo.find_remote(remote)?;

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(remote_callbacks());

        let refspecs = [
            format!("refs/heads/{}:refs/heads/{}", branch, branch),
            format!("refs/tags/{}:refs/tags/{}", tag, tag),
        ];
        let refspec_strs: Vec<&str> = refspecs.iter().map(String::as_str).collect();

        debug!("pushing {:?}", refspec_strs);
        remote.push(&refspec_strs, Some(&mut push_options))?;
        Ok(())
    }
}
