//! Temporary shallow clones with guaranteed cleanup.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Prefix of the temporary clone directory.
const CLONE_DIR_PREFIX: &str = "shipnote_repo_";

/// A repository cloned into a temporary directory owned by this value.
///
/// The directory is removed when the value is dropped, on success, error and
/// interrupt paths alike. Read-only files left behind by git (pack files on
/// some platforms) are made writable first so removal cannot fail on them.
pub struct ClonedRepository {
    dir: Option<TempDir>,
}

impl ClonedRepository {
    /// Creates the empty temporary directory a clone will be written to.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(CLONE_DIR_PREFIX)
            .tempdir()
            .context("Failed to create temporary directory for clone")?;
        Ok(Self::from_temp_dir(dir))
    }

    /// Runs `git clone --depth <depth> <url>` into this directory.
    ///
    /// When `interrupt` resolves first, git is killed and reaped before this
    /// returns an error, so dropping `self` afterwards removes everything.
    pub async fn clone_shallow<F>(&self, url: &str, depth: usize, interrupt: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        debug!(url, depth, path = %self.path().display(), "Cloning repository");
        let mut child = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg(depth.max(1).to_string())
            .arg(url)
            .arg(self.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .context("Failed to run git clone. Is git installed?")?;

        let stderr = child.stderr.take().map(|mut pipe| {
            tokio::spawn(async move {
                let mut bytes = Vec::new();
                if let Err(e) = pipe.read_to_end(&mut bytes).await {
                    debug!("Failed to read git clone stderr: {e}");
                }
                bytes
            })
        });

        let status = tokio::select! {
            status = child.wait() => Some(status.context("Failed to wait for git clone")?),
            () = interrupt => None,
        };

        let Some(status) = status else {
            if let Err(e) = child.kill().await {
                warn!("Failed to stop git clone: {e}");
            }
            bail!("Interrupted while cloning");
        };

        if !status.success() {
            let stderr = match stderr {
                Some(task) => task.await.unwrap_or_default(),
                None => Vec::new(),
            };
            bail!(
                "Git clone failed:\n{}",
                String::from_utf8_lossy(&stderr).trim()
            );
        }
        Ok(())
    }

/// Takes ownership of an existing temporary directory.
    pub(crate) fn from_temp_dir(dir: TempDir) -> Self {
        Self { dir: Some(dir) }
    }

    /// Path of the clone.
    pub fn path(&self) -> &Path {
        self.dir.as_ref().map_or_else(|| Path::new(""), TempDir::path)
    }

    /// Disarms cleanup and returns the path, leaving the clone on disk.
    pub fn keep(mut self) -> PathBuf {
        match self.dir.take() {
            Some(dir) => dir.keep(),
            None => PathBuf::new(),
        }
    }
}

impl Drop for ClonedRepository {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        if let Err(e) = make_writable(&path) {
            warn!(path = %path.display(), "Failed to clear read-only flags: {e}");
        }
        match dir.close() {
            Ok(()) => debug!(path = %path.display(), "Removed temporary clone"),
            Err(e) => warn!(path = %path.display(), "Failed to remove temporary clone: {e}"),
        }
    }
}

/// Recursively clears the read-only flag under `path`.
fn make_writable(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }

    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }

    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            make_writable(&entry?.path())?;
        }
    }
    Ok(())
}
