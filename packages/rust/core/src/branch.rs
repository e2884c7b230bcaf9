//! Source-control branch lookup for notebook links.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use colablinks_shared::{ColabLinksError, Result};

/// Upper bound on a single `git` invocation.
const GIT_TIMEOUT_SECS: u64 = 10;

/// Resolves the branch a changed file lives on.
pub trait BranchLookup {
    fn branch_for(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Branch lookup backed by an optional fixed name and the local git checkout.
///
/// A fixed branch (from `GITHUB_HEAD_REF`, `--branch`, or the event payload)
/// wins. Otherwise `git rev-parse --abbrev-ref HEAD` runs in the file's
/// directory, memoised per directory.
#[derive(Debug)]
pub struct BranchResolver {
    work_dir: PathBuf,
    fixed: Option<String>,
    cache: Mutex<HashMap<PathBuf, String>>,
}

impl BranchResolver {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            fixed: None,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Use the first non-empty candidate as the branch for every file.
    pub fn with_fixed_branch<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        self.fixed = candidates
            .into_iter()
            .flatten()
            .map(Into::into)
            .find(|b: &String| !b.trim().is_empty());
        self
    }

    pub fn fixed_branch(&self) -> Option<&str> {
        self.fixed.as_deref()
    }

    /// Directory to run git in: the file's parent when it exists locally.
    fn lookup_dir(&self, path: &str) -> PathBuf {
        match self.work_dir.join(path).parent() {
            Some(dir) if dir.is_dir() => dir.to_path_buf(),
            _ => self.work_dir.clone(),
        }
    }
}

impl BranchLookup for BranchResolver {
    #[instrument(skip(self))]
    async fn branch_for(&self, path: &str) -> Result<String> {
        if let Some(branch) = &self.fixed {
            return Ok(branch.clone());
        }

        let dir = self.lookup_dir(path);
        let mut cache = self.cache.lock().await;
        if let Some(branch) = cache.get(&dir) {
            return Ok(branch.clone());
        }

        let branch = git_current_branch(&dir).await?;
        debug!(dir = %dir.display(), %branch, "resolved branch from git");
        cache.insert(dir, branch.clone());
        Ok(branch)
    }
}

/// Name of the branch checked out in `dir`.
async fn git_current_branch(dir: &Path) -> Result<String> {
    let mut command = Command::new("git");
    command
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(dir)
        .kill_on_drop(true);

    let output = tokio::time::timeout(Duration::from_secs(GIT_TIMEOUT_SECS), command.output())
        .await
        .map_err(|_| {
            ColabLinksError::repository_state(format!(
                "git timed out after {GIT_TIMEOUT_SECS}s in {}",
                dir.display()
            ))
        })?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                ColabLinksError::repository_state("git executable not found on PATH")
            }
            _ => ColabLinksError::repository_state(format!(
                "failed to run git in {}: {e}",
                dir.display()
            )),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ColabLinksError::repository_state(format!(
            "git rev-parse failed in {}: {}",
            dir.display(),
            stderr.trim()
        )));
    }

    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    match branch.as_str() {
        "" | "HEAD" => Err(ColabLinksError::repository_state(format!(
            "{} is on a detached HEAD; set GITHUB_HEAD_REF or pass --branch",
            dir.display()
        ))),
        _ => Ok(branch),
    }
}
