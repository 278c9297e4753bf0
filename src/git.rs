use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Git command failed: {0}")]
    GitError(String),

    #[error("Uncommitted changes in working tree")]
    UncommittedChanges,

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, GitError>;

/// Snapshot of a project's version-control state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GitInfo {
    pub is_git_repo: bool,
    pub current_branch: Option<String>,
    pub uncommitted_changes: Vec<String>,
    pub recent_commits: Vec<String>,
    pub remote_url: Option<String>,
    pub branches: Vec<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum BranchAction {
    Kept,
    Switched,
    Created,
    Skipped,
    Failed(String),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BranchSelection {
    pub branch: Option<String>,
    pub action: BranchAction,
}

pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

// Runs git in `path` and returns trimmed stdout, or the stderr text on failure.
fn run_git(path: &Path, args: &[&str]) -> Result<String> {
    tracing::debug!(cwd = %path.display(), ?args, "running git");
    let output = Command::new("git").current_dir(path).args(args).output()?;

    if !output.status.success() {
        return Err(GitError::GitError(format!(
            "git {}: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub fn get_current_branch(path: &Path) -> Result<Option<String>> {
    let branch = run_git(path, &["branch", "--show-current"])?;
    // Detached HEAD prints nothing
    Ok(Some(branch).filter(|b| !b.is_empty()))
}

pub fn get_uncommitted_changes(path: &Path) -> Result<Vec<String>> {
    // Porcelain lines carry a two-column status prefix, so only trim line ends
    let output = Command::new("git")
        .current_dir(path)
        .args(["status", "--porcelain"])
        .output()?;

    if !output.status.success() {
        return Err(GitError::GitError(format!(
            "git status --porcelain: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(non_empty_lines(String::from_utf8_lossy(&output.stdout).trim_end()))
}

pub fn get_recent_commits(path: &Path, limit: usize) -> Result<Vec<String>> {
    let limit_arg = format!("-{}", limit);
    match run_git(path, &["log", limit_arg.as_str(), "--oneline", "--decorate"]) {
        Ok(log) => Ok(non_empty_lines(&log)),
        // A freshly initialised repository has no commits yet
        Err(_) if !has_commits(path) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn has_commits(path: &Path) -> bool {
    run_git(path, &["rev-parse", "--verify", "--quiet", "HEAD"]).is_ok()
}

/// Returns `None` when the project has no `origin` remote.
pub fn get_remote_url(path: &Path) -> Result<Option<String>> {
    let output = Command::new("git")
        .current_dir(path)
        .args(["remote", "get-url", "origin"])
        .output()?;

    if !output.status.success() {
        return Ok(None);
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(url).filter(|u| !u.is_empty()))
}

pub fn list_local_branches(path: &Path) -> Result<Vec<String>> {
    let output = run_git(path, &["branch", "--format=%(refname:short)"])?;
    Ok(non_empty_lines(&output))
}

pub fn branch_exists(path: &Path, branch: &str) -> Result<bool> {
    let output = Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--verify", "--quiet"])
        .arg(format!("refs/heads/{}", branch))
        .output()?;
    Ok(output.status.success())
}

/// Fails when tracked files have changes. Untracked files (`??`) are
/// carried across a checkout, so they do not count.
pub fn check_uncommitted_changes(path: &Path) -> Result<()> {
    let changes = get_uncommitted_changes(path)?;
    if changes.iter().any(|line| !line.starts_with("??")) {
        return Err(GitError::UncommittedChanges);
    }
    Ok(())
}

/// Collect the git state of `path`. Never fails: the first git error is
/// recorded in [`GitInfo::error`] and the remaining queries still run.
pub fn collect_git_info(path: &Path, commit_limit: usize) -> GitInfo {
    let mut info = GitInfo::default();

    if !is_git_repo(path) {
        return info;
    }
    info.is_git_repo = true;

    let mut first_error: Option<String> = None;
    let mut record = |e: GitError| {
        tracing::warn!(error = %e, "git query failed");
        first_error.get_or_insert_with(|| e.to_string());
    };

    match get_current_branch(path) {
        Ok(branch) => info.current_branch = branch,
        Err(e) => record(e),
    }
    match get_uncommitted_changes(path) {
        Ok(changes) => info.uncommitted_changes = changes,
        Err(e) => record(e),
    }
    match get_recent_commits(path, commit_limit) {
        Ok(commits) => info.recent_commits = commits,
        Err(e) => record(e),
    }
    match get_remote_url(path) {
        Ok(url) => info.remote_url = url,
        Err(e) => record(e),
    }
    match list_local_branches(path) {
        Ok(branches) => info.branches = branches,
        Err(e) => record(e),
    }

    info.error = first_error;
    info
}

fn checkout_branch(path: &Path, branch: &str) -> Result<BranchAction> {
    if run_git(path, &["check-ref-format", "--branch", branch]).is_err() {
        return Err(GitError::InvalidBranchName(branch.to_string()));
    }

    check_uncommitted_changes(path)?;

    if branch_exists(path, branch)? {
        run_git(path, &["checkout", branch])?;
        Ok(BranchAction::Switched)
    } else {
        run_git(path, &["checkout", "-b", branch])?;
        Ok(BranchAction::Created)
    }
}

/// Make sure the working tree is on `requested`, creating the branch when it
/// does not exist. Without a request the current branch is kept.
pub fn select_branch(path: &Path, requested: Option<&str>) -> BranchSelection {
    if !is_git_repo(path) {
        return BranchSelection {
            branch: None,
            action: BranchAction::Skipped,
        };
    }

    let current = match get_current_branch(path) {
        Ok(current) => current,
        Err(e) => {
            return BranchSelection {
                branch: None,
                action: BranchAction::Failed(e.to_string()),
            }
        }
    };

    let Some(requested) = requested.map(str::trim).filter(|b| !b.is_empty()) else {
        return BranchSelection {
            branch: current,
            action: BranchAction::Kept,
        };
    };

    if current.as_deref() == Some(requested) {
        return BranchSelection {
            branch: current,
            action: BranchAction::Kept,
        };
    }

    match checkout_branch(path, requested) {
        Ok(action) => {
            tracing::info!(branch = requested, ?action, "branch selected");
            BranchSelection {
                branch: Some(requested.to_string()),
                action,
            }
        }
        Err(e) => {
            tracing::warn!(branch = requested, error = %e, "branch selection failed");
            BranchSelection {
                branch: current,
                action: BranchAction::Failed(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
