//! Human-readable status report and its persisted log copy.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::environment::{EnvInfo, SetupSummary};
use crate::git::{BranchAction, GitInfo};

const RULE: &str = "============================================================";

#[derive(Serialize, Debug, Clone)]
pub struct StatusReport {
    pub project_path: PathBuf,
    pub project_name: String,
    pub generated_at: DateTime<Local>,
    pub git: GitInfo,
    pub environment: EnvInfo,
    pub claude_md: Option<String>,
    pub setup: Option<SetupSummary>,
}

fn mark(present: bool) -> &'static str {
    if present {
        "[x]"
    } else {
        "[ ]"
    }
}

fn branch_label(summary: &SetupSummary) -> String {
    let branch = summary.branch.branch.as_deref().unwrap_or("(detached HEAD)");
    match &summary.branch.action {
        BranchAction::Kept => format!("{branch} (kept)"),
        BranchAction::Switched => format!("{branch} (switched)"),
        BranchAction::Created => format!("{branch} (created)"),
        BranchAction::Skipped => "skipped (not a git repository)".to_string(),
        BranchAction::Failed(reason) => format!("{branch} (FAILED: {reason})"),
    }
}

impl StatusReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, " Project: {}", self.project_name);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Path:      {}", self.project_path.display());
        let _ = writeln!(
            out,
            "Generated: {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        );

        let _ = writeln!(out, "\n[Git]");
        self.render_git(&mut out);

        let env = &self.environment;
        let _ = writeln!(out, "\n[Environment]");
        let _ = writeln!(out, "  {} virtual environment", mark(env.venv_exists));
        let _ = writeln!(out, "  {} requirements.txt", mark(env.requirements_exists));
        let _ = writeln!(out, "  {} .env", mark(env.env_exists));
        let _ = writeln!(out, "  {} run script", mark(env.run_script_exists));
        let _ = writeln!(out, "  {} .vscode/launch.json", mark(env.launch_config_exists));
        let _ = writeln!(out, "  {} CLAUDE.md", mark(env.claude_md_exists));

        if let Some(setup) = &self.setup {
            let _ = writeln!(out, "\n[Setup]");
            let _ = writeln!(out, "  Virtual environment: {}", setup.venv.label());
            let _ = writeln!(out, "  Run script:          {}", setup.run_script.label());
            let _ = writeln!(out, "  Launch config:       {}", setup.launch_config.label());
            let _ = writeln!(out, "  Branch:              {}", branch_label(setup));
        }

        let _ = writeln!(out, "\n[CLAUDE.md]");
        match &self.claude_md {
            Some(text) => {
                let _ = writeln!(out, "  present ({} lines)", text.lines().count());
            }
            None => {
                let _ = writeln!(out, "  not found");
            }
        }

        out
    }

    fn render_git(&self, out: &mut String) {
        let git = &self.git;
        if !git.is_git_repo {
            let _ = writeln!(out, "  not a git repository");
            return;
        }

        let _ = writeln!(
            out,
            "  Branch: {}",
            git.current_branch.as_deref().unwrap_or("(detached HEAD)")
        );
        let _ = writeln!(
            out,
            "  Remote: {}",
            git.remote_url.as_deref().unwrap_or("(none)")
        );

        if git.uncommitted_changes.is_empty() {
            let _ = writeln!(out, "  Working tree clean");
        } else {
            let _ = writeln!(
                out,
                "  Uncommitted changes: {}",
                git.uncommitted_changes.len()
            );
            for change in &git.uncommitted_changes {
                let _ = writeln!(out, "    {change}");
            }
        }

        if git.recent_commits.is_empty() {
            let _ = writeln!(out, "  No commits yet");
        } else {
            let _ = writeln!(out, "  Recent commits:");
            for commit in &git.recent_commits {
                let _ = writeln!(out, "    {commit}");
            }
        }

        if let Some(error) = &git.error {
            let _ = writeln!(out, "  Warning: {error}");
        }
    }

    /// Write the rendered report to `<project>/<log_dir>/restart_<stamp>.log`
    /// and return the path written.
    pub fn save_log(&self, log_dir: &str) -> std::io::Result<PathBuf> {
        let dir = self.project_path.join(log_dir);
        fs::create_dir_all(&dir)?;

        let stamp = self.generated_at.format("%Y%m%d_%H%M%S").to_string();
        let body = self.render_text();
        write_new_log(&dir, &stamp, &body)
    }
}

// Never overwrites an earlier log from the same second.
fn write_new_log(dir: &Path, stamp: &str, body: &str) -> std::io::Result<PathBuf> {
    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("restart_{stamp}.log")
        } else {
            format!("restart_{stamp}_{attempt}.log")
        };
        let path = dir.join(name);

        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(body.as_bytes())?;
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
