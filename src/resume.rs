use chrono::Local;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::environment::{self, SetupSummary};
use crate::error::{Result, ResumeError};
use crate::git;
use crate::report::StatusReport;

#[derive(Debug, Clone)]
pub struct ResumeOptions {
    /// Branch to check out (created when missing).
    pub branch: Option<String>,
    pub setup: bool,
    pub save_log: bool,
}

impl Default for ResumeOptions {
    fn default() -> Self {
        Self {
            branch: None,
            setup: true,
            save_log: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResumeOutcome {
    pub report: StatusReport,
    pub log_file: Option<PathBuf>,
}

/// Absolute, symlink-free project directory, or the reason it is unusable.
pub fn resolve_project_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if !absolute.exists() {
        return Err(ResumeError::ProjectNotFound(absolute));
    }
    if !absolute.is_dir() {
        return Err(ResumeError::NotADirectory(absolute));
    }

    Ok(absolute.canonicalize()?)
}

pub fn run_setup(project: &Path, config: &Config, branch: Option<&str>) -> SetupSummary {
    // Branch first: the files written below would otherwise dirty the tree
    // and they belong on the selected branch.
    let branch = git::select_branch(project, branch);
    SetupSummary {
        venv: environment::ensure_venv(project, config),
        run_script: environment::ensure_run_script(project, config),
        launch_config: environment::ensure_launch_config(project, config),
        branch,
    }
}

/// Bring the project at `path` up to a workable state and report on it.
pub fn resume_project(path: &Path, config: &Config, options: &ResumeOptions) -> Result<ResumeOutcome> {
    let project = resolve_project_path(path)?;
    let project_name = project
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| project.display().to_string());
    tracing::info!(project = %project.display(), "resuming project");

    // Setup runs first so the checks below see what it created
    let setup = options
        .setup
        .then(|| run_setup(&project, config, options.branch.as_deref()));

    let report = StatusReport {
        git: git::collect_git_info(&project, config.commit_limit),
        environment: environment::probe_environment(&project, config),
        claude_md: environment::read_claude_md(&project)?,
        generated_at: Local::now(),
        project_path: project,
        project_name,
        setup,
    };

    let log_file = if options.save_log {
        match report.save_log(&config.log_dir) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "report saved");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save report log");
                None
            }
        }
    } else {
        None
    };

    Ok(ResumeOutcome { report, log_file })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SetupOutcome;
    use crate::git::BranchAction;
    use std::fs;
    use tempfile::TempDir;

    fn offline_config() -> Config {
        Config {
            python: "definitely-not-a-python".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn missing_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = resume_project(
            &dir.path().join("absent"),
            &Config::default(),
            &ResumeOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResumeError::ProjectNotFound(_)));
    }

    #[test]
    fn file_path_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("main.py");
        fs::write(&file, "print('hi')").unwrap();

        let err = resume_project(&file, &Config::default(), &ResumeOptions::default()).unwrap_err();
        assert!(matches!(err, ResumeError::NotADirectory(_)));
    }

    #[test]
    fn info_only_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let options = ResumeOptions {
            setup: false,
            save_log: false,
            ..ResumeOptions::default()
        };

        let outcome = resume_project(dir.path(), &Config::default(), &options).unwrap();

        assert!(outcome.report.setup.is_none());
        assert!(outcome.log_file.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!outcome.report.git.is_git_repo);
    }

    #[test]
    fn setup_run_writes_templates_and_log() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CLAUDE.md"), "# Notes\n").unwrap();
        let config = offline_config();

        let outcome = resume_project(dir.path(), &config, &ResumeOptions::default()).unwrap();
        let report = &outcome.report;

        let setup = report.setup.as_ref().unwrap();
        assert!(matches!(setup.venv, SetupOutcome::Failed(_)));
        assert_eq!(setup.run_script, SetupOutcome::Created);
        assert_eq!(setup.launch_config, SetupOutcome::Created);
        assert_eq!(setup.branch.action, BranchAction::Skipped);

        assert!(report.environment.run_script_exists);
        assert!(report.environment.launch_config_exists);
        assert!(!report.environment.venv_exists);
        assert_eq!(report.claude_md.as_deref(), Some("# Notes\n"));
        assert_eq!(
            report.project_name,
            dir.path().canonicalize().unwrap().file_name().unwrap().to_string_lossy()
        );

        let log = outcome.log_file.unwrap();
        assert!(log.exists());
        assert!(fs::read_to_string(log).unwrap().contains("[Setup]"));
    }

    #[test]
    fn second_run_reports_existing_files() {
        let dir = TempDir::new().unwrap();
        let config = offline_config();
        let options = ResumeOptions {
            save_log: false,
            ..ResumeOptions::default()
        };

        resume_project(dir.path(), &config, &options).unwrap();
        let outcome = resume_project(dir.path(), &config, &options).unwrap();

        let setup = outcome.report.setup.unwrap();
        assert_eq!(setup.run_script, SetupOutcome::Existing);
        assert_eq!(setup.launch_config, SetupOutcome::Existing);
    }

    fn git(repo: &Path, args: &[&str]) -> bool {
        std::process::Command::new("git")
            .current_dir(repo)
            .args(args)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn committed_repo() -> Option<TempDir> {
        let dir = TempDir::new().ok()?;
        let steps: [&[&str]; 7] = [
            &["init"],
            &["config", "user.email", "test@example.com"],
            &["config", "user.name", "Test User"],
            &["config", "commit.gpgsign", "false"],
            &["checkout", "-b", "main"],
            &["add", "."],
            &["commit", "-m", "Initial commit"],
        ];
        fs::write(dir.path().join("main.py"), "print('hi')\n").ok()?;
        for args in steps {
            if !git(dir.path(), args) {
                eprintln!("git {:?} failed, skipping test", args);
                return None;
            }
        }
        Some(dir)
    }

    #[test]
    fn branch_is_selected_before_setup_writes_files() {
        let Some(dir) = committed_repo() else {
            return; // Skip test if git is not available
        };
        let config = offline_config();
        let options = ResumeOptions {
            branch: Some("feature".to_string()),
            ..ResumeOptions::default()
        };

        let outcome = resume_project(dir.path(), &config, &options).unwrap();

        let setup = outcome.report.setup.unwrap();
        assert_eq!(setup.branch.action, BranchAction::Created);
        assert_eq!(setup.branch.branch.as_deref(), Some("feature"));
        assert_eq!(setup.run_script, SetupOutcome::Created);
        assert_eq!(outcome.report.git.current_branch.as_deref(), Some("feature"));
        assert!(outcome.log_file.is_some());

        // Templates and the log from the first run are untracked and must not
        // block a later switch.
        let options = ResumeOptions {
            branch: Some("main".to_string()),
            ..ResumeOptions::default()
        };
        let outcome = resume_project(dir.path(), &config, &options).unwrap();

        let setup = outcome.report.setup.unwrap();
        assert_eq!(setup.branch.action, BranchAction::Switched);
        assert_eq!(outcome.report.git.current_branch.as_deref(), Some("main"));
        assert!(outcome
            .report
            .git
            .uncommitted_changes
            .iter()
            .any(|line| line.starts_with("??")));
    }

    #[test]
    fn log_file_stamp_matches_report_timestamp() {
        let dir = TempDir::new().unwrap();
        let options = ResumeOptions {
            setup: false,
            ..ResumeOptions::default()
        };

        let outcome = resume_project(dir.path(), &Config::default(), &options).unwrap();

        let stamp = outcome.report.generated_at.format("%Y%m%d_%H%M%S").to_string();
        let name = outcome.log_file.unwrap().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name, format!("restart_{stamp}.log"));
    }
}
