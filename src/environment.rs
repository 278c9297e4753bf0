//! Environment inspection and the setup steps that bring a project up to a
//! workable state: virtual environment, run script and editor launch
//! configuration. Every step leaves existing files untouched.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::process::Command;

use crate::config::Config;
use crate::git::BranchSelection;
use crate::{generate_launch_config, generate_run_script};

pub const REQUIREMENTS_FILE: &str = "requirements.txt";
pub const CLAUDE_MD_FILE: &str = "CLAUDE.md";
pub const ENV_FILE: &str = ".env";
pub const LAUNCH_CONFIG_PATH: &str = ".vscode/launch.json";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EnvInfo {
    pub venv_exists: bool,
    pub requirements_exists: bool,
    pub claude_md_exists: bool,
    pub env_exists: bool,
    pub run_script_exists: bool,
    pub launch_config_exists: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SetupOutcome {
    Created,
    Existing,
    Failed(String),
}

impl SetupOutcome {
    pub fn label(&self) -> String {
        match self {
            SetupOutcome::Created => "created".to_string(),
            SetupOutcome::Existing => "already present".to_string(),
            SetupOutcome::Failed(reason) => format!("FAILED ({})", reason),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SetupSummary {
    pub venv: SetupOutcome,
    pub run_script: SetupOutcome,
    pub launch_config: SetupOutcome,
    pub branch: BranchSelection,
}

pub fn probe_environment(project: &Path, config: &Config) -> EnvInfo {
    EnvInfo {
        venv_exists: project.join(&config.venv_dir).exists(),
        requirements_exists: project.join(REQUIREMENTS_FILE).exists(),
        claude_md_exists: project.join(CLAUDE_MD_FILE).exists(),
        env_exists: project.join(ENV_FILE).exists(),
        run_script_exists: project.join(config.run_script_name()).exists(),
        launch_config_exists: project.join(LAUNCH_CONFIG_PATH).exists(),
    }
}

pub fn read_claude_md(project: &Path) -> std::io::Result<Option<String>> {
    let path = project.join(CLAUDE_MD_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path)?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Create the virtual environment with `<python> -m venv <venv_dir>`.
pub fn ensure_venv(project: &Path, config: &Config) -> SetupOutcome {
    if project.join(&config.venv_dir).exists() {
        return SetupOutcome::Existing;
    }

    tracing::info!(python = %config.python, dir = %config.venv_dir, "creating virtual environment");
    let output = Command::new(&config.python)
        .current_dir(project)
        .args(["-m", "venv"])
        .arg(&config.venv_dir)
        .output();

    match output {
        Ok(out) if out.status.success() => SetupOutcome::Created,
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            let reason = if stderr.is_empty() {
                format!("{} -m venv exited with {}", config.python, out.status)
            } else {
                stderr
            };
            tracing::warn!(%reason, "virtual environment creation failed");
            SetupOutcome::Failed(reason)
        }
        Err(e) => {
            tracing::warn!(error = %e, python = %config.python, "could not run python");
            SetupOutcome::Failed(format!("could not run '{}': {}", config.python, e))
        }
    }
}

// Returns Ok(false) when the file already exists.
fn write_if_missing(path: &Path, contents: &str) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(true)
}

fn outcome_of(step: &str, result: std::io::Result<bool>) -> SetupOutcome {
    match result {
        Ok(true) => {
            tracing::info!(step, "created");
            SetupOutcome::Created
        }
        Ok(false) => SetupOutcome::Existing,
        Err(e) => {
            tracing::warn!(step, error = %e, "setup step failed");
            SetupOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

pub fn ensure_run_script(project: &Path, config: &Config) -> SetupOutcome {
    let path = project.join(config.run_script_name());
    let script = generate_run_script(&config.venv_dir, &config.entry_point, cfg!(windows));
    let result = write_if_missing(&path, &script).and_then(|created| {
        if created {
            make_executable(&path)?;
        }
        Ok(created)
    });
    outcome_of("run script", result)
}

pub fn ensure_launch_config(project: &Path, config: &Config) -> SetupOutcome {
    let path = project.join(LAUNCH_CONFIG_PATH);
    let launch = generate_launch_config(&config.venv_dir, &config.entry_point, cfg!(windows));
    outcome_of("launch config", write_if_missing(&path, &launch))
}
