use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ResumeError};

pub const CONFIG_DIR_NAME: &str = "project-resume";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Expand a leading `~` to the home directory. Other input is returned as is.
pub fn expand_home(input: &str) -> PathBuf {
    let rest = if input == "~" {
        Some("")
    } else {
        input.strip_prefix("~/").or(input.strip_prefix("~\\"))
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input),
    }
}

/// User settings, read from `<config_dir>/project-resume/config.toml`.
/// Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory listed by the interactive folder picker.
    pub projects_dir: Option<PathBuf>,
    pub editor: String,
    /// Interpreter used to create the virtual environment.
    pub python: String,
    pub venv_dir: String,
    /// Script launched by the run script and the debug configuration.
    pub entry_point: String,
    pub log_dir: String,
    pub commit_limit: usize,
    /// Run the environment setup steps before reporting.
    pub setup: bool,
}

fn default_python() -> &'static str {
    if cfg!(windows) {
        "python"
    } else {
        "python3"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: None,
            editor: "code".to_string(),
            python: default_python().to_string(),
            venv_dir: ".venv".to_string(),
            entry_point: "main.py".to_string(),
            log_dir: "_logs".to_string(),
            commit_limit: 5,
            setup: true,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load settings. An explicit path must exist; the default location is
    /// optional and falls back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => {
                    tracing::debug!("no config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data).map_err(|source| ResumeError::ConfigError {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Folder the picker starts from: the configured one, else `~/Projects`,
    /// else the home directory itself.
    pub fn projects_dir(&self) -> PathBuf {
        if let Some(dir) = &self.projects_dir {
            return expand_home(&dir.to_string_lossy());
        }
        match dirs::home_dir() {
            Some(home) if home.join("Projects").is_dir() => home.join("Projects"),
            Some(home) => home,
            None => PathBuf::from("."),
        }
    }

    pub fn run_script_name(&self) -> &'static str {
        if cfg!(windows) {
            "run.bat"
        } else {
            "run.sh"
        }
    }
}
