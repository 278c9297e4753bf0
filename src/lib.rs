pub mod config;
pub mod editor;
pub mod environment;
pub mod error;
pub mod git;
pub mod picker;
pub mod report;
pub mod resume;

pub use config::Config;
pub use error::{Result, ResumeError};
pub use resume::{resume_project, ResumeOptions};

pub fn generate_run_script(venv_dir: &str, entry_point: &str, windows: bool) -> String {
    if windows {
        let venv_dir = venv_dir.replace('/', "\\");
        format!(
            "@echo off\r\n\
cd /d \"%~dp0\"\r\n\
call \"{}\\Scripts\\activate.bat\"\r\n\
python \"{}\" %*\r\n",
            venv_dir, entry_point
        )
    } else {
        format!(
            r#"#!/usr/bin/env bash
set -e
cd "$(dirname "$0")"
source "{}/bin/activate"
python "{}" "$@"
"#,
            venv_dir, entry_point
        )
    }
}

/// VS Code `launch.json` with one debug configuration for `entry_point`,
/// running on the project's virtual environment interpreter.
pub fn generate_launch_config(venv_dir: &str, entry_point: &str, windows: bool) -> String {
    let interpreter = if windows {
        format!("${{workspaceFolder}}\\{}\\Scripts\\python.exe", venv_dir.replace('/', "\\"))
    } else {
        format!("${{workspaceFolder}}/{}/bin/python", venv_dir)
    };

    let config = serde_json::json!({
        "version": "0.2.0",
        "configurations": [
            {
                "name": format!("Python: {}", entry_point),
                "type": "debugpy",
                "request": "launch",
                "program": format!("${{workspaceFolder}}/{}", entry_point),
                "console": "integratedTerminal",
                "python": interpreter,
                "envFile": "${workspaceFolder}/.env",
                "justMyCode": true
            }
        ]
    });

    // Serializing a json! literal cannot fail
    let mut text = serde_json::to_string_pretty(&config).unwrap_or_default();
    text.push('\n');
    text
}
