use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ResumeError};

pub fn find_editor(editor: &str) -> Result<PathBuf> {
    which::which(editor).map_err(|_| ResumeError::EditorNotFound(editor.to_string()))
}

/// Open `project` in `editor` and wait for the launcher to return.
///
/// Editor CLIs such as `code` or `cursor` hand the folder to a running window
/// and exit, so waiting does not block on the editing session.
pub fn launch_editor(editor: &str, project: &Path) -> Result<()> {
    let binary = find_editor(editor)?;
    tracing::info!(editor, binary = %binary.display(), project = %project.display(), "launching editor");

    let status = Command::new(&binary)
        .arg(project)
        .status()
        .map_err(|e| ResumeError::EditorFailed {
            editor: editor.to_string(),
            reason: e.to_string(),
        })?;

    if !status.success() {
        return Err(ResumeError::EditorFailed {
            editor: editor.to_string(),
            reason: format!("exited with {}", status),
        });
    }

    Ok(())
}
