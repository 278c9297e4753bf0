//! Terminal folder picker for interactive mode.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::expand_home;
use crate::error::{Result, ResumeError};

/// Immediate, non-hidden subdirectories of `projects_dir`, sorted by name.
/// A missing directory yields an empty list.
pub fn list_projects(projects_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !projects_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut projects: Vec<PathBuf> = fs::read_dir(projects_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    projects.sort();
    Ok(projects)
}

/// Interpret one line of picker input: a menu number or a folder path.
pub fn resolve_choice(choice: &str, projects_dir: &Path, projects: &[PathBuf]) -> Option<PathBuf> {
    let choice = choice.trim();
    if choice.is_empty() {
        return None;
    }

    if let Ok(index) = choice.parse::<usize>() {
        if (1..=projects.len()).contains(&index) {
            return Some(projects[index - 1].clone());
        }
    }

    let path = expand_home(choice);
    if path.is_absolute() {
        Some(path)
    } else {
        Some(projects_dir.join(path))
    }
}

/// Show the project menu on `output` and read the selection from `input`.
pub fn pick_project<R: BufRead, W: Write>(
    projects_dir: &Path,
    input: &mut R,
    output: &mut W,
) -> Result<PathBuf> {
    let projects = list_projects(projects_dir)?;

    writeln!(output, "Select the project folder to resume")?;
    writeln!(output, "Projects in {}:", projects_dir.display())?;
    if projects.is_empty() {
        writeln!(output, "  (no project folders found)")?;
    }
    for (i, project) in projects.iter().enumerate() {
        let name = project
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        writeln!(output, "  {:>2}) {}", i + 1, name)?;
    }
    write!(output, "\nNumber or path (empty to cancel): ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let selected = resolve_choice(&line, projects_dir, &projects).ok_or(ResumeError::NoFolderSelected)?;
    tracing::debug!(path = %selected.display(), "folder selected");
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn projects_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        fs::create_dir(dir.path().join("alpha")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a project").unwrap();
        dir
    }

    #[test]
    fn lists_sorted_visible_directories() {
        let dir = projects_root();
        let projects = list_projects(dir.path()).unwrap();

        assert_eq!(
            projects,
            vec![dir.path().join("alpha"), dir.path().join("beta")]
        );
    }

    #[test]
    fn missing_projects_dir_lists_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(list_projects(&dir.path().join("absent")).unwrap().is_empty());
    }

    #[test]
    fn number_selects_menu_entry() {
        let dir = projects_root();
        let mut input = Cursor::new("2\n");
        let mut output = Vec::new();

        let selected = pick_project(dir.path(), &mut input, &mut output).unwrap();

        assert_eq!(selected, dir.path().join("beta"));
        let menu = String::from_utf8(output).unwrap();
        assert!(menu.contains(" 1) alpha"));
        assert!(menu.contains(" 2) beta"));
        assert!(!menu.contains(".hidden"));
    }

    #[test]
    fn relative_path_resolves_against_projects_dir() {
        let dir = projects_root();
        let mut input = Cursor::new("gamma\n");
        let mut output = Vec::new();

        let selected = pick_project(dir.path(), &mut input, &mut output).unwrap();
        assert_eq!(selected, dir.path().join("gamma"));
    }

    #[test]
    fn out_of_range_number_is_treated_as_path() {
        let dir = projects_root();
        let projects = list_projects(dir.path()).unwrap();

        let selected = resolve_choice("7", dir.path(), &projects).unwrap();
        assert_eq!(selected, dir.path().join("7"));
    }

    #[test]
    fn empty_input_cancels() {
        let dir = projects_root();
        for raw in ["\n", ""] {
            let mut input = Cursor::new(raw);
            let mut output = Vec::new();
            let err = pick_project(dir.path(), &mut input, &mut output).unwrap_err();
            assert!(matches!(err, ResumeError::NoFolderSelected));
        }
    }
}
