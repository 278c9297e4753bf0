mod output;

use clap::{ArgAction, Parser};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use project_resume::editor::launch_editor;
use project_resume::picker::pick_project;
use project_resume::report::StatusReport;
use project_resume::{resume_project, Config, ResumeOptions, Result};

use output::{print_error, print_json};

#[derive(Parser, Debug)]
#[command(
    name = "project-resume",
    about = "Re-open an existing project: check git, prepare the environment, report and launch the editor",
    version
)]
struct Cli {
    /// Project to resume. Prints a JSON report for automation instead of prompting
    #[arg(long)]
    path: Option<PathBuf>,

    /// Branch to check out, created if it does not exist
    #[arg(long)]
    branch: Option<String>,

    /// Launch the editor in --path mode too
    #[arg(long)]
    open: bool,

    /// Only inspect; skip venv, run script, launch config and branch steps
    #[arg(long)]
    no_setup: bool,

    /// Do not write the report log
    #[arg(long)]
    no_log: bool,

    /// Editor command (default from config, else `code`)
    #[arg(long, env = "PROJECT_RESUME_EDITOR")]
    editor: Option<String>,

    /// Config file (default: <config dir>/project-resume/config.toml)
    #[arg(long, env = "PROJECT_RESUME_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    success: bool,
    #[serde(flatten)]
    status: &'a StatusReport,
    report: String,
    log_file: Option<&'a Path>,
    editor_launched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    editor_error: Option<String>,
}

#[derive(Serialize)]
struct InteractiveOutput<'a> {
    success: bool,
    message: String,
    project_path: &'a Path,
    venv_exists: bool,
    log_file: Option<&'a Path>,
}

/// Set while the folder prompt waits for input.
static PROMPTING: AtomicBool = AtomicBool::new(false);

/// Marks the prompt window; the flag clears on drop, error paths included.
struct PromptGuard;

impl PromptGuard {
    fn enter() -> Self {
        PROMPTING.store(true, Ordering::SeqCst);
        PromptGuard
    }
}

impl Drop for PromptGuard {
    fn drop(&mut self) {
        PROMPTING.store(false, Ordering::SeqCst);
    }
}

fn on_interrupt() {
    // Outside the prompt, stdout may already hold the report, so exit
    // without appending the cancellation envelope.
    if PROMPTING.load(Ordering::SeqCst) {
        println!();
        print_error("Cancelled by user");
    }
    std::process::exit(130);
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };

    // stdout carries the JSON contract, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let result = match &cli.path {
        Some(path) => handle_info_mode(&cli, path),
        None => handle_interactive_mode(&cli),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "run failed");
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(editor) = &cli.editor {
        config.editor = editor.clone();
    }
    Ok(config)
}

fn resume_options(cli: &Cli, config: &Config) -> ResumeOptions {
    ResumeOptions {
        branch: cli.branch.clone(),
        setup: config.setup && !cli.no_setup,
        save_log: !cli.no_log,
    }
}

fn handle_info_mode(cli: &Cli, path: &Path) -> Result<()> {
    let config = load_config(cli)?;
    let outcome = resume_project(path, &config, &resume_options(cli, &config))?;
    let status = &outcome.report;

    let mut editor_launched = false;
    let mut editor_error = None;
    if cli.open {
        match launch_editor(&config.editor, &status.project_path) {
            Ok(()) => editor_launched = true,
            Err(e) => {
                tracing::warn!(error = %e, "editor launch failed");
                editor_error = Some(e.to_string());
            }
        }
    }

    print_json(&InfoOutput {
        success: true,
        status,
        report: status.render_text(),
        log_file: outcome.log_file.as_deref(),
        editor_launched,
        editor_error,
    })?;
    Ok(())
}

fn handle_interactive_mode(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    if let Err(e) = ctrlc::set_handler(on_interrupt) {
        tracing::debug!(error = %e, "could not install Ctrl-C handler");
    }

    let selected = {
        let _prompt = PromptGuard::enter();
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut out = io::stdout();
        pick_project(&config.projects_dir(), &mut input, &mut out)?
    };

    let outcome = resume_project(&selected, &config, &resume_options(cli, &config))?;
    let status = &outcome.report;

    println!();
    print!("{}", status.render_text());
    if let Some(log) = &outcome.log_file {
        println!("\nReport saved to {}", log.display());
    }
    println!();

    launch_editor(&config.editor, &status.project_path)?;

    print_json(&InteractiveOutput {
        success: true,
        message: format!(
            "Opened project in {}: {}",
            config.editor, status.project_name
        ),
        project_path: &status.project_path,
        venv_exists: status.environment.venv_exists,
        log_file: outcome.log_file.as_deref(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test: the flag is process-wide.
    #[test]
    fn prompt_guard_scopes_the_cancel_window() {
        assert!(!PROMPTING.load(Ordering::SeqCst));
        {
            let _prompt = PromptGuard::enter();
            assert!(PROMPTING.load(Ordering::SeqCst));
        }
        assert!(!PROMPTING.load(Ordering::SeqCst));

        // Cleared on the error path too
        let dir = tempfile::TempDir::new().unwrap();
        let result = {
            let _prompt = PromptGuard::enter();
            let mut input = io::Cursor::new("");
            let mut out = Vec::new();
            pick_project(dir.path(), &mut input, &mut out)
        };
        assert!(result.is_err());
        assert!(!PROMPTING.load(Ordering::SeqCst));
    }
}
