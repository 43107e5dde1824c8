/// Tool Engine - Invocation of the External Modeling Tool
///
/// **Core Responsibility:**
/// Build the tool's command line, run it in a private working directory and
/// classify how it ended.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to run the tool (subprocess, working dir, timeout)
/// - Engine does NOT read result documents
/// - Engine does NOT judge objective values
/// - Engine returns a `ToolOutcome` for the executor to act on
///
/// **Resource Rules:**
/// - Every run gets its own directory and result file name
/// - The directory is removed when the `RunWorkspace` guard drops
/// - The child process is killed if the run is abandoned (timeout, cancellation).
///   Only the direct child is killed; processes it started itself are not tracked.

use crate::error::CheckError;
use mpec_check_common::config::ToolSettings;
use mpec_check_common::paths;
use mpec_check_common::types::{RunMode, Scenario, SolverBackend};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Number of stderr lines kept in crash diagnostics
const STDERR_TAIL_LINES: usize = 10;

/// Arguments for `solve` mode
pub fn solve_args(
    selector: &str,
    backend: SolverBackend,
    result_file: &Path,
    problem_file: &Path,
    extra_args: &[String],
) -> Vec<String> {
    let mut args = vec![
        "solve".to_string(),
        format!("--solver={}", selector),
        format!("--solver-options=solver={}", backend),
        format!("--save-results={}", result_file.display()),
        "--results-format=yaml".to_string(),
        "-c".to_string(),
        problem_file.display().to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args
}

/// Arguments for `convert` mode
pub fn convert_args(problem_file: &Path, extra_args: &[String]) -> Vec<String> {
    let mut args = vec![
        "convert".to_string(),
        "-c".to_string(),
        problem_file.display().to_string(),
    ];
    args.extend(extra_args.iter().cloned());
    args
}

/// A fully resolved command line plus the directory it runs in
#[derive(Debug, Clone, PartialEq)]
pub struct RunInvocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl RunInvocation {
    pub fn for_scenario(
        program: PathBuf,
        settings: &ToolSettings,
        scenario: &Scenario,
        workspace: &RunWorkspace,
    ) -> Self {
        let args = match scenario.mode {
            RunMode::Solve => solve_args(
                &settings.solver,
                scenario.backend,
                workspace.result_file(),
                &scenario.problem_file,
                &scenario.extra_args,
            ),
            RunMode::Convert => convert_args(&scenario.problem_file, &scenario.extra_args),
        };

        Self {
            program,
            args,
            working_dir: workspace.dir().to_path_buf(),
        }
    }
}

/// Private run directory - guarantees removal on drop
///
/// Created before the tool starts so every exit path, including panics and
/// early returns, leaves nothing behind.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: PathBuf,
    result_file: PathBuf,
}

impl RunWorkspace {
    /// The run directory is made absolute, since the tool runs inside it and
    /// receives the result path on its command line.
    pub fn create(work_root: &Path) -> io::Result<Self> {
        let run_id = uuid::Uuid::new_v4();
        let dir = work_root.join(paths::run_dir_name(&run_id));
        fs::create_dir_all(&dir)?;
        let dir = fs::canonicalize(&dir)?;
        let result_file = dir.join(paths::result_file_name(&run_id));
        Ok(Self { dir, result_file })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn result_file(&self) -> &Path {
        &self.result_file
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(dir = %self.dir.display(), error = %e, "Failed to clean up run directory");
            }
        }
    }
}

/// A run that ended through one of the tool's handled exit codes
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    SpawnFailed(String),
    ExitCode(i32),
    Signal,
    TimedOut(Duration),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::SpawnFailed(e) => write!(f, "could not be started: {}", e),
            FailureReason::ExitCode(code) => write!(f, "exited with unhandled code {}", code),
            FailureReason::Signal => write!(f, "was terminated by a signal"),
            FailureReason::TimedOut(limit) => {
                write!(f, "timed out after {}s and was killed", limit.as_secs())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolFailure {
    pub reason: FailureReason,
    pub stderr: String,
    pub elapsed_ms: u64,
}

/// How a tool invocation ended
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    HandledExit(ToolRun),
    UnhandledFailure(ToolFailure),
}

impl ToolOutcome {
    pub fn into_result(self, program: &Path) -> Result<ToolRun, CheckError> {
        match self {
            ToolOutcome::HandledExit(run) => Ok(run),
            ToolOutcome::UnhandledFailure(failure) => Err(CheckError::ExternalToolCrash {
                program: program.display().to_string(),
                reason: format!("{} after {}ms", failure.reason, failure.elapsed_ms),
                stderr_tail: tail_lines(&failure.stderr, STDERR_TAIL_LINES),
            }),
        }
    }
}

fn tail_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}

/// Subprocess-based engine for the modeling tool
pub struct ToolEngine {
    settings: ToolSettings,
}

impl ToolEngine {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Run the invocation to completion and classify the outcome
    pub async fn execute(&self, invocation: &RunInvocation) -> ToolOutcome {
        let start = Instant::now();
        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            working_dir = %invocation.working_dir.display(),
            "Invoking tool"
        );

        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %invocation.program.display(), error = %e, "Failed to spawn tool");
                return ToolOutcome::UnhandledFailure(ToolFailure {
                    reason: FailureReason::SpawnFailed(e.to_string()),
                    stderr: String::new(),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        };

        let waited = match self.settings.timeout_secs.filter(|secs| *secs > 0) {
            Some(secs) => {
                let limit = Duration::from_secs(secs);
                match tokio::time::timeout(limit, child.wait_with_output()).await {
                    Ok(waited) => waited,
                    Err(_) => {
                        // Dropping the wait future drops the child, which kills it
                        warn!(timeout_secs = secs, "Tool timed out");
                        return ToolOutcome::UnhandledFailure(ToolFailure {
                            reason: FailureReason::TimedOut(limit),
                            stderr: String::new(),
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        });
                    }
                }
            }
            None => child.wait_with_output().await,
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                return ToolOutcome::UnhandledFailure(ToolFailure {
                    reason: FailureReason::SpawnFailed(e.to_string()),
                    stderr: String::new(),
                    elapsed_ms,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match output.status.code() {
            Some(code) if self.settings.is_handled_exit(code) => {
                info!(exit_code = code, elapsed_ms, "Tool exited");
                ToolOutcome::HandledExit(ToolRun {
                    exit_code: code,
                    stdout,
                    stderr,
                    elapsed_ms,
                })
            }
            Some(code) => {
                warn!(
                    exit_code = code,
                    elapsed_ms,
                    error_preview = stderr.lines().last().unwrap_or(""),
                    "Tool exited with unhandled code"
                );
                ToolOutcome::UnhandledFailure(ToolFailure {
                    reason: FailureReason::ExitCode(code),
                    stderr,
                    elapsed_ms,
                })
            }
            None => {
                warn!(elapsed_ms, "Tool terminated by signal");
                ToolOutcome::UnhandledFailure(ToolFailure {
                    reason: FailureReason::Signal,
                    stderr,
                    elapsed_ms,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_args_layout() {
        let args = solve_args(
            "mpec_minlp",
            SolverBackend::Glpk,
            Path::new("/work/run-1/result-1.yml"),
            Path::new("/fixtures/mpec/linear1.py"),
            &[],
        );

        assert_eq!(
            args,
            vec![
                "solve",
                "--solver=mpec_minlp",
                "--solver-options=solver=glpk",
                "--save-results=/work/run-1/result-1.yml",
                "--results-format=yaml",
                "-c",
                "/fixtures/mpec/linear1.py",
            ]
        );
    }

    #[test]
    fn test_extra_args_are_appended() {
        let extra = vec!["--logging=debug".to_string()];
        let args = solve_args(
            "mpec_minlp",
            SolverBackend::Cplex,
            Path::new("r.yml"),
            Path::new("p.py"),
            &extra,
        );
        assert_eq!(args.last().map(String::as_str), Some("--logging=debug"));
        assert!(args.contains(&"--solver-options=solver=cplex".to_string()));

        let args = convert_args(Path::new("p.py"), &extra);
        assert_eq!(args, vec!["convert", "-c", "p.py", "--logging=debug"]);
    }

    #[test]
    fn test_workspace_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::create(root.path()).unwrap();
        let dir = workspace.dir().to_path_buf();
        fs::write(workspace.result_file(), "Solution: []\n").unwrap();
        assert!(workspace.result_file().starts_with(&dir));

        drop(workspace);

        assert!(!dir.exists());
    }

    #[test]
    fn test_workspace_from_relative_root_is_absolute() {
        let root = tempfile::tempdir_in(".").unwrap();
        assert!(root.path().is_relative());

        let workspace = RunWorkspace::create(root.path()).unwrap();

        assert!(workspace.dir().is_absolute());
        assert!(workspace.result_file().is_absolute());
        assert!(workspace.dir().is_dir());
        let args = solve_args(
            "mpec_minlp",
            SolverBackend::Glpk,
            workspace.result_file(),
            Path::new("linear1.py"),
            &[],
        );
        assert!(args.contains(&format!(
            "--save-results={}",
            workspace.result_file().display()
        )));
    }

    #[test]
    fn test_workspaces_are_private() {
        let root = tempfile::tempdir().unwrap();
        let a = RunWorkspace::create(root.path()).unwrap();
        let b = RunWorkspace::create(root.path()).unwrap();

        assert_ne!(a.dir(), b.dir());
        assert_ne!(a.result_file().file_name(), b.result_file().file_name());
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc", 2), "b\nc");
        assert_eq!(tail_lines("a", 5), "a");
        assert_eq!(tail_lines("", 5), "");
    }

    #[test]
    fn test_unhandled_failure_becomes_tool_crash() {
        let outcome = ToolOutcome::UnhandledFailure(ToolFailure {
            reason: FailureReason::ExitCode(1),
            stderr: "Traceback\nValueError: bad model".to_string(),
            elapsed_ms: 3,
        });

        let err = outcome.into_result(Path::new("pyomo")).unwrap_err();

        assert_eq!(err.code(), "TOOL_CRASH");
        assert!(err.to_string().contains("ValueError: bad model"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_timeout_means_no_limit() {
        let root = tempfile::tempdir().unwrap();
        let engine = ToolEngine::new(ToolSettings {
            timeout_secs: Some(0),
            ..ToolSettings::default()
        });
        let invocation = RunInvocation {
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), "sleep 0.2".to_string()],
            working_dir: root.path().to_path_buf(),
        };

        match engine.execute(&invocation).await {
            ToolOutcome::HandledExit(run) => assert_eq!(run.exit_code, 0),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_unhandled() {
        let root = tempfile::tempdir().unwrap();
        let engine = ToolEngine::new(ToolSettings::default());
        let invocation = RunInvocation {
            program: root.path().join("no-such-tool"),
            args: Vec::new(),
            working_dir: root.path().to_path_buf(),
        };

        match engine.execute(&invocation).await {
            ToolOutcome::UnhandledFailure(failure) => {
                assert!(matches!(failure.reason, FailureReason::SpawnFailed(_)))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
