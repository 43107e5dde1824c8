//! Failure taxonomy for a scenario run.

use std::fmt;
use std::path::PathBuf;

/// Why a scenario failed. Unmet preconditions are not errors; they become skips.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    /// The tool ended some way other than a handled exit.
    ExternalToolCrash {
        program: String,
        reason: String,
        stderr_tail: String,
    },
    /// A result or reference document is absent or does not parse.
    DocumentMissingOrUnparseable { path: PathBuf, detail: String },
    SolutionCountMismatch { expected: usize, actual: usize },
    ObjectiveKeyCountMismatch {
        solution: usize,
        expected: usize,
        actual: usize,
    },
    /// `actual` is `None` when the candidate lacks the key entirely.
    ObjectiveMismatch {
        solution: usize,
        key: String,
        expected: f64,
        actual: Option<f64>,
        places: u32,
    },
}

impl CheckError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::ExternalToolCrash { .. } => "TOOL_CRASH",
            CheckError::DocumentMissingOrUnparseable { .. } => "DOCUMENT_UNREADABLE",
            CheckError::SolutionCountMismatch { .. } => "SOLUTION_COUNT_MISMATCH",
            CheckError::ObjectiveKeyCountMismatch { .. } => "OBJECTIVE_COUNT_MISMATCH",
            CheckError::ObjectiveMismatch { .. } => "OBJECTIVE_MISMATCH",
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::ExternalToolCrash {
                program,
                reason,
                stderr_tail,
            } => {
                write!(f, "[{}] '{}' {}", self.code(), program, reason)?;
                if !stderr_tail.is_empty() {
                    write!(f, "; stderr: {}", stderr_tail)?;
                }
                Ok(())
            }
            CheckError::DocumentMissingOrUnparseable { path, detail } => write!(
                f,
                "[{}] cannot read results from {}: {}",
                self.code(),
                path.display(),
                detail
            ),
            CheckError::SolutionCountMismatch { expected, actual } => write!(
                f,
                "[{}] expected {} solutions, got {}",
                self.code(),
                expected,
                actual
            ),
            CheckError::ObjectiveKeyCountMismatch {
                solution,
                expected,
                actual,
            } => write!(
                f,
                "[{}] solution {}: expected {} objectives, got {}",
                self.code(),
                solution,
                expected,
                actual
            ),
            CheckError::ObjectiveMismatch {
                solution,
                key,
                expected,
                actual: Some(actual),
                places,
            } => write!(
                f,
                "[{}] solution {}: objective '{}' expected {} got {} (places={})",
                self.code(),
                solution,
                key,
                expected,
                actual,
                places
            ),
            CheckError::ObjectiveMismatch {
                solution,
                key,
                expected,
                actual: None,
                ..
            } => write!(
                f,
                "[{}] solution {}: objective '{}' expected {} but is missing",
                self.code(),
                solution,
                key,
                expected
            ),
        }
    }
}

impl std::error::Error for CheckError {}
