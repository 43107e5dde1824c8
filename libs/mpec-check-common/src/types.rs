use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// External numerical solver that `mpec_minlp` delegates subproblems to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    Glpk,
    Cplex,
}

impl SolverBackend {
    pub const ALL: [SolverBackend; 2] = [SolverBackend::Glpk, SolverBackend::Cplex];

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "glpk" => Some(SolverBackend::Glpk),
            "cplex" => Some(SolverBackend::Cplex),
            _ => None,
        }
    }

    /// Name of the executable that must be on the search path for this backend
    pub fn executable(&self) -> &'static str {
        match self {
            SolverBackend::Glpk => "glpsol",
            SolverBackend::Cplex => "cplex",
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Glpk => write!(f, "glpk"),
            SolverBackend::Cplex => write!(f, "cplex"),
        }
    }
}

/// What the modeling tool is asked to do with a problem file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Solve,
    Convert,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Solve => write!(f, "solve"),
            RunMode::Convert => write!(f, "convert"),
        }
    }
}

/// One row of the scenario table: a problem solved through one backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub problem: String,
    pub backend: SolverBackend,
    pub mode: RunMode,
    pub problem_file: PathBuf,
    pub reference_file: PathBuf,
    #[serde(default)]
    pub extra_args: Vec<String>,
    pub description: String,
}

impl Scenario {
    /// Stable identifier, e.g. `linear1/glpk` or `linear1/convert`
    pub fn id(&self) -> String {
        match self.mode {
            RunMode::Solve => format!("{}/{}", self.problem, self.backend),
            RunMode::Convert => format!("{}/{}", self.problem, self.mode),
        }
    }

    /// Conversion does not depend on the backend, so it matches any
    pub fn uses_backend(&self, backend: SolverBackend) -> bool {
        self.mode == RunMode::Convert || self.backend == backend
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub id: String,
    pub description: String,
    pub status: ScenarioStatus,
    /// Skip reason or failure diagnostic; `None` when the scenario passed
    pub message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub reports: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: ScenarioReport) {
        match report.status {
            ScenarioStatus::Passed => self.passed += 1,
            ScenarioStatus::Failed => self.failed += 1,
            ScenarioStatus::Skipped => self.skipped += 1,
        }
        self.reports.push(report);
    }

    /// Skips never fail a run
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
