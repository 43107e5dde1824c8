// Settings for the external modeling tool
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TOOL_COMMAND: &str = "pyomo";
pub const DEFAULT_SOLVER_SELECTOR: &str = "mpec_minlp";
pub const DEFAULT_PLACES: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Command name or path of the modeling tool
    pub command: String,
    /// Value of `--solver=` in solve mode
    pub solver: String,
    /// Exit codes that count as the tool's controlled termination
    pub handled_exit_codes: Vec<i32>,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            command: DEFAULT_TOOL_COMMAND.to_string(),
            solver: DEFAULT_SOLVER_SELECTOR.to_string(),
            handled_exit_codes: vec![0],
            timeout_secs: None,
        }
    }
}

impl ToolSettings {
    /// Apply MPEC_CHECK_TOOL, MPEC_CHECK_SOLVER and MPEC_CHECK_TIMEOUT_SECS
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any variable source
    ///
    /// A timeout of 0 or a value that does not parse leaves the timeout as is.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(command) = lookup("MPEC_CHECK_TOOL") {
            self.command = command;
        }
        if let Some(solver) = lookup("MPEC_CHECK_SOLVER") {
            self.solver = solver;
        }
        if let Some(secs) = lookup("MPEC_CHECK_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.timeout_secs = Some(secs);
        }
        self
    }

    pub fn is_handled_exit(&self, code: i32) -> bool {
        self.handled_exit_codes.contains(&code)
    }
}

/// Root under which private run directories are created
pub fn default_work_root() -> PathBuf {
    work_root_from(|key| std::env::var(key).ok())
}

fn work_root_from(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("MPEC_CHECK_WORK_ROOT")
        .filter(|root| !root.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("mpec-check"))
}
