// Capability checks that gate whether a scenario can run at all
use crate::extractor;
use mpec_check_common::types::SolverBackend;
use std::path::{Path, PathBuf};

/// A precondition that is not met on this host. Reported as a skip, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreconditionUnmet {
    pub reason: String,
}

impl PreconditionUnmet {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Locates executables on a search path
#[derive(Debug, Clone)]
pub struct Probe {
    search_path: Vec<PathBuf>,
}

impl Probe {
    /// Search the directories listed in PATH
    pub fn from_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Resolve a command name or path to an executable file
    ///
    /// Anything containing a path separator is checked as-is; bare names are
    /// looked up in each search directory in order.
    pub fn find_executable(&self, command: &str) -> Option<PathBuf> {
        let as_path = Path::new(command);
        if as_path.components().count() > 1 {
            return is_executable(as_path).then(|| as_path.to_path_buf());
        }

        self.search_path
            .iter()
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate))
    }

    pub fn require_yaml(&self) -> Result<(), PreconditionUnmet> {
        if extractor::yaml_available() {
            Ok(())
        } else {
            Err(PreconditionUnmet::new("YAML is not available"))
        }
    }

    /// Resolve the modeling tool
    pub fn require_tool(&self, command: &str) -> Result<PathBuf, PreconditionUnmet> {
        self.find_executable(command).ok_or_else(|| {
            PreconditionUnmet::new(format!("The '{}' command is not available", command))
        })
    }

    /// Resolve the solver executable behind a backend
    pub fn require_backend(&self, backend: SolverBackend) -> Result<PathBuf, PreconditionUnmet> {
        self.find_executable(backend.executable()).ok_or_else(|| {
            PreconditionUnmet::new(format!("The '{}' executable is not available", backend))
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}
