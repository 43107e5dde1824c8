// Scenario table management for mpec-check
use anyhow::{bail, Context, Result};
use mpec_check_common::config::{default_work_root, ToolSettings, DEFAULT_PLACES};
use mpec_check_common::paths;
use mpec_check_common::types::{RunMode, Scenario, SolverBackend};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/scenarios.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub name: String,
    /// Problem file, relative to `problem_dir`
    pub file: String,
    #[serde(default)]
    pub mode: RunMode,
    pub description: String,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ScenariosJson {
    #[serde(default)]
    tool: ToolSettings,
    problem_dir: PathBuf,
    reference_dir: PathBuf,
    #[serde(default)]
    work_root: Option<PathBuf>,
    #[serde(default = "default_places")]
    places: u32,
    backends: Vec<String>,
    problems: Vec<ProblemConfig>,
}

fn default_places() -> u32 {
    DEFAULT_PLACES
}

/// Scenario table manager
#[derive(Debug, Clone)]
pub struct ScenarioConfigManager {
    tool: ToolSettings,
    work_root: PathBuf,
    places: u32,
    scenarios: Vec<Scenario>,
}

impl ScenarioConfigManager {
    /// Load the scenario table from a scenarios.json file
    ///
    /// Relative directories resolve against the directory holding the file.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Scenario config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let parsed: ScenariosJson = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        let base_dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let base_dir = fs::canonicalize(base_dir).context("Failed to resolve config directory")?;

        Self::from_parsed(parsed, &base_dir)
    }

    fn from_parsed(parsed: ScenariosJson, base_dir: &Path) -> Result<Self> {
        let mut backends = Vec::new();
        for name in &parsed.backends {
            match SolverBackend::from_str(name) {
                Some(backend) => backends.push(backend),
                None => bail!("Unknown solver backend '{}' in scenario config", name),
            }
        }
        if backends.is_empty() {
            bail!("No solver backends configured");
        }
        if parsed.problems.is_empty() {
            bail!("No problems configured");
        }

        let problem_dir = base_dir.join(&parsed.problem_dir);
        let reference_dir = base_dir.join(&parsed.reference_dir);

        let mut scenarios = Vec::new();
        for problem in &parsed.problems {
            let problem_file = problem_dir.join(&problem.file);
            if !problem_file.is_file() {
                bail!(
                    "Problem file for '{}' not found: {}",
                    problem.name,
                    problem_file.display()
                );
            }
            let reference_file = paths::reference_file(&reference_dir, &problem.name);

            // Conversion never reaches a solver, so it runs once per problem
            let rows: Vec<(SolverBackend, String)> = match problem.mode {
                RunMode::Solve => backends
                    .iter()
                    .map(|b| (*b, format!("{} ({} via {})", problem.description, problem.name, b)))
                    .collect(),
                RunMode::Convert => vec![(
                    backends[0],
                    format!("{} ({} convert)", problem.description, problem.name),
                )],
            };

            for (backend, description) in rows {
                scenarios.push(Scenario {
                    problem: problem.name.clone(),
                    backend,
                    mode: problem.mode,
                    problem_file: problem_file.clone(),
                    reference_file: reference_file.clone(),
                    extra_args: problem.extra_args.clone(),
                    description,
                });
            }
        }

        let work_root = match parsed.work_root {
            Some(root) => base_dir.join(root),
            None => default_work_root(),
        };

        Ok(Self {
            tool: parsed.tool.with_env_overrides(),
            work_root,
            places: parsed.places,
            scenarios,
        })
    }

    pub fn tool_settings(&self) -> &ToolSettings {
        &self.tool
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    pub fn places(&self) -> u32 {
        self.places
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scenarios matching the given problem names (all when empty) and backend
    pub fn select(&self, problems: &[String], backend: Option<SolverBackend>) -> Vec<Scenario> {
        self.scenarios
            .iter()
            .filter(|s| problems.is_empty() || problems.contains(&s.problem))
            .filter(|s| backend.map_or(true, |b| s.uses_backend(b)))
            .cloned()
            .collect()
    }

    /// Look up a single scenario
    pub fn get_scenario(&self, problem: &str, backend: SolverBackend) -> Result<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.problem == problem && s.uses_backend(backend))
            .ok_or_else(|| anyhow::anyhow!("No scenario for {}/{}", problem, backend))
    }

    /// List configured problem names, in table order
    pub fn list_problems(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for scenario in &self.scenarios {
            if !names.contains(&scenario.problem) {
                names.push(scenario.problem.clone());
            }
        }
        names
    }
}
