/// Scenario Executor - High-Level Orchestration
///
/// **Responsibility:**
/// Take one row of the scenario table through the whole pipeline.
///
/// **Architecture:**
/// 1. Check preconditions with the Probe (probe.rs); unmet → Skipped
/// 2. Run the tool with the ToolEngine (engine.rs) in a private workspace
/// 3. Extract objectives from reference and result (extractor.rs)
/// 4. Compare them with the Evaluator (evaluator.rs)
///
/// This module is the glue layer - it knows nothing about:
/// - How the tool is started (engine's job)
/// - How documents are parsed (extractor's job)
/// - How values are compared (evaluator's job)

use crate::config::ScenarioConfigManager;
use crate::engine::{RunInvocation, RunWorkspace, ToolEngine};
use crate::evaluator;
use crate::extractor;
use crate::probe::{PreconditionUnmet, Probe};
use anyhow::{Context, Result};
use chrono::Utc;
use mpec_check_common::types::{RunMode, RunSummary, Scenario, ScenarioReport, ScenarioStatus};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub struct ScenarioRunner {
    engine: ToolEngine,
    probe: Probe,
    work_root: PathBuf,
    places: u32,
}

impl ScenarioRunner {
    pub fn new(engine: ToolEngine, probe: Probe, work_root: PathBuf, places: u32) -> Self {
        Self {
            engine,
            probe,
            work_root,
            places,
        }
    }

    /// Runner for a loaded scenario table, searching PATH for executables
    pub fn from_config(config: &ScenarioConfigManager) -> Self {
        Self::new(
            ToolEngine::new(config.tool_settings().clone()),
            Probe::from_env(),
            config.work_root().to_path_buf(),
            config.places(),
        )
    }

    /// Check every precondition once, returning the resolved tool path
    pub fn check_preconditions(&self, scenario: &Scenario) -> Result<PathBuf, PreconditionUnmet> {
        if scenario.mode == RunMode::Solve {
            self.probe.require_yaml()?;
        }
        let tool = self.probe.require_tool(&self.engine.settings().command)?;
        if scenario.mode == RunMode::Solve {
            self.probe.require_backend(scenario.backend)?;
        }
        Ok(tool)
    }

    async fn attempt(&self, scenario: &Scenario, tool: PathBuf) -> Result<()> {
        let workspace =
            RunWorkspace::create(&self.work_root).context("Failed to create run directory")?;

        let invocation =
            RunInvocation::for_scenario(tool, self.engine.settings(), scenario, &workspace);
        let run = self
            .engine
            .execute(&invocation)
            .await
            .into_result(&invocation.program)?;
        debug!(
            exit_code = run.exit_code,
            elapsed_ms = run.elapsed_ms,
            stdout_lines = run.stdout.lines().count(),
            stderr_lines = run.stderr.lines().count(),
            "Tool finished"
        );

        if scenario.mode == RunMode::Convert {
            return Ok(());
        }

        let reference = extractor::load_objectives(&scenario.reference_file)?;
        let candidate = extractor::load_objectives(workspace.result_file())?;
        evaluator::compare_objectives(&reference, &candidate, self.places)?;

        Ok(())
    }

    /// Run one scenario to a Passed / Failed / Skipped verdict
    #[instrument(skip(self, scenario), fields(scenario = %scenario.id(), mode = %scenario.mode))]
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let (status, message) = match self.check_preconditions(scenario) {
            Err(unmet) => {
                info!(reason = %unmet.reason, "Scenario skipped");
                (ScenarioStatus::Skipped, Some(unmet.reason))
            }
            Ok(tool) => match self.attempt(scenario, tool).await {
                Ok(()) => {
                    info!("Scenario passed");
                    (ScenarioStatus::Passed, None)
                }
                Err(e) => {
                    warn!(error = %format!("{:#}", e), "Scenario failed");
                    (ScenarioStatus::Failed, Some(format!("{:#}", e)))
                }
            },
        };

        ScenarioReport {
            id: scenario.id(),
            description: scenario.description.clone(),
            status,
            message,
            started_at,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Run scenarios strictly one after another
    pub async fn run_all(&self, scenarios: &[Scenario]) -> RunSummary {
        let mut summary = RunSummary::default();
        for scenario in scenarios {
            summary.record(self.run_scenario(scenario).await);
        }
        summary
    }

    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    pub fn probe(&self) -> &Probe {
        &self.probe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpec_check_common::config::ToolSettings;
    use mpec_check_common::types::SolverBackend;

    fn scenario(mode: RunMode) -> Scenario {
        Scenario {
            problem: "linear1".to_string(),
            backend: SolverBackend::Glpk,
            mode,
            problem_file: PathBuf::from("linear1.py"),
            reference_file: PathBuf::from("linear1.txt"),
            extra_args: Vec::new(),
            description: "Linear MPEC".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_tool_is_skipped() {
        let work = tempfile::tempdir().unwrap();
        let runner = ScenarioRunner::new(
            ToolEngine::new(ToolSettings::default()),
            Probe::with_search_path(Vec::new()),
            work.path().to_path_buf(),
            3,
        );

        let report = runner.run_scenario(&scenario(RunMode::Solve)).await;

        assert_eq!(report.status, ScenarioStatus::Skipped);
        assert_eq!(
            report.message.as_deref(),
            Some("The 'pyomo' command is not available")
        );
        assert_eq!(report.id, "linear1/glpk");
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_probe_is_the_one_used_for_preconditions() {
        let runner = ScenarioRunner::new(
            ToolEngine::new(ToolSettings::default()),
            Probe::with_search_path(Vec::new()),
            PathBuf::from("work"),
            3,
        );

        let direct = runner.probe().require_tool("pyomo").unwrap_err();
        let via_scenario = runner
            .check_preconditions(&scenario(RunMode::Convert))
            .unwrap_err();

        assert_eq!(direct.reason, via_scenario.reason);
    }

    #[tokio::test]
    async fn test_run_all_records_every_scenario() {
        let work = tempfile::tempdir().unwrap();
        let runner = ScenarioRunner::new(
            ToolEngine::new(ToolSettings::default()),
            Probe::with_search_path(Vec::new()),
            work.path().to_path_buf(),
            3,
        );

        let summary = runner
            .run_all(&[scenario(RunMode::Solve), scenario(RunMode::Convert)])
            .await;

        assert_eq!(summary.skipped, 2);
        assert!(summary.is_success());
    }
}
