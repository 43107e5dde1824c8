// CLI commands for mpec-check
use crate::config::ScenarioConfigManager;
use crate::evaluator;
use crate::executor::ScenarioRunner;
use crate::extractor;
use anyhow::{Context, Result};
use mpec_check_common::types::{RunSummary, ScenarioStatus, SolverBackend};
use std::fs;
use std::path::Path;

fn print_summary(summary: &RunSummary) {
    println!();
    println!("→ Run complete");
    for report in &summary.reports {
        let mark = match report.status {
            ScenarioStatus::Passed => "✓",
            ScenarioStatus::Failed => "✗",
            ScenarioStatus::Skipped => "-",
        };
        println!("  {} {} ({}ms)", mark, report.id, report.duration_ms);
        if let Some(message) = &report.message {
            println!("      {}", message);
        }
    }
    println!();
    println!(
        "  Passed: {}  Failed: {}  Skipped: {}",
        summary.passed, summary.failed, summary.skipped
    );
}

/// Save a run summary as pretty JSON
fn save_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json_content =
        serde_json::to_string_pretty(summary).context("Failed to serialize run report")?;

    fs::write(path, json_content)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(())
}

/// Run the selected scenarios; returns whether none failed
pub async fn run(
    config_path: &Path,
    problems: &[String],
    backend: Option<SolverBackend>,
    report_path: Option<&Path>,
) -> Result<bool> {
    let config = ScenarioConfigManager::load(config_path)?;
    let scenarios = config.select(problems, backend);
    if scenarios.is_empty() {
        anyhow::bail!("No scenarios match the given filters");
    }

    let runner = ScenarioRunner::from_config(&config);

    println!("→ Running {} scenarios", scenarios.len());
    println!("  Tool: {}", config.tool_settings().command);
    println!("  Solver: {}", config.tool_settings().solver);
    println!("  Work root: {}", runner.work_root().display());
    println!("  Places: {}", config.places());

    let summary = runner.run_all(&scenarios).await;
    print_summary(&summary);

    if let Some(path) = report_path {
        save_report(&summary, path)?;
        println!("📝 Report written to {}", path.display());
    }

    Ok(summary.is_success())
}

/// List every configured scenario with its description
pub fn list(config_path: &Path) -> Result<()> {
    let config = ScenarioConfigManager::load(config_path)?;

    println!("📋 Problems: {}", config.list_problems().join(", "));
    println!("📋 Configured scenarios:\n");
    for scenario in config.scenarios() {
        println!("  {} [{}]", scenario.id(), scenario.mode);
        println!("    {}", scenario.description);
        println!("    Problem:   {}", scenario.problem_file.display());
        println!("    Reference: {}", scenario.reference_file.display());
    }

    Ok(())
}

/// Report which preconditions hold on this host
pub fn probe(config_path: &Path) -> Result<()> {
    let config = ScenarioConfigManager::load(config_path)?;
    let runner = ScenarioRunner::from_config(&config);
    let probe = runner.probe();

    println!("🔎 Host capabilities:\n");
    match probe.require_yaml() {
        Ok(()) => println!("  ✓ YAML support"),
        Err(unmet) => println!("  ✗ {}", unmet.reason),
    }
    match probe.require_tool(&config.tool_settings().command) {
        Ok(path) => println!("  ✓ {} ({})", config.tool_settings().command, path.display()),
        Err(unmet) => println!("  ✗ {}", unmet.reason),
    }
    for backend in SolverBackend::ALL {
        match probe.require_backend(backend) {
            Ok(path) => println!("  ✓ {} ({})", backend, path.display()),
            Err(unmet) => println!("  ✗ {}", unmet.reason),
        }
    }

    println!("\n📋 Scenarios:\n");
    for scenario in config.scenarios() {
        match runner.check_preconditions(scenario) {
            Ok(_) => println!("  ✓ {} runnable", scenario.id()),
            Err(unmet) => println!("  - {} would be skipped: {}", scenario.id(), unmet.reason),
        }
    }

    Ok(())
}

/// Compare two existing documents; returns whether they agree
pub fn compare(reference_path: &Path, result_path: &Path, places: u32) -> Result<bool> {
    let reference = extractor::load_objectives(reference_path)?;
    let candidate = extractor::load_objectives(result_path)?;

    println!("→ Comparing {} solutions", reference.len());
    println!("  Reference: {}", reference_path.display());
    println!("  Result:    {}", result_path.display());

    match evaluator::compare_objectives(&reference, &candidate, places) {
        Ok(()) => {
            println!("  ✓ Objectives match to {} places", places);
            Ok(true)
        }
        Err(e) => {
            println!("  ✗ {}", e);
            Ok(false)
        }
    }
}
