//! PartCheck Headless Scenario Harness
//!
//! Drives the scenario engine through scripted and randomized sessions.
//! Runs entirely in-process — no UI, no rendering, no audio.
//!
//! Usage:
//!   cargo run -p partcheck-simtest
//!   cargo run -p partcheck-simtest -- --verbose
//!   cargo run -p partcheck-simtest -- --seeds 500

use partcheck_logic::config::validate_config;
use partcheck_logic::prelude::*;
use partcheck_logic::risk;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ── Scenario definition (same data a UI build ships) ────────────────────
const SCENARIO_JSON: &str = include_str!("../../../data/scenario.json");

// ── Logging ─────────────────────────────────────────────────────────────

/// Filter directive for the engine's `log` records. `None` keeps them silent.
fn log_filter(verbose: bool) -> Option<&'static str> {
    verbose.then_some("info")
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let seeds = args
        .iter()
        .position(|a| a == "--seeds")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(200);

    // log records from the engine are bridged into the fmt subscriber
    if let Some(filter) = log_filter(verbose) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    println!("=== PartCheck Scenario Harness ===\n");

    let mut results = Vec::new();

    // 1. Scenario definition validation
    let definition = match load_definition(&mut results) {
        Some(d) => d,
        None => {
            report(&results, verbose);
            std::process::exit(1);
        }
    };

    // 2. Reference runs with literal expected values
    results.extend(validate_reference_runs(&definition));

    // 3. Lifecycle gating
    results.extend(validate_lifecycle(&definition));

    // 4. Task-driven completion
    results.extend(validate_task_mode(&definition));

    // 5. Randomized play sweep
    results.extend(validate_random_sweep(&definition, seeds, verbose));

    if !report(&results, verbose) {
        std::process::exit(1);
    }
}

/// Print the summary. Returns whether everything passed.
fn report(results: &[TestResult], verbose: bool) -> bool {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );
    failed == 0
}

fn engine_from(definition: &ScenarioDefinition) -> Option<ScenarioEngine> {
    ScenarioEngine::from_definition(definition.clone()).ok()
}

/// Build, initialize and start an engine, skipping the intro.
fn running_engine(definition: &ScenarioDefinition) -> Option<ScenarioEngine> {
    let mut engine = engine_from(definition)?;
    engine.initialize().ok()?;
    engine.start_scenario().ok()?;
    if engine.phase() == Phase::Intro {
        engine.start_actual_scenario().ok()?;
    }
    engine.drain_events();
    Some(engine)
}

fn check_risk(name: &str, engine: &ScenarioEngine, expected: f32) -> TestResult {
    let actual = engine.risk_level();
    TestResult {
        name: name.into(),
        passed: (actual - expected).abs() < 0.001,
        detail: format!("risk {:.1} (expected {:.1})", actual, expected),
    }
}

// ── 1. Scenario Definition ──────────────────────────────────────────────

fn load_definition(results: &mut Vec<TestResult>) -> Option<ScenarioDefinition> {
    println!("--- Scenario Definition ---");

    let definition: ScenarioDefinition = match serde_json::from_str(SCENARIO_JSON) {
        Ok(d) => d,
        Err(e) => {
            results.push(TestResult {
                name: "definition_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    let errors = validate_config(&definition.config);
    results.push(TestResult {
        name: "definition_config_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            format!("'{}' config valid", definition.name)
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    let catalogue = ItemCatalogue::new(definition.items.clone());
    results.push(TestResult {
        name: "definition_unique_items".into(),
        passed: catalogue.len() == definition.items.len(),
        detail: format!(
            "{} items, {} unique",
            definition.items.len(),
            catalogue.len()
        ),
    });

    let matching = catalogue.matching_count() as u32;
    results.push(TestResult {
        name: "definition_winnable".into(),
        passed: matching >= definition.config.required_validations,
        detail: format!(
            "{} matching items for {} required validations",
            matching, definition.config.required_validations
        ),
    });

    let registry = TaskRegistry::new(definition.tasks.clone());
    results.push(TestResult {
        name: "definition_tasks".into(),
        passed: registry.total() == definition.tasks.len() && registry.total() > 0,
        detail: format!(
            "{} tasks, {} need elevated verification",
            registry.total(),
            registry.elevated_task_count()
        ),
    });

    results.push(TestResult {
        name: "definition_builds_engine".into(),
        passed: engine_from(&definition).is_some(),
        detail: "engine accepts the definition".into(),
    });

    Some(definition)
}

// ── 2. Reference Runs ───────────────────────────────────────────────────

fn validate_reference_runs(definition: &ScenarioDefinition) -> Vec<TestResult> {
    println!("--- Reference Runs ---");
    let mut results = Vec::new();

    let Some(mut engine) = running_engine(definition) else {
        results.push(TestResult {
            name: "reference_start".into(),
            passed: false,
            detail: "engine failed to start".into(),
        });
        return results;
    };

    results.push(check_risk("reference_initial_risk", &engine, 25.0));

    let _ = engine.validate_item("monaco1");
    results.push(check_risk("reference_validate_match", &engine, 15.0));
    let progress = engine
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            ScenarioEvent::ProgressChanged { fraction } => Some(fraction),
            _ => None,
        });
    results.push(TestResult {
        name: "reference_progress_half".into(),
        passed: progress == Some(0.5),
        detail: format!("progress event {:?}", progress),
    });

    let _ = engine.validate_item("barcelone");
    results.push(check_risk("reference_validate_mismatch", &engine, 30.0));

    let _ = engine.validate_item("monaco2");
    results.push(check_risk("reference_validate_second_match", &engine, 20.0));
    let report = engine.last_report().cloned();
    results.push(TestResult {
        name: "reference_success_report".into(),
        passed: report
            .as_ref()
            .is_some_and(|r| r.success && r.validated == 2 && r.required == 2),
        detail: format!("{:?}", report),
    });

    // Timeout
    if let Some(mut engine) = running_engine(definition) {
        let _ = engine.advance(definition.config.time_limit);
        let events = engine.drain_events();
        let time_up = events.iter().filter(|e| **e == ScenarioEvent::TimeUp).count();
        let failed = events.iter().any(|e| {
            matches!(e, ScenarioEvent::ScenarioCompleted(r) if !r.success && r.risk == 25.0)
        });
        results.push(TestResult {
            name: "reference_timeout".into(),
            passed: time_up == 1 && failed,
            detail: format!("{} time-up events, failure report: {}", time_up, failed),
        });
    }

    // Rejecting a needed part
    if let Some(mut engine) = running_engine(definition) {
        let _ = engine.reject_item("monaco1");
        results.push(check_risk("reference_reject_match", &engine, 45.0));
    }

    // Elevated mode round trip
    if let Some(mut engine) = running_engine(definition) {
        let _ = engine.set_elevated_mode(true);
        results.push(check_risk("reference_elevated_on", &engine, 10.0));
        let _ = engine.set_elevated_mode(false);
        results.push(check_risk("reference_elevated_off", &engine, 20.0));
    }

    results
}

// ── 3. Lifecycle ────────────────────────────────────────────────────────

fn validate_lifecycle(definition: &ScenarioDefinition) -> Vec<TestResult> {
    println!("--- Lifecycle ---");
    let mut results = Vec::new();

    let Some(mut engine) = engine_from(definition) else {
        return results;
    };

    let idle_ignored = engine.validate_item("monaco1") == Err(NoopReason::NotRunning)
        && engine.advance(10.0) == Err(NoopReason::NotRunning);
    results.push(TestResult {
        name: "lifecycle_idle_ignores_actions".into(),
        passed: idle_ignored && engine.elapsed() == 0.0,
        detail: format!("phase {:?}", engine.phase()),
    });

    let _ = engine.initialize();
    let _ = engine.start_scenario();
    let intro = engine.phase() == Phase::Intro
        && engine.drain_events().contains(&ScenarioEvent::IntroRequested);
    results.push(TestResult {
        name: "lifecycle_intro".into(),
        passed: intro,
        detail: "start_scenario requests the intro".into(),
    });

    let intro_ignored = engine.advance(30.0).is_err() && engine.elapsed() == 0.0;
    results.push(TestResult {
        name: "lifecycle_intro_freezes_time".into(),
        passed: intro_ignored,
        detail: format!("elapsed {:.1}", engine.elapsed()),
    });

    let _ = engine.start_actual_scenario();
    let _ = engine.scan_item("monaco1");
    let _ = engine.validate_item("monaco1");
    let _ = engine.advance(20.0);
    let _ = engine.reset_and_start();
    let cleared = !engine.is_item_scanned("monaco1")
        && engine.validated_count() == 0
        && engine.elapsed() == 0.0
        && (engine.risk_level() - 25.0).abs() < 0.001;
    results.push(TestResult {
        name: "lifecycle_reset_clears".into(),
        passed: cleared && engine.phase() == Phase::Intro,
        detail: format!(
            "phase {:?}, validated {}, risk {:.1}",
            engine.phase(),
            engine.validated_count(),
            engine.risk_level()
        ),
    });

    let unknown = engine.start_actual_scenario().is_ok()
        && engine.validate_item("does-not-exist").is_err()
        && engine.reject_item("does-not-exist").is_err()
        && engine.complete_task("does-not-exist").is_err()
        && (engine.risk_level() - 25.0).abs() < 0.001;
    results.push(TestResult {
        name: "lifecycle_unknown_ids".into(),
        passed: unknown,
        detail: "unknown ids leave risk and counters alone".into(),
    });

    results
}

// ── 4. Task Mode ────────────────────────────────────────────────────────

fn validate_task_mode(definition: &ScenarioDefinition) -> Vec<TestResult> {
    println!("--- Task Mode ---");
    let mut results = Vec::new();

    let task_definition = ScenarioDefinition {
        config: ScenarioConfig {
            completion: CompletionMode::Tasks,
            ..definition.config.clone()
        },
        ..definition.clone()
    };

    // Careless run: sensitive tasks done without elevated verification
    if let Some(mut engine) = running_engine(&task_definition) {
        let names: Vec<String> = engine
            .tasks()
            .get_all()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        for name in &names {
            let _ = engine.complete_task(name);
        }
        let report = engine.last_report().cloned();
        let expected = task_risk(&task_definition, false);
        results.push(TestResult {
            name: "tasks_complete_all".into(),
            passed: report.as_ref().is_some_and(|r| r.success),
            detail: format!("{:?}", report.map(|r| (r.completed_tasks, r.total_tasks))),
        });
        results.push(check_risk("tasks_risk_without_elevated", &engine, expected));
    }

    // Careful run: elevated mode on first
    if let Some(mut engine) = running_engine(&task_definition) {
        if !engine.elevated_mode() {
            let _ = engine.set_elevated_mode(true);
        }
        let names: Vec<String> = engine
            .tasks()
            .get_all()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        for name in &names {
            let _ = engine.complete_task(name);
        }
        let expected = task_risk(&task_definition, true);
        results.push(check_risk("tasks_risk_with_elevated", &engine, expected));
    }

    results
}

/// Expected risk after completing every task in order, optionally turning
/// elevated mode on first. Starts from the definition's own elevated mode.
fn task_risk(definition: &ScenarioDefinition, enable_elevated: bool) -> f32 {
    let config = &definition.config;
    let max = config.max_risk;
    let mut value = risk::initial_risk(config.base_risk, config.elevated_mode).clamp(0.0, max);
    if enable_elevated && !config.elevated_mode {
        value = (value + risk::ELEVATED_ENABLE_DELTA).clamp(0.0, max);
    }
    let elevated = config.elevated_mode || enable_elevated;
    for task in &definition.tasks {
        let delta = if task.requires_elevated_verification && !elevated {
            risk::TASK_UNSAFE_DELTA
        } else {
            risk::TASK_SAFE_DELTA
        };
        value = (value + delta).clamp(0.0, max);
    }
    value
}

// ── 5. Random Sweep ─────────────────────────────────────────────────────

fn validate_random_sweep(
    definition: &ScenarioDefinition,
    seeds: u64,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Random Sweep ({} seeds) ---", seeds);
    let mut results = Vec::new();

    let mut ids: Vec<String> = definition.items.iter().map(|i| i.id.clone()).collect();
    ids.push("does-not-exist".into());
    let mut tasks: Vec<String> = definition.tasks.iter().map(|t| t.name.clone()).collect();
    tasks.push("does-not-exist".into());

    let mut clamp_violations = 0;
    let mut completion_violations = 0;
    let mut monotonic_violations = 0;
    let mut successes = 0;

    for seed in 0..seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let Some(mut engine) = running_engine(definition) else {
            completion_violations += 1;
            continue;
        };
        let max = engine.max_risk();
        let mut last_validated = 0;

        while engine.is_running() {
            let id = &ids[rng.gen_range(0..ids.len())];
            let _ = match rng.gen_range(0..6) {
                0 => engine.scan_item(id),
                1 => engine.validate_item(id),
                2 => engine.reject_item(id),
                3 => engine.complete_task(&tasks[rng.gen_range(0..tasks.len())]),
                4 => engine.set_elevated_mode(rng.gen_bool(0.5)),
                _ => engine.advance(rng.gen_range(0.0..20.0)),
            };
            let _ = engine.advance(1.0);

            if !(0.0..=max).contains(&engine.risk_level()) {
                clamp_violations += 1;
            }
            if engine.validated_count() < last_validated {
                monotonic_violations += 1;
            }
            last_validated = engine.validated_count();
        }

        let completed: Vec<ScenarioReport> = engine
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                ScenarioEvent::ScenarioCompleted(r) => Some(r),
                _ => None,
            })
            .collect();
        let consistent = completed.len() == 1
            && completed[0].success == (completed[0].validated >= completed[0].required);
        if !consistent {
            completion_violations += 1;
        }
        if completed.first().is_some_and(|r| r.success) {
            successes += 1;
        }
    }

    results.push(TestResult {
        name: "sweep_risk_clamped".into(),
        passed: clamp_violations == 0,
        detail: format!("{} clamp violations", clamp_violations),
    });
    results.push(TestResult {
        name: "sweep_validated_monotonic".into(),
        passed: monotonic_violations == 0,
        detail: format!("{} decreases", monotonic_violations),
    });
    results.push(TestResult {
        name: "sweep_single_completion".into(),
        passed: completion_violations == 0,
        detail: format!("{} runs with missing or duplicate completion", completion_violations),
    });

    if verbose {
        println!("  {}/{} random runs succeeded", successes, seeds);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_definition(elevated_mode: bool) -> ScenarioDefinition {
        let definition: ScenarioDefinition = serde_json::from_str(SCENARIO_JSON).unwrap();
        ScenarioDefinition {
            config: ScenarioConfig {
                completion: CompletionMode::Tasks,
                elevated_mode,
                ..definition.config.clone()
            },
            ..definition
        }
    }

    fn run_all_tasks(definition: &ScenarioDefinition, enable_elevated: bool) -> f32 {
        let mut engine = running_engine(definition).unwrap();
        if enable_elevated && !engine.elevated_mode() {
            engine.set_elevated_mode(true).unwrap();
        }
        let names: Vec<String> = engine
            .tasks()
            .get_all()
            .iter()
            .map(|t| t.name.clone())
            .collect();
        for name in &names {
            engine.complete_task(name).unwrap();
        }
        engine.risk_level()
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(false), None);
        assert_eq!(log_filter(true), Some("info"));
    }

    #[test]
    fn test_task_risk_matches_engine() {
        for elevated_mode in [false, true] {
            let definition = task_definition(elevated_mode);
            for enable in [false, true] {
                let expected = task_risk(&definition, enable);
                let actual = run_all_tasks(&definition, enable);
                assert!(
                    (expected - actual).abs() < 0.001,
                    "start elevated {}, enable {}: {} vs {}",
                    elevated_mode,
                    enable,
                    expected,
                    actual
                );
            }
        }
    }

    #[test]
    fn test_task_risk_starts_from_elevated_base() {
        // 25 / 2 = 12.5, then four safe completions at -5 each
        let definition = task_definition(true);
        assert_eq!(task_risk(&definition, false), 0.0);
        assert_eq!(task_risk(&definition, true), 0.0);
        // 25, two safe (-5) and two unsafe (+15)
        assert_eq!(task_risk(&task_definition(false), false), 45.0);
    }
}
