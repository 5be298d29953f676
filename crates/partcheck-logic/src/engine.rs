//! Scenario engine — lifecycle, validation bookkeeping, risk, timer.
//!
//! The engine is the single authority for one inspection scenario. It is
//! driven by discrete player actions and by [`ScenarioEngine::advance`]
//! once per external tick. It never blocks, sleeps or spawns work.
//!
//! ```text
//! Idle ──initialize──▶ Ready ──start_scenario──▶ Intro ──start_actual_scenario──▶ Running
//!                        ▲                                                         │
//!                        └────────────── reset_and_start ◀── Completed ◀───────────┘
//! ```
//!
//! ```
//! use partcheck_logic::engine::{Phase, ScenarioEngine};
//!
//! let mut engine = ScenarioEngine::standard();
//! engine.initialize().unwrap();
//! engine.start_scenario().unwrap();
//! engine.start_actual_scenario().unwrap();
//!
//! engine.validate_item("monaco1").unwrap();
//! engine.validate_item("monaco2").unwrap();
//! assert_eq!(engine.phase(), Phase::Completed { success: true });
//! assert_eq!(engine.risk_level(), 5.0);
//! ```

use crate::config::{
    validate_config, CompletionMode, ConfigError, ScenarioConfig, ScenarioDefinition,
};
use crate::error::{ActionResult, NoopReason};
use crate::events::{EventQueue, ScenarioEvent, ScenarioListener, ScenarioReport};
use crate::item::{Item, ItemCatalogue, ScanLedger};
use crate::risk::{self, RiskMeter};
use crate::task::TaskRegistry;

/// Slack on the time-limit comparison for frame deltas that round just short.
const TIME_EPSILON: f64 = 1e-6;

/// Lifecycle phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, catalogue not loaded.
    Idle,
    /// Catalogue loaded, waiting for `start_scenario`.
    Ready,
    /// Waiting for the UI to dismiss the intro.
    Intro,
    /// Timer running, actions accepted.
    Running,
    /// Terminal until `reset_and_start`.
    Completed { success: bool },
}

pub struct ScenarioEngine {
    config: ScenarioConfig,
    catalogue: ItemCatalogue,
    tasks: TaskRegistry,
    ledger: ScanLedger,
    risk: RiskMeter,
    phase: Phase,
    elevated_mode: bool,
    /// Accumulated in f64 so per-frame deltas do not drift past the limit.
    elapsed: f64,
    validated_count: u32,
    completed_task_count: u32,
    time_warning_sent: bool,
    /// Item ids with a registered station, in registration order.
    stations: Vec<String>,
    last_report: Option<ScenarioReport>,
    events: EventQueue,
}

impl ScenarioEngine {
    /// Create an engine in the Idle phase. Refuses invalid configs.
    pub fn new(
        config: ScenarioConfig,
        catalogue: ItemCatalogue,
        tasks: TaskRegistry,
    ) -> Result<Self, Vec<ConfigError>> {
        let mut errors = validate_config(&config);
        if config.completion == CompletionMode::Tasks && tasks.total() == 0 {
            errors.push(ConfigError::NoTasks);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self::build(config, catalogue, tasks))
    }

    /// Default config with the built-in catalogue and task list.
    pub fn standard() -> Self {
        Self::build(
            ScenarioConfig::default(),
            ItemCatalogue::standard(),
            TaskRegistry::standard(),
        )
    }

    fn build(config: ScenarioConfig, catalogue: ItemCatalogue, tasks: TaskRegistry) -> Self {
        let risk = RiskMeter::new(
            risk::initial_risk(config.base_risk, config.elevated_mode),
            config.max_risk,
        );
        Self {
            elevated_mode: config.elevated_mode,
            config,
            catalogue,
            tasks,
            ledger: ScanLedger::new(),
            risk,
            phase: Phase::Idle,
            elapsed: 0.0,
            validated_count: 0,
            completed_task_count: 0,
            time_warning_sent: false,
            stations: Vec::new(),
            last_report: None,
            events: EventQueue::new(),
        }
    }

    pub fn from_definition(definition: ScenarioDefinition) -> Result<Self, Vec<ConfigError>> {
        Self::new(
            definition.config,
            ItemCatalogue::new(definition.items),
            TaskRegistry::new(definition.tasks),
        )
    }

    /// Subscribe a collaborator to every future event.
    pub fn subscribe(&mut self, listener: Box<dyn ScenarioListener>) {
        self.events.subscribe(listener);
    }

    /// Take every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<ScenarioEvent> {
        self.events.drain()
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Load session state: Idle → Ready.
    pub fn initialize(&mut self) -> ActionResult {
        self.expect_phase(Phase::Idle)?;
        self.clear_session();
        self.phase = Phase::Ready;
        log::info!(
            "Scenario initialized: {} items, {} tasks, risk {:.1}",
            self.catalogue.len(),
            self.tasks.total(),
            self.risk.value()
        );
        Ok(())
    }

    /// Ready → Intro, or straight to Running when the intro is disabled.
    pub fn start_scenario(&mut self) -> ActionResult {
        self.expect_phase(Phase::Ready)?;
        if self.config.intro_enabled {
            self.phase = Phase::Intro;
            self.events.emit(ScenarioEvent::IntroRequested);
            log::info!("Scenario intro requested");
        } else {
            self.begin_run();
        }
        Ok(())
    }

    /// Intro dismissed: Intro → Running.
    pub fn start_actual_scenario(&mut self) -> ActionResult {
        self.expect_phase(Phase::Intro)?;
        self.begin_run();
        Ok(())
    }

    /// Clear scans, counters, tasks, risk and time, then start again.
    pub fn reset_and_start(&mut self) -> ActionResult {
        if self.phase == Phase::Idle {
            return Err(NoopReason::WrongPhase(self.phase));
        }
        let had_progress = self.validated_count > 0 || self.progress() > 0.0;
        self.clear_session();
        self.phase = Phase::Ready;
        log::info!("Scenario reset (risk {:.1})", self.risk.value());
        if had_progress {
            self.events.emit(ScenarioEvent::ProgressChanged { fraction: 0.0 });
        }
        self.start_scenario()
    }

    /// Advance the timer by `delta` seconds.
    pub fn advance(&mut self, delta: f32) -> ActionResult {
        if !delta.is_finite() || delta < 0.0 {
            return Err(NoopReason::InvalidDelta);
        }
        self.ensure_running()?;

        self.elapsed += f64::from(delta);

        if self.completion_reached() {
            self.finish(true);
        } else if self.elapsed + TIME_EPSILON >= f64::from(self.config.time_limit) {
            log::info!("Time up after {:.1}s", self.elapsed);
            self.events.emit(ScenarioEvent::TimeUp);
            self.finish(false);
        } else if let Some(threshold) = self.config.time_warning_threshold {
            let remaining = self.remaining_time();
            if !self.time_warning_sent && remaining <= threshold {
                self.time_warning_sent = true;
                self.events.emit(ScenarioEvent::TimeWarning { remaining });
            }
        }
        Ok(())
    }

    // ========================================================================
    // PLAYER ACTIONS
    // ========================================================================

    /// Record a scan. No risk change.
    pub fn scan_item(&mut self, id: &str) -> ActionResult {
        self.ensure_running()?;
        let item = self.lookup_item(id)?.clone();
        self.ledger.record_scan(id);

        let text = if self.ledger.is_validated(id) {
            format!("{} already validated.", item.display_name)
        } else {
            format!(
                "{} scanned. Complete documentation to validate.",
                item.display_name
            )
        };
        self.toast(text);
        Ok(())
    }

    /// Accept an item. Idempotent: a second validation does nothing.
    pub fn validate_item(&mut self, id: &str) -> ActionResult {
        self.ensure_running()?;
        let item = self.lookup_item(id)?.clone();
        if !self.ledger.mark_validated(id) {
            log::debug!("Item '{}' already validated", id);
            return Err(NoopReason::AlreadyValidated(id.to_string()));
        }

        if item.target_match {
            self.validated_count += 1;
            self.adjust_risk(risk::VALIDATE_MATCH_DELTA);
            self.toast(format!("{} validated.", item.display_name));
            let fraction = self.item_progress();
            self.events.emit(ScenarioEvent::ProgressChanged { fraction });
        } else {
            self.adjust_risk(risk::VALIDATE_MISMATCH_DELTA);
            self.toast(format!(
                "{} accepted, but it does not fit this aircraft.",
                item.display_name
            ));
        }

        if self.config.completion == CompletionMode::Items && self.completion_reached() {
            self.finish(true);
        }
        Ok(())
    }

    /// Refuse an item. Not idempotent: each rejection is scored.
    pub fn reject_item(&mut self, id: &str) -> ActionResult {
        self.ensure_running()?;
        let item = self.lookup_item(id)?.clone();

        if item.target_match {
            self.adjust_risk(risk::REJECT_MATCH_DELTA);
            self.toast(format!(
                "{} rejected, but it was the right part.",
                item.display_name
            ));
        } else {
            self.adjust_risk(risk::REJECT_MISMATCH_DELTA);
            self.toast(format!("{} rejected.", item.display_name));
        }
        Ok(())
    }

    /// Complete a named task. Sensitive tasks done without elevated mode
    /// are penalized.
    pub fn complete_task(&mut self, name: &str) -> ActionResult {
        self.ensure_running()?;
        let elevated = self.elevated_mode;
        let Some(task) = self.tasks.find_by_name_mut(name) else {
            log::warn!("Unknown task '{}'", name);
            return Err(NoopReason::UnknownTask(name.to_string()));
        };
        if task.is_completed {
            log::debug!("Task '{}' already completed", name);
            return Err(NoopReason::AlreadyCompleted(name.to_string()));
        }
        task.is_completed = true;
        let unsafe_completion = task.requires_elevated_verification && !elevated;

        self.completed_task_count += 1;
        if unsafe_completion {
            self.adjust_risk(risk::TASK_UNSAFE_DELTA);
            self.toast(format!(
                "Task '{}' done without elevated verification.",
                name
            ));
        } else {
            self.adjust_risk(risk::TASK_SAFE_DELTA);
            self.toast(format!("Task '{}' completed.", name));
        }

        if self.config.completion == CompletionMode::Tasks {
            self.emit_progress();
            if self.completion_reached() {
                self.finish(true);
            }
        }
        Ok(())
    }

    /// Toggle elevated verification. Enabling lowers risk by 15, disabling
    /// raises it by 10, and every registered station is reconfigured.
    pub fn set_elevated_mode(&mut self, enabled: bool) -> ActionResult {
        if matches!(self.phase, Phase::Idle | Phase::Completed { .. }) {
            return Err(NoopReason::WrongPhase(self.phase));
        }
        if self.elevated_mode == enabled {
            return Err(NoopReason::ModeUnchanged(enabled));
        }
        self.elevated_mode = enabled;
        self.adjust_risk(if enabled {
            risk::ELEVATED_ENABLE_DELTA
        } else {
            risk::ELEVATED_DISABLE_DELTA
        });
        log::info!(
            "Elevated mode {} (risk {:.1})",
            if enabled { "enabled" } else { "disabled" },
            self.risk.value()
        );

        self.events.emit(ScenarioEvent::ElevatedModeChanged {
            enabled,
            risk: self.risk.value(),
        });
        for item_id in &self.stations {
            self.events.emit(ScenarioEvent::StationReconfigured {
                item_id: item_id.clone(),
                elevated: enabled,
            });
        }
        self.toast(if enabled {
            "Elevated verification enabled.".to_string()
        } else {
            "Elevated verification disabled.".to_string()
        });
        Ok(())
    }

    /// Bind an interactive station to an item so it follows mode changes.
    pub fn register_station(&mut self, item_id: &str) -> ActionResult {
        self.lookup_item(item_id)?;
        if !self.stations.iter().any(|s| s == item_id) {
            self.stations.push(item_id.to_string());
        }
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn risk_level(&self) -> f32 {
        self.risk.value()
    }

    pub fn max_risk(&self) -> f32 {
        self.risk.max()
    }

    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.catalogue.get(id)
    }

    pub fn is_item_scanned(&self, id: &str) -> bool {
        self.ledger.is_scanned(id)
    }

    pub fn is_item_validated(&self, id: &str) -> bool {
        self.ledger.is_validated(id)
    }

    pub fn scan_count(&self, id: &str) -> u32 {
        self.ledger.scan_count(id)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn remaining_time(&self) -> f32 {
        (f64::from(self.config.time_limit) - self.elapsed).max(0.0) as f32
    }

    /// Completion fraction in `[0, 1]` for the configured mode.
    pub fn progress(&self) -> f32 {
        match self.config.completion {
            CompletionMode::Items => self.item_progress(),
            CompletionMode::Tasks => {
                if self.tasks.total() == 0 {
                    return 0.0;
                }
                self.completed_task_count as f32 / self.tasks.total() as f32
            }
        }
    }

    /// Validated matches over required validations, capped at 1.
    pub fn item_progress(&self) -> f32 {
        if self.config.required_validations == 0 {
            return 1.0;
        }
        (self.validated_count as f32 / self.config.required_validations as f32).min(1.0)
    }

    pub fn validated_count(&self) -> u32 {
        self.validated_count
    }

    pub fn required_validations(&self) -> u32 {
        self.config.required_validations
    }

    pub fn completed_task_count(&self) -> u32 {
        self.completed_task_count
    }

    pub fn elevated_mode(&self) -> bool {
        self.elevated_mode
    }

    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    pub fn catalogue(&self) -> &ItemCatalogue {
        &self.catalogue
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    /// Report of the most recent completed run, if any.
    pub fn last_report(&self) -> Option<&ScenarioReport> {
        self.last_report.as_ref()
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn expect_phase(&self, expected: Phase) -> ActionResult {
        if self.phase != expected {
            log::debug!("Expected phase {:?}, found {:?}", expected, self.phase);
            return Err(NoopReason::WrongPhase(self.phase));
        }
        Ok(())
    }

    fn ensure_running(&self) -> ActionResult {
        if self.phase != Phase::Running {
            log::debug!("Action ignored in phase {:?}", self.phase);
            return Err(NoopReason::NotRunning);
        }
        Ok(())
    }

    fn lookup_item(&self, id: &str) -> Result<&Item, NoopReason> {
        self.catalogue.get(id).ok_or_else(|| {
            log::warn!("Unknown item '{}'", id);
            NoopReason::UnknownItem(id.to_string())
        })
    }

    /// Reset everything a run accumulates. Stations and elevated mode stay.
    fn clear_session(&mut self) {
        self.ledger.clear();
        self.tasks.reset_all();
        self.validated_count = 0;
        self.completed_task_count = 0;
        self.elapsed = 0.0;
        self.time_warning_sent = false;
        self.last_report = None;
        self.risk
            .set(risk::initial_risk(self.config.base_risk, self.elevated_mode));
    }

    fn begin_run(&mut self) {
        self.phase = Phase::Running;
        self.elapsed = 0.0;
        self.time_warning_sent = false;
        log::info!(
            "Scenario running: {:.0}s limit, {} validations required",
            self.config.time_limit,
            self.config.required_validations
        );
        self.events.emit(ScenarioEvent::ScenarioStarted);
    }

    fn completion_reached(&self) -> bool {
        match self.config.completion {
            CompletionMode::Items => self.validated_count >= self.config.required_validations,
            CompletionMode::Tasks => {
                self.tasks.total() > 0 && self.completed_task_count as usize >= self.tasks.total()
            }
        }
    }

    fn finish(&mut self, success: bool) {
        let report = ScenarioReport {
            success,
            validated: self.validated_count,
            required: self.config.required_validations,
            elapsed: self.elapsed as f32,
            risk: self.risk.value(),
            band: self.risk.band(),
            completed_tasks: self.completed_task_count,
            total_tasks: self.tasks.total() as u32,
        };
        self.phase = Phase::Completed { success };
        log::info!(
            "Scenario {}: {}/{} validated, risk {:.1} ({}), {:.1}s",
            if success { "succeeded" } else { "failed" },
            report.validated,
            report.required,
            report.risk,
            report.band.label(),
            report.elapsed
        );
        self.last_report = Some(report.clone());
        self.events.emit(ScenarioEvent::ScenarioCompleted(report));
    }

    fn adjust_risk(&mut self, delta: f32) {
        let applied = self.risk.apply(delta);
        if applied != 0.0 {
            self.events.emit(ScenarioEvent::RiskChanged {
                risk: self.risk.value(),
                delta: applied,
            });
        }
    }

    fn emit_progress(&mut self) {
        let fraction = self.progress();
        self.events.emit(ScenarioEvent::ProgressChanged { fraction });
    }

    fn toast(&mut self, text: String) {
        let duration = self.config.message_duration;
        self.events.emit(ScenarioEvent::TemporaryMessage { text, duration });
    }
}
