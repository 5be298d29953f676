//! Events the engine raises for collaborators (UI, stations, audio).
//!
//! Every event is delivered synchronously to each subscribed listener in
//! subscription order, then kept in a pending queue until drained. The
//! engine never waits on a listener; timing of toasts and intros belongs
//! to whoever consumes the event.

use serde::{Deserialize, Serialize};

use crate::risk::RiskBand;

/// End-of-run summary, the payload of [`ScenarioEvent::ScenarioCompleted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub success: bool,
    pub validated: u32,
    pub required: u32,
    /// Seconds elapsed when the run ended.
    pub elapsed: f32,
    pub risk: f32,
    pub band: RiskBand,
    pub completed_tasks: u32,
    pub total_tasks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioEvent {
    /// Progress fraction in `[0, 1]` changed.
    ProgressChanged { fraction: f32 },
    /// Time limit reached while running. Fires before the failure report.
    TimeUp,
    /// Remaining time crossed the warning threshold.
    TimeWarning { remaining: f32 },
    ScenarioCompleted(ScenarioReport),
    /// Transient toast. `duration` is a display hint in seconds.
    TemporaryMessage { text: String, duration: f32 },
    /// UI should show the intro; answer with `start_actual_scenario`.
    IntroRequested,
    /// Timer started.
    ScenarioStarted,
    /// A registered station must reflect the new verification mode.
    StationReconfigured { item_id: String, elevated: bool },
    ElevatedModeChanged { enabled: bool, risk: f32 },
    /// Risk moved. `delta` is the change after clamping.
    RiskChanged { risk: f32, delta: f32 },
}

/// Receives engine events as they happen.
pub trait ScenarioListener {
    fn on_event(&mut self, event: &ScenarioEvent);
}

impl<F> ScenarioListener for F
where
    F: FnMut(&ScenarioEvent),
{
    fn on_event(&mut self, event: &ScenarioEvent) {
        self(event)
    }
}

/// Fan-out to listeners plus a drainable backlog.
#[derive(Default)]
pub struct EventQueue {
    listeners: Vec<Box<dyn ScenarioListener>>,
    pending: Vec<ScenarioEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ScenarioListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn emit(&mut self, event: ScenarioEvent) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
        self.pending.push(event);
    }

    /// Take every event raised since the last drain.
    pub fn drain(&mut self) -> Vec<ScenarioEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[ScenarioEvent] {
        &self.pending
    }
}
