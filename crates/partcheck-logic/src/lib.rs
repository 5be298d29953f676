//! Pure scenario logic for PartCheck.
//!
//! PartCheck is a training simulation: the player inspects parts at
//! stations, decides whether each one is authentic and fit for the target
//! aircraft, and is scored on a risk metric that punishes both rejecting
//! good parts and accepting bad ones. This crate holds the scenario
//! progression and scoring state machine. It is independent of rendering,
//! input and audio; those layers call into [`engine::ScenarioEngine`] and
//! react to the [`events::ScenarioEvent`]s it raises.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Scenario configuration, validation, data-driven definitions |
//! | [`engine`] | Lifecycle, validation bookkeeping, risk scoring, timer |
//! | [`error`] | Why a call left state untouched (`NoopReason`) |
//! | [`events`] | Events, listeners, end-of-run report |
//! | [`item`] | Inspectable items, catalogue, per-session scan ledger |
//! | [`risk`] | Clamped risk meter, scoring deltas, risk bands |
//! | [`task`] | Named tasks and the per-session task registry |

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod item;
pub mod risk;
pub mod task;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::{CompletionMode, ScenarioConfig, ScenarioDefinition};
    pub use crate::engine::{Phase, ScenarioEngine};
    pub use crate::error::{ActionResult, NoopReason};
    pub use crate::events::{ScenarioEvent, ScenarioListener, ScenarioReport};
    pub use crate::item::{Item, ItemCatalogue};
    pub use crate::risk::RiskBand;
    pub use crate::task::{Task, TaskRegistry};
}
