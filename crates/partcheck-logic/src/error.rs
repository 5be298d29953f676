//! Why a call did nothing.
//!
//! The engine never panics on bad input. Every mutating call returns
//! [`ActionResult`]; an `Err` means state was left untouched.

use crate::engine::Phase;

pub type ActionResult = Result<(), NoopReason>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoopReason {
    /// Item id not in the catalogue.
    UnknownItem(String),
    /// Task name not in the registry.
    UnknownTask(String),
    /// Action attempted outside the running phase.
    NotRunning,
    AlreadyValidated(String),
    AlreadyCompleted(String),
    /// Elevated mode already has the requested value.
    ModeUnchanged(bool),
    /// Negative or non-finite time step.
    InvalidDelta,
    /// Lifecycle call made from a phase that does not allow it.
    WrongPhase(Phase),
}

impl std::fmt::Display for NoopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoopReason::UnknownItem(id) => write!(f, "Unknown item: {}", id),
            NoopReason::UnknownTask(name) => write!(f, "Unknown task: {}", name),
            NoopReason::NotRunning => write!(f, "Scenario is not running"),
            NoopReason::AlreadyValidated(id) => write!(f, "Item already validated: {}", id),
            NoopReason::AlreadyCompleted(name) => write!(f, "Task already completed: {}", name),
            NoopReason::ModeUnchanged(enabled) => {
                write!(f, "Elevated mode already {}", if *enabled { "on" } else { "off" })
            }
            NoopReason::InvalidDelta => write!(f, "Invalid time step"),
            NoopReason::WrongPhase(phase) => write!(f, "Not allowed in phase {:?}", phase),
        }
    }
}

impl std::error::Error for NoopReason {}
