//! Risk scoring. Lower is better.
//!
//! Wrong actions cost more than right actions gain:
//!
//! | Action | Target match | Delta |
//! |--------|--------------|-------|
//! | Validate | yes | −10 |
//! | Validate | no | +15 |
//! | Reject | yes | +20 |
//! | Reject | no | −5 |
//! | Complete elevated task, elevated mode off | — | +15 |
//! | Complete any other task | — | −5 |
//! | Enable elevated mode | — | −15 |
//! | Disable elevated mode | — | +10 |
//!
//! Every mutation is clamped to `[0, max]`.

use serde::{Deserialize, Serialize};

pub const VALIDATE_MATCH_DELTA: f32 = -10.0;
pub const VALIDATE_MISMATCH_DELTA: f32 = 15.0;
pub const REJECT_MATCH_DELTA: f32 = 20.0;
pub const REJECT_MISMATCH_DELTA: f32 = -5.0;
pub const TASK_UNSAFE_DELTA: f32 = 15.0;
pub const TASK_SAFE_DELTA: f32 = -5.0;
pub const ELEVATED_ENABLE_DELTA: f32 = -15.0;
pub const ELEVATED_DISABLE_DELTA: f32 = 10.0;

/// Starting risk for a session: halved when elevated mode starts on.
pub fn initial_risk(base: f32, elevated: bool) -> f32 {
    if elevated {
        base / 2.0
    } else {
        base
    }
}

/// A risk value bounded to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskMeter {
    value: f32,
    max: f32,
}

impl RiskMeter {
    pub fn new(value: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            value: value.clamp(0.0, max),
            max,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Add `delta` and clamp. Returns the change actually applied.
    pub fn apply(&mut self, delta: f32) -> f32 {
        let before = self.value;
        self.value = (self.value + delta).clamp(0.0, self.max);
        self.value - before
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.max);
    }

    pub fn band(&self) -> RiskBand {
        RiskBand::classify(self.value, self.max)
    }
}

/// Coarse risk rating for end-of-session display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    /// Below a quarter of max.
    Low,
    Moderate,
    High,
    /// Three quarters of max or more.
    Critical,
}

impl RiskBand {
    pub fn classify(risk: f32, max: f32) -> Self {
        if max <= 0.0 {
            return Self::Low;
        }
        let fraction = risk / max;
        if fraction < 0.25 {
            Self::Low
        } else if fraction < 0.5 {
            Self::Moderate
        } else if fraction < 0.75 {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}
