//! Flow conditions - closed-form continuous dynamics per control mode
//!
//! Inside a mode the observed variable follows an exponential relaxation:
//!
//! | Law | Formula | Asymptote |
//! |-----|---------|-----------|
//! | **Decay** | `T0 · exp(-(t - t0) / τ)` | 0 |
//! | **Approach** | `K - (K - T0) · exp(-(t - t0) / τ)` | K |
//!
//! Both laws return the initial value at `t = t0` and move monotonically
//! toward their asymptote as time increases. Timestamps are not checked for
//! monotonicity; callers pass them in trace order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::trace::Timestamp;

/// Identifier of a control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeId(pub u32);

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f_{}", self.0)
    }
}

/// Continuous-time law of one mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum FlowLaw {
    /// Relaxation to zero with time constant `tau`
    Decay { tau: f64 },

    /// Relaxation to `asymptote` with time constant `tau`
    Approach { asymptote: f64, tau: f64 },
}

impl FlowLaw {
    /// Passive decay toward zero
    pub fn decay(tau: f64) -> Result<Self> {
        check_time_constant(tau)?;
        Ok(Self::Decay { tau })
    }

    /// Active approach toward `asymptote`
    pub fn approach(asymptote: f64, tau: f64) -> Result<Self> {
        check_time_constant(tau)?;
        if !asymptote.is_finite() {
            return Err(Error::ModelConstruction(format!(
                "asymptote must be finite, got {}",
                asymptote
            )));
        }
        Ok(Self::Approach { asymptote, tau })
    }

    /// Value reached after `elapsed` seconds starting from `initial`
    pub fn value_at(&self, elapsed: f64, initial: f64) -> f64 {
        // Exact identity at t0, free of rounding in the approach form
        if elapsed == 0.0 {
            return initial;
        }

        match *self {
            FlowLaw::Decay { tau } => initial * (-elapsed / tau).exp(),
            FlowLaw::Approach { asymptote, tau } => {
                asymptote - (asymptote - initial) * (-elapsed / tau).exp()
            }
        }
    }

    /// Value the law tends to as time goes to infinity
    pub fn asymptote(&self) -> f64 {
        match *self {
            FlowLaw::Decay { .. } => 0.0,
            FlowLaw::Approach { asymptote, .. } => asymptote,
        }
    }

    /// Time constant of the relaxation
    pub fn tau(&self) -> f64 {
        match *self {
            FlowLaw::Decay { tau } | FlowLaw::Approach { tau, .. } => tau,
        }
    }
}

fn check_time_constant(tau: f64) -> Result<()> {
    if tau.is_finite() && tau > 0.0 {
        Ok(())
    } else {
        Err(Error::ModelConstruction(format!(
            "time constant must be finite and positive, got {}",
            tau
        )))
    }
}

/// A mode together with its flow law
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowCondition {
    pub id: ModeId,
    pub law: FlowLaw,
}

impl FlowCondition {
    pub fn new(id: ModeId, law: FlowLaw) -> Self {
        Self { id, law }
    }

    /// Predict the variable over `interval`, starting from `initial` at `interval[0]`
    ///
    /// Output length always equals input length; an empty interval yields an
    /// empty prediction.
    pub fn evaluate(&self, interval: &[Timestamp], initial: f64) -> Vec<f64> {
        let Some(origin) = interval.first() else {
            return Vec::new();
        };

        interval
            .iter()
            .map(|t| self.law.value_at(t.elapsed_since(origin), initial))
            .collect()
    }
}
