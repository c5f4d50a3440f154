//! # Thermostat SHA
//!
//! Case-study model of a thermostat for stochastic hybrid automaton (SHA)
//! learning: the continuous dynamics of each control mode, the noise
//! hypotheses around them, and the discrete event alphabet used to segment and
//! label observed traces.
//!
//! ## Model
//!
//! | Mode | Id | Flow condition | Asymptote |
//! |------|----|----------------|-----------|
//! | **on** | 0 | `K - (K - T0)·exp(-(t - t0)/R)` | `K = R · 0.7` |
//! | **off** | 1 | `T0·exp(-(t - t0)/τ_off)` | 0 |
//!
//! The event alphabet depends on the case-study version read from
//! configuration (`CS_VERSION`): one to three guard tiers, each contributing
//! an `on` event (`h_i`) and an `off` event (`c_i`).
//!
//! ## Collaborators
//!
//! Trace parsing, event labelling, parameter estimation, change-point
//! detection, the learning engine and the teacher are all external. This
//! crate declares the model and the traits they implement.
//!
//! ## Example
//!
//! ```rust,no_run
//! use thermostat_sha::{SulConfig, ThermostatParams, thermostat_sul, Collaborators};
//! # fn collaborators() -> Collaborators { unimplemented!() }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let config = SulConfig::load("./resources/config/config.ini")?;
//! let sul = thermostat_sul(&config, &ThermostatParams::default(), collaborators())?;
//!
//! println!("{:?}", sul.alphabet().symbols());
//! sul.export_to_json("thermostat_model.json")?;
//! # Ok(())
//! # }
//! ```

pub mod alphabet;
pub mod config;
pub mod error;
pub mod exercise;
pub mod export;
pub mod flow;
pub mod noise;
pub mod oracle;
pub mod sul;
pub mod thermostat;
pub mod trace;
pub mod variable;

// Re-exports
pub use crate::alphabet::{AlphabetLayout, ControlAction, ControlEvent, EventAlphabet, GuardTier};
pub use crate::config::{ExerciseConfig, SulConfig};
pub use crate::error::{Error, Result};
pub use crate::exercise::{thermostat_exercise, Exercise, ExerciseReport, HypothesisRequest};
pub use crate::export::ModelSnapshot;
pub use crate::flow::{FlowCondition, FlowLaw, ModeId};
pub use crate::noise::{DistributionId, NoiseCatalog, NoiseDistribution};
pub use crate::oracle::{HypothesisVerdict, SulEngine, Teacher};
pub use crate::sul::{
    ChangePointDetector, Collaborators, EventLabeler, ParameterEstimator, SulArgs, SulDescriptor,
    TraceParser,
};
pub use crate::thermostat::{noise_catalog, thermostat_sul, ThermostatParams, OFF_MODE, ON_MODE};
pub use crate::trace::{ObservedTrace, SampledSignal, Segment, SignalPoint, Timestamp, Trace};
pub use crate::variable::{Assignment, ModeDistributionMap, ObservableVariable};
