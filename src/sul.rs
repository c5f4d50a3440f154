//! System under learning - model assembly and collaborator contracts
//!
//! A [`SulDescriptor`] bundles what the external learning engine needs for one
//! case study: the observable variables, the event alphabet, the candidate
//! noise catalog, four collaborator callbacks and a few named arguments.
//!
//! Collaborators are implemented outside this crate. Their errors are wrapped
//! as [`Error::Collaborator`] and forwarded without interpretation.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::alphabet::{ControlEvent, EventAlphabet};
use crate::error::{Error, Result};
use crate::flow::{FlowCondition, ModeId};
use crate::noise::{DistributionId, NoiseCatalog};
use crate::trace::{ObservedTrace, SignalPoint};
use crate::variable::{ModeDistributionMap, ObservableVariable};

/// Loads a structured trace from a file
pub trait TraceParser: Send + Sync {
    fn parse(&self, path: &Path) -> anyhow::Result<ObservedTrace>;
}

/// Maps a raw driver-signal observation onto an alphabet tag
pub trait EventLabeler: Send + Sync {
    /// Returns the symbolic tag of the event observed at `sample`
    fn label(
        &self,
        alphabet: &EventAlphabet,
        sample: &SignalPoint,
        trace: &ObservedTrace,
    ) -> anyhow::Result<String>;
}

/// Fits physical parameters of a segment under an assumed mode
pub trait ParameterEstimator: Send + Sync {
    fn estimate(&self, segment: &[SignalPoint], flow: &FlowCondition) -> anyhow::Result<Vec<f64>>;
}

/// Locates mode switches within a trace
pub trait ChangePointDetector: Send + Sync {
    /// Indices (into the driver signal) where a mode switch occurs
    fn detect(&self, trace: &ObservedTrace) -> anyhow::Result<Vec<usize>>;
}

/// The four external callbacks of a case study
#[derive(Clone)]
pub struct Collaborators {
    pub parser: Arc<dyn TraceParser>,
    pub labeler: Arc<dyn EventLabeler>,
    pub estimator: Arc<dyn ParameterEstimator>,
    pub detector: Arc<dyn ChangePointDetector>,
}

impl Collaborators {
    pub fn new(
        parser: impl TraceParser + 'static,
        labeler: impl EventLabeler + 'static,
        estimator: impl ParameterEstimator + 'static,
        detector: impl ChangePointDetector + 'static,
    ) -> Self {
        Self {
            parser: Arc::new(parser),
            labeler: Arc::new(labeler),
            estimator: Arc::new(estimator),
            detector: Arc::new(detector),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Named arguments of a case study
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SulArgs {
    /// Process name
    pub name: String,

    /// Raw signal gating the controlled variable
    pub driver: String,

    /// Mode assumed while none is confirmed
    pub default_mode: ModeId,

    /// Distribution assumed while none is confirmed
    pub default_distribution: DistributionId,
}

/// Everything the learning engine needs for one case study
#[derive(Debug, Clone)]
pub struct SulDescriptor {
    vars: Vec<ObservableVariable>,
    alphabet: EventAlphabet,
    candidates: NoiseCatalog,
    collaborators: Collaborators,
    args: SulArgs,
}

impl SulDescriptor {
    /// Assemble a descriptor
    ///
    /// Requires at least one variable, unique variable labels, a non-empty
    /// alphabet and a default mode known to some variable.
    pub fn new(
        vars: Vec<ObservableVariable>,
        alphabet: EventAlphabet,
        collaborators: Collaborators,
        args: SulArgs,
    ) -> Result<Self> {
        if vars.is_empty() {
            return Err(Error::ModelConstruction(
                "a system under learning needs at least one variable".to_string(),
            ));
        }

        let mut labels = HashSet::new();
        for var in &vars {
            if !labels.insert(var.label()) {
                return Err(Error::ModelConstruction(format!(
                    "duplicate variable label '{}'",
                    var.label()
                )));
            }
        }

        if alphabet.is_empty() {
            return Err(Error::ModelConstruction("event alphabet is empty".to_string()));
        }
        if args.name.is_empty() || args.driver.is_empty() {
            return Err(Error::ModelConstruction(
                "process name and driver signal must be set".to_string(),
            ));
        }
        if !vars.iter().any(|v| v.flow(args.default_mode).is_some()) {
            return Err(Error::UnknownMode(args.default_mode));
        }

        info!(
            name = %args.name,
            driver = %args.driver,
            variables = vars.len(),
            events = alphabet.len(),
            "System under learning assembled"
        );

        Ok(Self {
            vars,
            alphabet,
            candidates: NoiseCatalog::new(),
            collaborators,
            args,
        })
    }

    /// Attach the candidate noise catalog offered to the oracle
    ///
    /// Every owning mode must belong to one of the variables. Catalog entries
    /// are not copied into any mode map.
    pub fn with_candidates(mut self, candidates: NoiseCatalog) -> Result<Self> {
        for owner in candidates.owners() {
            if !self.vars.iter().any(|v| v.flow(owner).is_some()) {
                return Err(Error::UnknownMode(owner));
            }
        }

        debug!(candidates = candidates.len(), "Noise catalog attached");
        self.candidates = candidates;
        Ok(self)
    }

    pub fn vars(&self) -> &[ObservableVariable] {
        &self.vars
    }

    /// Variable by label
    pub fn var(&self, label: &str) -> Option<&ObservableVariable> {
        self.vars.iter().find(|v| v.label() == label)
    }

    /// Mode map of the variable labelled `label`
    pub fn mode_map_mut(&mut self, label: &str) -> Option<&mut ModeDistributionMap> {
        self.vars
            .iter_mut()
            .find(|v| v.label() == label)
            .map(ObservableVariable::mode_map_mut)
    }

    pub fn alphabet(&self) -> &EventAlphabet {
        &self.alphabet
    }

    pub fn candidates(&self) -> &NoiseCatalog {
        &self.candidates
    }

    pub fn args(&self) -> &SulArgs {
        &self.args
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Parse a trace file through the external parser
    pub fn parse_trace(&self, path: &Path) -> Result<ObservedTrace> {
        Ok(self.collaborators.parser.parse(path)?)
    }

    /// Label a driver sample and resolve it against the alphabet
    pub fn label_event(
        &self,
        sample: &SignalPoint,
        trace: &ObservedTrace,
    ) -> Result<&ControlEvent> {
        let tag = self
            .collaborators
            .labeler
            .label(&self.alphabet, sample, trace)?;

        self.alphabet
            .get(&tag)
            .ok_or_else(|| Error::InvalidEvent(format!("labeler produced unknown tag '{}'", tag)))
    }

    /// Estimate physical parameters of `segment` under `flow`
    pub fn estimate_parameters(
        &self,
        segment: &[SignalPoint],
        flow: &FlowCondition,
    ) -> Result<Vec<f64>> {
        Ok(self.collaborators.estimator.estimate(segment, flow)?)
    }

    /// Change points of `trace`
    pub fn detect_change_points(&self, trace: &ObservedTrace) -> Result<Vec<usize>> {
        Ok(self.collaborators.detector.detect(trace)?)
    }
}
