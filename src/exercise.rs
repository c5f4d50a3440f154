//! Exercise - diagnostic walk through the learning protocol
//!
//! Drives an external engine and teacher through one pass of the protocol:
//!
//! 1. Load every trace file whose name starts with the case-study prefix
//! 2. Ask the engine for the segments following an event prefix
//! 3. Estimate physical parameters of each segment
//! 4. Issue a model-identification query for the empty word
//! 5. Issue hypothesis-testing queries, shortest prefix first, committing
//!    each supported verdict to the variable's mode map
//!
//! Step 5 is ordered because each committed verdict changes the map the next
//! query reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ExerciseConfig;
use crate::error::{Error, Result};
use crate::flow::ModeId;
use crate::oracle::{HypothesisVerdict, SulEngine, Teacher};
use crate::sul::SulDescriptor;
use crate::thermostat::{OFF_MODE, ON_MODE, TEMPERATURE_LABEL};
use crate::trace::Trace;
use crate::variable::ModeDistributionMap;

/// A hypothesis-testing query to issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisRequest {
    pub prefix: Trace,
    pub mode: ModeId,
}

/// A verdict as recorded in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedVerdict {
    pub prefix: String,
    pub verdict: HypothesisVerdict,
    pub committed: bool,
}

/// What one exercise run observed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseReport {
    pub loaded: Vec<PathBuf>,
    pub symbols: BTreeMap<String, String>,
    pub segment_count: usize,

    /// Estimated parameters, one entry per segment
    pub parameters: Vec<Vec<f64>>,

    pub identified_mode: Option<ModeId>,
    pub verdicts: Vec<RecordedVerdict>,

    /// Mode map after the run
    pub mode_map: ModeDistributionMap,
}

/// Diagnostic exercise over one variable
#[derive(Debug, Clone)]
pub struct Exercise {
    config: ExerciseConfig,
    variable: String,
    segment_prefix: Trace,
    estimate_mode: ModeId,
    requests: Vec<HypothesisRequest>,
}

impl Exercise {
    /// Exercise over the variable labelled `variable`
    pub fn new(
        config: ExerciseConfig,
        variable: impl Into<String>,
        segment_prefix: Trace,
        estimate_mode: ModeId,
    ) -> Self {
        Self {
            config,
            variable: variable.into(),
            segment_prefix,
            estimate_mode,
            requests: Vec::new(),
        }
    }

    /// Queue a hypothesis-testing query
    pub fn test_hypothesis(mut self, prefix: Trace, mode: ModeId) -> Self {
        self.requests.push(HypothesisRequest { prefix, mode });
        self
    }

    fn unknown_variable(&self) -> Error {
        Error::ModelConstruction(format!("unknown variable '{}'", self.variable))
    }

    /// Queued queries in issue order: shorter prefixes first, ties in queue order
    pub fn schedule(&self) -> Vec<&HypothesisRequest> {
        let mut ordered: Vec<&HypothesisRequest> = self.requests.iter().collect();
        ordered.sort_by_key(|r| r.prefix.len());
        ordered
    }

    pub fn run<E, T>(
        &self,
        sul: &mut SulDescriptor,
        engine: &mut E,
        teacher: &T,
    ) -> Result<ExerciseReport>
    where
        E: SulEngine,
        T: Teacher,
    {
        let symbols = sul.alphabet().symbols();
        info!(symbols = ?symbols, "Event configuration");

        let loaded = list_trace_files(&self.config.trace_dir, &self.config.file_prefix)?;
        for path in &loaded {
            engine.process_data(path)?;
            debug!(path = %path.display(), "Trace loaded");
        }
        for trace in engine.traces() {
            let labels: Vec<&str> = trace.signals.iter().map(|s| s.label.as_str()).collect();
            debug!(source = %trace.source.display(), signals = ?labels, "Stored trace");
        }
        info!(traces = engine.traces().len(), files = loaded.len(), "Trace store populated");

        let segments = engine.segments(&self.segment_prefix)?;
        info!(prefix = %self.segment_prefix, segments = segments.len(), "Segments identified");

        let variable = sul
            .var(&self.variable)
            .ok_or_else(|| self.unknown_variable())?;
        let estimate_flow = *variable
            .flow(self.estimate_mode)
            .ok_or(Error::UnknownMode(self.estimate_mode))?;

        let parameters = segments
            .iter()
            .map(|s| sul.estimate_parameters(s, &estimate_flow))
            .collect::<Result<Vec<_>>>()?;
        info!(parameters = ?parameters, "Segment parameters estimated");

        let identified_mode = teacher.mi_query(&Trace::empty())?;
        info!(mode = ?identified_mode, "Model identification answered");

        let mut verdicts = Vec::with_capacity(self.requests.len());
        for request in self.schedule() {
            let flow = *sul
                .var(&self.variable)
                .and_then(|v| v.flow(request.mode))
                .ok_or(Error::UnknownMode(request.mode))?;
            let map = sul
                .mode_map_mut(&self.variable)
                .ok_or_else(|| self.unknown_variable())?;

            let verdict = teacher.ht_query(&request.prefix, &flow, map)?;

            let committed = match (self.config.save_verdicts, verdict.assignment) {
                (true, Some(assignment)) => {
                    map.commit(assignment)?;
                    true
                }
                _ => false,
            };

            if verdict.distribution.is_none() {
                warn!(prefix = %request.prefix, mode = %request.mode, "No distribution supported");
            }
            info!(
                prefix = %request.prefix,
                mode = %request.mode,
                distributions = ?map.distributions(request.mode),
                committed,
                "Hypothesis testing answered"
            );

            verdicts.push(RecordedVerdict {
                prefix: request.prefix.to_string(),
                verdict,
                committed,
            });
        }

        let mode_map = sul
            .var(&self.variable)
            .map(|v| v.mode_map().clone())
            .ok_or_else(|| self.unknown_variable())?;

        Ok(ExerciseReport {
            loaded,
            symbols,
            segment_count: segments.len(),
            parameters,
            identified_mode,
            verdicts,
            mode_map,
        })
    }
}

/// Files in `dir` whose name starts with `prefix`, sorted by name
pub fn list_trace_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            files.push(entry.path());
        }
    }

    files.sort();
    Ok(files)
}

/// The thermostat walk: estimate on-mode segments after the configured
/// prefix, then test the on mode after `h_0` and the off mode after `h_0 c_0`
pub fn thermostat_exercise(config: ExerciseConfig, sul: &SulDescriptor) -> Result<Exercise> {
    let event = |tag: &str| {
        sul.alphabet()
            .get(tag)
            .cloned()
            .ok_or_else(|| Error::InvalidEvent(format!("alphabet has no '{}' event", tag)))
    };
    let on = event("h_0")?;
    let off = event("c_0")?;

    let segment_prefix = Trace::new(
        config
            .segment_prefix
            .iter()
            .map(|tag| event(tag.as_str()))
            .collect::<Result<Vec<_>>>()?,
    );

    let heating = Trace::new(vec![on]);
    let cooling = heating.extended(off);

    Ok(Exercise::new(config, TEMPERATURE_LABEL, segment_prefix, ON_MODE)
        .test_hypothesis(heating, ON_MODE)
        .test_hypothesis(cooling, OFF_MODE))
}
