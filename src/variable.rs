//! Observable variable and its mode→distribution map
//!
//! The map records, per mode, the noise distributions the learning engine has
//! confirmed so far. It starts empty for every mode and only grows through
//! committed [`Assignment`]s.
//!
//! ## Ordering
//!
//! Hypothesis-testing results depend on what was confirmed before them, so
//! writes are serialized per mode. Every mode carries a revision counter:
//!
//! ```text
//! read map (rev n) → query oracle → Assignment { base_revision: n } → commit
//! ```
//!
//! A commit whose `base_revision` no longer matches the mode's revision is
//! rejected, the same way a delta must link to the current chain head.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flow::{FlowCondition, ModeId};
use crate::noise::{DistributionId, NoiseDistribution};

/// A pending association of a distribution with a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub mode: ModeId,
    pub distribution: DistributionId,

    /// Revision of `mode` the assignment was derived from
    pub base_revision: u64,
}

/// Confirmed distributions per mode, with per-mode revisions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawModeDistributionMap")]
pub struct ModeDistributionMap {
    assigned: BTreeMap<ModeId, Vec<DistributionId>>,
    revisions: BTreeMap<ModeId, u64>,
}

#[derive(Deserialize)]
struct RawModeDistributionMap {
    assigned: BTreeMap<ModeId, Vec<DistributionId>>,
    revisions: BTreeMap<ModeId, u64>,
}

impl TryFrom<RawModeDistributionMap> for ModeDistributionMap {
    type Error = Error;

    fn try_from(raw: RawModeDistributionMap) -> Result<Self> {
        if !raw.assigned.keys().eq(raw.revisions.keys()) {
            return Err(Error::Serialization(
                "mode map revisions do not cover the same modes as assignments".to_string(),
            ));
        }

        for (mode, assigned) in &raw.assigned {
            let mut seen = HashSet::new();
            if let Some(dup) = assigned.iter().find(|d| !seen.insert(**d)) {
                return Err(Error::Serialization(format!(
                    "distribution {} confirmed twice for mode {}",
                    dup, mode
                )));
            }
        }

        Ok(Self {
            assigned: raw.assigned,
            revisions: raw.revisions,
        })
    }
}

impl ModeDistributionMap {
    /// Empty sequences for every mode in `modes`
    pub fn with_modes(modes: impl IntoIterator<Item = ModeId>) -> Result<Self> {
        let mut assigned = BTreeMap::new();
        let mut revisions = BTreeMap::new();

        for mode in modes {
            if assigned.insert(mode, Vec::new()).is_some() {
                return Err(Error::DuplicateMode(mode));
            }
            revisions.insert(mode, 0);
        }

        Ok(Self {
            assigned,
            revisions,
        })
    }

    /// Distributions confirmed for `mode`, in confirmation order
    pub fn distributions(&self, mode: ModeId) -> Option<&[DistributionId]> {
        self.assigned.get(&mode).map(Vec::as_slice)
    }

    pub fn modes(&self) -> impl Iterator<Item = ModeId> + '_ {
        self.assigned.keys().copied()
    }

    pub fn contains_mode(&self, mode: ModeId) -> bool {
        self.assigned.contains_key(&mode)
    }

    /// Current revision of `mode`
    pub fn revision(&self, mode: ModeId) -> Result<u64> {
        self.revisions
            .get(&mode)
            .copied()
            .ok_or(Error::UnknownMode(mode))
    }

    /// True when no mode has a confirmed distribution
    pub fn is_unassigned(&self) -> bool {
        self.assigned.values().all(Vec::is_empty)
    }

    /// Stamp an assignment against the current revision of `mode`
    pub fn propose(&self, mode: ModeId, distribution: DistributionId) -> Result<Assignment> {
        Ok(Assignment {
            mode,
            distribution,
            base_revision: self.revision(mode)?,
        })
    }

    /// Apply an assignment
    ///
    /// Returns `true` if the distribution was newly appended, `false` if it was
    /// already confirmed for the mode. Either way the mode's revision advances.
    pub fn commit(&mut self, assignment: Assignment) -> Result<bool> {
        let current = self.revision(assignment.mode)?;
        if assignment.base_revision != current {
            return Err(Error::StaleAssignment {
                mode: assignment.mode,
                expected: current,
                found: assignment.base_revision,
            });
        }

        let assigned = self
            .assigned
            .get_mut(&assignment.mode)
            .ok_or(Error::UnknownMode(assignment.mode))?;

        let appended = if assigned.contains(&assignment.distribution) {
            false
        } else {
            assigned.push(assignment.distribution);
            true
        };
        self.revisions.insert(assignment.mode, current + 1);

        debug!(
            mode = %assignment.mode,
            distribution = %assignment.distribution,
            revision = current + 1,
            appended,
            "Mode assignment committed"
        );

        Ok(appended)
    }

    /// Save confirmed assignments as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!(path = %path.display(), "Mode map saved");
        Ok(())
    }

    /// Load confirmed assignments from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// A real-valued observable bound to its modes and noise hypotheses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObservableVariable")]
pub struct ObservableVariable {
    label: String,
    flows: Vec<FlowCondition>,
    distributions: Vec<NoiseDistribution>,
    mode_map: ModeDistributionMap,
}

#[derive(Deserialize)]
struct RawObservableVariable {
    label: String,
    flows: Vec<FlowCondition>,
    distributions: Vec<NoiseDistribution>,
    mode_map: ModeDistributionMap,
}

impl TryFrom<RawObservableVariable> for ObservableVariable {
    type Error = Error;

    /// Same checks as [`ObservableVariable::new`], plus a mode map covering
    /// exactly the variable's modes
    fn try_from(raw: RawObservableVariable) -> Result<Self> {
        check_binding(&raw.label, &raw.flows, &raw.distributions)?;

        if !raw.flows.iter().all(|f| raw.mode_map.contains_mode(f.id))
            || raw.mode_map.modes().count() != raw.flows.len()
        {
            return Err(Error::Serialization(format!(
                "mode map of variable '{}' does not match its modes",
                raw.label
            )));
        }

        Ok(Self {
            label: raw.label,
            flows: raw.flows,
            distributions: raw.distributions,
            mode_map: raw.mode_map,
        })
    }
}

fn check_binding(
    label: &str,
    flows: &[FlowCondition],
    distributions: &[NoiseDistribution],
) -> Result<()> {
    if label.is_empty() {
        return Err(Error::ModelConstruction("variable label must not be empty".to_string()));
    }
    if flows.is_empty() {
        return Err(Error::ModelConstruction(format!(
            "variable '{}' needs at least one mode",
            label
        )));
    }

    let mut modes = HashSet::new();
    for f in flows {
        if !modes.insert(f.id) {
            return Err(Error::DuplicateMode(f.id));
        }
    }

    let mut seen = HashSet::new();
    for d in distributions {
        if !seen.insert(d.id) {
            return Err(Error::DuplicateDistribution(d.id));
        }
    }

    Ok(())
}

impl ObservableVariable {
    /// Bind `flows` and an initial distribution set to a new variable
    ///
    /// The mode map gets one empty sequence per flow. Duplicate mode or
    /// distribution ids are rejected.
    pub fn new(
        label: impl Into<String>,
        flows: Vec<FlowCondition>,
        distributions: Vec<NoiseDistribution>,
    ) -> Result<Self> {
        let label = label.into();
        check_binding(&label, &flows, &distributions)?;

        let mode_map = ModeDistributionMap::with_modes(flows.iter().map(|f| f.id))?;

        Ok(Self {
            label,
            flows,
            distributions,
            mode_map,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn flows(&self) -> &[FlowCondition] {
        &self.flows
    }

    /// Flow condition of `mode`
    pub fn flow(&self, mode: ModeId) -> Option<&FlowCondition> {
        self.flows.iter().find(|f| f.id == mode)
    }

    pub fn modes(&self) -> Vec<ModeId> {
        self.flows.iter().map(|f| f.id).collect()
    }

    pub fn distributions(&self) -> &[NoiseDistribution] {
        &self.distributions
    }

    pub fn mode_map(&self) -> &ModeDistributionMap {
        &self.mode_map
    }

    pub fn mode_map_mut(&mut self) -> &mut ModeDistributionMap {
        &mut self.mode_map
    }

    /// SHA-256 of the canonical JSON form
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}
