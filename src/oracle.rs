//! Learning engine and teacher contracts
//!
//! Both sides live outside this crate. The engine owns the trace store and
//! the segmentation; the teacher answers model-identification and
//! hypothesis-testing queries.
//!
//! Hypothesis testing never writes to the mode map directly: the teacher
//! reads the map and returns a verdict carrying an [`Assignment`] stamped with
//! the revision it saw. The caller decides whether to commit it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::flow::{FlowCondition, ModeId};
use crate::noise::DistributionId;
use crate::trace::{ObservedTrace, Segment, Trace};
use crate::variable::{Assignment, ModeDistributionMap};

/// Trace store and segmentation of the system under learning
pub trait SulEngine {
    /// Load one trace file into the store
    fn process_data(&mut self, path: &Path) -> Result<()>;

    /// Traces loaded so far
    fn traces(&self) -> &[ObservedTrace];

    /// Segments of the stored traces that follow the event word `prefix`
    fn segments(&self, prefix: &Trace) -> Result<Vec<Segment>>;
}

/// Outcome of a hypothesis-testing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisVerdict {
    pub mode: ModeId,

    /// Distribution supported by the data, if any
    pub distribution: Option<DistributionId>,

    /// Map update to commit when the verdict is kept
    pub assignment: Option<Assignment>,
}

impl HypothesisVerdict {
    /// Verdict without support for any distribution
    pub fn rejected(mode: ModeId) -> Self {
        Self {
            mode,
            distribution: None,
            assignment: None,
        }
    }

    /// Verdict supporting `distribution`, stamped against `map`
    pub fn supported(
        map: &ModeDistributionMap,
        mode: ModeId,
        distribution: DistributionId,
    ) -> Result<Self> {
        Ok(Self {
            mode,
            distribution: Some(distribution),
            assignment: Some(map.propose(mode, distribution)?),
        })
    }
}

/// Query oracle of the learning algorithm
pub trait Teacher {
    /// Which mode explains the data following `prefix`?
    fn mi_query(&self, prefix: &Trace) -> Result<Option<ModeId>>;

    /// Does the data following `prefix` support a distribution for `flow`'s mode?
    fn ht_query(
        &self,
        prefix: &Trace,
        flow: &FlowCondition,
        mode_map: &ModeDistributionMap,
    ) -> Result<HypothesisVerdict>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_verdict_stamps_revision() {
        let mut map = ModeDistributionMap::with_modes([ModeId(0)]).unwrap();
        let first = map.propose(ModeId(0), DistributionId(0)).unwrap();
        map.commit(first).unwrap();

        let verdict = HypothesisVerdict::supported(&map, ModeId(0), DistributionId(1)).unwrap();
        assert_eq!(verdict.assignment.unwrap().base_revision, 1);
        assert_eq!(verdict.distribution, Some(DistributionId(1)));
    }

    #[test]
    fn test_rejected_verdict() {
        let verdict = HypothesisVerdict::rejected(ModeId(1));
        assert!(verdict.distribution.is_none());
        assert!(verdict.assignment.is_none());
    }
}
