//! Export - snapshot of an assembled model
//!
//! Writes the declarative part of a [`SulDescriptor`] (arguments, variables,
//! symbol table, candidate catalog) as JSON for inspection or for handing to a
//! learning engine running elsewhere. Collaborators are not exported.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::noise::NoiseCatalog;
use crate::sul::{SulArgs, SulDescriptor};
use crate::variable::ObservableVariable;

/// Exported model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub args: SulArgs,

    pub variables: Vec<ObservableVariable>,

    /// Tag → rendered event
    pub symbols: BTreeMap<String, String>,

    pub candidates: NoiseCatalog,

    pub metadata: SnapshotMetadata,
}

/// Metadata for export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub exported_at: String,
    pub alphabet_fingerprint: String,

    /// One fingerprint per variable, same order as `variables`
    pub variable_fingerprints: Vec<String>,
}

impl SulDescriptor {
    /// Snapshot of the declarative model
    pub fn snapshot(&self) -> Result<ModelSnapshot> {
        let variable_fingerprints = self
            .vars()
            .iter()
            .map(ObservableVariable::fingerprint)
            .collect::<Result<Vec<_>>>()?;

        Ok(ModelSnapshot {
            args: self.args().clone(),
            variables: self.vars().to_vec(),
            symbols: self.alphabet().symbols(),
            candidates: self.candidates().clone(),
            metadata: SnapshotMetadata {
                exported_at: chrono::Utc::now().to_rfc3339(),
                alphabet_fingerprint: self.alphabet().fingerprint()?,
                variable_fingerprints,
            },
        })
    }

    /// Export the snapshot to a JSON file
    pub fn export_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot()?;

        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;

        info!(path = %path.display(), symbols = snapshot.symbols.len(), "Model exported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::EventAlphabet;
    use crate::flow::{FlowCondition, FlowLaw, ModeId};
    use crate::noise::DistributionId;
    use crate::sul::{
        ChangePointDetector, Collaborators, EventLabeler, ParameterEstimator, TraceParser,
    };
    use crate::trace::{ObservedTrace, SignalPoint};

    struct Inert;

    impl TraceParser for Inert {
        fn parse(&self, path: &Path) -> anyhow::Result<ObservedTrace> {
            Ok(ObservedTrace::new(path, vec![]))
        }
    }

    impl EventLabeler for Inert {
        fn label(
        &self,
        _: &EventAlphabet,
        _: &SignalPoint,
        _: &ObservedTrace,
    ) -> anyhow::Result<String> {
            Ok("h_0".to_string())
        }
    }

    impl ParameterEstimator for Inert {
        fn estimate(&self, _: &[SignalPoint], _: &FlowCondition) -> anyhow::Result<Vec<f64>> {
            Ok(vec![])
        }
    }

    impl ChangePointDetector for Inert {
        fn detect(&self, _: &ObservedTrace) -> anyhow::Result<Vec<usize>> {
            Ok(vec![])
        }
    }

    fn descriptor() -> SulDescriptor {
        let var = ObservableVariable::new(
            "T_r",
            vec![FlowCondition::new(ModeId(1), FlowLaw::decay(100.0).unwrap())],
            vec![],
        )
        .unwrap();

        SulDescriptor::new(
            vec![var],
            EventAlphabet::for_version(2).unwrap(),
            Collaborators::new(Inert, Inert, Inert, Inert),
            SulArgs {
                name: "test".to_string(),
                driver: "t.ON".to_string(),
                default_mode: ModeId(1),
                default_distribution: DistributionId(1),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_structure() {
        let snapshot = descriptor().snapshot().unwrap();

        assert_eq!(snapshot.args.name, "test");
        assert_eq!(snapshot.symbols.len(), 4);
        assert_eq!(snapshot.variables.len(), 1);
        assert_eq!(snapshot.metadata.variable_fingerprints.len(), 1);
    }

    #[test]
    fn test_export_to_json() {
        use tempfile::tempdir;

        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");

        descriptor().export_to_json(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("alphabet_fingerprint"));
        assert!(json.contains("open and on"));
    }
}
