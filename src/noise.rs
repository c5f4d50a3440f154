//! Noise catalog - labelled Gaussian hypotheses per mode
//!
//! The catalog lists the candidate noise distributions the learning engine may
//! associate with a mode. Declaring a distribution here does not associate it
//! with anything: the mode→distribution map starts empty and only hypothesis
//! testing fills it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::flow::ModeId;

/// Identifier of a noise distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributionId(pub u32);

impl fmt::Display for DistributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D_{}", self.0)
    }
}

/// Gaussian (mean, standard deviation, sample count)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseDistribution {
    pub id: DistributionId,
    pub mean: f64,
    pub std_dev: f64,

    /// Observations backing the estimate (0 for a declared hypothesis)
    pub samples: usize,
}

impl NoiseDistribution {
    /// Declared hypothesis, not yet backed by observations
    pub fn new(id: DistributionId, mean: f64, std_dev: f64) -> Result<Self> {
        Self::with_samples(id, mean, std_dev, 0)
    }

    pub fn with_samples(
        id: DistributionId,
        mean: f64,
        std_dev: f64,
        samples: usize,
    ) -> Result<Self> {
        if !mean.is_finite() {
            return Err(Error::ModelConstruction(format!(
                "{}: mean must be finite, got {}",
                id, mean
            )));
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(Error::ModelConstruction(format!(
                "{}: standard deviation must be finite and non-negative, got {}",
                id, std_dev
            )));
        }

        Ok(Self {
            id,
            mean,
            std_dev,
            samples,
        })
    }
}

/// Catalog entry: a distribution and the mode it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub owner: ModeId,
    pub distribution: NoiseDistribution,
}

/// Ordered catalog of candidate noise distributions with unique ids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoiseCatalog {
    entries: Vec<CatalogEntry>,
}

impl NoiseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a distribution for `owner`
    ///
    /// Fails if the id is already declared.
    pub fn declare(&mut self, owner: ModeId, distribution: NoiseDistribution) -> Result<()> {
        if self.get(distribution.id).is_some() {
            return Err(Error::DuplicateDistribution(distribution.id));
        }
        self.entries.push(CatalogEntry {
            owner,
            distribution,
        });
        Ok(())
    }

    pub fn get(&self, id: DistributionId) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.distribution.id == id)
    }

    /// Distributions owned by `mode`, in declaration order
    pub fn for_mode(&self, mode: ModeId) -> impl Iterator<Item = &NoiseDistribution> {
        self.entries
            .iter()
            .filter(move |e| e.owner == mode)
            .map(|e| &e.distribution)
    }

    /// Set of modes owning at least one distribution
    pub fn owners(&self) -> HashSet<ModeId> {
        self.entries.iter().map(|e| e.owner).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
