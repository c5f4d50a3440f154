//! Thermostat case study
//!
//! A room temperature `T_r` driven by a heater switched through the `t.ON`
//! channel:
//!
//! - **on** (mode 0): heating toward `R · on_target`, time constant `R`
//! - **off** (mode 1): passive cooling toward 0, time constant `off_tau`
//!
//! `R` is the closed-room thermal resistance, fixed at model-definition time.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alphabet::EventAlphabet;
use crate::config::SulConfig;
use crate::error::Result;
use crate::flow::{FlowCondition, FlowLaw, ModeId};
use crate::noise::{DistributionId, NoiseCatalog, NoiseDistribution};
use crate::sul::{Collaborators, SulArgs, SulDescriptor};
use crate::variable::ObservableVariable;

/// Heater on
pub const ON_MODE: ModeId = ModeId(0);

/// Heater off
pub const OFF_MODE: ModeId = ModeId(1);

/// Label of the observed temperature
pub const TEMPERATURE_LABEL: &str = "T_r";

/// Process name
pub const PROCESS_NAME: &str = "thermostat";

/// Driver channel gating the temperature
pub const DRIVER_SIG: &str = "t.ON";

pub const DEFAULT_MODE: ModeId = OFF_MODE;

pub const DEFAULT_DISTRIBUTION: DistributionId = DistributionId(1);

/// Nominal (mean, standard deviation, samples) of a mode's behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NominalNoise {
    pub mean: f64,
    pub std_dev: f64,
    pub samples: usize,
}

/// Physical constants of the case study
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermostatParams {
    /// Closed-room thermal resistance `R`; also the on-mode time constant
    pub closed_r: f64,

    /// Off-mode nominal; `mean` is the cooling time constant
    pub off_nominal: NominalNoise,

    /// On-mode nominal; `mean` is the heating target factor
    pub on_nominal: NominalNoise,
}

impl Default for ThermostatParams {
    fn default() -> Self {
        Self {
            closed_r: 100.0,
            off_nominal: NominalNoise {
                mean: 100.0,
                std_dev: 1.0,
                samples: 200,
            },
            on_nominal: NominalNoise {
                mean: 0.7,
                std_dev: 0.01,
                samples: 200,
            },
        }
    }
}

impl ThermostatParams {
    /// Heating asymptote `R · on_target`
    pub fn on_asymptote(&self) -> f64 {
        self.closed_r * self.on_nominal.mean
    }

    /// Heating flow (mode 0)
    pub fn on_flow(&self) -> Result<FlowCondition> {
        Ok(FlowCondition::new(
            ON_MODE,
            FlowLaw::approach(self.on_asymptote(), self.closed_r)?,
        ))
    }

    /// Cooling flow (mode 1)
    pub fn off_flow(&self) -> Result<FlowCondition> {
        Ok(FlowCondition::new(OFF_MODE, FlowLaw::decay(self.off_nominal.mean)?))
    }

    /// The temperature variable with both modes and an empty mode map
    pub fn temperature(&self) -> Result<ObservableVariable> {
        ObservableVariable::new(
            TEMPERATURE_LABEL,
            vec![self.on_flow()?, self.off_flow()?],
            Vec::new(),
        )
    }
}

/// Candidate noise hypotheses: ids 0..3 for heating, 4..7 for cooling
pub fn noise_catalog() -> Result<NoiseCatalog> {
    const ON_MEANS: [f64; 4] = [0.9, 0.7, 0.5, 0.3];
    const OFF_MEANS: [f64; 4] = [120.0, 100.0, 80.0, 60.0];

    let mut catalog = NoiseCatalog::new();
    let mut next_id = 0;

    for mean in ON_MEANS {
        catalog.declare(ON_MODE, NoiseDistribution::new(DistributionId(next_id), mean, 0.01)?)?;
        next_id += 1;
    }
    for mean in OFF_MEANS {
        catalog.declare(OFF_MODE, NoiseDistribution::new(DistributionId(next_id), mean, 1.0)?)?;
        next_id += 1;
    }

    Ok(catalog)
}

/// Named arguments of the thermostat
pub fn sul_args() -> SulArgs {
    SulArgs {
        name: PROCESS_NAME.to_string(),
        driver: DRIVER_SIG.to_string(),
        default_mode: DEFAULT_MODE,
        default_distribution: DEFAULT_DISTRIBUTION,
    }
}

/// Assemble the thermostat system under learning
pub fn thermostat_sul(
    config: &SulConfig,
    params: &ThermostatParams,
    collaborators: Collaborators,
) -> Result<SulDescriptor> {
    let alphabet = EventAlphabet::for_version(config.cs_version())?;
    let temperature = params.temperature()?;

    debug!(
        cs_version = config.cs_version(),
        symbols = ?alphabet.tags(),
        "Thermostat model declared"
    );

    SulDescriptor::new(vec![temperature], alphabet, collaborators, sul_args())?
        .with_candidates(noise_catalog()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let params = ThermostatParams::default();

        assert_eq!(params.on_asymptote(), 70.0);
        assert_eq!(params.on_flow().unwrap().law.tau(), 100.0);
        assert_eq!(params.off_flow().unwrap().law.tau(), 100.0);
    }

    #[test]
    fn test_temperature_modes() {
        let var = ThermostatParams::default().temperature().unwrap();

        assert_eq!(var.label(), TEMPERATURE_LABEL);
        assert_eq!(var.modes(), vec![ON_MODE, OFF_MODE]);
        assert!(var.distributions().is_empty());
    }

    #[test]
    fn test_catalog_layout() {
        let catalog = noise_catalog().unwrap();

        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.for_mode(ON_MODE).count(), 4);
        assert_eq!(catalog.for_mode(OFF_MODE).count(), 4);
        assert_eq!(catalog.get(DistributionId(4)).unwrap().distribution.mean, 120.0);
        assert_eq!(catalog.get(DistributionId(3)).unwrap().owner, ON_MODE);
    }

    #[test]
    fn test_invalid_resistance() {
        let params = ThermostatParams {
            closed_r: 0.0,
            ..ThermostatParams::default()
        };
        assert!(params.temperature().is_err());
    }
}
