//! Thermostat model properties
//!
//! Alphabet layouts per version, flow-condition limits, empty initial mode
//! maps and deterministic assembly.

use std::path::Path;
use thermostat_sha::*;

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

fn collaborators() -> Collaborators {
    Collaborators::new(Inert, Inert, Inert, Inert)
}

fn assemble(version: u32) -> SulDescriptor {
    thermostat_sul(
        &SulConfig::new(version),
        &ThermostatParams::default(),
        collaborators(),
    )
    .unwrap()
}

fn secs(values: &[f64]) -> Vec<Timestamp> {
    values.iter().copied().map(Timestamp::from_secs).collect()
}

#[test]
fn test_version_one_alphabet() {
    let sul = assemble(1);
    let alphabet = sul.alphabet();

    assert_eq!(alphabet.len(), 2);
    assert_eq!(alphabet.tags(), vec!["h_0", "c_0"]);
    assert!(alphabet.events().iter().all(|e| e.guard().is_empty()));
    assert_eq!(alphabet.events()[0].action(), ControlAction::On);
    assert_eq!(alphabet.events()[1].action(), ControlAction::Off);
}

#[test]
fn test_version_two_alphabet() {
    let alphabet = assemble(2).alphabet().clone();

    assert_eq!(alphabet.tags(), vec!["h_0", "c_0", "h_1", "c_1"]);
    assert_eq!(alphabet.get("h_0").unwrap().guard(), "!open");
    assert_eq!(alphabet.get("c_1").unwrap().guard(), "open");
}

#[test]
fn test_door_guarded_versions_share_layout() {
    let reference = EventAlphabet::for_version(2).unwrap();
    for version in [4, 5, 6, 7] {
        assert_eq!(EventAlphabet::for_version(version).unwrap(), reference);
    }
}

#[test]
fn test_extended_versions_alphabet() {
    let v2 = EventAlphabet::for_version(2).unwrap();

    for version in [8, 9, 10] {
        let alphabet = EventAlphabet::for_version(version).unwrap();

        assert_eq!(alphabet.len(), 6);
        assert_eq!(alphabet.tags(), vec!["h_0", "c_0", "h_1", "c_1", "h_2", "c_2"]);
        assert_eq!(&alphabet.events()[..4], v2.events());
        assert_eq!(alphabet.get("h_2").unwrap().guard(), "open2");
    }
}

#[test]
fn test_unmatched_version_rejected() {
    let result = thermostat_sul(&SulConfig::new(11), &ThermostatParams::default(), collaborators());
    assert!(matches!(result, Err(Error::UnsupportedVersion(11))));

    let result = thermostat_sul(&SulConfig::new(0), &ThermostatParams::default(), collaborators());
    assert!(matches!(result, Err(Error::UnsupportedVersion(0))));
}

#[test]
fn test_off_dynamics_limits() {
    let off = ThermostatParams::default().off_flow().unwrap();

    let out = off.evaluate(&secs(&[0.0, 1e6]), 100.0);
    assert_eq!(out[0], 100.0);
    assert!(out[1].abs() < 1e-9);
}

#[test]
fn test_on_dynamics_limits() {
    let on = ThermostatParams::default().on_flow().unwrap();

    let out = on.evaluate(&secs(&[0.0, 1e6]), 0.7);
    assert!((out[0] - 0.7).abs() < 1e-12);
    assert!((out[1] - 70.0).abs() < 1e-9);
}

#[test]
fn test_single_timestamp_returns_initial_value() {
    let params = ThermostatParams::default();

    for flow in [params.on_flow().unwrap(), params.off_flow().unwrap()] {
        let out = flow.evaluate(&secs(&[42.0]), 21.5);
        assert_eq!(out, vec![21.5]);
    }
}

#[test]
fn test_mode_map_starts_empty() {
    let sul = assemble(8);
    let var = sul.var("T_r").unwrap();

    assert_eq!(sul.candidates().len(), 8);
    assert!(var.mode_map().is_unassigned());
    assert!(var.mode_map().distributions(ON_MODE).unwrap().is_empty());
    assert!(var.mode_map().distributions(OFF_MODE).unwrap().is_empty());
}

#[test]
fn test_variable_binding() {
    let sul = assemble(1);
    let var = &sul.vars()[0];

    assert_eq!(sul.vars().len(), 1);
    assert_eq!(var.modes(), vec![ON_MODE, OFF_MODE]);
    assert!(var.distributions().is_empty());
}

#[test]
fn test_sul_args() {
    let sul = assemble(2);
    let args = sul.args();

    assert_eq!(args.name, "thermostat");
    assert_eq!(args.driver, "t.ON");
    assert_eq!(args.default_mode, OFF_MODE);
    assert_eq!(args.default_distribution, DistributionId(1));
}

#[test]
fn test_assembly_is_deterministic() {
    let a = assemble(9);
    let b = assemble(9);

    assert_eq!(a.alphabet(), b.alphabet());
    assert_eq!(a.vars(), b.vars());
    assert_eq!(a.alphabet().fingerprint().unwrap(), b.alphabet().fingerprint().unwrap());
    assert_eq!(
        a.vars()[0].fingerprint().unwrap(),
        b.vars()[0].fingerprint().unwrap()
    );
}

#[test]
fn test_config_drives_assembly() {
    let config = SulConfig::from_ini_str("[SUL CONFIGURATION]\nCS_VERSION = 10\n").unwrap();
    let sul = thermostat_sul(&config, &ThermostatParams::default(), collaborators()).unwrap();

    assert_eq!(sul.alphabet().len(), 6);
}
