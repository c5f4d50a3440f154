//! Traces - time base, sampled signals and event words
//!
//! Two kinds of "trace" flow through a learning session:
//! - **Observed traces**: sampled signals loaded from files by the external parser
//! - **Event words** ([`Trace`]): sequences of alphabet events used as query prefixes
//!
//! Segments are the slices of an observed signal that the external engine
//! associates with one event word.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::alphabet::ControlEvent;

/// A point in time, stored as seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp {
    secs: f64,
}

impl Timestamp {
    /// Timestamp from raw seconds (simulation traces count from 0)
    pub fn from_secs(secs: f64) -> Self {
        Self { secs }
    }

    /// Timestamp from a wall-clock instant (seconds since the Unix epoch)
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        let secs = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) / 1e9;
        Self { secs }
    }

    /// Seconds represented by this timestamp
    pub fn to_secs(&self) -> f64 {
        self.secs
    }

    /// Seconds elapsed since `origin`
    pub fn elapsed_since(&self, origin: &Timestamp) -> f64 {
        self.secs - origin.secs
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.secs)
    }
}

/// One sample of a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl SignalPoint {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A labelled, time-ordered signal (e.g. `T_r` or the driver channel `t.ON`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledSignal {
    pub label: String,
    pub points: Vec<SignalPoint>,
}

impl SampledSignal {
    pub fn new(label: impl Into<String>, points: Vec<SignalPoint>) -> Self {
        Self {
            label: label.into(),
            points,
        }
    }

    /// Timestamps of all samples, in order
    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Values of all samples, in order
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// A trace as loaded from one file: a bundle of signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedTrace {
    /// File the trace was parsed from
    pub source: PathBuf,

    pub signals: Vec<SampledSignal>,
}

impl ObservedTrace {
    pub fn new(source: impl Into<PathBuf>, signals: Vec<SampledSignal>) -> Self {
        Self {
            source: source.into(),
            signals,
        }
    }

    /// Find a signal by label
    pub fn signal(&self, label: &str) -> Option<&SampledSignal> {
        self.signals.iter().find(|s| s.label == label)
    }
}

/// Slice of an observed signal explained by a single event word
pub type Segment = Vec<SignalPoint>;

/// An event word: the sequence of alphabet events observed so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    events: Vec<ControlEvent>,
}

impl Trace {
    /// The empty word
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(events: Vec<ControlEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[ControlEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Word extended by one event
    pub fn extended(&self, event: ControlEvent) -> Self {
        let mut events = self.events.clone();
        events.push(event);
        Self { events }
    }

    /// Whether `self` is a (non-strict) prefix of `other`
    pub fn is_prefix_of(&self, other: &Trace) -> bool {
        self.events.len() <= other.events.len()
            && self.events.iter().zip(&other.events).all(|(a, b)| a == b)
    }

    /// Symbolic tags of the word, e.g. `["h_0", "c_0"]`
    pub fn symbols(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.symbol()).collect()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.events.is_empty() {
            return write!(f, "ε");
        }
        write!(f, "{}", self.symbols().join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ControlAction;
    use chrono::TimeZone;

    fn on() -> ControlEvent {
        ControlEvent::new("", ControlAction::On, "h_0").unwrap()
    }

    fn off() -> ControlEvent {
        ControlEvent::new("", ControlAction::Off, "c_0").unwrap()
    }

    #[test]
    fn test_timestamp_from_datetime() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 10).unwrap();
        let origin = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let elapsed = Timestamp::from_datetime(at).elapsed_since(&Timestamp::from_datetime(origin));
        assert!((elapsed - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_prefix_relation() {
        let short = Trace::new(vec![on()]);
        let long = short.extended(off());

        assert!(Trace::empty().is_prefix_of(&short));
        assert!(short.is_prefix_of(&long));
        assert!(!long.is_prefix_of(&short));
        assert!(!Trace::new(vec![off()]).is_prefix_of(&long));
    }

    #[test]
    fn test_trace_display() {
        assert_eq!(Trace::empty().to_string(), "ε");
        assert_eq!(Trace::new(vec![on(), off()]).to_string(), "h_0c_0");
    }
}
