//! Event alphabet - versioned construction of the control-event set
//!
//! Each case-study version selects one alphabet layout. A layout is a list of
//! guard tiers; every tier contributes an `on` event tagged `h_<tier>` and an
//! `off` event tagged `c_<tier>`.
//!
//! ```text
//! version 1            → [unconditional]                     h_0 c_0
//! version 2,4,5,6,7    → [door closed, door open]            h_0 c_0 h_1 c_1
//! version 8,9,10       → [door closed, door open, second]    h_0 c_0 h_1 c_1 h_2 c_2
//! ```
//!
//! Version 3 declares the second-opening tier without any base tier and is a
//! configuration error. Any other version is unsupported.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};

/// Action carried by a control event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    /// Heater switched on
    On,
    /// Heater switched off
    Off,
}

impl ControlAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }

    /// Tag prefix used for symbols of this action (`h` heating, `c` cooling)
    pub fn tag_prefix(&self) -> &'static str {
        match self {
            Self::On => "h",
            Self::Off => "c",
        }
    }
}

impl FromStr for ControlAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(Error::InvalidEvent(format!("unknown action label '{}'", other))),
        }
    }
}

/// A discrete control event: guard, action and unique symbolic tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlEvent {
    guard: String,
    action: ControlAction,
    symbol: String,
}

impl ControlEvent {
    pub fn new(
        guard: impl Into<String>,
        action: ControlAction,
        symbol: impl Into<String>,
    ) -> Result<Self> {
        let guard = guard.into();
        let symbol = symbol.into();

        if symbol.is_empty() || symbol.chars().any(char::is_whitespace) {
            return Err(Error::InvalidEvent(format!(
                "symbol '{}' must be non-empty and contain no whitespace",
                symbol
            )));
        }
        if guard.trim() != guard {
            return Err(Error::InvalidEvent(format!(
                "guard '{}' has surrounding whitespace",
                guard
            )));
        }

        Ok(Self {
            guard,
            action,
            symbol,
        })
    }

    /// Guard condition; empty means unconditional
    pub fn guard(&self) -> &str {
        &self.guard
    }

    pub fn action(&self) -> ControlAction {
        self.action
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_unconditional(&self) -> bool {
        self.guard.is_empty()
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.guard.is_empty() {
            write!(f, "{}", self.action.label())
        } else {
            write!(f, "{} and {}", self.guard, self.action.label())
        }
    }
}

/// Ordered, duplicate-free event set; immutable once built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventAlphabet {
    events: Vec<ControlEvent>,
}

impl EventAlphabet {
    pub fn builder() -> EventAlphabetBuilder {
        EventAlphabetBuilder::default()
    }

    /// Alphabet for a case-study version
    pub fn for_version(version: u32) -> Result<Self> {
        AlphabetLayout::for_version(version)?.build()
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

    /// Look up an event by symbolic tag
    pub fn get(&self, symbol: &str) -> Option<&ControlEvent> {
        self.events.iter().find(|e| e.symbol == symbol)
    }

    pub fn tags(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.symbol.as_str()).collect()
    }

    /// Symbol table: tag → rendered event
    pub fn symbols(&self) -> BTreeMap<String, String> {
        self.events
            .iter()
            .map(|e| (e.symbol.clone(), e.to_string()))
            .collect()
    }

    /// SHA-256 of the canonical JSON form
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(format!("{:x}", Sha256::digest(&bytes)))
    }
}

/// Append-only construction of an [`EventAlphabet`]
#[derive(Debug, Default)]
pub struct EventAlphabetBuilder {
    events: Vec<ControlEvent>,
}

impl EventAlphabetBuilder {
    /// Append an event; its tag must not already be present
    pub fn push(&mut self, event: ControlEvent) -> Result<&mut Self> {
        if self.events.iter().any(|e| e.symbol == event.symbol) {
            return Err(Error::DuplicateSymbol(event.symbol));
        }
        self.events.push(event);
        Ok(self)
    }

    pub fn build(self) -> EventAlphabet {
        EventAlphabet {
            events: self.events,
        }
    }
}

/// Guard tier of the thermostat's door condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardTier {
    /// No door condition
    Unconditional,
    /// Door closed
    DoorClosed,
    /// Door open
    DoorOpen,
    /// Second opening
    SecondOpen,
}

impl GuardTier {
    /// Guard literal of this tier
    pub fn guard(&self) -> &'static str {
        match self {
            Self::Unconditional => "",
            Self::DoorClosed => "!open",
            Self::DoorOpen => "open",
            Self::SecondOpen => "open2",
        }
    }

    /// Tier index used in symbolic tags
    pub fn index(&self) -> usize {
        match self {
            Self::Unconditional | Self::DoorClosed => 0,
            Self::DoorOpen => 1,
            Self::SecondOpen => 2,
        }
    }

    /// `on`/`off` event pair of this tier
    pub fn events(&self) -> Result<[ControlEvent; 2]> {
        let tag = |action: ControlAction| format!("{}_{}", action.tag_prefix(), self.index());
        Ok([
            ControlEvent::new(self.guard(), ControlAction::On, tag(ControlAction::On))?,
            ControlEvent::new(self.guard(), ControlAction::Off, tag(ControlAction::Off))?,
        ])
    }
}

/// Alphabet variant selected by the case-study version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlphabetLayout {
    /// Version 1
    Unguarded,
    /// Versions 2, 4, 5, 6, 7
    DoorGuarded,
    /// Versions 8, 9, 10
    DoorGuardedWithSecondOpening,
}

impl AlphabetLayout {
    /// Map a version selector onto a layout, rejecting unknown versions
    pub fn for_version(version: u32) -> Result<Self> {
        match version {
            1 => Ok(Self::Unguarded),
            2 | 4 | 5 | 6 | 7 => Ok(Self::DoorGuarded),
            3 => Err(Error::Configuration(
                "version 3 declares only the second-opening tier (h_2, c_2); \
                 the base tier h_0/c_0 is missing"
                    .to_string(),
            )),
            8 | 9 | 10 => Ok(Self::DoorGuardedWithSecondOpening),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }

    /// Guard tiers in alphabet order
    pub fn tiers(&self) -> &'static [GuardTier] {
        match self {
            Self::Unguarded => &[GuardTier::Unconditional],
            Self::DoorGuarded => &[GuardTier::DoorClosed, GuardTier::DoorOpen],
            Self::DoorGuardedWithSecondOpening => &[
                GuardTier::DoorClosed,
                GuardTier::DoorOpen,
                GuardTier::SecondOpen,
            ],
        }
    }

    pub fn build(&self) -> Result<EventAlphabet> {
        let mut builder = EventAlphabet::builder();
        for tier in self.tiers() {
            for event in tier.events()? {
                builder.push(event)?;
            }
        }

        let alphabet = builder.build();
        debug!(layout = ?self, events = alphabet.len(), "Event alphabet built");
        Ok(alphabet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_versions() {
        assert_eq!(AlphabetLayout::for_version(1).unwrap(), AlphabetLayout::Unguarded);
        for v in [2, 4, 5, 6, 7] {
            assert_eq!(AlphabetLayout::for_version(v).unwrap(), AlphabetLayout::DoorGuarded);
        }
        for v in [8, 9, 10] {
            assert_eq!(
                AlphabetLayout::for_version(v).unwrap(),
                AlphabetLayout::DoorGuardedWithSecondOpening
            );
        }
    }

    #[test]
    fn test_unknown_version_fails_fast() {
        for v in [0, 11, 42] {
            assert!(matches!(
                EventAlphabet::for_version(v),
                Err(Error::UnsupportedVersion(x)) if x == v
            ));
        }
    }

    #[test]
    fn test_version_three_lacks_base_tier() {
        let err = EventAlphabet::for_version(3).unwrap_err();
        assert!(matches!(&err, Error::Configuration(msg) if msg.contains("h_0")));

        // The second-opening tier only appears stacked on the base tiers
        let v8 = EventAlphabet::for_version(8).unwrap();
        assert_eq!(v8.tags()[..2], ["h_0", "c_0"]);
        assert_eq!(v8.get("c_2").unwrap().guard(), "open2");
    }

    #[test]
    fn test_builder_rejects_duplicate_symbol() {
        let mut builder = EventAlphabet::builder();
        builder
            .push(ControlEvent::new("", ControlAction::On, "h_0").unwrap())
            .unwrap();

        let dup = ControlEvent::new("open", ControlAction::Off, "h_0").unwrap();
        assert!(matches!(builder.push(dup), Err(Error::DuplicateSymbol(_))));
    }

    #[test]
    fn test_malformed_event() {
        assert!(ControlEvent::new("", ControlAction::On, "").is_err());
        assert!(ControlEvent::new("", ControlAction::On, "h 0").is_err());
        assert!(ControlEvent::new(" open", ControlAction::On, "h_1").is_err());
        assert!("toggle".parse::<ControlAction>().is_err());
        assert_eq!("off".parse::<ControlAction>().unwrap(), ControlAction::Off);
    }

    #[test]
    fn test_symbols_table() {
        let symbols = EventAlphabet::for_version(2).unwrap().symbols();

        assert_eq!(symbols["h_0"], "!open and on");
        assert_eq!(symbols["c_1"], "open and off");
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = EventAlphabet::for_version(2).unwrap();
        let b = EventAlphabet::for_version(4).unwrap();
        let c = EventAlphabet::for_version(8).unwrap();

        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_ne!(a.fingerprint().unwrap(), c.fingerprint().unwrap());
    }
}
