//! Sequence phases and the marker-driven transition function.
//!
//! Markers are matched on the parsed integer after `SEQ.`, so `SEQ.1:` and
//! `SEQ.11:` can never be confused.

use regex::Regex;
use std::sync::LazyLock;

static SEQ_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9A-Za-z_])SEQ\.(\d+):").expect("valid sequence marker regex")
});

/// One of the eleven burn-in test phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phase(u8);

impl Phase {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 11;

    pub fn new(number: u8) -> Option<Self> {
        (Self::FIRST..=Self::LAST)
            .contains(&number)
            .then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Namespace prefix for field keys extracted in this phase (`Seq3-`).
    pub fn key_prefix(self) -> String {
        format!("Seq{}-", self.0)
    }

    /// Phases 2 to 4 and 8 to 9 share one rule set each.
    pub fn rule_group(self) -> RuleGroup {
        match self.0 {
            1 => RuleGroup::TurnOn,
            2..=4 => RuleGroup::Ripple,
            5 => RuleGroup::Period,
            6 => RuleGroup::LoadOnly,
            7 => RuleGroup::Disable,
            8 | 9 => RuleGroup::Dynamic,
            10 => RuleGroup::Timing,
            _ => RuleGroup::Final,
        }
    }
}

/// Shared rule set selector; several phases map onto one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleGroup {
    TurnOn,
    Ripple,
    Period,
    LoadOnly,
    Disable,
    Dynamic,
    Timing,
    Final,
}

/// A recognized `SEQ.<n>:` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceMarker {
    pub phase: Phase,
    pub passed: bool,
}

/// Parses a sequence marker; `None` for other lines and out-of-range numbers.
pub fn parse_marker(line: &str) -> Option<SequenceMarker> {
    let caps = SEQ_MARKER.captures(line)?;
    let number: u8 = caps[1].parse().ok()?;
    let phase = Phase::new(number)?;
    Some(SequenceMarker {
        phase,
        passed: line.contains("PASS"),
    })
}

/// Scanner position inside one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// No marker seen since the unit started.
    #[default]
    Idle,
    Active(Phase),
}

impl ScanState {
    pub fn transition(self, marker: SequenceMarker) -> Self {
        Self::Active(marker.phase)
    }

    pub fn phase(self) -> Option<Phase> {
        match self {
            Self::Idle => None,
            Self::Active(phase) => Some(phase),
        }
    }
}
