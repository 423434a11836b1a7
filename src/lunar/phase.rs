//! Moon phase calculator.
//!
//! The position in the synodic cycle is the time elapsed since a known new
//! moon (2000-01-06 18:14 UTC), reduced modulo the mean synodic month of
//! 2,551,443 seconds and expressed as a fraction in `[0, 1)`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Mean synodic month in seconds (about 29.53 days).
pub const SYNODIC_PERIOD_SECS: f64 = 2_551_443.0;

/// Reference new moon, 2000-01-06T18:14:00Z, as a Unix timestamp.
pub const REFERENCE_NEW_MOON_UNIX: i64 = 947_182_440;

// ---------------------------------------------------------------------------
// LunarPhase
// ---------------------------------------------------------------------------

/// One of the eight named phases of the moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LunarPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl LunarPhase {
    /// All phases in cycle order, starting at the new moon.
    pub const ALL: [LunarPhase; 8] = [
        LunarPhase::NewMoon,
        LunarPhase::WaxingCrescent,
        LunarPhase::FirstQuarter,
        LunarPhase::WaxingGibbous,
        LunarPhase::FullMoon,
        LunarPhase::WaningGibbous,
        LunarPhase::LastQuarter,
        LunarPhase::WaningCrescent,
    ];

    /// Classify a cycle position.
    ///
    /// Each band is inclusive at the lower bound and exclusive at the upper.
    /// The new moon wraps around both ends of the cycle: anything below 0.03
    /// or from 0.97 upwards.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction < 0.03 {
            LunarPhase::NewMoon
        } else if fraction < 0.22 {
            LunarPhase::WaxingCrescent
        } else if fraction < 0.28 {
            LunarPhase::FirstQuarter
        } else if fraction < 0.47 {
            LunarPhase::WaxingGibbous
        } else if fraction < 0.53 {
            LunarPhase::FullMoon
        } else if fraction < 0.72 {
            LunarPhase::WaningGibbous
        } else if fraction < 0.78 {
            LunarPhase::LastQuarter
        } else if fraction < 0.97 {
            LunarPhase::WaningCrescent
        } else {
            LunarPhase::NewMoon
        }
    }

    /// Human-readable name, e.g. `"Waxing Gibbous"`.
    pub fn name(&self) -> &'static str {
        match self {
            LunarPhase::NewMoon => "New Moon",
            LunarPhase::WaxingCrescent => "Waxing Crescent",
            LunarPhase::FirstQuarter => "First Quarter",
            LunarPhase::WaxingGibbous => "Waxing Gibbous",
            LunarPhase::FullMoon => "Full Moon",
            LunarPhase::WaningGibbous => "Waning Gibbous",
            LunarPhase::LastQuarter => "Last Quarter",
            LunarPhase::WaningCrescent => "Waning Crescent",
        }
    }
}

impl fmt::Display for LunarPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LunarPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LunarPhase::ALL
            .iter()
            .copied()
            .find(|phase| phase.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown lunar phase: {}", s))
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Position of `at` within the synodic cycle, in `[0, 1)`.
///
/// Instants before the reference new moon produce a negative elapsed time;
/// `rem_euclid` keeps the remainder non-negative for those.
pub fn phase_fraction(at: DateTime<Utc>) -> f64 {
    let elapsed_ms = at.timestamp_millis() - REFERENCE_NEW_MOON_UNIX * 1000;
    let elapsed_secs = elapsed_ms as f64 / 1000.0;
    let fraction = elapsed_secs.rem_euclid(SYNODIC_PERIOD_SECS) / SYNODIC_PERIOD_SECS;
    // rem_euclid can round up to the divisor for tiny negative inputs
    if fraction >= 1.0 {
        0.0
    } else {
        fraction
    }
}

/// The named phase of the moon at `at`.
pub fn moon_phase(at: DateTime<Utc>) -> LunarPhase {
    LunarPhase::from_fraction(phase_fraction(at))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
