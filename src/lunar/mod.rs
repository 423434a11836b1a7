//! Lunar phase computation and the ritual table keyed by it.
//!
//! - [`phase`] - Maps a point in time onto one of the eight named phases
//! - [`ritual`] - Fixed advisory text per phase
//!
//! Nothing here holds state. The current time is read through a [`Clock`]
//! so the router can be driven at a fixed instant in tests.

pub mod phase;
pub mod ritual;

use chrono::{DateTime, Utc};

pub use phase::{moon_phase, phase_fraction, LunarPhase};
pub use ritual::{ritual_for, ritual_for_name, FALLBACK_RITUAL};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
