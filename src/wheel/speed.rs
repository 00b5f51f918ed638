use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::random::UnitSource;

/// Physical constants for one spin speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Velocity (radians per frame) added on top of the rotation term
    pub initial_velocity_base: f64,
    /// Per-frame multiplicative velocity decay, strictly inside (0, 1)
    pub friction: f64,
    pub min_rotations: f64,
    pub max_rotations: f64,
}

const SLOW: SpeedProfile = SpeedProfile {
    initial_velocity_base: 0.25,
    friction: 0.96,
    min_rotations: 2.0,
    max_rotations: 3.0,
};

const MEDIUM: SpeedProfile = SpeedProfile {
    initial_velocity_base: 0.35,
    friction: 0.97,
    min_rotations: 3.0,
    max_rotations: 5.0,
};

const FAST: SpeedProfile = SpeedProfile {
    initial_velocity_base: 0.5,
    friction: 0.975,
    min_rotations: 4.0,
    max_rotations: 6.0,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpinSpeed {
    Slow,
    #[default]
    Medium,
    Fast,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown spin speed '{0}': expected slow, medium or fast")]
pub struct SpeedParseError(pub String);

impl SpinSpeed {
    pub fn all() -> &'static [SpinSpeed] {
        &[SpinSpeed::Slow, SpinSpeed::Medium, SpinSpeed::Fast]
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let current = all.iter().position(|s| s == self).unwrap_or(0);
        all[(current + 1) % all.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpinSpeed::Slow => "slow",
            SpinSpeed::Medium => "medium",
            SpinSpeed::Fast => "fast",
        }
    }

    pub fn profile(&self) -> &'static SpeedProfile {
        match self {
            SpinSpeed::Slow => &SLOW,
            SpinSpeed::Medium => &MEDIUM,
            SpinSpeed::Fast => &FAST,
        }
    }

    /// Draw a starting velocity for this speed.
    ///
    /// Blends a desired number of rotations (scaled by 0.1) with the profile's
    /// base velocity, so faster profiles both start quicker and travel further.
    pub fn initial_velocity(&self, rng: &mut impl UnitSource) -> f64 {
        let profile = self.profile();
        let rotations = profile.min_rotations
            + rng.next_unit() * (profile.max_rotations - profile.min_rotations);
        rotations * 0.1 + profile.initial_velocity_base
    }
}

impl fmt::Display for SpinSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SpinSpeed {
    type Err = SpeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow" => Ok(SpinSpeed::Slow),
            "medium" => Ok(SpinSpeed::Medium),
            "fast" => Ok(SpinSpeed::Fast),
            _ => Err(SpeedParseError(s.to_string())),
        }
    }
}
