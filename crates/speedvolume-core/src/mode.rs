//! Movement Modes
//!
//! Each mode defines the speed window (km/h) over which the volume scales
//! from the configured minimum to the configured maximum:
//!
//! | Mode    | Floor | Ceiling |
//! |---------|-------|---------|
//! | Car     | 5     | 120     |
//! | Bike    | 3     | 50      |
//! | Jogger  | 2     | 20      |
//! | Walking | 1     | 8       |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Speed window for a mode, in km/h
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedRange {
    /// Below this speed the volume stays at the floor
    pub min_kmh: f64,
    /// At or above this speed the volume saturates at the ceiling
    pub max_kmh: f64,
}

impl SpeedRange {
    /// Width of the window
    pub fn span(&self) -> f64 {
        self.max_kmh - self.min_kmh
    }
}

/// Movement profile selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Driving
    #[default]
    Car,
    /// Cycling
    Bike,
    /// Running
    Jogger,
    /// Walking
    Walking,
}

/// Resolve the speed window for a mode
pub const fn thresholds_for(mode: Mode) -> SpeedRange {
    match mode {
        Mode::Car => SpeedRange {
            min_kmh: 5.0,
            max_kmh: 120.0,
        },
        Mode::Bike => SpeedRange {
            min_kmh: 3.0,
            max_kmh: 50.0,
        },
        Mode::Jogger => SpeedRange {
            min_kmh: 2.0,
            max_kmh: 20.0,
        },
        Mode::Walking => SpeedRange {
            min_kmh: 1.0,
            max_kmh: 8.0,
        },
    }
}

impl Mode {
    /// All modes in selector order
    pub const ALL: [Mode; 4] = [Mode::Car, Mode::Bike, Mode::Jogger, Mode::Walking];

    /// Speed window for this mode
    pub const fn speed_range(self) -> SpeedRange {
        thresholds_for(self)
    }

    /// Mode at a selector position. Unknown positions fall back to Car.
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Selector position of this mode
    pub fn index(self) -> usize {
        match self {
            Mode::Car => 0,
            Mode::Bike => 1,
            Mode::Jogger => 2,
            Mode::Walking => 3,
        }
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Mode::Car => "Car",
            Mode::Bike => "Bike",
            Mode::Jogger => "Jogger",
            Mode::Walking => "Walking",
        }
    }

    /// Human readable description, e.g. `Car Mode: 5-120 km/h speed range`
    pub fn description(self) -> String {
        let range = self.speed_range();
        format!(
            "{} Mode: {}-{} km/h speed range",
            self.name(),
            range.min_kmh,
            range.max_kmh
        )
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "car" => Ok(Mode::Car),
            "bike" => Ok(Mode::Bike),
            "jogger" => Ok(Mode::Jogger),
            "walking" => Ok(Mode::Walking),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_mode_has_ordered_thresholds() {
        for mode in Mode::ALL {
            let range = mode.speed_range();
            assert!(
                range.min_kmh < range.max_kmh,
                "{} has min {} >= max {}",
                mode,
                range.min_kmh,
                range.max_kmh
            );
            assert!(range.span() > 0.0);
        }
    }

    #[test]
    fn test_thresholds_table() {
        assert_eq!(thresholds_for(Mode::Car), SpeedRange { min_kmh: 5.0, max_kmh: 120.0 });
        assert_eq!(thresholds_for(Mode::Bike), SpeedRange { min_kmh: 3.0, max_kmh: 50.0 });
        assert_eq!(thresholds_for(Mode::Jogger), SpeedRange { min_kmh: 2.0, max_kmh: 20.0 });
        assert_eq!(thresholds_for(Mode::Walking), SpeedRange { min_kmh: 1.0, max_kmh: 8.0 });
    }

    #[test]
    fn test_from_index_falls_back_to_car() {
        assert_eq!(Mode::from_index(0), Mode::Car);
        assert_eq!(Mode::from_index(3), Mode::Walking);
        assert_eq!(Mode::from_index(7), Mode::Car);
        for mode in Mode::ALL {
            assert_eq!(Mode::from_index(mode.index()), mode);
        }
    }

    #[test]
    fn test_description() {
        assert_eq!(Mode::Car.description(), "Car Mode: 5-120 km/h speed range");
        assert_eq!(Mode::Walking.description(), "Walking Mode: 1-8 km/h speed range");
    }

    #[test]
    fn test_parse() {
        assert_eq!("Bike".parse::<Mode>().unwrap(), Mode::Bike);
        assert_eq!(" jogger ".parse::<Mode>().unwrap(), Mode::Jogger);
        assert!(matches!(
            "boat".parse::<Mode>(),
            Err(ConfigError::UnknownMode(name)) if name == "boat"
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Walking).unwrap(), "\"walking\"");
        let mode: Mode = serde_json::from_str("\"bike\"").unwrap();
        assert_eq!(mode, Mode::Bike);
    }
}
