//! Canonical road classes.
//!
//! Every data source encodes functional class differently (numeric FHWA
//! codes, two-digit urban/rural codes, free text). All of them are folded
//! into the ordered [`RoadClass`] taxonomy defined here. Order is rendering
//! priority: a higher variant is drawn above a lower one and clamp rules
//! raise a class towards the top.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical road class, ordered from lowest to highest priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum RoadClass {
    /// Local street.
    #[serde(rename = "St")]
    Street,
    /// Primary street (major collector tier).
    #[serde(rename = "PS")]
    PrimaryStreet,
    /// Secondary primary street (minor collector tier).
    #[serde(rename = "PS2")]
    PrimaryStreet2,
    /// Minor highway (minor arterial).
    #[serde(rename = "mH")]
    MinorHighway,
    /// Major highway (principal arterial).
    #[serde(rename = "MH")]
    MajorHighway,
    /// Expressway: freeway/expressway codes that may map to MH or Fw.
    #[serde(rename = "Ew")]
    Expressway,
    /// Ramp.
    #[serde(rename = "Rmp")]
    Ramp,
    /// Freeway (interstate).
    #[serde(rename = "Fw")]
    Freeway,
}

impl RoadClass {
    /// All classes in ascending priority.
    pub const ALL: [RoadClass; 8] = [
        RoadClass::Street,
        RoadClass::PrimaryStreet,
        RoadClass::PrimaryStreet2,
        RoadClass::MinorHighway,
        RoadClass::MajorHighway,
        RoadClass::Expressway,
        RoadClass::Ramp,
        RoadClass::Freeway,
    ];

    /// The lowest-priority class (the one "hide streets" suppresses).
    pub const fn lowest() -> RoadClass {
        RoadClass::Street
    }

    /// Short editor abbreviation (`St`, `PS`, `mH`, ...).
    pub const fn abbrev(self) -> &'static str {
        match self {
            RoadClass::Street => "St",
            RoadClass::PrimaryStreet => "PS",
            RoadClass::PrimaryStreet2 => "PS2",
            RoadClass::MinorHighway => "mH",
            RoadClass::MajorHighway => "MH",
            RoadClass::Expressway => "Ew",
            RoadClass::Ramp => "Rmp",
            RoadClass::Freeway => "Fw",
        }
    }

    /// Position in the priority order, starting at 0 for [`RoadClass::Street`].
    pub fn priority(self) -> usize {
        self as usize
    }

    /// Drawing order used by the overlay (priority × 100).
    pub fn z_index(self) -> u32 {
        self.priority() as u32 * 100
    }

    /// Raise `self` to `floor` if it is lower priority.
    pub fn at_least(self, floor: RoadClass) -> RoadClass {
        self.max(floor)
    }

    /// Colour used when a region does not define one for this class.
    pub const fn default_color(self) -> &'static str {
        match self {
            RoadClass::Street => "#eeeeee",
            RoadClass::PrimaryStreet => "#cfae0e",
            RoadClass::PrimaryStreet2 => "#f3f300",
            RoadClass::MinorHighway => "#4ce600",
            RoadClass::MajorHighway => "#149ece",
            RoadClass::Expressway => "#4f33df",
            RoadClass::Ramp => "#999999",
            RoadClass::Freeway => "#ff00c5",
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// Error returned when parsing an unknown road class abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown road class '{0}'")]
pub struct ParseRoadClassError(pub String);

impl FromStr for RoadClass {
    type Err = ParseRoadClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoadClass::ALL
            .into_iter()
            .find(|class| class.abbrev() == s.trim())
            .ok_or_else(|| ParseRoadClassError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_rendering_priority() {
        assert!(RoadClass::Street < RoadClass::PrimaryStreet);
        assert!(RoadClass::MinorHighway < RoadClass::MajorHighway);
        assert!(RoadClass::Expressway < RoadClass::Ramp);
        assert!(RoadClass::Ramp < RoadClass::Freeway);

        let mut sorted = RoadClass::ALL;
        sorted.sort();
        assert_eq!(sorted, RoadClass::ALL);
    }

    #[test]
    fn test_lowest_is_street() {
        assert_eq!(RoadClass::lowest(), RoadClass::Street);
        assert_eq!(RoadClass::ALL.iter().min(), Some(&RoadClass::lowest()));
    }

    #[test]
    fn test_at_least_only_raises() {
        assert_eq!(
            RoadClass::Street.at_least(RoadClass::MinorHighway),
            RoadClass::MinorHighway
        );
        assert_eq!(
            RoadClass::Freeway.at_least(RoadClass::MinorHighway),
            RoadClass::Freeway
        );
    }

    #[test]
    fn test_z_index() {
        assert_eq!(RoadClass::Street.z_index(), 0);
        assert_eq!(RoadClass::Freeway.z_index(), 700);
    }

    #[test]
    fn test_abbrev_parse() {
        for class in RoadClass::ALL {
            assert_eq!(class.abbrev().parse::<RoadClass>(), Ok(class));
        }
        assert_eq!("mH".parse::<RoadClass>(), Ok(RoadClass::MinorHighway));
        assert_eq!("MH".parse::<RoadClass>(), Ok(RoadClass::MajorHighway));
        assert!("CH".parse::<RoadClass>().is_err());
    }

    #[test]
    fn test_serde_uses_abbreviation() {
        let json = serde_json::to_string(&RoadClass::MinorHighway).unwrap();
        assert_eq!(json, "\"mH\"");
        let back: RoadClass = serde_json::from_str("\"Rmp\"").unwrap();
        assert_eq!(back, RoadClass::Ramp);
    }
}
