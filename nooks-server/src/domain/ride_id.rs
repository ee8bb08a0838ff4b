//! Ride identifiers.
//!
//! The client names each travel segment with an underscore-joined key,
//! `<from>_<to>_<index>`, where `index` is the schedule position of the place
//! the segment arrives at. Return legs contain a `return` segment and dining
//! detours contain a `dining` segment. The format is informal, so parsing is
//! heuristic: anything we cannot classify is `Unrecognized`.

use std::fmt;

/// A classified ride key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideId {
    /// Travel into the place at `index`.
    Leg { index: usize },
    /// Detour to a dining stop after the place at `index`.
    DiningDetour { index: usize },
    /// Trip back to the starting point; affects no place.
    Return,
    Unrecognized,
}

impl RideId {
    /// Classify a ride key.
    ///
    /// ```
    /// use nooks_server::domain::RideId;
    ///
    /// assert_eq!(RideId::parse("start_Place1_0"), RideId::Leg { index: 0 });
    /// assert_eq!(RideId::parse("Place1_dining_2"), RideId::DiningDetour { index: 2 });
    /// assert_eq!(RideId::parse("A_return_B"), RideId::Return);
    /// assert_eq!(RideId::parse("A_B"), RideId::Unrecognized);
    /// ```
    pub fn parse(key: &str) -> Self {
        let segments: Vec<&str> = key.split('_').collect();

        if segments.iter().any(|s| s.eq_ignore_ascii_case("return")) {
            return RideId::Return;
        }

        // Need at least one name segment before the index
        if segments.len() < 2 {
            return RideId::Unrecognized;
        }

        let Some(index) = segments.last().and_then(|s| s.parse::<usize>().ok()) else {
            return RideId::Unrecognized;
        };

        let is_dining = segments[..segments.len() - 1]
            .iter()
            .any(|s| s.eq_ignore_ascii_case("dining"));

        if is_dining {
            RideId::DiningDetour { index }
        } else {
            RideId::Leg { index }
        }
    }

    /// The schedule position whose arrival this ride determines.
    ///
    /// A dining detour delays the place after the one it follows.
    pub fn affected_place_index(&self) -> Option<usize> {
        match *self {
            RideId::Leg { index } => Some(index),
            RideId::DiningDetour { index } => index.checked_add(1),
            RideId::Return | RideId::Unrecognized => None,
        }
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RideId::Leg { index } => write!(f, "leg to place {index}"),
            RideId::DiningDetour { index } => write!(f, "dining detour after place {index}"),
            RideId::Return => f.write_str("return leg"),
            RideId::Unrecognized => f.write_str("unrecognized ride"),
        }
    }
}

/// Index of the place whose arrival a ride affects.
///
/// Returns `None` for return legs and keys that do not parse.
pub fn extract_place_index(ride_id: &str) -> Option<usize> {
    RideId::parse(ride_id).affected_place_index()
}
