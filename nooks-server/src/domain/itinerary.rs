//! Itinerary model and re-timing.
//!
//! Itineraries are built by the client and sent back here whenever a travel
//! time changes. Re-timing is pure: it returns a new value and leaves every
//! entry before the changed index exactly as it was, including fields this
//! server does not know about.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use super::time::{add_minutes_to_time, is_open_at};

/// The place a schedule entry visits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,

    /// Free-form opening hours, e.g. "09:00-17:00".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,

    /// Anything else the client attached (address, rating, coordinates...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dining stop inserted after a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningStop {
    /// Minutes spent eating.
    pub dining_duration: u32,

    /// Extra travel minutes the detour adds.
    pub detour_time: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_stop_impact: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiningStop {
    /// Minutes this stop adds to the day. A precomputed impact wins.
    pub fn total_impact(&self) -> u32 {
        self.total_stop_impact
            .unwrap_or(self.dining_duration.saturating_add(self.detour_time))
    }
}

/// One visit in a day's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub place: Place,

    /// "HH:MM"
    pub arrival_time: String,

    /// "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,

    /// Minutes on site.
    pub visit_duration: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dining_stops: Option<Vec<DiningStop>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScheduleItem {
    /// A copy with arrival and departure moved by `delta` minutes.
    pub fn shifted(&self, delta: i32) -> Self {
        Self {
            arrival_time: add_minutes_to_time(&self.arrival_time, delta),
            departure_time: self
                .departure_time
                .as_deref()
                .map(|t| add_minutes_to_time(t, delta)),
            ..self.clone()
        }
    }

    /// Total minutes added by the dining stops after this visit.
    pub fn dining_minutes(&self) -> u32 {
        self.dining_stops
            .iter()
            .flatten()
            .map(DiningStop::total_impact)
            .fold(0, u32::saturating_add)
    }
}

/// A single day's ordered schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub schedule: Vec<ScheduleItem>,
}

impl DailySchedule {
    /// Shift every entry at or after `index` by `delta` minutes.
    ///
    /// Entries before `index` are cloned untouched. An index past the end
    /// changes nothing.
    pub fn retimed_from(&self, index: usize, delta: i32) -> Self {
        let schedule = self
            .schedule
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i >= index {
                    item.shifted(delta)
                } else {
                    item.clone()
                }
            })
            .collect();

        Self { schedule }
    }

    /// Remove the dining stops after the entry at `index` and pull every
    /// later entry forward by the time they took.
    ///
    /// Returns the new schedule and the (non-positive) shift applied, or
    /// `None` when there is no entry at `index`.
    pub fn without_dining_after(&self, index: usize) -> Option<(Self, i32)> {
        let saved = self.schedule.get(index)?.dining_minutes();
        let delta = -i32::try_from(saved).unwrap_or(i32::MAX);

        let mut retimed = self.retimed_from(index + 1, delta);
        if let Some(item) = retimed.schedule.get_mut(index) {
            item.dining_stops = None;
        }
        Some((retimed, delta))
    }

    /// Entries whose arrival falls outside their place's opening hours.
    ///
    /// Places without opening hours are never reported.
    pub fn closed_on_arrival(&self) -> Vec<ClosedOnArrival> {
        self.schedule
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let hours = item.place.opening_hours.as_deref()?;
                if is_open_at(hours, &item.arrival_time) {
                    return None;
                }
                Some(ClosedOnArrival {
                    index,
                    name: item.place.name.clone(),
                    arrival_time: item.arrival_time.clone(),
                    opening_hours: hours.to_string(),
                })
            })
            .collect()
    }
}

/// A schedule entry that arrives while its place is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedOnArrival {
    pub index: usize,
    pub name: String,
    pub arrival_time: String,
    pub opening_hours: String,
}

/// A single-day or multi-day itinerary.
///
/// On the wire this is either `{"schedule": [...]}` or
/// `{"days": {"1": {"schedule": [...]}, ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ItineraryRepr", into = "ItineraryRepr")]
pub enum Itinerary {
    SingleDay(DailySchedule),
    MultiDay(BTreeMap<u32, DailySchedule>),
}

#[derive(Serialize, Deserialize)]
struct ItineraryRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<ScheduleItem>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    days: Option<BTreeMap<u32, DailySchedule>>,
}

impl TryFrom<ItineraryRepr> for Itinerary {
    type Error = String;

    fn try_from(repr: ItineraryRepr) -> Result<Self, Self::Error> {
        match (repr.schedule, repr.days) {
            (Some(schedule), None) => Ok(Itinerary::SingleDay(DailySchedule { schedule })),
            (None, Some(days)) => Ok(Itinerary::MultiDay(days)),
            _ => Err("itinerary needs exactly one of `schedule` or `days`".to_string()),
        }
    }
}

impl From<Itinerary> for ItineraryRepr {
    fn from(itinerary: Itinerary) -> Self {
        match itinerary {
            Itinerary::SingleDay(day) => ItineraryRepr {
                schedule: Some(day.schedule),
                days: None,
            },
            Itinerary::MultiDay(days) => ItineraryRepr {
                schedule: None,
                days: Some(days),
            },
        }
    }
}

impl Itinerary {
    /// The schedule for `day`. Single-day itineraries ignore the day.
    pub fn schedule_for(&self, day: Option<u32>) -> Option<&DailySchedule> {
        match self {
            Itinerary::SingleDay(schedule) => Some(schedule),
            Itinerary::MultiDay(days) => day.and_then(|d| days.get(&d)),
        }
    }

    /// Shift entries at or after `index` by `delta` minutes.
    ///
    /// For multi-day itineraries only `day` is touched; an absent or unknown
    /// day returns the itinerary unchanged.
    pub fn retimed_from(&self, day: Option<u32>, index: usize, delta: i32) -> Self {
        match self {
            Itinerary::SingleDay(schedule) => {
                Itinerary::SingleDay(schedule.retimed_from(index, delta))
            }
            Itinerary::MultiDay(days) => {
                let Some(day) = day.filter(|d| days.contains_key(d)) else {
                    warn!(?day, "retime: no such day in itinerary, leaving unchanged");
                    return self.clone();
                };
                let days = days
                    .iter()
                    .map(|(&d, schedule)| {
                        let schedule = if d == day {
                            schedule.retimed_from(index, delta)
                        } else {
                            schedule.clone()
                        };
                        (d, schedule)
                    })
                    .collect();
                Itinerary::MultiDay(days)
            }
        }
    }

    /// Drop the dining stops after entry `index` of `day`.
    ///
    /// `None` when the day or entry does not exist.
    pub fn without_dining_after(&self, day: Option<u32>, index: usize) -> Option<(Self, i32)> {
        match self {
            Itinerary::SingleDay(schedule) => schedule
                .without_dining_after(index)
                .map(|(schedule, delta)| (Itinerary::SingleDay(schedule), delta)),
            Itinerary::MultiDay(days) => {
                let day = day?;
                let (schedule, delta) = days.get(&day)?.without_dining_after(index)?;
                let mut days = days.clone();
                days.insert(day, schedule);
                Some((Itinerary::MultiDay(days), delta))
            }
        }
    }
}

/// How a ride is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
}

/// Per-mode durations for one ride, in minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTimes {
    #[serde(default)]
    pub driving: Option<u32>,
    #[serde(default)]
    pub walking: Option<u32>,
}

impl TravelTimes {
    pub fn duration(&self, mode: TravelMode) -> Option<u32> {
        match mode {
            TravelMode::Driving => self.driving,
            TravelMode::Walking => self.walking,
        }
    }
}

/// Travel times keyed by ride id.
pub type TravelOptions = HashMap<String, TravelTimes>;

/// Minutes gained or lost by switching `ride_id` from one mode to another.
///
/// `None` when either duration is unknown or the difference does not fit in
/// an `i32`.
///
/// ```
/// use nooks_server::domain::{TravelMode, TravelOptions, TravelTimes, travel_mode_delta};
///
/// let mut options = TravelOptions::new();
/// options.insert(
///     "start_Museum_0".to_string(),
///     TravelTimes { driving: Some(10), walking: Some(35) },
/// );
/// let delta = travel_mode_delta(
///     &options,
///     "start_Museum_0",
///     TravelMode::Driving,
///     TravelMode::Walking,
/// );
/// assert_eq!(delta, Some(25));
/// ```
pub fn travel_mode_delta(
    options: &TravelOptions,
    ride_id: &str,
    from: TravelMode,
    to: TravelMode,
) -> Option<i32> {
    let times = options.get(ride_id)?;
    let before = times.duration(from)?;
    let after = times.duration(to)?;
    i32::try_from(after as i64 - before as i64).ok()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::time::{MINUTES_PER_DAY, time_to_minutes};
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u32..24, minute in 0u32..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    prop_compose! {
        fn schedule_item()(
            arrival in valid_time(),
            departure in proptest::option::of(valid_time()),
            visit in 0u32..240,
        ) -> ScheduleItem {
            ScheduleItem {
                place: Place { name: "P".to_string(), opening_hours: None, extra: Map::new() },
                arrival_time: arrival,
                departure_time: departure,
                visit_duration: visit,
                dining_stops: None,
                extra: Map::new(),
            }
        }
    }

    fn shifted_by(before: &str, after: &str, delta: i32) -> bool {
        (time_to_minutes(before) as i32 + delta).rem_euclid(MINUTES_PER_DAY)
            == time_to_minutes(after) as i32
    }

    proptest! {
        /// Entries before k are identical; entries from k move by exactly delta
        #[test]
        fn retime_preserves_prefix_and_shifts_suffix(
            items in proptest::collection::vec(schedule_item(), 0..12),
            k in 0usize..15,
            delta in -2000i32..2000,
        ) {
            let schedule = DailySchedule { schedule: items };
            let retimed = schedule.retimed_from(k, delta);

            prop_assert_eq!(retimed.schedule.len(), schedule.schedule.len());
            let pairs = schedule.schedule.iter().zip(&retimed.schedule);
            for (i, (before, after)) in pairs.enumerate() {
                if i < k {
                    prop_assert_eq!(before, after);
                } else {
                    prop_assert!(shifted_by(&before.arrival_time, &after.arrival_time, delta));
                    match (&before.departure_time, &after.departure_time) {
                        (Some(b), Some(a)) => prop_assert!(shifted_by(b, a, delta)),
                        (None, None) => {}
                        _ => prop_assert!(false, "departure presence changed"),
                    }
                    prop_assert_eq!(before.visit_duration, after.visit_duration);
                }
            }
        }
    }
}
