//! Domain types for itineraries and travel search.
//!
//! Validated types (`ClockTime`, `AirportCode`) enforce their invariants at
//! construction. The fail-soft helpers in `time` and the itinerary
//! transformations never return errors; they log and fall back instead.

mod airport;
mod itinerary;
mod ride_id;
mod time;

pub use airport::{AirportCode, InvalidAirportCode};
pub use itinerary::{
    ClosedOnArrival, DailySchedule, DiningStop, Itinerary, Place, ScheduleItem, TravelMode,
    TravelOptions, TravelTimes, travel_mode_delta,
};
pub use ride_id::{RideId, extract_place_index};
pub use time::{
    ClockTime, MINUTES_PER_DAY, OpeningHours, TimeError, add_minutes_to_time, format_duration,
    is_open_at, minutes_to_time, time_difference, time_to_minutes,
};
