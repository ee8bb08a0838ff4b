//! SerpAPI (Google Flights / Google Hotels) client.
//!
//! Key characteristics of SerpAPI:
//! - Every search is a GET to `/search.json` with an `engine` parameter
//! - Failed searches may still answer 200 with an `error` field
//! - Round-trip return flights and multi-city follow-up legs are fetched with
//!   the `departure_token` from a previous result

mod client;
mod error;
mod query;
mod types;

pub use client::{SerpClient, SerpConfig};
pub use error::SerpError;
pub use query::{
    FlightQuery, FlightRoute, HotelDetailsQuery, HotelQuery, HotelSort, MultiCityLeg,
    QueryParams, Stay, TravelClass,
};
pub use types::{
    AirportTime, FlightGroup, FlightLeg, FlightsResponse, GpsCoordinates, HotelDetailsResponse,
    HotelProperty, HotelsResponse, Image, Layover, Pagination, PriceInsights, Rate, SourcePrice,
};
