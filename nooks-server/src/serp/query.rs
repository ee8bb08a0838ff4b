//! Validated search queries and their SerpAPI parameter encoding.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::AirportCode;

/// Query-string pairs, excluding the API key. Also used as the cache key.
pub type QueryParams = Vec<(&'static str, String)>;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Cabin class, encoded as SerpAPI's numeric `travel_class`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TravelClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl TravelClass {
    /// Parse the snake_case name used in requests.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "economy" => Some(TravelClass::Economy),
            "premium_economy" => Some(TravelClass::PremiumEconomy),
            "business" => Some(TravelClass::Business),
            "first" => Some(TravelClass::First),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            TravelClass::Economy => "1",
            TravelClass::PremiumEconomy => "2",
            TravelClass::Business => "3",
            TravelClass::First => "4",
        }
    }
}

/// One leg of a multi-city trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiCityLeg {
    pub departure_id: AirportCode,
    pub arrival_id: AirportCode,
    pub date: NaiveDate,
}

/// Where and when to fly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlightRoute {
    /// One-way when `return_date` is `None`, otherwise round trip.
    Direct {
        departure_id: AirportCode,
        arrival_id: AirportCode,
        outbound_date: NaiveDate,
        return_date: Option<NaiveDate>,
    },
    MultiCity(Vec<MultiCityLeg>),
}

impl FlightRoute {
    /// SerpAPI's `type`: 1 round trip, 2 one way, 3 multi-city.
    fn trip_code(&self) -> &'static str {
        match self {
            FlightRoute::Direct {
                return_date: Some(_),
                ..
            } => "1",
            FlightRoute::Direct {
                return_date: None, ..
            } => "2",
            FlightRoute::MultiCity(_) => "3",
        }
    }
}

/// A Google Flights search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightQuery {
    pub route: FlightRoute,
    pub adults: u8,
    pub children: u8,
    pub travel_class: TravelClass,
    pub currency: String,

    /// Continuation from a previous result: return flights for a round
    /// trip, or the next leg of a multi-city trip.
    pub departure_token: Option<String>,
}

impl FlightQuery {
    pub fn params(&self) -> QueryParams {
        let mut params: QueryParams = vec![
            ("engine", "google_flights".to_string()),
            ("type", self.route.trip_code().to_string()),
        ];

        match &self.route {
            FlightRoute::Direct {
                departure_id,
                arrival_id,
                outbound_date,
                return_date,
            } => {
                params.push(("departure_id", departure_id.to_string()));
                params.push(("arrival_id", arrival_id.to_string()));
                params.push(("outbound_date", outbound_date.format(DATE_FORMAT).to_string()));
                if let Some(date) = return_date {
                    params.push(("return_date", date.format(DATE_FORMAT).to_string()));
                }
            }
            FlightRoute::MultiCity(legs) => {
                let legs: Vec<serde_json::Value> = legs
                    .iter()
                    .map(|leg| {
                        serde_json::json!({
                            "departure_id": leg.departure_id.as_str(),
                            "arrival_id": leg.arrival_id.as_str(),
                            "date": leg.date.format(DATE_FORMAT).to_string(),
                        })
                    })
                    .collect();
                params.push((
                    "multi_city_json",
                    serde_json::Value::Array(legs).to_string(),
                ));
            }
        }

        params.push(("adults", self.adults.to_string()));
        if self.children > 0 {
            params.push(("children", self.children.to_string()));
        }
        params.push(("travel_class", self.travel_class.code().to_string()));
        params.push(("currency", self.currency.clone()));
        params.push(("hl", "en".to_string()));

        if let Some(token) = &self.departure_token {
            params.push(("departure_token", token.clone()));
        }

        params
    }
}

/// Hotel result ordering, encoded as SerpAPI's `sort_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotelSort {
    LowestPrice,
    HighestRating,
    MostReviewed,
}

impl HotelSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lowest_price" => Some(HotelSort::LowestPrice),
            "highest_rating" => Some(HotelSort::HighestRating),
            "most_reviewed" => Some(HotelSort::MostReviewed),
            _ => None,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            HotelSort::LowestPrice => "3",
            HotelSort::HighestRating => "8",
            HotelSort::MostReviewed => "13",
        }
    }
}

/// Location and dates shared by hotel searches and detail lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stay {
    /// Free-text destination, e.g. "Paris" or "hotels near Shibuya".
    pub q: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u8,
    pub children: u8,
    pub currency: String,
}

impl Stay {
    /// Number of nights booked.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    fn push_params(&self, params: &mut QueryParams) {
        params.push(("q", self.q.clone()));
        params.push(("check_in_date", self.check_in.format(DATE_FORMAT).to_string()));
        params.push(("check_out_date", self.check_out.format(DATE_FORMAT).to_string()));
        params.push(("adults", self.adults.to_string()));
        if self.children > 0 {
            params.push(("children", self.children.to_string()));
        }
        params.push(("currency", self.currency.clone()));
        params.push(("hl", "en".to_string()));
    }
}

/// A Google Hotels search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelQuery {
    pub stay: Stay,
    pub sort_by: Option<HotelSort>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,

    /// Star classes to include (2-5).
    pub hotel_class: Vec<u8>,

    pub next_page_token: Option<String>,
}

impl HotelQuery {
    pub fn params(&self) -> QueryParams {
        let mut params: QueryParams = vec![("engine", "google_hotels".to_string())];
        self.stay.push_params(&mut params);

        if let Some(sort) = self.sort_by {
            params.push(("sort_by", sort.code().to_string()));
        }
        if let Some(min) = self.min_price {
            params.push(("min_price", min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("max_price", max.to_string()));
        }
        if !self.hotel_class.is_empty() {
            let classes: Vec<String> = self.hotel_class.iter().map(u8::to_string).collect();
            params.push(("hotel_class", classes.join(",")));
        }
        if let Some(token) = &self.next_page_token {
            params.push(("next_page_token", token.clone()));
        }

        params
    }
}

/// A Google Hotels property lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelDetailsQuery {
    pub stay: Stay,
    pub property_token: String,
}

impl HotelDetailsQuery {
    pub fn params(&self) -> QueryParams {
        let mut params: QueryParams = vec![("engine", "google_hotels".to_string())];
        self.stay.push_params(&mut params);
        params.push(("property_token", self.property_token.clone()));
        params
    }
}

impl fmt::Display for FlightRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightRoute::Direct {
                departure_id,
                arrival_id,
                ..
            } => write!(f, "{departure_id}-{arrival_id}"),
            FlightRoute::MultiCity(legs) => {
                let stops: Vec<String> = legs
                    .iter()
                    .map(|l| format!("{}-{}", l.departure_id, l.arrival_id))
                    .collect();
                f.write_str(&stops.join(","))
            }
        }
    }
}
