//! Data transfer objects for web requests and responses.
//!
//! Request types deserialize permissively and are then checked with
//! `Validator`, turning into the validated query types the clients accept.
//! Response types are the narrow envelopes returned to the frontend.

use serde::{Deserialize, Serialize};

use crate::domain::{
    ClosedOnArrival, Itinerary, RideId, TravelMode, TravelOptions, format_duration,
};
use crate::expense::{TravelStyle, Trip};
use crate::serp::{
    FlightGroup, FlightLeg, FlightQuery, FlightRoute, FlightsResponse, HotelDetailsQuery,
    HotelDetailsResponse, HotelProperty, HotelQuery, HotelSort, HotelsResponse, Layover,
    MultiCityLeg, PriceInsights, Rate, Stay, TravelClass,
};

use super::validate::{ValidationErrors, Validator};

const MAX_ADULTS: u32 = 9;
const MAX_CHILDREN: u32 = 8;
const MIN_MULTI_CITY_LEGS: usize = 2;
const MAX_MULTI_CITY_LEGS: usize = 5;
const MAX_TRAVELERS: u32 = 20;

// ============================================================================
// Flights
// ============================================================================

/// Which flight endpoint a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightSearchKind {
    /// First page of a search.
    Initial,
    /// Return flights for a chosen outbound flight.
    Return,
    /// Next leg of a multi-city trip.
    NextSegment,
}

/// Request body shared by the three flight endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FlightSearchRequest {
    /// "round_trip", "one_way" or "multi_city". Inferred when absent.
    pub trip_type: Option<String>,

    pub departure_id: Option<String>,
    pub arrival_id: Option<String>,

    /// "YYYY-MM-DD"
    pub outbound_date: Option<String>,

    /// "YYYY-MM-DD"
    pub return_date: Option<String>,

    #[serde(default)]
    pub multi_city: Vec<MultiCityLegRequest>,

    pub adults: Option<u32>,
    pub children: Option<u32>,

    /// "economy", "premium_economy", "business" or "first"
    pub travel_class: Option<String>,

    pub currency: Option<String>,

    pub departure_token: Option<String>,
}

/// One leg of a multi-city request.
#[derive(Debug, Clone, Deserialize)]
pub struct MultiCityLegRequest {
    pub departure_id: String,
    pub arrival_id: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TripType {
    RoundTrip,
    OneWay,
    MultiCity,
}

impl FlightSearchRequest {
    /// Validate into a search query for the given endpoint.
    pub fn validate(&self, kind: FlightSearchKind) -> Result<FlightQuery, ValidationErrors> {
        let mut v = Validator::new();

        let trip = match self.trip_type.as_deref() {
            Some("round_trip") => Some(TripType::RoundTrip),
            Some("one_way") => Some(TripType::OneWay),
            Some("multi_city") => Some(TripType::MultiCity),
            Some(_) => {
                v.error("trip_type", "must be round_trip, one_way or multi_city");
                None
            }
            None if !self.multi_city.is_empty() => Some(TripType::MultiCity),
            None if self.return_date.is_some() => Some(TripType::RoundTrip),
            None => Some(TripType::OneWay),
        };

        match (kind, trip) {
            (FlightSearchKind::Return, Some(t)) if t != TripType::RoundTrip => {
                v.error("trip_type", "return flights need a round trip");
            }
            (FlightSearchKind::NextSegment, Some(t)) if t != TripType::MultiCity => {
                v.error("trip_type", "next segment needs a multi-city trip");
            }
            _ => {}
        }

        let departure_token = match kind {
            FlightSearchKind::Initial => self
                .departure_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            FlightSearchKind::Return | FlightSearchKind::NextSegment => v
                .required("departure_token", self.departure_token.as_deref())
                .and_then(|t| v.non_empty("departure_token", t)),
        };

        let route = match trip {
            Some(TripType::MultiCity) => self.multi_city_route(&mut v),
            Some(t) => self.direct_route(&mut v, t == TripType::RoundTrip),
            None => None,
        };

        let adults = v.count("adults", self.adults, 1, 1, MAX_ADULTS);
        let children = v.count("children", self.children, 0, 0, MAX_CHILDREN);

        let travel_class = match self.travel_class.as_deref() {
            None => Some(TravelClass::default()),
            Some(s) => {
                let class = TravelClass::parse(s);
                if class.is_none() {
                    v.error(
                        "travel_class",
                        "must be economy, premium_economy, business or first",
                    );
                }
                class
            }
        };

        let currency = v.currency("currency", self.currency.as_deref());

        match (route, adults, children, travel_class, currency) {
            (Some(route), Some(adults), Some(children), Some(travel_class), Some(currency))
                if v.is_ok() =>
            {
                Ok(FlightQuery {
                    route,
                    adults: adults as u8,
                    children: children as u8,
                    travel_class,
                    currency,
                    departure_token,
                })
            }
            _ => Err(v.into_errors()),
        }
    }

    fn direct_route(&self, v: &mut Validator, round_trip: bool) -> Option<FlightRoute> {
        let departure_id = v
            .required("departure_id", self.departure_id.as_deref())
            .and_then(|s| v.airport("departure_id", s));
        let arrival_id = v
            .required("arrival_id", self.arrival_id.as_deref())
            .and_then(|s| v.airport("arrival_id", s));
        let outbound_date = v
            .required("outbound_date", self.outbound_date.as_deref())
            .and_then(|s| v.date("outbound_date", s));

        let return_date = if round_trip {
            v.required("return_date", self.return_date.as_deref())
                .and_then(|s| v.date("return_date", s))
        } else {
            if self.return_date.is_some() {
                v.error("return_date", "not allowed for a one-way trip");
            }
            None
        };
        v.ordered("return_date", outbound_date, return_date, false);

        if let (Some(d), Some(a)) = (departure_id, arrival_id) {
            if d == a {
                v.error("arrival_id", "must differ from departure_id");
            }
        }

        match (departure_id, arrival_id, outbound_date) {
            (Some(departure_id), Some(arrival_id), Some(outbound_date))
                if !round_trip || return_date.is_some() =>
            {
                Some(FlightRoute::Direct {
                    departure_id,
                    arrival_id,
                    outbound_date,
                    return_date,
                })
            }
            _ => None,
        }
    }

    fn multi_city_route(&self, v: &mut Validator) -> Option<FlightRoute> {
        let count = self.multi_city.len();
        if !(MIN_MULTI_CITY_LEGS..=MAX_MULTI_CITY_LEGS).contains(&count) {
            v.error(
                "multi_city",
                format!("must have between {MIN_MULTI_CITY_LEGS} and {MAX_MULTI_CITY_LEGS} legs"),
            );
            return None;
        }

        let mut legs = Vec::with_capacity(count);
        for (i, leg) in self.multi_city.iter().enumerate() {
            let departure_id =
                v.airport(&format!("multi_city[{i}].departure_id"), &leg.departure_id);
            let arrival_id = v.airport(&format!("multi_city[{i}].arrival_id"), &leg.arrival_id);
            let date = v.date(&format!("multi_city[{i}].date"), &leg.date);
            if let (Some(departure_id), Some(arrival_id), Some(date)) =
                (departure_id, arrival_id, date)
            {
                legs.push(MultiCityLeg {
                    departure_id,
                    arrival_id,
                    date,
                });
            }
        }

        for (i, pair) in legs.windows(2).enumerate() {
            v.ordered(
                &format!("multi_city[{}].date", i + 1),
                Some(pair[0].date),
                Some(pair[1].date),
                false,
            );
        }

        (legs.len() == count).then_some(FlightRoute::MultiCity(legs))
    }
}

/// Response for all flight endpoints.
#[derive(Debug, Serialize)]
pub struct FlightSearchResponse {
    /// Best flights first, then the rest, in upstream order.
    pub flights: Vec<FlightOffer>,

    pub price_insights: Option<PriceInsightsResult>,
}

/// One bookable flight option.
#[derive(Debug, Serialize)]
pub struct FlightOffer {
    pub price: Option<f64>,
    pub total_duration_mins: Option<u32>,

    /// e.g. "13h 55m"
    pub total_duration: Option<String>,

    pub segments: Vec<FlightSegmentResult>,
    pub layovers: Vec<LayoverResult>,
    pub airline_logo: Option<String>,

    /// Pass back to fetch return flights or the next leg.
    pub departure_token: Option<String>,
    pub booking_token: Option<String>,

    /// Whether the search engine ranked this among the best flights.
    pub best: bool,
}

/// A single flight.
#[derive(Debug, Serialize)]
pub struct FlightSegmentResult {
    pub airline: Option<String>,
    pub flight_number: Option<String>,
    pub travel_class: Option<String>,
    pub airplane: Option<String>,
    pub from: AirportResult,
    pub to: AirportResult,
    pub duration_mins: Option<u32>,
    pub duration: Option<String>,
    pub overnight: bool,
    pub often_delayed: bool,
}

/// An airport with the local time of departure or arrival.
#[derive(Debug, Serialize)]
pub struct AirportResult {
    pub code: String,
    pub name: Option<String>,
    pub time: Option<String>,
}

/// A connection between flights.
#[derive(Debug, Serialize)]
pub struct LayoverResult {
    pub airport_code: Option<String>,
    pub airport_name: Option<String>,
    pub duration_mins: Option<u32>,
    pub duration: Option<String>,
    pub overnight: bool,
}

#[derive(Debug, Serialize)]
pub struct PriceInsightsResult {
    pub lowest_price: Option<f64>,
    pub price_level: Option<String>,
    pub typical_price_range: Option<[f64; 2]>,
}

impl FlightSearchResponse {
    /// Reshape an upstream response.
    pub fn from_response(resp: &FlightsResponse) -> Self {
        let best = resp.best_flights.iter().map(|g| FlightOffer::from_group(g, true));
        let other = resp
            .other_flights
            .iter()
            .map(|g| FlightOffer::from_group(g, false));

        Self {
            flights: best.chain(other).collect(),
            price_insights: resp
                .price_insights
                .as_ref()
                .map(PriceInsightsResult::from_insights),
        }
    }
}

impl FlightOffer {
    pub fn from_group(group: &FlightGroup, best: bool) -> Self {
        Self {
            price: group.price,
            total_duration_mins: group.total_duration,
            total_duration: group.total_duration.map(|d| duration_text(d)),
            segments: group
                .flights
                .iter()
                .map(FlightSegmentResult::from_leg)
                .collect(),
            layovers: group
                .layovers
                .iter()
                .map(LayoverResult::from_layover)
                .collect(),
            airline_logo: group.airline_logo.clone(),
            departure_token: group.departure_token.clone(),
            booking_token: group.booking_token.clone(),
            best,
        }
    }
}

impl FlightSegmentResult {
    pub fn from_leg(leg: &FlightLeg) -> Self {
        Self {
            airline: leg.airline.clone(),
            flight_number: leg.flight_number.clone(),
            travel_class: leg.travel_class.clone(),
            airplane: leg.airplane.clone(),
            from: AirportResult {
                code: leg.departure_airport.id.clone(),
                name: leg.departure_airport.name.clone(),
                time: leg.departure_airport.time.clone(),
            },
            to: AirportResult {
                code: leg.arrival_airport.id.clone(),
                name: leg.arrival_airport.name.clone(),
                time: leg.arrival_airport.time.clone(),
            },
            duration_mins: leg.duration,
            duration: leg.duration.map(|d| duration_text(d)),
            overnight: leg.overnight,
            often_delayed: leg.often_delayed_by_over_30_min,
        }
    }
}

impl LayoverResult {
    pub fn from_layover(layover: &Layover) -> Self {
        Self {
            airport_code: layover.id.clone(),
            airport_name: layover.name.clone(),
            duration_mins: layover.duration,
            duration: layover.duration.map(|d| duration_text(d)),
            overnight: layover.overnight,
        }
    }
}

impl PriceInsightsResult {
    pub fn from_insights(insights: &PriceInsights) -> Self {
        Self {
            lowest_price: insights.lowest_price,
            price_level: insights.price_level.clone(),
            typical_price_range: insights.typical_price_range,
        }
    }
}

// ============================================================================
// Hotels
// ============================================================================

/// Request to search hotels.
#[derive(Debug, Default, Deserialize)]
pub struct HotelSearchRequest {
    /// Destination or free-text query
    pub q: String,

    /// "YYYY-MM-DD"
    pub check_in_date: String,

    /// "YYYY-MM-DD"
    pub check_out_date: String,

    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub currency: Option<String>,

    /// "lowest_price", "highest_rating" or "most_reviewed"
    pub sort_by: Option<String>,

    pub min_price: Option<u32>,
    pub max_price: Option<u32>,

    /// Star classes, 2-5
    #[serde(default)]
    pub hotel_class: Vec<u8>,

    pub next_page_token: Option<String>,
}

/// Request for one hotel's details.
#[derive(Debug, Default, Deserialize)]
pub struct HotelDetailsRequest {
    pub q: String,
    pub property_token: String,
    pub check_in_date: String,
    pub check_out_date: String,
    pub adults: Option<u32>,
    pub children: Option<u32>,
    pub currency: Option<String>,
}

/// Shared stay checks. Check-out must be strictly after check-in.
#[allow(clippy::too_many_arguments)]
fn validate_stay(
    v: &mut Validator,
    q: &str,
    check_in: &str,
    check_out: &str,
    adults: Option<u32>,
    children: Option<u32>,
    currency: Option<&str>,
) -> Option<Stay> {
    let q = v.non_empty("q", q);
    let check_in = v.date("check_in_date", check_in);
    let check_out = v.date("check_out_date", check_out);
    v.ordered("check_out_date", check_in, check_out, true);
    let adults = v.count("adults", adults, 2, 1, MAX_ADULTS);
    let children = v.count("children", children, 0, 0, MAX_CHILDREN);
    let currency = v.currency("currency", currency);

    Some(Stay {
        q: q?,
        check_in: check_in?,
        check_out: check_out?,
        adults: adults? as u8,
        children: children? as u8,
        currency: currency?,
    })
}

impl HotelSearchRequest {
    pub fn validate(&self) -> Result<HotelQuery, ValidationErrors> {
        let mut v = Validator::new();

        let stay = validate_stay(
            &mut v,
            &self.q,
            &self.check_in_date,
            &self.check_out_date,
            self.adults,
            self.children,
            self.currency.as_deref(),
        );

        let sort_by = match self.sort_by.as_deref() {
            None => None,
            Some(s) => {
                let sort = HotelSort::parse(s);
                if sort.is_none() {
                    v.error(
                        "sort_by",
                        "must be lowest_price, highest_rating or most_reviewed",
                    );
                }
                sort
            }
        };

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                v.error("max_price", "must not be below min_price");
            }
        }

        if self.hotel_class.iter().any(|c| !(2..=5).contains(c)) {
            v.error("hotel_class", "classes must be between 2 and 5");
        }

        match stay {
            Some(stay) if v.is_ok() => Ok(HotelQuery {
                stay,
                sort_by,
                min_price: self.min_price,
                max_price: self.max_price,
                hotel_class: self.hotel_class.clone(),
                next_page_token: self.next_page_token.clone(),
            }),
            _ => Err(v.into_errors()),
        }
    }
}

impl HotelDetailsRequest {
    pub fn validate(&self) -> Result<HotelDetailsQuery, ValidationErrors> {
        let mut v = Validator::new();

        let stay = validate_stay(
            &mut v,
            &self.q,
            &self.check_in_date,
            &self.check_out_date,
            self.adults,
            self.children,
            self.currency.as_deref(),
        );
        let property_token = v.non_empty("property_token", &self.property_token);

        match (stay, property_token) {
            (Some(stay), Some(property_token)) if v.is_ok() => Ok(HotelDetailsQuery {
                stay,
                property_token,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

/// Response for hotel search.
#[derive(Debug, Serialize)]
pub struct HotelSearchResponse {
    pub hotels: Vec<HotelResult>,

    /// Pass back to fetch the next page.
    pub next_page_token: Option<String>,
}

/// A hotel in search results.
#[derive(Debug, Serialize)]
pub struct HotelResult {
    pub name: String,
    pub property_token: Option<String>,
    pub property_type: Option<String>,
    pub rate_per_night: Option<f64>,
    pub rate_per_night_display: Option<String>,
    pub total_rate: Option<f64>,
    pub hotel_class: Option<u8>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub amenities: Vec<String>,
    pub thumbnail: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
}

fn extracted(rate: &Option<Rate>) -> Option<f64> {
    rate.as_ref().and_then(|r| r.extracted_lowest)
}

impl HotelSearchResponse {
    pub fn from_response(resp: &HotelsResponse) -> Self {
        Self {
            hotels: resp.properties.iter().map(HotelResult::from_property).collect(),
            next_page_token: resp
                .serpapi_pagination
                .as_ref()
                .and_then(|p| p.next_page_token.clone()),
        }
    }
}

impl HotelResult {
    pub fn from_property(p: &HotelProperty) -> Self {
        Self {
            name: p.name.clone(),
            property_token: p.property_token.clone(),
            property_type: p.property_type.clone(),
            rate_per_night: extracted(&p.rate_per_night),
            rate_per_night_display: p.rate_per_night.as_ref().and_then(|r| r.lowest.clone()),
            total_rate: extracted(&p.total_rate),
            hotel_class: p.extracted_hotel_class,
            rating: p.overall_rating,
            reviews: p.reviews,
            amenities: p.amenities.clone(),
            thumbnail: p.images.first().and_then(|i| i.thumbnail.clone()),
            latitude: p.gps_coordinates.map(|g| g.latitude),
            longitude: p.gps_coordinates.map(|g| g.longitude),
            check_in_time: p.check_in_time.clone(),
            check_out_time: p.check_out_time.clone(),
        }
    }
}

/// Response for hotel details.
#[derive(Debug, Serialize)]
pub struct HotelDetailsResult {
    pub name: Option<String>,
    pub property_token: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub rate_per_night: Option<f64>,
    pub total_rate: Option<f64>,
    pub hotel_class: Option<u8>,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub prices: Vec<SourcePriceResult>,
}

/// One booking site's offer.
#[derive(Debug, Serialize)]
pub struct SourcePriceResult {
    pub source: Option<String>,
    pub link: Option<String>,
    pub rate_per_night: Option<f64>,
    pub total_rate: Option<f64>,
}

impl HotelDetailsResult {
    pub fn from_response(resp: &HotelDetailsResponse, property_token: &str) -> Self {
        Self {
            name: resp.name.clone(),
            property_token: property_token.to_string(),
            address: resp.address.clone(),
            phone: resp.phone.clone(),
            link: resp.link.clone(),
            description: resp.description.clone(),
            rate_per_night: extracted(&resp.rate_per_night),
            total_rate: extracted(&resp.total_rate),
            hotel_class: resp.extracted_hotel_class,
            rating: resp.overall_rating,
            reviews: resp.reviews,
            amenities: resp.amenities.clone(),
            images: resp
                .images
                .iter()
                .filter_map(|i| i.original_image.clone().or_else(|| i.thumbnail.clone()))
                .collect(),
            latitude: resp.gps_coordinates.map(|g| g.latitude),
            longitude: resp.gps_coordinates.map(|g| g.longitude),
            check_in_time: resp.check_in_time.clone(),
            check_out_time: resp.check_out_time.clone(),
            prices: resp
                .prices
                .iter()
                .map(|p| SourcePriceResult {
                    source: p.source.clone(),
                    link: p.link.clone(),
                    rate_per_night: extracted(&p.rate_per_night),
                    total_rate: extracted(&p.total_rate),
                })
                .collect(),
        }
    }
}

// ============================================================================
// Expense analysis
// ============================================================================

/// Request to estimate a trip's expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseAnalysisRequest {
    pub destination: String,
    pub origin: Option<String>,
    pub departure_date: String,
    pub return_date: String,
    pub travelers: Option<u32>,
    pub currency: Option<String>,

    /// "budget", "moderate" or "luxury"
    pub travel_style: Option<String>,

    #[serde(default)]
    pub interests: Vec<String>,

    /// Total fare of the chosen flights, all travellers.
    pub flight_price: Option<f64>,

    pub hotel: Option<HotelChoice>,
}

/// The hotel the traveller picked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelChoice {
    pub name: Option<String>,
    pub rate_per_night: Option<f64>,

    /// Used to look up the rate when `rate_per_night` is absent.
    pub property_token: Option<String>,
}

/// A validated expense request.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpensePlan {
    pub trip: Trip,

    /// Set when the nightly rate must be fetched first.
    pub rate_lookup_token: Option<String>,
}

impl ExpenseAnalysisRequest {
    pub fn validate(&self) -> Result<ExpensePlan, ValidationErrors> {
        let mut v = Validator::new();

        let destination = v.non_empty("destination", &self.destination);
        let departure_date = v.date("departure_date", &self.departure_date);
        let return_date = v.date("return_date", &self.return_date);
        v.ordered("return_date", departure_date, return_date, false);
        let travelers = v.count("travelers", self.travelers, 1, 1, MAX_TRAVELERS);
        let currency = v.currency("currency", self.currency.as_deref());

        let style = match self.travel_style.as_deref() {
            None => Some(TravelStyle::default()),
            Some(s) => {
                let style = TravelStyle::parse(s);
                if style.is_none() {
                    v.error("travel_style", "must be budget, moderate or luxury");
                }
                style
            }
        };

        let flight_price = v.amount("flight_price", self.flight_price);
        let hotel = self.hotel.clone().unwrap_or_default();
        let hotel_rate = v.amount("hotel.rate_per_night", hotel.rate_per_night);

        let rate_lookup_token = match (hotel_rate, hotel.property_token) {
            (Some(None), Some(token)) if !token.trim().is_empty() => Some(token),
            _ => None,
        };

        match (
            destination,
            departure_date,
            return_date,
            travelers,
            currency,
            style,
            flight_price,
            hotel_rate,
        ) {
            (
                Some(destination),
                Some(departure_date),
                Some(return_date),
                Some(travelers),
                Some(currency),
                Some(style),
                Some(flight_price),
                Some(hotel_rate_per_night),
            ) if v.is_ok() => Ok(ExpensePlan {
                trip: Trip {
                    destination,
                    origin: self
                        .origin
                        .as_deref()
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string),
                    departure_date,
                    return_date,
                    travelers,
                    currency,
                    style,
                    interests: self
                        .interests
                        .iter()
                        .map(|i| i.trim().to_string())
                        .filter(|i| !i.is_empty())
                        .collect(),
                    flight_price,
                    hotel_name: hotel.name.filter(|n| !n.trim().is_empty()),
                    hotel_rate_per_night,
                },
                rate_lookup_token,
            }),
            _ => Err(v.into_errors()),
        }
    }
}

// ============================================================================
// Itinerary re-timing
// ============================================================================

/// Request to shift an itinerary after a travel time changed.
///
/// Give exactly one of `ride_id` / `start_index`, and exactly one of
/// `delta_minutes` / `mode_change` / `drop_dining`.
#[derive(Debug, Deserialize)]
pub struct RetimeRequest {
    pub itinerary: Itinerary,

    /// Day to adjust in a multi-day itinerary.
    pub day: Option<u32>,

    pub ride_id: Option<String>,
    pub start_index: Option<usize>,

    pub delta_minutes: Option<i32>,
    pub mode_change: Option<ModeChange>,

    /// Remove the dining stops of a `*_dining_*` ride and pull the rest of
    /// the day forward by their time.
    #[serde(default)]
    pub drop_dining: bool,
}

/// A ride switching travel mode.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeChange {
    pub from: TravelMode,
    pub to: TravelMode,
    pub travel_options: TravelOptions,
}

/// Where re-timing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetimeStart {
    Ride(String),
    Index(usize),
}

/// How far to shift.
#[derive(Debug, Clone)]
pub enum RetimeDelta {
    Fixed(i32),
    ModeChange(ModeChange),
    /// Drop the dining stops after the place at `after`.
    DropDining { after: usize },
}

impl RetimeRequest {
    pub fn validate(&self) -> Result<(RetimeStart, RetimeDelta), ValidationErrors> {
        let mut v = Validator::new();

        let start = match (&self.ride_id, self.start_index) {
            (Some(ride), None) => v.non_empty("ride_id", ride).map(RetimeStart::Ride),
            (None, Some(index)) => Some(RetimeStart::Index(index)),
            _ => {
                v.error("ride_id", "give exactly one of ride_id or start_index");
                None
            }
        };

        let delta = match (self.delta_minutes, &self.mode_change, self.drop_dining) {
            (Some(d), None, false) => Some(RetimeDelta::Fixed(d)),
            (None, Some(change), false) => {
                if self.ride_id.is_none() {
                    v.error("mode_change", "needs a ride_id");
                }
                Some(RetimeDelta::ModeChange(change.clone()))
            }
            (None, None, true) => match self.ride_id.as_deref().map(RideId::parse) {
                Some(RideId::DiningDetour { index }) => {
                    Some(RetimeDelta::DropDining { after: index })
                }
                _ => {
                    v.error("drop_dining", "needs a dining ride_id");
                    None
                }
            },
            _ => {
                v.error(
                    "delta_minutes",
                    "give exactly one of delta_minutes, mode_change or drop_dining",
                );
                None
            }
        };

        if let Itinerary::MultiDay(days) = &self.itinerary {
            match self.day {
                None => v.error("day", "is required for a multi-day itinerary"),
                Some(d) if !days.contains_key(&d) => {
                    v.error("day", format!("day {d} is not in the itinerary"))
                }
                Some(_) => {}
            }
        }

        match (start, delta) {
            (Some(start), Some(delta)) if v.is_ok() => Ok((start, delta)),
            _ => Err(v.into_errors()),
        }
    }
}

/// Response for re-timing.
#[derive(Debug, Serialize)]
pub struct RetimeResponse {
    pub itinerary: Itinerary,

    /// First schedule index that moved; `None` when nothing did.
    pub affected_index: Option<usize>,

    pub delta_minutes: i32,

    /// Entries of the adjusted day now arriving while their place is closed.
    pub closed_on_arrival: Vec<ClosedOnArrival>,
}

/// Render an upstream minute count, clamping counts past `i32::MAX`.
fn duration_text(minutes: u32) -> String {
    format_duration(i32::try_from(minutes).unwrap_or(i32::MAX))
}

// ============================================================================
// Saved searches and errors
// ============================================================================

/// A saved search. The feature was removed; the list is always empty.
#[derive(Debug, Serialize)]
pub struct SavedSearch {
    pub id: String,
    pub name: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<super::validate::FieldError>,
}
