//! SerpAPI response DTOs.
//!
//! These map directly onto the Google Flights and Google Hotels engines'
//! JSON. SerpAPI omits fields freely, so nearly everything is optional.

use serde::Deserialize;

/// Response from `engine=google_flights`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightsResponse {
    #[serde(default)]
    pub best_flights: Vec<FlightGroup>,

    #[serde(default)]
    pub other_flights: Vec<FlightGroup>,

    pub price_insights: Option<PriceInsights>,

    /// Set when the search itself failed (SerpAPI still answers 200).
    pub error: Option<String>,
}

/// One bookable itinerary: a sequence of flights with layovers.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightGroup {
    #[serde(default)]
    pub flights: Vec<FlightLeg>,

    #[serde(default)]
    pub layovers: Vec<Layover>,

    /// Total duration in minutes.
    pub total_duration: Option<u32>,

    /// Price in the requested currency. Missing when unavailable.
    pub price: Option<f64>,

    /// e.g. "Round trip", "One way"
    #[serde(rename = "type")]
    pub trip_type: Option<String>,

    pub airline_logo: Option<String>,

    /// Continuation key for the return or next multi-city leg.
    pub departure_token: Option<String>,

    /// Key for fetching booking options.
    pub booking_token: Option<String>,
}

/// A single flight within a group.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightLeg {
    pub departure_airport: AirportTime,
    pub arrival_airport: AirportTime,

    /// Minutes.
    pub duration: Option<u32>,

    pub airplane: Option<String>,
    pub airline: Option<String>,
    pub airline_logo: Option<String>,
    pub travel_class: Option<String>,
    pub flight_number: Option<String>,
    pub legroom: Option<String>,

    #[serde(default)]
    pub overnight: bool,

    #[serde(default)]
    pub often_delayed_by_over_30_min: bool,
}

/// Airport and local time of a departure or arrival.
#[derive(Debug, Clone, Deserialize)]
pub struct AirportTime {
    pub name: Option<String>,

    /// IATA code.
    pub id: String,

    /// "YYYY-MM-DD HH:MM"
    pub time: Option<String>,
}

/// A connection between two flights.
#[derive(Debug, Clone, Deserialize)]
pub struct Layover {
    /// Minutes.
    pub duration: Option<u32>,
    pub name: Option<String>,
    pub id: Option<String>,

    #[serde(default)]
    pub overnight: bool,
}

/// Price context for the searched route.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceInsights {
    pub lowest_price: Option<f64>,

    /// "low", "typical" or "high"
    pub price_level: Option<String>,

    pub typical_price_range: Option<[f64; 2]>,
}

/// Response from `engine=google_hotels` without a property token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelsResponse {
    #[serde(default)]
    pub properties: Vec<HotelProperty>,

    pub serpapi_pagination: Option<Pagination>,

    pub error: Option<String>,
}

/// A hotel or vacation rental in search results.
#[derive(Debug, Clone, Deserialize)]
pub struct HotelProperty {
    pub name: String,

    /// "hotel" or "vacation rental"
    #[serde(rename = "type")]
    pub property_type: Option<String>,

    pub property_token: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub gps_coordinates: Option<GpsCoordinates>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub rate_per_night: Option<Rate>,
    pub total_rate: Option<Rate>,

    /// e.g. "4-star hotel"
    pub hotel_class: Option<String>,
    pub extracted_hotel_class: Option<u8>,

    pub overall_rating: Option<f64>,
    pub reviews: Option<u64>,

    #[serde(default)]
    pub amenities: Vec<String>,

    #[serde(default)]
    pub images: Vec<Image>,
}

/// A displayed price with its numeric extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct Rate {
    /// Display form, e.g. "$120"
    pub lowest: Option<String>,
    pub extracted_lowest: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub thumbnail: Option<String>,
    pub original_image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub next_page_token: Option<String>,
}

/// Response from `engine=google_hotels` with a property token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelDetailsResponse {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub gps_coordinates: Option<GpsCoordinates>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub rate_per_night: Option<Rate>,
    pub total_rate: Option<Rate>,
    pub hotel_class: Option<String>,
    pub extracted_hotel_class: Option<u8>,
    pub overall_rating: Option<f64>,
    pub reviews: Option<u64>,

    #[serde(default)]
    pub amenities: Vec<String>,

    #[serde(default)]
    pub images: Vec<Image>,

    /// Offers from individual booking sites.
    #[serde(default)]
    pub prices: Vec<SourcePrice>,

    pub error: Option<String>,
}

/// A booking site's offer for a property.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePrice {
    pub source: Option<String>,
    pub link: Option<String>,
    pub rate_per_night: Option<Rate>,
    pub total_rate: Option<Rate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_flights() {
        let json = r#"{
            "search_metadata": {"status": "Success"},
            "best_flights": [{
                "flights": [{
                    "departure_airport": {
                        "name": "Charles de Gaulle",
                        "id": "CDG",
                        "time": "2025-06-01 10:05"
                    },
                    "arrival_airport": {"name": "Haneda", "id": "HND", "time": "2025-06-02 06:00"},
                    "duration": 835,
                    "airline": "Air France",
                    "flight_number": "AF 272",
                    "travel_class": "Economy",
                    "overnight": true
                }],
                "total_duration": 835,
                "price": 1123,
                "type": "Round trip",
                "departure_token": "WyJDa"
            }],
            "price_insights": {
                "lowest_price": 980,
                "price_level": "typical",
                "typical_price_range": [900, 1400]
            }
        }"#;

        let resp: FlightsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.best_flights.len(), 1);
        assert!(resp.other_flights.is_empty());

        let group = &resp.best_flights[0];
        assert_eq!(group.price, Some(1123.0));
        assert_eq!(group.flights[0].departure_airport.id, "CDG");
        assert!(group.flights[0].overnight);
        assert!(!group.flights[0].often_delayed_by_over_30_min);
        assert_eq!(group.departure_token.as_deref(), Some("WyJDa"));

        let insights = resp.price_insights.unwrap();
        assert_eq!(insights.typical_price_range, Some([900.0, 1400.0]));
    }

    #[test]
    fn deserialize_error_response() {
        let resp: FlightsResponse =
            serde_json::from_str(r#"{"error": "Google Flights hasn't returned any results."}"#)
                .unwrap();
        assert!(resp.best_flights.is_empty());
        assert!(resp.error.is_some());
    }

    #[test]
    fn deserialize_hotels() {
        let json = r#"{
            "properties": [{
                "type": "hotel",
                "name": "Hotel Lumen",
                "property_token": "ChkI",
                "gps_coordinates": {"latitude": 48.85, "longitude": 2.35},
                "rate_per_night": {"lowest": "$150", "extracted_lowest": 150},
                "total_rate": {"lowest": "$450", "extracted_lowest": 450},
                "extracted_hotel_class": 4,
                "overall_rating": 4.4,
                "reviews": 1320,
                "amenities": ["Free Wi-Fi", "Bar"],
                "images": [{"thumbnail": "https://img/1.jpg"}]
            }],
            "serpapi_pagination": {"next_page_token": "CBI="}
        }"#;

        let resp: HotelsResponse = serde_json::from_str(json).unwrap();
        let hotel = &resp.properties[0];
        assert_eq!(hotel.name, "Hotel Lumen");
        assert_eq!(hotel.property_type.as_deref(), Some("hotel"));
        assert_eq!(
            hotel.rate_per_night.as_ref().unwrap().extracted_lowest,
            Some(150.0)
        );
        assert_eq!(hotel.amenities.len(), 2);
        assert_eq!(
            resp.serpapi_pagination.unwrap().next_page_token.as_deref(),
            Some("CBI=")
        );
    }

    #[test]
    fn deserialize_hotel_details() {
        let json = r#"{
            "name": "Hotel Lumen",
            "address": "15 Rue Boulard, Paris",
            "rate_per_night": {"lowest": "$150", "extracted_lowest": 150},
            "prices": [{"source": "Booking.com", "rate_per_night": {"extracted_lowest": 148}}]
        }"#;

        let resp: HotelDetailsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.address.as_deref(), Some("15 Rue Boulard, Paris"));
        assert_eq!(resp.prices[0].source.as_deref(), Some("Booking.com"));
    }
}
