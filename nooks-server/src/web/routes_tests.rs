//! End-to-end tests for the HTTP routes.
//!
//! The router runs on an ephemeral port; SerpAPI and Groq are mocked.

use httpmock::prelude::*;
use serde_json::{Value, json};

use super::*;
use crate::cache::{CacheConfig, CachedSearchClient};
use crate::llm::{LlmClient, LlmConfig};
use crate::serp::{SerpClient, SerpConfig};

struct TestApp {
    base: String,
    http: reqwest::Client,
}

impl TestApp {
    async fn spawn(serp: &MockServer, groq: &MockServer) -> Self {
        let serp_client =
            SerpClient::new(SerpConfig::new("serp-key").with_base_url(serp.base_url())).unwrap();
        let search = CachedSearchClient::new(serp_client, &CacheConfig::default());
        let llm =
            LlmClient::new(LlmConfig::new("groq-key").with_base_url(groq.base_url())).unwrap();

        let app = create_router(AppState::new(search, llm));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            http: reqwest::Client::new(),
        }
    }

    async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        let resp = self
            .http
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap_or(Value::Null))
    }
}

async fn servers() -> (MockServer, MockServer) {
    (MockServer::start_async().await, MockServer::start_async().await)
}

fn flights_body() -> Value {
    json!({
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
                "flight_number": "AF 272"
            }],
            "total_duration": 835,
            "price": 1123,
            "departure_token": "WyJDa"
        }],
        "price_insights": {"lowest_price": 980, "price_level": "typical"}
    })
}

fn round_trip_request() -> Value {
    json!({
        "departure_id": "cdg",
        "arrival_id": "HND",
        "outbound_date": "2025-06-01",
        "return_date": "2025-06-10",
        "adults": 1
    })
}

#[tokio::test]
async fn health_check() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let body = app
        .http
        .get(format!("{}/health", app.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn flight_search_is_reshaped_and_cached() {
    let (serp, groq) = servers().await;
    let search = serp
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("engine", "google_flights")
                .query_param("type", "1")
                .query_param("departure_id", "CDG")
                .query_param("api_key", "serp-key");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(flights_body());
        })
        .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app.post("/api/flights/search", round_trip_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["flights"][0]["price"], 1123.0);
    assert_eq!(body["flights"][0]["total_duration"], "13h 55m");
    assert_eq!(body["flights"][0]["best"], true);
    assert_eq!(body["flights"][0]["segments"][0]["from"]["code"], "CDG");
    assert_eq!(body["flights"][0]["departure_token"], "WyJDa");
    assert_eq!(body["price_insights"]["price_level"], "typical");

    let (status, _) = app.post("/api/flights/search", round_trip_request()).await;
    assert_eq!(status, 200);
    search.assert_hits_async(1).await;
}

#[tokio::test]
async fn return_flights_forward_the_token() {
    let (serp, groq) = servers().await;
    let search = serp
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("departure_token", "WyJDa");
            then.status(200).json_body(json!({"best_flights": []}));
        })
        .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let mut req = round_trip_request();
    req["departure_token"] = json!("WyJDa");
    let (status, body) = app.post("/api/flights/return", req).await;
    assert_eq!(status, 200);
    assert_eq!(body["flights"], json!([]));
    search.assert_async().await;
}

#[tokio::test]
async fn validation_errors_list_every_field() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/flights/search",
            json!({
                "departure_id": "PARIS",
                "arrival_id": "HND",
                "outbound_date": "June 1st",
                "adults": 12
            }),
        )
        .await;
    assert_eq!(status, 400);

    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["departure_id", "outbound_date", "adults"]);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let resp = app
        .http
        .post(format!("{}/api/hotels/search", app.base))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn hotel_search_and_upstream_failures() {
    let (serp, groq) = servers().await;
    serp.mock_async(|when, then| {
        when.method(GET)
            .path("/search.json")
            .query_param("engine", "google_hotels")
            .query_param("q", "Paris");
        then.status(200).json_body(json!({
            "properties": [{
                "name": "Hotel Lumen",
                "property_token": "ChkI",
                "rate_per_night": {"lowest": "$150", "extracted_lowest": 150},
                "images": [{"thumbnail": "https://img/1.jpg"}]
            }],
            "serpapi_pagination": {"next_page_token": "CBI="}
        }));
    })
    .await;
    serp.mock_async(|when, then| {
        when.method(GET).path("/search.json").query_param("q", "Atlantis");
        then.status(200).json_body(json!({
            "error": "Google Hotels hasn't returned any results for this query."
        }));
    })
    .await;
    serp.mock_async(|when, then| {
        when.method(GET).path("/search.json").query_param("q", "Lyon");
        then.status(503).body("upstream down");
    })
    .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let stay = |q: &str| {
        json!({
            "q": q,
            "check_in_date": "2025-06-01",
            "check_out_date": "2025-06-04"
        })
    };

    let (status, body) = app.post("/api/hotels/search", stay("Paris")).await;
    assert_eq!(status, 200);
    assert_eq!(body["hotels"][0]["name"], "Hotel Lumen");
    assert_eq!(body["hotels"][0]["rate_per_night"], 150.0);
    assert_eq!(body["hotels"][0]["thumbnail"], "https://img/1.jpg");
    assert_eq!(body["next_page_token"], "CBI=");

    let (status, body) = app.post("/api/hotels/search", stay("Atlantis")).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("returned any results"));

    let (status, _) = app.post("/api/hotels/search", stay("Lyon")).await;
    assert_eq!(status, 500);
}

#[tokio::test]
async fn hotel_details_lists_sources() {
    let (serp, groq) = servers().await;
    serp.mock_async(|when, then| {
        when.method(GET)
            .path("/search.json")
            .query_param("property_token", "ChkI");
        then.status(200).json_body(json!({
            "name": "Hotel Lumen",
            "address": "15 Rue Boulard, Paris",
            "prices": [{"source": "Booking.com", "rate_per_night": {"extracted_lowest": 148}}]
        }));
    })
    .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/hotels/details",
            json!({
                "q": "Hotel Lumen",
                "property_token": "ChkI",
                "check_in_date": "2025-06-01",
                "check_out_date": "2025-06-04"
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["address"], "15 Rue Boulard, Paris");
    assert_eq!(body["property_token"], "ChkI");
    assert_eq!(body["prices"][0]["source"], "Booking.com");
    assert_eq!(body["prices"][0]["rate_per_night"], 148.0);
}

fn completion(content: Value) -> Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content.to_string()},
            "finish_reason": "stop"
        }]
    })
}

fn expense_request() -> Value {
    json!({
        "destination": "Lisbon",
        "departure_date": "2025-05-10",
        "return_date": "2025-05-14",
        "travelers": 2,
        "flight_price": 600,
        "hotel": {"property_token": "ChkI"}
    })
}

#[tokio::test]
async fn expense_analysis_fetches_missing_rate() {
    let (serp, groq) = servers().await;
    let details = serp
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search.json")
                .query_param("property_token", "ChkI")
                .query_param("check_in_date", "2025-05-10");
            then.status(200).json_body(json!({
                "name": "Casa Azul",
                "rate_per_night": {"lowest": "$100", "extracted_lowest": 100}
            }));
        })
        .await;
    let chat = groq
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer groq-key");
            then.status(200).json_body(completion(json!({
                "food": 320,
                "local_transportation": 80,
                "activities": 150,
                "miscellaneous": 50,
                "tips": ["Buy a Viva Viagem card"]
            })));
        })
        .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app.post("/api/expense-analysis", expense_request()).await;
    assert_eq!(status, 200);
    assert_eq!(body["nights"], 4);
    assert_eq!(body["breakdown"]["flights"], 600.0);
    assert_eq!(body["breakdown"]["accommodation"], 400.0);
    assert_eq!(body["total"], 1600.0);
    assert_eq!(body["per_person"], 800.0);
    assert_eq!(body["per_day"], 400.0);
    assert_eq!(body["tips"][0], "Buy a Viva Viagem card");

    details.assert_async().await;
    chat.assert_async().await;
}

#[tokio::test]
async fn expense_analysis_rejects_incomplete_answer() {
    let (serp, groq) = servers().await;
    groq.mock_async(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(completion(json!({
            "food": 320,
            "activities": 150,
            "miscellaneous": 50
        })));
    })
    .await;
    let app = TestApp::spawn(&serp, &groq).await;

    let mut req = expense_request();
    req["hotel"] = json!({"name": "Casa Azul", "rate_per_night": 100});
    let (status, body) = app.post("/api/expense-analysis", req).await;
    assert_eq!(status, 500);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("local_transportation")
    );
}

fn itinerary() -> Value {
    json!({
        "schedule": [
            {
                "place": {"name": "Museum", "openingHours": "09:00-17:00"},
                "arrivalTime": "09:00",
                "departureTime": "10:00",
                "visitDuration": 60
            },
            {
                "place": {"name": "Bakery", "openingHours": "08:00-11:00", "rating": 4.7},
                "arrivalTime": "10:30",
                "departureTime": "10:50",
                "visitDuration": 20
            }
        ]
    })
}

#[tokio::test]
async fn retime_by_ride_id() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": itinerary(),
                "ride_id": "Museum_Bakery_1",
                "delta_minutes": 30
            }),
        )
        .await;
    assert_eq!(status, 200);

    let schedule = &body["itinerary"]["schedule"];
    assert_eq!(schedule[0]["arrivalTime"], "09:00");
    assert_eq!(schedule[1]["arrivalTime"], "11:00");
    assert_eq!(schedule[1]["departureTime"], "11:20");
    assert_eq!(schedule[1]["place"]["rating"], 4.7);
    assert_eq!(body["affected_index"], 1);
    assert_eq!(body["closed_on_arrival"][0]["name"], "Bakery");
}

#[tokio::test]
async fn retime_by_mode_change() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": itinerary(),
                "ride_id": "Museum_Bakery_1",
                "mode_change": {
                    "from": "driving",
                    "to": "walking",
                    "travel_options": {"Museum_Bakery_1": {"driving": 5, "walking": 20}}
                }
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["delta_minutes"], 15);
    assert_eq!(body["itinerary"]["schedule"][1]["arrivalTime"], "10:45");
    assert_eq!(body["closed_on_arrival"], json!([]));

    let (status, _) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": itinerary(),
                "ride_id": "Museum_Bakery_1",
                "mode_change": {"from": "driving", "to": "walking", "travel_options": {}}
            }),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn return_leg_changes_nothing() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": itinerary(),
                "ride_id": "Bakery_return_home",
                "delta_minutes": 45
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["affected_index"], Value::Null);
    assert_eq!(body["itinerary"], itinerary());
}

#[tokio::test]
async fn extreme_deltas_wrap_the_clock() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({"itinerary": itinerary(), "start_index": 1, "delta_minutes": i32::MAX}),
        )
        .await;
    assert_eq!(status, 200);
    let schedule = &body["itinerary"]["schedule"];
    assert_eq!(schedule[0]["arrivalTime"], "09:00");
    assert_eq!(schedule[1]["arrivalTime"], "12:37");
    assert_eq!(schedule[1]["departureTime"], "12:57");

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({"itinerary": itinerary(), "start_index": 0, "delta_minutes": i32::MIN}),
        )
        .await;
    assert_eq!(status, 200);
    let schedule = &body["itinerary"]["schedule"];
    assert_eq!(schedule[0]["arrivalTime"], "06:52");
    assert_eq!(schedule[1]["arrivalTime"], "08:22");
    assert_eq!(body["closed_on_arrival"][0]["name"], "Museum");
    assert_eq!(body["closed_on_arrival"].as_array().unwrap().len(), 1);
}

fn multi_day_itinerary() -> Value {
    json!({
        "days": {
            "1": {
                "schedule": [{
                    "place": {"name": "Museum", "openingHours": "09:00-17:00"},
                    "arrivalTime": "08:00",
                    "departureTime": "09:00",
                    "visitDuration": 60
                }]
            },
            "2": {
                "schedule": [
                    {
                        "place": {"name": "Gallery", "openingHours": "10:00-12:00"},
                        "arrivalTime": "10:00",
                        "departureTime": "11:30",
                        "visitDuration": 90
                    },
                    {
                        "place": {"name": "Cafe", "openingHours": "08:00-13:00"},
                        "arrivalTime": "12:30",
                        "departureTime": "13:00",
                        "visitDuration": 30
                    }
                ]
            }
        }
    })
}

#[tokio::test]
async fn retime_shifts_only_the_selected_day() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": multi_day_itinerary(),
                "day": 2,
                "ride_id": "Gallery_Cafe_1",
                "delta_minutes": 40
            }),
        )
        .await;
    assert_eq!(status, 200);

    let days = &body["itinerary"]["days"];
    assert_eq!(days["1"], multi_day_itinerary()["days"]["1"]);
    assert_eq!(days["2"]["schedule"][0]["arrivalTime"], "10:00");
    assert_eq!(days["2"]["schedule"][1]["arrivalTime"], "13:10");
    assert_eq!(days["2"]["schedule"][1]["departureTime"], "13:40");

    // Day 1's early Museum arrival is not reported.
    assert_eq!(
        body["closed_on_arrival"],
        json!([{
            "index": 1,
            "name": "Cafe",
            "arrival_time": "13:10",
            "opening_hours": "08:00-13:00"
        }])
    );
}

#[tokio::test]
async fn multi_day_retime_needs_a_known_day() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    for (day, message) in [
        (json!(7), "day 7 is not in the itinerary"),
        (Value::Null, "is required for a multi-day itinerary"),
    ] {
        let (status, body) = app
            .post(
                "/api/itinerary/retime",
                json!({
                    "itinerary": multi_day_itinerary(),
                    "day": day,
                    "start_index": 0,
                    "delta_minutes": 15
                }),
            )
            .await;
        assert_eq!(status, 400);
        assert_eq!(body["details"][0]["field"], "day");
        assert_eq!(body["details"][0]["message"], message);
    }
}

#[tokio::test]
async fn dropping_dining_pulls_the_day_forward() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let mut with_lunch = itinerary();
    with_lunch["schedule"][0]["diningStops"] = json!([{"diningDuration": 30, "detourTime": 15}]);

    let (status, body) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": with_lunch,
                "ride_id": "Museum_dining_0",
                "drop_dining": true
            }),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["delta_minutes"], -45);
    assert_eq!(body["affected_index"], 1);

    let schedule = &body["itinerary"]["schedule"];
    assert!(schedule[0].get("diningStops").is_none());
    assert_eq!(schedule[0]["arrivalTime"], "09:00");
    assert_eq!(schedule[1]["arrivalTime"], "09:45");
    assert_eq!(schedule[1]["departureTime"], "10:05");

    let (status, _) = app
        .post(
            "/api/itinerary/retime",
            json!({
                "itinerary": with_lunch,
                "ride_id": "Bakery_dining_5",
                "drop_dining": true
            }),
        )
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn saved_searches_are_stubbed() {
    let (serp, groq) = servers().await;
    let app = TestApp::spawn(&serp, &groq).await;

    let list: Value = app
        .http
        .get(format!("{}/api/saved-searches", app.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list, json!([]));

    let (status, body) = app.post("/api/saved-searches", json!({"name": "Tokyo"})).await;
    assert_eq!(status, 501);
    assert_eq!(body["error"], "feature removed");

    let resp = app
        .http
        .delete(format!("{}/api/saved-searches/abc", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 501);

    let resp = app
        .http
        .get(format!("{}/api/nowhere", app.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
