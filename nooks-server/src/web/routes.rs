//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{Itinerary, extract_place_index, travel_mode_delta};
use crate::expense::{ExpenseAnalysis, ModelEstimate};
use crate::llm::LlmError;
use crate::serp::{HotelDetailsQuery, SerpError, Stay};

use super::dto::*;
use super::state::AppState;
use super::validate::{FieldError, ValidationErrors};

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/flights/search", post(search_flights))
        .route("/api/flights/return", post(return_flights))
        .route("/api/flights/next-segment", post(next_segment))
        .route("/api/hotels/search", post(search_hotels))
        .route("/api/hotels/details", post(hotel_details))
        .route("/api/expense-analysis", post(expense_analysis))
        .route("/api/itinerary/retime", post(retime_itinerary))
        .route(
            "/api/saved-searches",
            get(list_saved_searches).post(feature_removed),
        )
        .route(
            "/api/saved-searches/:id",
            get(saved_search_removed).delete(saved_search_removed),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Parse JSON manually so we can log the body on failure.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!(
            error = %e,
            body = %String::from_utf8_lossy(body),
            "rejecting request body"
        );
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
            details: Vec::new(),
        }
    })
}

async fn search_flights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FlightSearchResponse>, AppError> {
    flights(&state, &body, FlightSearchKind::Initial).await
}

async fn return_flights(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FlightSearchResponse>, AppError> {
    flights(&state, &body, FlightSearchKind::Return).await
}

async fn next_segment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<FlightSearchResponse>, AppError> {
    flights(&state, &body, FlightSearchKind::NextSegment).await
}

async fn flights(
    state: &AppState,
    body: &Bytes,
    kind: FlightSearchKind,
) -> Result<Json<FlightSearchResponse>, AppError> {
    let req: FlightSearchRequest = parse_body(body)?;
    let query = req.validate(kind)?;

    info!(route = %query.route, ?kind, "searching flights");
    let resp = state.search.search_flights(&query).await?;

    Ok(Json(FlightSearchResponse::from_response(&resp)))
}

async fn search_hotels(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HotelSearchResponse>, AppError> {
    let req: HotelSearchRequest = parse_body(&body)?;
    let query = req.validate()?;

    info!(q = %query.stay.q, nights = query.stay.nights(), "searching hotels");
    let resp = state.search.search_hotels(&query).await?;

    Ok(Json(HotelSearchResponse::from_response(&resp)))
}

async fn hotel_details(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HotelDetailsResult>, AppError> {
    let req: HotelDetailsRequest = parse_body(&body)?;
    let query = req.validate()?;

    let resp = state.search.hotel_details(&query).await?;

    Ok(Json(HotelDetailsResult::from_response(
        &resp,
        &query.property_token,
    )))
}

/// Estimate trip expenses.
///
/// Flights and accommodation come from the request (or a hotel details
/// lookup); the remaining categories come from the model.
async fn expense_analysis(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExpenseAnalysis>, AppError> {
    let req: ExpenseAnalysisRequest = parse_body(&body)?;
    let ExpensePlan {
        mut trip,
        rate_lookup_token,
    } = req.validate()?;

    if let Some(property_token) = rate_lookup_token.filter(|_| trip.nights() > 0) {
        let query = HotelDetailsQuery {
            stay: Stay {
                q: trip
                    .hotel_name
                    .clone()
                    .unwrap_or_else(|| trip.destination.clone()),
                check_in: trip.departure_date,
                check_out: trip.return_date,
                adults: trip.travelers.min(u8::MAX as u32) as u8,
                children: 0,
                currency: trip.currency.clone(),
            },
            property_token,
        };
        let details = state.search.hotel_details(&query).await?;
        trip.hotel_rate_per_night = details
            .rate_per_night
            .as_ref()
            .and_then(|r| r.extracted_lowest);
        if trip.hotel_rate_per_night.is_none() {
            warn!(token = %query.property_token, "hotel details carried no nightly rate");
        }
        if trip.hotel_name.is_none() {
            trip.hotel_name = details.name.clone();
        }
    }

    info!(
        destination = %trip.destination,
        nights = trip.nights(),
        travelers = trip.travelers,
        "requesting expense estimate"
    );

    let content = state
        .llm
        .complete_json(trip.system_prompt(), &trip.prompt())
        .await?;
    let estimate = ModelEstimate::parse(&content)?;

    Ok(Json(ExpenseAnalysis::new(&trip, estimate)))
}

/// Shift the itinerary after a ride's travel time changed.
async fn retime_itinerary(body: Bytes) -> Result<Json<RetimeResponse>, AppError> {
    let req: RetimeRequest = parse_body(&body)?;
    let (start, delta) = req.validate()?;

    let index = match &start {
        RetimeStart::Index(index) => Some(*index),
        RetimeStart::Ride(ride_id) => extract_place_index(ride_id),
    };

    let (itinerary, delta_minutes) = match delta {
        RetimeDelta::Fixed(minutes) => (shift(&req, index, minutes), minutes),
        RetimeDelta::ModeChange(change) => {
            let RetimeStart::Ride(ride_id) = &start else {
                return Err(AppError::bad_request("mode_change needs a ride_id"));
            };
            let minutes =
                travel_mode_delta(&change.travel_options, ride_id, change.from, change.to)
                    .ok_or_else(|| {
                        AppError::bad_request(format!(
                            "no usable {:?} and {:?} travel times for ride {ride_id}",
                            change.from, change.to
                        ))
                    })?;
            (shift(&req, index, minutes), minutes)
        }
        RetimeDelta::DropDining { after } => req
            .itinerary
            .without_dining_after(req.day, after)
            .ok_or_else(|| AppError::bad_request(format!("no schedule entry at index {after}")))?,
    };

    let closed_on_arrival = itinerary
        .schedule_for(req.day)
        .map(|schedule| schedule.closed_on_arrival())
        .unwrap_or_default();

    Ok(Json(RetimeResponse {
        itinerary,
        affected_index: index,
        delta_minutes,
        closed_on_arrival,
    }))
}

fn shift(req: &RetimeRequest, index: Option<usize>, minutes: i32) -> Itinerary {
    match index {
        Some(index) if minutes != 0 => req.itinerary.retimed_from(req.day, index, minutes),
        _ => req.itinerary.clone(),
    }
}

async fn list_saved_searches() -> Json<Vec<SavedSearch>> {
    Json(Vec::new())
}

async fn feature_removed() -> AppError {
    AppError::NotImplemented
}

async fn saved_search_removed(Path(_id): Path<String>) -> AppError {
    AppError::NotImplemented
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        message: format!("No route for {}", uri.path()),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest {
        message: String,
        details: Vec<FieldError>,
    },
    NotFound {
        message: String,
    },
    NotImplemented,
    Internal {
        message: String,
    },
}

impl AppError {
    fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            details: Vec::new(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(e: ValidationErrors) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
            details: e.0,
        }
    }
}

impl From<SerpError> for AppError {
    fn from(e: SerpError) -> Self {
        if e.is_client_error() {
            AppError::bad_request(e.to_string())
        } else {
            AppError::Internal {
                message: e.to_string(),
            }
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Internal {
            message: format!("Expense analysis failed: {e}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::BadRequest { message, details } => {
                (StatusCode::BAD_REQUEST, message, details)
            }
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message, Vec::new()),
            AppError::NotImplemented => (
                StatusCode::NOT_IMPLEMENTED,
                "feature removed".to_string(),
                Vec::new(),
            ),
            AppError::Internal { message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new())
            }
        };

        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            error!(%status, "{message}");
        } else {
            warn!(%status, "{message}");
        }

        let body = Json(ErrorResponse {
            error: message,
            details,
        });
        (status, body).into_response()
    }
}
