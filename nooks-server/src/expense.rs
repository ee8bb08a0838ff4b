//! Trip expense estimation.
//!
//! Flight and hotel costs come from search results the traveller already
//! picked. Everything else (food, local transport, activities, sundries) is
//! estimated by the LLM. Its answer must contain every required figure: a
//! missing one fails the estimate rather than being filled with a default.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::llm::LlmError;

/// Numeric fields the model must return, as trip totals.
pub const REQUIRED_FIELDS: [&str; 4] = [
    "food",
    "local_transportation",
    "activities",
    "miscellaneous",
];

const SYSTEM_PROMPT: &str = "You are a travel budget analyst. You estimate realistic trip \
costs for the destination and travel style you are given. Answer with a single JSON object \
and nothing else.";

/// Spending level for the estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TravelStyle {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl TravelStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "budget" => Some(TravelStyle::Budget),
            "moderate" => Some(TravelStyle::Moderate),
            "luxury" => Some(TravelStyle::Luxury),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelStyle::Budget => "budget",
            TravelStyle::Moderate => "moderate",
            TravelStyle::Luxury => "luxury",
        }
    }
}

/// Everything known about a trip before estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub destination: String,
    pub origin: Option<String>,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub travelers: u32,
    pub currency: String,
    pub style: TravelStyle,
    pub interests: Vec<String>,

    /// Total fare for all travellers.
    pub flight_price: Option<f64>,
    pub hotel_name: Option<String>,
    pub hotel_rate_per_night: Option<f64>,
}

impl Trip {
    pub fn nights(&self) -> i64 {
        (self.return_date - self.departure_date).num_days().max(0)
    }

    /// Calendar days on the ground, counting a same-day trip as one.
    pub fn days(&self) -> i64 {
        self.nights().max(1)
    }

    pub fn flight_cost(&self) -> f64 {
        self.flight_price.unwrap_or(0.0)
    }

    pub fn accommodation_cost(&self) -> f64 {
        self.hotel_rate_per_night.unwrap_or(0.0) * self.nights() as f64
    }

    /// The user prompt describing this trip.
    pub fn prompt(&self) -> String {
        let mut lines = vec![format!(
            "Estimate the costs of a {} trip to {} for {} traveller(s), \
             from {} to {} ({} night(s)).",
            self.style.as_str(),
            self.destination,
            self.travelers,
            self.departure_date,
            self.return_date,
            self.nights(),
        )];

        if let Some(origin) = &self.origin {
            lines.push(format!("They are travelling from {origin}."));
        }
        if let Some(price) = self.flight_price {
            lines.push(format!(
                "Flights are already booked for {price:.2} {} in total.",
                self.currency
            ));
        }
        match (&self.hotel_name, self.hotel_rate_per_night) {
            (Some(name), Some(rate)) => lines.push(format!(
                "They are staying at {name} for {rate:.2} {} per night.",
                self.currency
            )),
            (Some(name), None) => lines.push(format!("They are staying at {name}.")),
            (None, Some(rate)) => lines.push(format!(
                "Accommodation costs {rate:.2} {} per night.",
                self.currency
            )),
            (None, None) => {}
        }
        if !self.interests.is_empty() {
            lines.push(format!("Their interests: {}.", self.interests.join(", ")));
        }

        lines.push(format!(
            "Do not include flights or accommodation. Give totals for the whole trip and all \
             travellers in {currency}, as a JSON object with numeric fields {fields}, and a \
             \"tips\" array of short money-saving tips.",
            currency = self.currency,
            fields = REQUIRED_FIELDS
                .iter()
                .map(|f| format!("\"{f}\""))
                .collect::<Vec<_>>()
                .join(", "),
        ));

        lines.join("\n")
    }

    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }
}

/// The model's part of the estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEstimate {
    pub food: f64,
    pub local_transportation: f64,
    pub activities: f64,
    pub miscellaneous: f64,
    pub tips: Vec<String>,
}

impl ModelEstimate {
    /// Parse the model's answer.
    ///
    /// Tolerates a Markdown code fence around the object. Numbers sent as
    /// numeric strings are accepted; anything else in a required field is
    /// an error.
    pub fn parse(content: &str) -> Result<Self, LlmError> {
        let json = strip_code_fence(content);
        let value: Value =
            serde_json::from_str(json).map_err(|e| LlmError::InvalidAnswer(e.to_string()))?;

        if !value.is_object() {
            return Err(LlmError::InvalidAnswer("expected an object".to_string()));
        }

        let number = |field: &'static str| -> Result<f64, LlmError> {
            let n = match value.get(field) {
                Some(Value::Number(n)) => n.as_f64(),
                Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            n.filter(|n| n.is_finite() && *n >= 0.0)
                .ok_or(LlmError::MissingField(field))
        };

        let tips = value
            .get("tips")
            .and_then(Value::as_array)
            .map(|tips| {
                tips.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            food: number("food")?,
            local_transportation: number("local_transportation")?,
            activities: number("activities")?,
            miscellaneous: number("miscellaneous")?,
            tips,
        })
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Cost per category for the whole trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseBreakdown {
    pub flights: f64,
    pub accommodation: f64,
    pub food: f64,
    pub local_transportation: f64,
    pub activities: f64,
    pub miscellaneous: f64,
}

impl ExpenseBreakdown {
    pub fn total(&self) -> f64 {
        self.flights
            + self.accommodation
            + self.food
            + self.local_transportation
            + self.activities
            + self.miscellaneous
    }
}

/// A finished expense estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseAnalysis {
    pub currency: String,
    pub nights: i64,
    pub travelers: u32,
    pub breakdown: ExpenseBreakdown,
    pub total: f64,
    pub per_person: f64,
    pub per_day: f64,
    pub tips: Vec<String>,
}

impl ExpenseAnalysis {
    /// Combine booked costs with the model's estimate.
    pub fn new(trip: &Trip, estimate: ModelEstimate) -> Self {
        let breakdown = ExpenseBreakdown {
            flights: round2(trip.flight_cost()),
            accommodation: round2(trip.accommodation_cost()),
            food: round2(estimate.food),
            local_transportation: round2(estimate.local_transportation),
            activities: round2(estimate.activities),
            miscellaneous: round2(estimate.miscellaneous),
        };
        let total = round2(breakdown.total());

        Self {
            currency: trip.currency.clone(),
            nights: trip.nights(),
            travelers: trip.travelers,
            per_person: round2(total / trip.travelers.max(1) as f64),
            per_day: round2(total / trip.days() as f64),
            breakdown,
            total,
            tips: estimate.tips,
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
