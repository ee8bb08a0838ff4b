//! Request validation.
//!
//! Handlers deserialize loosely-typed request bodies and then validate them
//! field by field, collecting every problem so the client sees all of them in
//! one 400 response.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::AirportCode;

/// A problem with one request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All problems found in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "invalid request: {}", parts.join("; "))
    }
}

/// Accumulates field errors while checking a request.
///
/// Each check returns the parsed value, or `None` after recording an error.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }

    /// A required field.
    pub fn required<'a, T: ?Sized>(
        &mut self,
        field: &str,
        value: Option<&'a T>,
    ) -> Option<&'a T> {
        if value.is_none() {
            self.error(field, "is required");
        }
        value
    }

    /// A non-blank string, trimmed.
    pub fn non_empty(&mut self, field: &str, value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.error(field, "must not be empty");
            return None;
        }
        Some(trimmed.to_string())
    }

    pub fn airport(&mut self, field: &str, value: &str) -> Option<AirportCode> {
        AirportCode::parse_normalized(value)
            .map_err(|e| self.error(field, e.to_string()))
            .ok()
    }

    /// A "YYYY-MM-DD" date.
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| self.error(field, "must be a YYYY-MM-DD date"))
            .ok()
    }

    /// An integer within `min..=max`, or `default` when absent.
    pub fn count(
        &mut self,
        field: &str,
        value: Option<u32>,
        default: u32,
        min: u32,
        max: u32,
    ) -> Option<u32> {
        let value = value.unwrap_or(default);
        if value < min || value > max {
            self.error(field, format!("must be between {min} and {max}"));
            return None;
        }
        Some(value)
    }

    /// A 3-letter currency code, uppercased; "USD" when absent.
    pub fn currency(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        let Some(value) = value else {
            return Some("USD".to_string());
        };
        let code = value.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            self.error(field, "must be a 3-letter currency code");
            return None;
        }
        Some(code)
    }

    /// A finite, non-negative amount.
    pub fn amount(&mut self, field: &str, value: Option<f64>) -> Option<Option<f64>> {
        match value {
            Some(v) if !v.is_finite() || v < 0.0 => {
                self.error(field, "must be a non-negative number");
                None
            }
            other => Some(other),
        }
    }

    /// `later` must not be before `earlier`; `strict` also rejects equality.
    pub fn ordered(
        &mut self,
        field: &str,
        earlier: Option<NaiveDate>,
        later: Option<NaiveDate>,
        strict: bool,
    ) {
        if let (Some(a), Some(b)) = (earlier, later) {
            if b < a || (strict && b == a) {
                let relation = if strict { "after" } else { "on or after" };
                self.error(field, format!("must be {relation} {a}"));
            }
        }
    }
}
