//! Travel planner backend.
//!
//! Proxies flight and hotel searches to SerpAPI, estimates trip expenses
//! with a hosted LLM, and re-times day-by-day itineraries when a travel
//! leg changes.

pub mod cache;
pub mod config;
pub mod domain;
pub mod expense;
pub mod llm;
pub mod serp;
pub mod web;
