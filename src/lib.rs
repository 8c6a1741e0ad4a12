//! Preference-driven workout and nutrition recommendations
//!
//! [`services::RecommendationEngine`] is the core; the HTTP surface in [`routes`] is a thin
//! host around it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
