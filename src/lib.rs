//! Meal planner backend
//!
//! Generates AI meal plans from a user's nutrition profile and enriches each
//! meal with measured nutrition data.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
