//! Plant care engine
//!
//! Scores plant health from recent soil moisture, temperature, humidity
//! and light readings against per-type threshold profiles, and derives
//! irrigation schedules from sensor averages and watering history.

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod models;
pub mod profiles;
pub mod schedule;
pub mod service;
pub mod simulator;
pub mod state;
pub mod validation;
