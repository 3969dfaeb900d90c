//! Energy predictor server
//!
//! Loads the model once at startup and serves predictions over HTTP.

pub mod api;
pub mod config;
