//! CLI subcommands

pub mod health;
pub mod params;
pub mod predict;
