//! Flight operations analytics: load a flight table, filter it by airline
//! and departure date, and summarise it for the dashboard.

pub mod analytics;
pub mod config;
pub mod data;
