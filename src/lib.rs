//! Shooting-frequency statistics from a photo catalog.
//!
//! Reads capture timestamps (and optionally focal lengths) from a catalog
//! database, counts them per month and per focal length, and renders the
//! counts as an annotated line chart.

pub mod aggregate;
pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;

pub use error::{Error, Result};
