//! Live-updating synthetic price chart.
//!
//! [`services::ChartEngine`] owns a rolling window of random-walk prices, appends a
//! sample every second and redraws the chart (grid, gradient area, glowing line,
//! pulsing marker, price badge and crosshair) on every frame, adapting its layout
//! to the viewport class of the container.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;
