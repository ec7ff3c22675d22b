//! Data models for the live chart
//!
//! Plain value types shared by the sampler, the renderer and the engine.

pub mod sample;
pub mod viewport;
pub mod scale;
pub mod frame;

// Re-export commonly used types for convenience
pub use sample::{PriceSample, SeriesSnapshot};
pub use viewport::{LayoutConfig, Padding, ViewportClass};
pub use scale::{ChartScale, PlotArea, PriceRange};
pub use frame::{
    ContainerLayout, Frame, FrameOutcome, SkipReason, SurfaceSize, MAX_CHART_HEIGHT,
    MAX_CONTAINER_WIDTH, MAX_DEVICE_PIXEL_RATIO,
};
