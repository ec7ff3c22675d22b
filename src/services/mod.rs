pub mod sampler_service;
pub mod render_service;
pub mod engine_service;

pub use engine_service::{ChartEngine, EngineOptions};
