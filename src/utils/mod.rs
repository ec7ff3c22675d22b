pub mod errors;
pub mod format;
pub mod geometry;
pub mod surface;

pub use errors::ChartError;
