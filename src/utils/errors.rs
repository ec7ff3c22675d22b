use thiserror::Error;

/// Errors surfaced by the chart engine and the headless runner
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Drawing surface error: {0}")]
    Surface(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Chart is not active")]
    NotActive,
}

impl ChartError {
    /// Wrap any backend error (plotters reports its own error kinds) as a surface error
    pub fn surface(error: impl std::fmt::Display) -> Self {
        ChartError::Surface(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChartError::Config("CHART_HEIGHT must be a number".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: CHART_HEIGHT must be a number");

        let err = ChartError::surface("font not found");
        assert_eq!(err.to_string(), "Drawing surface error: font not found");
    }

    #[test]
    fn test_io_error_converts() {
        fn write() -> Result<(), ChartError> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }

        assert!(matches!(write(), Err(ChartError::Io(_))));
    }
}
