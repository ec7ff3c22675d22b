use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::{
    ContainerLayout, MAX_CHART_HEIGHT, MAX_CONTAINER_WIDTH, MAX_DEVICE_PIXEL_RATIO,
};
use crate::services::engine_service::{EngineOptions, DEFAULT_CHART_HEIGHT, DEFAULT_FRAME_RATE};
use crate::utils::errors::ChartError;

/// Runner settings, read from the environment (and `.env` via dotenv)
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub asset: String,
    pub height: f64,
    pub container_width: f64,
    pub device_pixel_ratio: f64,
    pub frame_rate: u32,
    pub run_seconds: u64,
    pub snapshot_path: PathBuf,
    pub series_path: Option<PathBuf>,
    pub resize_schedule: Vec<f64>,
}

impl ChartSettings {
    pub fn from_env() -> Result<Self, ChartError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ChartError> {
        let height: f64 = parse_var(&lookup, "CHART_HEIGHT", DEFAULT_CHART_HEIGHT)?;
        check_bounded("CHART_HEIGHT", height, MAX_CHART_HEIGHT)?;
        if height == 0.0 {
            return Err(ChartError::Config("CHART_HEIGHT must be positive".to_string()));
        }

        let container_width: f64 = parse_var(&lookup, "CHART_CONTAINER_WIDTH", 1280.0)?;
        check_bounded("CHART_CONTAINER_WIDTH", container_width, MAX_CONTAINER_WIDTH)?;

        let device_pixel_ratio: f64 = parse_var(&lookup, "CHART_DEVICE_PIXEL_RATIO", 1.0)?;
        check_bounded("CHART_DEVICE_PIXEL_RATIO", device_pixel_ratio, MAX_DEVICE_PIXEL_RATIO)?;
        if device_pixel_ratio == 0.0 {
            return Err(ChartError::Config(
                "CHART_DEVICE_PIXEL_RATIO must be positive".to_string(),
            ));
        }

        let frame_rate: u32 = parse_var(&lookup, "CHART_FRAME_RATE", DEFAULT_FRAME_RATE)?;
        if !(1..=240).contains(&frame_rate) {
            return Err(ChartError::Config(
                "CHART_FRAME_RATE must be between 1 and 240".to_string(),
            ));
        }

        let resize_schedule = match lookup("CHART_RESIZE_SCHEDULE") {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(|w| -> Result<f64, ChartError> {
                    let width = w.trim().parse::<f64>().map_err(|_| {
                        ChartError::Config(format!(
                            "Invalid width '{}' in CHART_RESIZE_SCHEDULE",
                            w.trim()
                        ))
                    })?;
                    check_bounded("CHART_RESIZE_SCHEDULE", width, MAX_CONTAINER_WIDTH)?;
                    Ok(width)
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };

        Ok(ChartSettings {
            asset: lookup("CHART_ASSET").unwrap_or_else(|| "BTC/USD".to_string()),
            height,
            container_width,
            device_pixel_ratio,
            frame_rate,
            run_seconds: parse_var(&lookup, "CHART_RUN_SECONDS", 10)?,
            snapshot_path: lookup("CHART_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("chart.png")),
            series_path: lookup("CHART_SERIES_PATH").map(PathBuf::from),
            resize_schedule,
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            asset: Some(self.asset.clone()),
            height: self.height,
            frame_period: Duration::from_secs(1) / self.frame_rate,
        }
    }

    pub fn container_layout(&self) -> ContainerLayout {
        ContainerLayout {
            width: self.container_width,
            device_pixel_ratio: self.device_pixel_ratio,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ChartError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ChartError::Config(format!("{} has an invalid value: '{}'", key, raw))),
        None => Ok(default),
    }
}

/// Rejects NaN and infinities along with anything outside `0..=max`
fn check_bounded(key: &str, value: f64, max: f64) -> Result<(), ChartError> {
    if value.is_finite() && (0.0..=max).contains(&value) {
        return Ok(());
    }
    Err(ChartError::Config(format!(
        "{} must be between 0 and {}, got {}",
        key, max, value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<ChartSettings, ChartError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ChartSettings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.asset, "BTC/USD");
        assert_eq!(settings.height, 400.0);
        assert_eq!(settings.container_width, 1280.0);
        assert_eq!(settings.device_pixel_ratio, 1.0);
        assert_eq!(settings.frame_rate, 60);
        assert_eq!(settings.run_seconds, 10);
        assert_eq!(settings.snapshot_path, PathBuf::from("chart.png"));
        assert!(settings.series_path.is_none());
        assert!(settings.resize_schedule.is_empty());
    }

    #[test]
    fn test_overrides() {
        let settings = settings(&[
            ("CHART_ASSET", "EUR/USD"),
            ("CHART_HEIGHT", "520"),
            ("CHART_CONTAINER_WIDTH", "800"),
            ("CHART_DEVICE_PIXEL_RATIO", "2"),
            ("CHART_FRAME_RATE", "30"),
            ("CHART_SERIES_PATH", "/tmp/series.json"),
            ("CHART_RESIZE_SCHEDULE", "1280, 800,400"),
        ])
        .unwrap();

        assert_eq!(settings.asset, "EUR/USD");
        assert_eq!(settings.resize_schedule, vec![1280.0, 800.0, 400.0]);

        let options = settings.engine_options();
        assert_eq!(options.height, 520.0);
        assert_eq!(options.frame_period, Duration::from_secs(1) / 30);
        assert_eq!(options.asset.as_deref(), Some("EUR/USD"));

        let layout = settings.container_layout();
        assert_eq!(layout.width, 800.0);
        assert_eq!(layout.device_pixel_ratio, 2.0);
    }

    fn rejected(key: &str, value: &str) -> bool {
        matches!(settings(&[(key, value)]), Err(ChartError::Config(_)))
    }

    #[test]
    fn test_invalid_values() {
        assert!(rejected("CHART_HEIGHT", "tall"));
        assert!(rejected("CHART_HEIGHT", "0"));
        assert!(rejected("CHART_DEVICE_PIXEL_RATIO", "-1"));
        assert!(rejected("CHART_FRAME_RATE", "0"));
        assert!(rejected("CHART_RESIZE_SCHEDULE", "800,wide"));
    }

    #[test]
    fn test_unbounded_sizes_rejected() {
        assert!(rejected("CHART_CONTAINER_WIDTH", "inf"));
        assert!(rejected("CHART_CONTAINER_WIDTH", "NaN"));
        assert!(rejected("CHART_CONTAINER_WIDTH", "1e12"));
        assert!(rejected("CHART_DEVICE_PIXEL_RATIO", "inf"));
        assert!(rejected("CHART_DEVICE_PIXEL_RATIO", "NaN"));
        assert!(rejected("CHART_DEVICE_PIXEL_RATIO", "1e12"));
        assert!(rejected("CHART_HEIGHT", "inf"));
        assert!(rejected("CHART_HEIGHT", "1e9"));
        assert!(rejected("CHART_RESIZE_SCHEDULE", "800,inf"));

        let settings = settings(&[
            ("CHART_CONTAINER_WIDTH", "8192"),
            ("CHART_DEVICE_PIXEL_RATIO", "4"),
        ])
        .unwrap();
        assert_eq!(settings.container_layout().sanitized(), settings.container_layout());
    }
}
