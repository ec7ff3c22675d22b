//! Viewport classes and their layout table

use serde::Serialize;
use std::fmt;

/// Container width (logical px) where the tablet layout starts
pub const TABLET_MIN_WIDTH: f64 = 640.0;
/// Container width (logical px) where the desktop layout starts
pub const DESKTOP_MIN_WIDTH: f64 = 1024.0;

/// Discrete layout bucket derived from the render surface width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportClass {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportClass {
    /// Classify a surface width in device-independent pixels
    pub fn classify(width: f64) -> Self {
        if width < TABLET_MIN_WIDTH {
            ViewportClass::Mobile
        } else if width < DESKTOP_MIN_WIDTH {
            ViewportClass::Tablet
        } else {
            ViewportClass::Desktop
        }
    }

    pub fn layout(self) -> &'static LayoutConfig {
        match self {
            ViewportClass::Mobile => &MOBILE_LAYOUT,
            ViewportClass::Tablet => &TABLET_LAYOUT,
            ViewportClass::Desktop => &DESKTOP_LAYOUT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewportClass::Mobile => "mobile",
            ViewportClass::Tablet => "tablet",
            ViewportClass::Desktop => "desktop",
        }
    }
}

impl fmt::Display for ViewportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

/// Chart height rule for a viewport class
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChartHeight {
    Fixed(f64),
    Requested,
}

/// Every layout constant the renderer needs for one viewport class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub padding: Padding,
    pub font_size: f64,
    pub price_grid_lines: u32,
    pub time_grid_lines: u32,
    pub show_price_label: bool,
    pub show_time_labels: bool,
    pub abbreviate_prices: bool,
    pub show_caption: bool,
    pub line_width: f64,
    pub marker_radius: f64,
    pub glow_blur: f64,
    pub chart_height: ChartHeight,
}

impl LayoutConfig {
    /// Logical surface height for this class given the height the chart was activated with
    pub fn chart_height(&self, requested: f64) -> f64 {
        match self.chart_height {
            ChartHeight::Fixed(height) => height,
            ChartHeight::Requested => requested,
        }
    }
}

const MOBILE_LAYOUT: LayoutConfig = LayoutConfig {
    padding: Padding { left: 20.0, right: 10.0, top: 10.0, bottom: 10.0 },
    font_size: 7.0,
    price_grid_lines: 3,
    time_grid_lines: 2,
    show_price_label: false,
    show_time_labels: false,
    abbreviate_prices: true,
    show_caption: false,
    line_width: 1.5,
    marker_radius: 3.0,
    glow_blur: 4.0,
    chart_height: ChartHeight::Fixed(100.0),
};

const TABLET_LAYOUT: LayoutConfig = LayoutConfig {
    padding: Padding { left: 50.0, right: 20.0, top: 20.0, bottom: 35.0 },
    font_size: 8.0,
    price_grid_lines: 3,
    time_grid_lines: 3,
    show_price_label: false,
    show_time_labels: true,
    abbreviate_prices: false,
    show_caption: true,
    line_width: 2.0,
    marker_radius: 4.0,
    glow_blur: 8.0,
    chart_height: ChartHeight::Fixed(300.0),
};

const DESKTOP_LAYOUT: LayoutConfig = LayoutConfig {
    padding: Padding { left: 70.0, right: 30.0, top: 25.0, bottom: 40.0 },
    font_size: 9.0,
    price_grid_lines: 4,
    time_grid_lines: 5,
    show_price_label: true,
    show_time_labels: true,
    abbreviate_prices: false,
    show_caption: true,
    line_width: 2.5,
    marker_radius: 5.0,
    glow_blur: 12.0,
    chart_height: ChartHeight::Requested,
};
