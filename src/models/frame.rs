//! Render target sizing and published frames

use crate::models::ViewportClass;

/// Widest logical container the chart will allocate a surface for
pub const MAX_CONTAINER_WIDTH: f64 = 8_192.0;
/// Tallest logical chart height
pub const MAX_CHART_HEIGHT: f64 = 2_048.0;
pub const MAX_DEVICE_PIXEL_RATIO: f64 = 4.0;

/// Container layout box as reported by the embedder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerLayout {
    pub width: f64,
    pub device_pixel_ratio: f64,
}

impl ContainerLayout {
    pub fn viewport(&self) -> ViewportClass {
        ViewportClass::classify(self.width)
    }

    /// Clamp into the supported bounds. A NaN width collapses to zero and an
    /// unusable ratio falls back to 1.
    pub fn sanitized(self) -> Self {
        ContainerLayout {
            width: clamp_extent(self.width, MAX_CONTAINER_WIDTH),
            device_pixel_ratio: clamp_ratio(self.device_pixel_ratio),
        }
    }

    /// Logical surface for this layout; the height comes from the viewport class
    pub fn surface_size(&self, requested_height: f64) -> SurfaceSize {
        let layout = self.sanitized();
        let height = layout.viewport().layout().chart_height(requested_height);
        SurfaceSize {
            width: layout.width,
            height: clamp_extent(height, MAX_CHART_HEIGHT),
            device_pixel_ratio: layout.device_pixel_ratio,
        }
    }
}

fn clamp_extent(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() && ratio > 0.0 {
        ratio.min(MAX_DEVICE_PIXEL_RATIO)
    } else {
        1.0
    }
}

/// Logical size of the drawing surface plus the ratio used to allocate its backing pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl SurfaceSize {
    /// Backing pixel dimensions (`logical * device_pixel_ratio`)
    pub fn physical(&self) -> (u32, u32) {
        let scale = clamp_ratio(self.device_pixel_ratio);
        let to_px = |logical: f64, max: f64| (clamp_extent(logical, max) * scale).round() as u32;
        (
            to_px(self.width, MAX_CONTAINER_WIDTH),
            to_px(self.height, MAX_CHART_HEIGHT),
        )
    }

    pub fn is_empty(&self) -> bool {
        let (w, h) = self.physical();
        w == 0 || h == 0
    }
}

/// A fully drawn frame in RGB8, at physical resolution
#[derive(Debug, Clone)]
pub struct Frame {
    pub number: u64,
    pub viewport: ViewportClass,
    pub size: SurfaceSize,
    pub rgb: Vec<u8>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        let (w, h) = self.size.physical();
        if x >= w || y >= h {
            return None;
        }
        let offset = ((y * w + x) * 3) as usize;
        self.rgb
            .get(offset..offset + 3)
            .map(|px| [px[0], px[1], px[2]])
    }
}

/// Why a redraw produced no chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotEnoughSamples,
    EmptyPlotArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    Skipped(SkipReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_size_follows_viewport() {
        let layout = ContainerLayout { width: 500.0, device_pixel_ratio: 2.0 };
        let size = layout.surface_size(400.0);
        assert_eq!(size.height, 100.0);
        assert_eq!(size.physical(), (1000, 200));

        let layout = ContainerLayout { width: 800.0, device_pixel_ratio: 1.0 };
        assert_eq!(layout.surface_size(400.0).height, 300.0);

        let layout = ContainerLayout { width: 1440.0, device_pixel_ratio: 1.5 };
        let size = layout.surface_size(400.0);
        assert_eq!(size.height, 400.0);
        assert_eq!(size.physical(), (2160, 600));
    }

    #[test]
    fn test_collapsed_surface_is_empty() {
        let size = ContainerLayout { width: 0.0, device_pixel_ratio: 1.0 }.surface_size(400.0);
        assert!(size.is_empty());
    }

    #[test]
    fn test_layout_is_bounded() {
        let layout = ContainerLayout { width: f64::INFINITY, device_pixel_ratio: 1e12 }.sanitized();
        assert_eq!(layout.width, MAX_CONTAINER_WIDTH);
        assert_eq!(layout.device_pixel_ratio, MAX_DEVICE_PIXEL_RATIO);

        let layout = ContainerLayout { width: f64::NAN, device_pixel_ratio: f64::NAN }.sanitized();
        assert_eq!(layout.width, 0.0);
        assert_eq!(layout.device_pixel_ratio, 1.0);

        let size = ContainerLayout { width: 1e12, device_pixel_ratio: 2.0 }.surface_size(1e9);
        assert_eq!(size.physical(), (16_384, 4_096));
    }

    #[test]
    fn test_physical_bounds_hand_built_sizes() {
        let size = SurfaceSize {
            width: f64::INFINITY,
            height: f64::NAN,
            device_pixel_ratio: f64::INFINITY,
        };
        assert_eq!(size.physical(), (8_192, 0));
        assert!(size.is_empty());
    }

    #[test]
    fn test_frame_pixel_lookup() {
        let size = SurfaceSize { width: 2.0, height: 1.0, device_pixel_ratio: 1.0 };
        let frame = Frame {
            number: 1,
            viewport: ViewportClass::Mobile,
            size,
            rgb: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(frame.pixel(1, 0), Some([4, 5, 6]));
        assert_eq!(frame.pixel(2, 0), None);
    }
}
