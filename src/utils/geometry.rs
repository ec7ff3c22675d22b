//! Plain 2D helpers used by the renderer: curve smoothing, dash segmentation
//! and polygon clipping. All coordinates are logical pixels, y grows downward.

/// A point in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Smooth a polyline with quadratic curves through the midpoints of consecutive points.
///
/// Each interior point acts as the control point of a quadratic segment that runs
/// from the previous midpoint to the next one; the curve starts at the first point
/// and finishes with a straight run into the last point. The result is flattened
/// into `segments` line pieces per quadratic.
pub fn smooth_curve(points: &[Point], segments: usize) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let segments = segments.max(1);
    let mut curve = Vec::with_capacity((points.len() - 2) * segments + 2);
    let mut current = points[0];
    curve.push(current);

    for window in points[1..].windows(2) {
        let control = window[0];
        let end = control.midpoint(window[1]);
        for step in 1..=segments {
            let t = step as f64 / segments as f64;
            curve.push(quadratic(current, control, end, t));
        }
        current = end;
    }

    curve.push(points[points.len() - 1]);
    curve
}

fn quadratic(start: Point, control: Point, end: Point, t: f64) -> Point {
    let inv = 1.0 - t;
    Point::new(
        inv * inv * start.x + 2.0 * inv * t * control.x + t * t * end.x,
        inv * inv * start.y + 2.0 * inv * t * control.y + t * t * end.y,
    )
}

/// Split the segment `from -> to` into dash pieces of length `dash` separated by `gap`
pub fn dash_segments(from: Point, to: Point, dash: f64, gap: f64) -> Vec<(Point, Point)> {
    let length = from.distance(to);
    if length <= 0.0 || dash <= 0.0 {
        return Vec::new();
    }

    let period = dash + gap.max(0.0);
    let mut dashes = Vec::new();
    let mut offset = 0.0;
    while offset < length {
        let end = (offset + dash).min(length);
        dashes.push((from.lerp(to, offset / length), from.lerp(to, end / length)));
        offset += period;
    }
    dashes
}

/// Clip a polygon to the horizontal slab `y_min <= y <= y_max` (Sutherland-Hodgman).
pub fn clip_to_slab(polygon: &[Point], y_min: f64, y_max: f64) -> Vec<Point> {
    let upper = clip_edge(polygon, |p| p.y >= y_min, y_min);
    clip_edge(&upper, |p| p.y <= y_max, y_max)
}

fn clip_edge(polygon: &[Point], inside: impl Fn(Point) -> bool, edge_y: f64) -> Vec<Point> {
    let mut output = Vec::with_capacity(polygon.len() + 2);
    let Some(&last) = polygon.last() else {
        return output;
    };

    let mut previous = last;
    for &point in polygon {
        match (inside(previous), inside(point)) {
            (true, true) => output.push(point),
            (true, false) => output.push(crossing(previous, point, edge_y)),
            (false, true) => {
                output.push(crossing(previous, point, edge_y));
                output.push(point);
            }
            (false, false) => {}
        }
        previous = point;
    }
    output
}

fn crossing(a: Point, b: Point, y: f64) -> Point {
    let t = (y - a.y) / (b.y - a.y);
    Point::new(a.x + (b.x - a.x) * t, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_curve_keeps_endpoints() {
        let points = vec![
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(30.0, 5.0),
        ];
        let curve = smooth_curve(&points, 8);

        assert_eq!(curve.first(), Some(&points[0]));
        assert_eq!(curve.last(), Some(&points[3]));
        assert_eq!(curve.len(), 2 * 8 + 2);
    }

    #[test]
    fn test_smooth_curve_passes_through_midpoints() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(20.0, 0.0),
        ];
        let curve = smooth_curve(&points, 4);

        // The single quadratic ends at the midpoint of the last two points
        assert_eq!(curve[4], Point::new(15.0, 10.0));
        // Control point is never reached
        assert!(curve.iter().all(|p| p.y < 20.0));
    }

    #[test]
    fn test_smooth_curve_short_input_is_unchanged() {
        let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(smooth_curve(&points, 8), points);
        assert!(smooth_curve(&[], 8).is_empty());
    }

    #[test]
    fn test_dash_segments() {
        let dashes = dash_segments(Point::new(0.0, 5.0), Point::new(20.0, 5.0), 4.0, 4.0);

        assert_eq!(dashes.len(), 3);
        assert_eq!(dashes[0], (Point::new(0.0, 5.0), Point::new(4.0, 5.0)));
        assert_eq!(dashes[1], (Point::new(8.0, 5.0), Point::new(12.0, 5.0)));
        assert_eq!(dashes[2], (Point::new(16.0, 5.0), Point::new(20.0, 5.0)));
    }

    #[test]
    fn test_dash_segments_degenerate() {
        let p = Point::new(3.0, 3.0);
        assert!(dash_segments(p, p, 4.0, 4.0).is_empty());
    }

    #[test]
    fn test_clip_to_slab() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let clipped = clip_to_slab(&square, 2.0, 6.0);

        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|p| p.y >= 2.0 && p.y <= 6.0));
        assert!(clipped.contains(&Point::new(0.0, 2.0)));
        assert!(clipped.contains(&Point::new(10.0, 6.0)));
    }

    #[test]
    fn test_clip_to_slab_outside() {
        let triangle = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 3.0),
        ];
        assert!(clip_to_slab(&triangle, 5.0, 9.0).is_empty());
    }
}
