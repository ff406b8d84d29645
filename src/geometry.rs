#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Shortest arc between two angles in degrees, normalized to [0, 180].
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + 180.0).rem_euclid(360.0) - 180.0).abs()
}

/// `n` angles spaced 360/n degrees apart, starting at 0.
pub fn evenly_spaced_angles(n: usize) -> impl Iterator<Item = f64> {
    let step = if n == 0 { 0.0 } else { 360.0 / n as f64 };
    (0..n).map(move |i| i as f64 * step)
}

/// A circle with fixed center and radius, mapping between points and angles.
///
/// Angles are in degrees, counted clockwise with 0 at the top of the
/// circle, in the range [0, 360). Coordinates follow screen convention
/// (y grows downward).
#[derive(Debug, Clone, Copy)]
pub struct CirclePoints {
    center: Point,
    radius: f64,
}

impl CirclePoints {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn distance(&self, p: Point) -> f64 {
        let (dx, dy) = (p.x - self.center.x, p.y - self.center.y);
        dx.hypot(dy)
    }

    /// Angle of `p` relative to the center. The exact center maps to 0.
    pub fn angle_from_point(&self, p: Point) -> f64 {
        let (dx, dy) = (p.x - self.center.x, p.y - self.center.y);
        if dx == 0.0 && dy == 0.0 {
            return 0.0;
        }
        dx.atan2(-dy).to_degrees().rem_euclid(360.0)
    }

    /// Point on the circle at the given angle.
    pub fn point_from_angle(&self, angle: f64) -> Point {
        let rad = angle.to_radians();
        Point::new(
            self.center.x + self.radius * rad.sin(),
            self.center.y - self.radius * rad.cos(),
        )
    }

    /// Evenly distributed (angle, point) pairs around the circle.
    pub fn iterate_over_circle(&self, n: usize) -> Vec<(f64, Point)> {
        evenly_spaced_angles(n)
            .map(|angle| (angle, self.point_from_angle(angle)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle() -> CirclePoints {
        CirclePoints::new(Point::new(100.0, 100.0), 50.0)
    }

    #[test]
    fn test_cardinal_angles() {
        let circle = circle();
        let cases = [
            (Point::new(100.0, 40.0), 0.0),
            (Point::new(160.0, 100.0), 90.0),
            (Point::new(100.0, 160.0), 180.0),
            (Point::new(40.0, 100.0), 270.0),
        ];
        for (point, expected) in cases {
            assert!(
                (circle.angle_from_point(point) - expected).abs() < 1e-9,
                "{point:?} should map to {expected}"
            );
        }
    }

    #[test]
    fn test_angle_point_round_trip() {
        let circle = circle();
        for i in 0..360 {
            let angle = i as f64;
            let back = circle.angle_from_point(circle.point_from_angle(angle));
            assert!(
                angle_difference(back, angle) < 1e-9,
                "round trip failed for {angle}: got {back}"
            );
        }
    }

    #[test]
    fn test_center_maps_to_zero() {
        let circle = circle();
        assert_eq!(circle.angle_from_point(circle.center()), 0.0);
    }

    #[test]
    fn test_angle_difference_wraps_around() {
        assert!((angle_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angle_difference(10.0, 350.0) - 20.0).abs() < 1e-9);
        assert!((angle_difference(180.0, 0.0) - 180.0).abs() < 1e-9);
        assert_eq!(angle_difference(42.0, 42.0), 0.0);
    }

    #[test]
    fn test_evenly_spaced_angles() {
        let angles: Vec<f64> = evenly_spaced_angles(4).collect();
        assert_eq!(angles, vec![0.0, 90.0, 180.0, 270.0]);
        assert_eq!(evenly_spaced_angles(0).count(), 0);
    }

    #[test]
    fn test_distance() {
        let circle = circle();
        assert_eq!(circle.distance(Point::new(100.0, 100.0)), 0.0);
        assert!((circle.distance(Point::new(103.0, 104.0)) - 5.0).abs() < 1e-9);
    }
}
