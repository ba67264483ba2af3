//! Wire curve geometry.
//!
//! A wire leaves its source pin heading down the canvas and arrives at its
//! destination pin from above. Both control points take their vertical
//! offset from the start point, so a wire bends the same way whether the
//! destination sits below or above its source.

use egui::{Pos2, Rect, Vec2, pos2};

/// Line segments used to approximate a wire for hit testing.
const HIT_SEGMENTS: usize = 32;

/// Cubic curve between an output pin centre and an input pin centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WireCurve {
    /// Output end.
    pub start: Pos2,
    /// Input end.
    pub end: Pos2,
}

impl WireCurve {
    /// Creates a curve from `start` (output end) to `end` (input end).
    pub const fn new(start: Pos2, end: Pos2) -> Self {
        Self { start, end }
    }

    /// The four Bézier control points.
    pub fn control_points(&self) -> [Pos2; 4] {
        let dy = self.end.y - self.start.y;
        [
            self.start,
            pos2(self.start.x, self.start.y + dy * 0.33),
            pos2(self.end.x, self.start.y + dy * 0.66),
            self.end,
        ]
    }

    /// Point on the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Pos2 {
        let [p0, p1, p2, p3] = self.control_points();
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        pos2(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        )
    }

    /// `segments + 1` evenly spaced points from start to end.
    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// Midpoint of the curve (where the direction arrow is drawn).
    pub fn midpoint(&self) -> Pos2 {
        self.point_at(0.5)
    }

    /// Unit tangent at the midpoint, pointing towards the input end.
    pub fn mid_direction(&self) -> Vec2 {
        let dir = self.point_at(0.55) - self.point_at(0.45);
        if dir.length_sq() > f32::EPSILON {
            dir.normalized()
        } else {
            Vec2::DOWN
        }
    }

    /// Shortest distance from `point` to the curve.
    pub fn distance_to(&self, point: Pos2) -> f32 {
        self.sample(HIT_SEGMENTS)
            .windows(2)
            .map(|seg| distance_to_segment(point, seg[0], seg[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Smallest rectangle containing the control polygon (and so the curve).
    pub fn bounding_rect(&self) -> Rect {
        Rect::from_points(&self.control_points())
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_lie_on_the_curve() {
        let c = WireCurve::new(pos2(10.0, 20.0), pos2(200.0, 300.0));
        assert_eq!(c.point_at(0.0), c.start);
        assert!(c.point_at(1.0).distance(c.end) < 1e-3);
        assert!(c.distance_to(c.start) < 1e-3);
        assert!(c.distance_to(c.end) < 1e-3);
    }

    #[test]
    fn vertical_wire_is_straight() {
        let c = WireCurve::new(pos2(50.0, 0.0), pos2(50.0, 100.0));
        assert!((c.distance_to(pos2(58.0, 50.0)) - 8.0).abs() < 1e-3);
        assert!((c.midpoint().x - 50.0).abs() < 1e-4);
        assert!(c.mid_direction().y > 0.99);
    }

    #[test]
    fn control_points_follow_vertical_delta() {
        let c = WireCurve::new(pos2(0.0, 0.0), pos2(100.0, 300.0));
        let [_, c1, c2, _] = c.control_points();
        assert!(c1.distance(pos2(0.0, 99.0)) < 1e-3);
        assert!(c2.distance(pos2(100.0, 198.0)) < 1e-3);
    }

    #[test]
    fn upward_wire_bends_from_its_source() {
        let c = WireCurve::new(pos2(0.0, 300.0), pos2(100.0, 0.0));
        let [_, c1, c2, _] = c.control_points();
        assert!(c1.y < 300.0 && c2.y > 0.0);
        assert!(c.bounding_rect().contains(c.midpoint()));
    }

    #[test]
    fn far_points_are_far() {
        let c = WireCurve::new(pos2(0.0, 0.0), pos2(0.0, 100.0));
        assert!(c.distance_to(pos2(500.0, 500.0)) > 400.0);
    }

    #[test]
    fn degenerate_curve_measures_from_the_point() {
        let c = WireCurve::new(pos2(5.0, 5.0), pos2(5.0, 5.0));
        assert!((c.distance_to(pos2(8.0, 9.0)) - 5.0).abs() < 1e-4);
        assert_eq!(c.mid_direction(), Vec2::DOWN);
    }
}
