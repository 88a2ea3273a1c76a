//! Raw touch input and per-pointer tracking
//!
//! The host feeds `TouchEvent`s in; handlers never sample a clock of their
//! own. Every event carries the host's monotonic time in milliseconds, so
//! a recorded trace replays to identical recognition results.

use tracing::debug;

use crate::geom::Point;

/// Raw touch event from the host's input source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    Down {
        id: i32,
        position: Point,
        time_ms: u64,
    },
    Motion {
        id: i32,
        position: Point,
        time_ms: u64,
    },
    Up {
        id: i32,
        time_ms: u64,
    },
    Cancel {
        time_ms: u64,
    },
}

/// One tracked pointer: where it started, where it is, how fast it moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub start_pos: Point,
    pub current_pos: Point,
    pub start_time_ms: u64,
    pub last_time_ms: u64,
    /// Incremental velocity in px/s, updated on every motion
    pub velocity: Point,
}

impl TouchPoint {
    pub fn new(id: i32, pos: Point, time_ms: u64) -> Self {
        Self {
            id,
            start_pos: pos,
            current_pos: pos,
            start_time_ms: time_ms,
            last_time_ms: time_ms,
            velocity: Point::ZERO,
        }
    }

    pub fn update(&mut self, pos: Point, time_ms: u64) {
        let dt = time_ms.saturating_sub(self.last_time_ms) as f64 / 1000.0;

        // Below ~1ms the velocity estimate explodes; keep the previous one
        if dt > 0.001 {
            self.velocity = Point::new(
                (pos.x - self.current_pos.x) / dt,
                (pos.y - self.current_pos.y) / dt,
            );
        }

        self.current_pos = pos;
        self.last_time_ms = time_ms;
    }

    /// Total displacement since the pointer went down
    pub fn delta(&self) -> Point {
        self.current_pos.delta_from(self.start_pos)
    }

    /// Straight-line distance from the down position
    pub fn distance(&self) -> f64 {
        self.delta().length()
    }
}

/// Live pointer set for one handler, in down order.
///
/// `primary()` is the earliest pointer still down; `span()` and
/// `span_angle()` describe the segment between the first two pointers,
/// which is what pinch and rotation recognition work from.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    points: Vec<TouchPoint>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_down(&mut self, id: i32, pos: Point, time_ms: u64) {
        if let Some(existing) = self.points.iter_mut().find(|p| p.id == id) {
            // Host re-used a slot without an Up; restart tracking for it
            debug!(id, "touch down on live pointer, restarting track");
            *existing = TouchPoint::new(id, pos, time_ms);
            return;
        }
        self.points.push(TouchPoint::new(id, pos, time_ms));
    }

    pub fn touch_motion(&mut self, id: i32, pos: Point, time_ms: u64) {
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(point) => point.update(pos, time_ms),
            None => debug!(id, "motion for unknown pointer ignored"),
        }
    }

    /// Remove a pointer, returning its final track for inspection
    pub fn touch_up(&mut self, id: i32) -> Option<TouchPoint> {
        match self.points.iter().position(|p| p.id == id) {
            Some(idx) => Some(self.points.remove(idx)),
            None => {
                debug!(id, "up for unknown pointer ignored");
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.points.clear();
    }

    pub fn count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&TouchPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Earliest pointer still down
    pub fn primary(&self) -> Option<&TouchPoint> {
        self.points.first()
    }

    /// Mean position of all live pointers
    pub fn centroid(&self) -> Option<Point> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(Point::ZERO, |acc, p| acc + p.current_pos);
        let n = self.points.len() as f64;
        Some(Point::new(sum.x / n, sum.y / n))
    }

    /// Mean velocity of all live pointers, px/s
    pub fn centroid_velocity(&self) -> Point {
        if self.points.is_empty() {
            return Point::ZERO;
        }
        let sum = self
            .points
            .iter()
            .fold(Point::ZERO, |acc, p| acc + p.velocity);
        let n = self.points.len() as f64;
        Point::new(sum.x / n, sum.y / n)
    }

    /// Distance between the first two pointers
    pub fn span(&self) -> Option<f64> {
        if self.points.len() >= 2 {
            Some(self.points[0].current_pos.distance_to(self.points[1].current_pos))
        } else {
            None
        }
    }

    /// Angle of the segment between the first two pointers, radians
    pub fn span_angle(&self) -> Option<f64> {
        if self.points.len() >= 2 {
            let a = self.points[0].current_pos;
            let b = self.points[1].current_pos;
            Some((b.y - a.y).atan2(b.x - a.x))
        } else {
            None
        }
    }

    /// Midpoint of the segment between the first two pointers
    pub fn span_midpoint(&self) -> Option<Point> {
        if self.points.len() >= 2 {
            Some(self.points[0].current_pos.midpoint(self.points[1].current_pos))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_from_motion() {
        let mut point = TouchPoint::new(0, Point::new(0.0, 0.0), 0);
        point.update(Point::new(100.0, 0.0), 100); // 100px in 100ms
        assert!((point.velocity.x - 1000.0).abs() < 1e-6);
        assert!(point.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn test_velocity_survives_tiny_dt() {
        let mut point = TouchPoint::new(0, Point::new(0.0, 0.0), 0);
        point.update(Point::new(50.0, 0.0), 50);
        let v = point.velocity;
        point.update(Point::new(51.0, 0.0), 50); // same timestamp
        assert_eq!(point.velocity, v);
        assert!((point.current_pos.x - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_primary_is_earliest_down() {
        let mut tracker = PointerTracker::new();
        tracker.touch_down(5, Point::new(1.0, 1.0), 0);
        tracker.touch_down(2, Point::new(9.0, 9.0), 10);
        assert_eq!(tracker.primary().unwrap().id, 5);

        tracker.touch_up(5);
        assert_eq!(tracker.primary().unwrap().id, 2);
    }

    #[test]
    fn test_centroid_and_span() {
        let mut tracker = PointerTracker::new();
        tracker.touch_down(0, Point::new(0.0, 0.0), 0);
        tracker.touch_down(1, Point::new(100.0, 0.0), 0);

        let c = tracker.centroid().unwrap();
        assert!((c.x - 50.0).abs() < 1e-9);
        assert!((tracker.span().unwrap() - 100.0).abs() < 1e-9);
        assert!(tracker.span_angle().unwrap().abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ids_ignored() {
        let mut tracker = PointerTracker::new();
        tracker.touch_motion(3, Point::new(1.0, 1.0), 5);
        assert!(tracker.is_empty());
        assert!(tracker.touch_up(3).is_none());
    }

    #[test]
    fn test_cancel_clears_everything() {
        let mut tracker = PointerTracker::new();
        tracker.touch_down(0, Point::ZERO, 0);
        tracker.touch_down(1, Point::ZERO, 0);
        tracker.cancel();
        assert!(tracker.is_empty());
        assert_eq!(tracker.count(), 0);
    }
}
