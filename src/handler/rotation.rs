//! Rotation gesture - two-finger twist tracking
//!
//! Tracks the signed, accumulated angle of the segment between the first
//! two pointers, unwrapped so crossing the atan2 branch cut never produces
//! a jump. Activates once the magnitude clears the slop. The anchor point
//! reported is the midpoint of the segment.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{config_f64, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::geom::Point;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Accumulated angle (radians) required before the gesture activates
    pub angle_slop: f64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { angle_slop: 0.05 }
    }
}

/// Shift an angle delta into (-pi, pi]
fn wrap_angle(mut a: f64) -> f64 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

#[derive(Debug, Default)]
pub struct RotationGesture {
    config: RotationConfig,
    rotation: f64,
    velocity: f64,
    anchor: Point,
    last_angle: f64,
    last_rotation: f64,
    last_time_ms: u64,
}

impl RotationGesture {
    pub fn with_config(config: RotationConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Accumulated rotation since the gesture began, radians.
    /// Positive is clockwise in a y-down coordinate system.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Rate of rotation, radians per second
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn anchor_x(&self) -> f64 {
        self.anchor.x
    }

    pub fn anchor_y(&self) -> f64 {
        self.anchor.y
    }

    /// Re-read the segment after a pointer change, keeping the rotation
    fn rebase(&mut self, tracker: &PointerTracker) {
        if let Some(a) = tracker.span_angle() {
            self.last_angle = a;
        }
        if let Some(m) = tracker.span_midpoint() {
            self.anchor = m;
        }
    }
}

impl Gesture for RotationGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Rotation
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match *ctx.ev {
            TouchEvent::Down { time_ms, .. } => {
                if ctx.state == State::Undetermined && ctx.tracker.count() == 2 {
                    if let Some(angle) = ctx.tracker.span_angle() {
                        self.rotation = 0.0;
                        self.last_rotation = 0.0;
                        self.last_angle = angle;
                        self.last_time_ms = time_ms;
                        if let Some(m) = ctx.tracker.span_midpoint() {
                            self.anchor = m;
                        }
                        return Verdict::Begin;
                    }
                }
                Verdict::Noop
            }
            TouchEvent::Motion { time_ms, .. } => {
                let angle = match ctx.tracker.span_angle() {
                    Some(a) => a,
                    None => return Verdict::Noop,
                };
                self.rotation += wrap_angle(angle - self.last_angle);
                self.last_angle = angle;
                let dt = time_ms.saturating_sub(self.last_time_ms) as f64 / 1000.0;
                if dt > 0.001 {
                    self.velocity = (self.rotation - self.last_rotation) / dt;
                    self.last_rotation = self.rotation;
                    self.last_time_ms = time_ms;
                }
                if let Some(m) = ctx.tracker.span_midpoint() {
                    self.anchor = m;
                }
                if ctx.state == State::Began && self.rotation.abs() > self.config.angle_slop {
                    Verdict::Activate
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Up { .. } => {
                if ctx.tracker.count() < 2 {
                    match ctx.state {
                        State::Active => Verdict::End,
                        State::Began => Verdict::Fail,
                        _ => Verdict::Noop,
                    }
                } else {
                    self.rebase(ctx.tracker);
                    Verdict::Noop
                }
            }
            TouchEvent::Cancel { .. } => Verdict::Noop,
        }
    }

    fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self { config, ..Self::default() };
    }

    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(s) = config_f64(config, "angleSlop")? {
            self.config.angle_slop = s;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::GestureHandler;

    fn down(id: i32, x: f64, y: f64, t: u64) -> TouchEvent {
        TouchEvent::Down { id, position: Point::new(x, y), time_ms: t }
    }

    fn motion(id: i32, x: f64, y: f64, t: u64) -> TouchEvent {
        TouchEvent::Motion { id, position: Point::new(x, y), time_ms: t }
    }

    fn up(id: i32, t: u64) -> TouchEvent {
        TouchEvent::Up { id, time_ms: t }
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        assert_eq!(handler.state(), State::Began);

        // Swing the second finger from 0 to 90 degrees around the first
        handler.on_touch(&motion(1, 70.71, 70.71, 50));
        assert_eq!(handler.state(), State::Active);
        let events = handler.on_touch(&motion(1, 0.0, 100.0, 100));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("rotation").unwrap() - PI / 2.0).abs() < 0.01);
        // pi/4 radians over the last 50 ms
        assert!((payload.get_f64("velocity").unwrap() - PI / 4.0 / 0.05).abs() < 0.5);
    }

    #[test]
    fn test_rotation_anchor_is_segment_midpoint() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        let events = handler.on_touch(&motion(1, 0.0, 100.0, 50));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("anchorX").unwrap() - 0.0).abs() < 0.001);
        assert!((payload.get_f64("anchorY").unwrap() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_rotation_unwraps_across_branch_cut() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        // Second finger at 135 degrees
        handler.on_touch(&down(1, -70.71, 70.71, 0));
        // Jump to -135 degrees: the short way round is +90, not -270
        let events = handler.on_touch(&motion(1, -70.71, -70.71, 50));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("rotation").unwrap() - PI / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_rotation_below_slop_stays_began() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        handler.on_touch(&motion(1, 100.0, 2.0, 30));
        assert_eq!(handler.state(), State::Began);
    }

    #[test]
    fn test_rotation_lift_ends_when_active() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        handler.on_touch(&motion(1, 0.0, 100.0, 50));
        assert_eq!(handler.state(), State::Active);

        let events = handler.on_touch(&up(0, 80));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_rotation_survives_pointer_swap() {
        let mut handler = GestureHandler::new(HandlerKind::Rotation, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        handler.on_touch(&motion(1, 0.0, 100.0, 50));
        assert_eq!(handler.state(), State::Active);

        // Third finger joins, second lifts; the segment is now measured
        // against finger 2 but the accumulated rotation must not jump
        handler.on_touch(&down(2, -50.0, 0.0, 60));
        let events = handler.on_touch(&up(1, 80));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("rotation").unwrap() - PI / 2.0).abs() < 0.01);

        // And keeps accumulating from the new segment
        let events = handler.on_touch(&motion(2, 0.0, -50.0, 100));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("rotation").unwrap() - PI).abs() < 0.01);
    }
}
