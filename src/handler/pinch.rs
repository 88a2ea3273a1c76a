//! Pinch gesture - two-finger scale tracking
//!
//! Begins when a second pointer lands. Scale is the ratio of the current
//! two-pointer span to the span at that moment, and the gesture activates
//! once the span has changed by more than the slop. Pointer changes rebase
//! the reference span so the reported scale stays continuous.

use serde::{Deserialize, Serialize};

use super::{config_f64, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::geom::Point;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Span change (px) required before the gesture activates
    pub span_slop: f64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self { span_slop: 8.0 }
    }
}

#[derive(Debug)]
pub struct PinchGesture {
    config: PinchConfig,
    initial_span: f64,
    scale: f64,
    velocity: f64,
    focal: Point,
    last_scale: f64,
    last_time_ms: u64,
}

impl Default for PinchGesture {
    fn default() -> Self {
        Self {
            config: PinchConfig::default(),
            initial_span: 0.0,
            scale: 1.0,
            velocity: 0.0,
            focal: Point::ZERO,
            last_scale: 1.0,
            last_time_ms: 0,
        }
    }
}

impl PinchGesture {
    pub fn with_config(config: PinchConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rate of scale change, per second
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn focal_x(&self) -> f64 {
        self.focal.x
    }

    pub fn focal_y(&self) -> f64 {
        self.focal.y
    }

    /// Pick a reference span that preserves the current scale
    fn rebase(&mut self, tracker: &PointerTracker) {
        if let Some(span) = tracker.span() {
            if self.scale.abs() > f64::EPSILON {
                self.initial_span = span / self.scale;
            }
        }
        if let Some(c) = tracker.centroid() {
            self.focal = c;
        }
    }
}

impl Gesture for PinchGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Pinch
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match *ctx.ev {
            TouchEvent::Down { time_ms, .. } => {
                if ctx.state == State::Undetermined && ctx.tracker.count() == 2 {
                    if let Some(span) = ctx.tracker.span() {
                        self.initial_span = span;
                        self.scale = 1.0;
                        self.last_scale = 1.0;
                        self.last_time_ms = time_ms;
                        if let Some(c) = ctx.tracker.centroid() {
                            self.focal = c;
                        }
                        return Verdict::Begin;
                    }
                }
                if ctx.tracker.count() > 2 {
                    self.rebase(ctx.tracker);
                }
                Verdict::Noop
            }
            TouchEvent::Motion { time_ms, .. } => {
                let span = match ctx.tracker.span() {
                    Some(s) => s,
                    None => return Verdict::Noop,
                };
                if self.initial_span <= f64::EPSILON {
                    return Verdict::Noop;
                }
                self.scale = span / self.initial_span;
                let dt = time_ms.saturating_sub(self.last_time_ms) as f64 / 1000.0;
                if dt > 0.001 {
                    self.velocity = (self.scale - self.last_scale) / dt;
                    self.last_scale = self.scale;
                    self.last_time_ms = time_ms;
                }
                if let Some(c) = ctx.tracker.centroid() {
                    self.focal = c;
                }
                if ctx.state == State::Began && (span - self.initial_span).abs() > self.config.span_slop
                {
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
        if let Some(s) = config_f64(config, "spanSlop")? {
            self.config.span_slop = s;
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
    fn test_pinch_begins_on_second_pointer() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        assert!(handler.on_touch(&down(0, 100.0, 100.0, 0)).is_empty());
        assert_eq!(handler.state(), State::Undetermined);

        let events = handler.on_touch(&down(1, 200.0, 100.0, 10));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Began.code()));
    }

    #[test]
    fn test_pinch_scale_focal_velocity() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        handler.on_touch(&down(0, 100.0, 100.0, 0));
        handler.on_touch(&down(1, 200.0, 100.0, 0));

        // Span 100 -> 200 over 100 ms
        let events = handler.on_touch(&motion(1, 300.0, 100.0, 100));
        assert_eq!(handler.state(), State::Active);
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("scale").unwrap() - 2.0).abs() < 0.001);
        assert!((payload.get_f64("focalX").unwrap() - 200.0).abs() < 0.001);
        assert!((payload.get_f64("focalY").unwrap() - 100.0).abs() < 0.001);
        assert!((payload.get_f64("velocity").unwrap() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_pinch_small_span_change_does_not_activate() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        handler.on_touch(&down(0, 100.0, 100.0, 0));
        handler.on_touch(&down(1, 200.0, 100.0, 0));
        handler.on_touch(&motion(1, 205.0, 100.0, 50));
        assert_eq!(handler.state(), State::Began);
    }

    #[test]
    fn test_pinch_lift_ends_when_active() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        handler.on_touch(&down(0, 100.0, 100.0, 0));
        handler.on_touch(&down(1, 200.0, 100.0, 0));
        handler.on_touch(&motion(1, 300.0, 100.0, 100));
        assert_eq!(handler.state(), State::Active);

        let events = handler.on_touch(&up(1, 150));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_pinch_lift_before_activation_fails() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        handler.on_touch(&down(0, 100.0, 100.0, 0));
        handler.on_touch(&down(1, 200.0, 100.0, 0));
        let events = handler.on_touch(&up(1, 40));
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_pinch_scale_survives_pointer_swap() {
        let mut handler = GestureHandler::new(HandlerKind::Pinch, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&down(1, 100.0, 0.0, 0));
        handler.on_touch(&down(2, 0.0, 100.0, 10));
        handler.on_touch(&motion(1, 200.0, 0.0, 100));
        assert_eq!(handler.state(), State::Active);

        // Second finger lifts; span is now measured against finger 2 but
        // the scale must not jump
        let events = handler.on_touch(&up(1, 150));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("scale").unwrap() - 2.0).abs() < 0.001);

        // Scale keeps compounding from there
        let events = handler.on_touch(&motion(2, 0.0, 150.0, 200));
        let payload = events.last().unwrap().payload();
        assert!((payload.get_f64("scale").unwrap() - 3.0).abs() < 0.001);
    }
}
