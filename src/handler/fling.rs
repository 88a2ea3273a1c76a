//! Fling gesture - a quick directional swipe
//!
//! Begins on touch and must finish fast: if the pointer covers `min_delta`
//! px along one of the allowed directions before the deadline, the gesture
//! activates and ends in one step. Running out of time or lifting short
//! fails it. Directions combine as a bitmask, so "horizontal" is
//! `RIGHT | LEFT`.

use serde::{Deserialize, Serialize};

use super::{config_f64, config_i64, config_u64, config_usize, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::geom::Point;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent};

/// Allowed fling directions, as a bitmask. Y grows downward, so `UP`
/// means the pointer's y decreased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct FlingDirection(u8);

impl FlingDirection {
    pub const RIGHT: FlingDirection = FlingDirection(1);
    pub const LEFT: FlingDirection = FlingDirection(2);
    pub const UP: FlingDirection = FlingDirection(4);
    pub const DOWN: FlingDirection = FlingDirection(8);

    pub fn from_mask(mask: i64) -> Result<Self, Error> {
        if mask <= 0 || mask > 0xF {
            return Err(Error::BadDirectionMask(mask));
        }
        Ok(FlingDirection(mask as u8))
    }

    pub fn mask(self) -> i64 {
        i64::from(self.0)
    }

    pub fn contains(self, other: FlingDirection) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for FlingDirection {
    type Output = FlingDirection;

    fn bitor(self, rhs: FlingDirection) -> FlingDirection {
        FlingDirection(self.0 | rhs.0)
    }
}

impl TryFrom<i64> for FlingDirection {
    type Error = Error;

    fn try_from(mask: i64) -> Result<Self, Error> {
        FlingDirection::from_mask(mask)
    }
}

impl From<FlingDirection> for i64 {
    fn from(d: FlingDirection) -> i64 {
        d.mask()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlingConfig {
    pub direction: FlingDirection,
    /// Pointers that must be down together during the swipe, exactly
    pub number_of_pointers: usize,
    /// Swipe must complete within this window
    pub max_duration_ms: u64,
    /// Distance (px) the pointer must cover along an allowed direction
    pub min_delta: f64,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            direction: FlingDirection::RIGHT,
            number_of_pointers: 1,
            max_duration_ms: 800,
            min_delta: 160.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct FlingGesture {
    config: FlingConfig,
    start_ms: u64,
    max_simultaneous: usize,
}

impl FlingGesture {
    pub fn with_config(config: FlingConfig) -> Self {
        Self { config, ..Self::default() }
    }

    fn expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) > self.config.max_duration_ms
    }

    fn hits_direction(&self, delta: Point) -> bool {
        let d = self.config.direction;
        let m = self.config.min_delta;
        (d.contains(FlingDirection::RIGHT) && delta.x >= m)
            || (d.contains(FlingDirection::LEFT) && delta.x <= -m)
            || (d.contains(FlingDirection::DOWN) && delta.y >= m)
            || (d.contains(FlingDirection::UP) && delta.y <= -m)
    }
}

impl Gesture for FlingGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Fling
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match *ctx.ev {
            TouchEvent::Down { time_ms, .. } => {
                if ctx.state == State::Undetermined {
                    self.start_ms = time_ms;
                    self.max_simultaneous = ctx.tracker.count();
                    Verdict::Begin
                } else {
                    self.max_simultaneous = self.max_simultaneous.max(ctx.tracker.count());
                    Verdict::Noop
                }
            }
            TouchEvent::Motion { time_ms, .. } => {
                if ctx.state != State::Began {
                    return Verdict::Noop;
                }
                if self.expired(time_ms) {
                    return Verdict::Fail;
                }
                if self.max_simultaneous == self.config.number_of_pointers {
                    if let Some(p) = ctx.tracker.primary() {
                        if self.hits_direction(p.delta()) {
                            return Verdict::ActivateAndEnd;
                        }
                    }
                }
                Verdict::Noop
            }
            TouchEvent::Up { time_ms, .. } => {
                if ctx.state != State::Began {
                    return Verdict::Noop;
                }
                // Last chance: the lifting pointer may have completed the swipe
                if !self.expired(time_ms)
                    && self.max_simultaneous == self.config.number_of_pointers
                {
                    if let Some(l) = ctx.lifted {
                        if self.hits_direction(l.delta()) {
                            return Verdict::ActivateAndEnd;
                        }
                    }
                }
                if ctx.tracker.is_empty() {
                    Verdict::Fail
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Cancel { .. } => Verdict::Noop,
        }
    }

    fn on_tick(&mut self, _tracker: &PointerTracker, state: State, now_ms: u64) -> Verdict {
        if state == State::Began && self.expired(now_ms) {
            Verdict::Fail
        } else {
            Verdict::Noop
        }
    }

    fn reset(&mut self) {
        self.start_ms = 0;
        self.max_simultaneous = 0;
    }

    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(mask) = config_i64(config, "direction")? {
            self.config.direction = FlingDirection::from_mask(mask)?;
        }
        if let Some(n) = config_usize(config, "numberOfPointers")? {
            self.config.number_of_pointers = n.max(1);
        }
        if let Some(ms) = config_u64(config, "maxDurationMs")? {
            self.config.max_duration_ms = ms;
        }
        if let Some(d) = config_f64(config, "minDelta")? {
            self.config.min_delta = d;
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
    fn test_fling_right_activates_and_ends() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        assert_eq!(handler.state(), State::Began);

        let events = handler.on_touch(&motion(0, 200.0, 0.0, 100));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Active.code()));
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_fling_wrong_direction_fails_on_lift() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&motion(0, -200.0, 0.0, 100));
        assert_eq!(handler.state(), State::Began);

        let events = handler.on_touch(&up(0, 150));
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_fling_deadline_fails() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));

        let events = handler.tick(900);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_fling_direction_mask_combines() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("direction", (FlingDirection::LEFT | FlingDirection::UP).mask());
        handler.apply_config(&cfg).unwrap();

        handler.on_touch(&down(0, 100.0, 300.0, 0));
        let events = handler.on_touch(&motion(0, 100.0, 100.0, 80));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_fling_motion_past_deadline_fails() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        handler.on_touch(&down(0, 0.0, 0.0, 0));
        let events = handler.on_touch(&motion(0, 300.0, 0.0, 900));
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_fling_pointer_count_must_match_exactly() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("numberOfPointers", 2_i64);
        handler.apply_config(&cfg).unwrap();

        handler.on_touch(&down(0, 0.0, 0.0, 0));
        handler.on_touch(&motion(0, 300.0, 0.0, 100));
        assert_eq!(handler.state(), State::Began);
        let events = handler.on_touch(&up(0, 150));
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_fling_rejects_bad_direction_mask() {
        let mut handler = GestureHandler::new(HandlerKind::Fling, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("direction", 0_i64);
        assert!(handler.apply_config(&cfg).is_err());

        let mut cfg = EventDataMap::new();
        cfg.insert("direction", 16_i64);
        assert!(handler.apply_config(&cfg).is_err());
    }
}
