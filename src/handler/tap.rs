//! Tap gesture - one or more quick touches in place
//!
//! Begins on the first touch and stays in Began across the whole sequence.
//! Each tap must stay inside the distance slop and lift within the press
//! deadline; consecutive taps must land within the delay deadline. When the
//! configured count is reached the gesture activates and ends in one step.
//! Deadlines are enforced by the host clock (`tick`) and re-checked against
//! event timestamps so replayed traces behave the same at any tick rate.

use serde::{Deserialize, Serialize};

use super::{config_f64, config_u64, config_usize, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent, TouchPoint};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    pub number_of_taps: u32,
    /// How long a single press may last
    pub max_duration_ms: u64,
    /// Longest allowed gap between taps
    pub max_delay_ms: u64,
    pub max_dist: f64,
    pub max_delta_x: Option<f64>,
    pub max_delta_y: Option<f64>,
    /// Pointers that must touch down together during each tap
    pub min_pointers: usize,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            number_of_taps: 1,
            max_duration_ms: 500,
            max_delay_ms: 500,
            max_dist: 10.0,
            max_delta_x: None,
            max_delta_y: None,
            min_pointers: 1,
        }
    }
}

#[derive(Debug, Default)]
pub struct TapGesture {
    config: TapConfig,
    taps_so_far: u32,
    tap_start_ms: u64,
    deadline_ms: Option<u64>,
    max_simultaneous: usize,
}

impl TapGesture {
    pub fn with_config(config: TapConfig) -> Self {
        Self { config, ..Self::default() }
    }

    fn drift_exceeded(&self, p: &TouchPoint) -> bool {
        let d = p.delta();
        if let Some(mx) = self.config.max_delta_x {
            if d.x.abs() > mx {
                return true;
            }
        }
        if let Some(my) = self.config.max_delta_y {
            if d.y.abs() > my {
                return true;
            }
        }
        p.distance() > self.config.max_dist
    }
}

impl Gesture for TapGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Tap
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match *ctx.ev {
            TouchEvent::Down { time_ms, .. } => {
                if ctx.state == State::Undetermined {
                    self.tap_start_ms = time_ms;
                    self.deadline_ms = Some(time_ms + self.config.max_duration_ms);
                    self.max_simultaneous = ctx.tracker.count();
                    return Verdict::Begin;
                }
                if ctx.tracker.count() == 1 {
                    // First touch of the next tap in the sequence
                    if let Some(d) = self.deadline_ms {
                        if time_ms > d {
                            return Verdict::Fail;
                        }
                    }
                    self.tap_start_ms = time_ms;
                    self.deadline_ms = Some(time_ms + self.config.max_duration_ms);
                }
                self.max_simultaneous = self.max_simultaneous.max(ctx.tracker.count());
                Verdict::Noop
            }
            TouchEvent::Motion { id, .. } => {
                if ctx.state == State::Began {
                    if let Some(p) = ctx.tracker.get(id) {
                        if self.drift_exceeded(p) {
                            return Verdict::Fail;
                        }
                    }
                }
                Verdict::Noop
            }
            TouchEvent::Up { time_ms, .. } => {
                if ctx.state != State::Began {
                    return Verdict::Noop;
                }
                // An up that removed no tracked pointer is not part of the
                // sequence; between taps the tracker is empty, so falling
                // through here would judge a tap that never happened
                let lifted = match ctx.lifted {
                    Some(l) => l,
                    None => return Verdict::Noop,
                };
                if self.drift_exceeded(lifted) {
                    return Verdict::Fail;
                }
                if !ctx.tracker.is_empty() {
                    return Verdict::Noop;
                }
                // The tap is complete once every pointer has lifted
                if time_ms.saturating_sub(self.tap_start_ms) > self.config.max_duration_ms {
                    return Verdict::Fail;
                }
                if self.max_simultaneous < self.config.min_pointers {
                    return Verdict::Fail;
                }
                self.taps_so_far += 1;
                if self.taps_so_far >= self.config.number_of_taps {
                    self.deadline_ms = None;
                    Verdict::ActivateAndEnd
                } else {
                    self.deadline_ms = Some(time_ms + self.config.max_delay_ms);
                    self.max_simultaneous = 0;
                    Verdict::Noop
                }
            }
            TouchEvent::Cancel { .. } => Verdict::Noop,
        }
    }

    fn on_tick(&mut self, _tracker: &PointerTracker, state: State, now_ms: u64) -> Verdict {
        if state == State::Began {
            if let Some(d) = self.deadline_ms {
                if now_ms > d {
                    return Verdict::Fail;
                }
            }
        }
        Verdict::Noop
    }

    fn reset(&mut self) {
        self.taps_so_far = 0;
        self.tap_start_ms = 0;
        self.deadline_ms = None;
        self.max_simultaneous = 0;
    }

    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(n) = config_usize(config, "numberOfTaps")? {
            self.config.number_of_taps = (n as u32).max(1);
        }
        if let Some(ms) = config_u64(config, "maxDurationMs")? {
            self.config.max_duration_ms = ms;
        }
        if let Some(ms) = config_u64(config, "maxDelayMs")? {
            self.config.max_delay_ms = ms;
        }
        if let Some(d) = config_f64(config, "maxDist")? {
            self.config.max_dist = d;
        }
        if let Some(d) = config_f64(config, "maxDeltaX")? {
            self.config.max_delta_x = Some(d);
        }
        if let Some(d) = config_f64(config, "maxDeltaY")? {
            self.config.max_delta_y = Some(d);
        }
        if let Some(n) = config_usize(config, "minPointers")? {
            self.config.min_pointers = n.max(1);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
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
    fn test_single_tap_activates_and_ends() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);

        let events = handler.on_touch(&down(0, 50.0, 50.0, 0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Began.code()));

        let events = handler.on_touch(&up(0, 120));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Active.code()));
        assert_eq!(events[0].payload().get_i64("oldState"), Some(State::Began.code()));
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
        assert_eq!(events[1].payload().get_i64("oldState"), Some(State::Active.code()));
        assert_eq!(handler.state(), State::Undetermined);
    }

    #[test]
    fn test_tap_payload_carries_position() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        handler.on_touch(&down(0, 50.0, 60.0, 0));
        let events = handler.on_touch(&up(0, 100));
        let payload = events[0].payload();
        assert_eq!(payload.get_f64("absoluteX"), Some(50.0));
        assert_eq!(payload.get_f64("absoluteY"), Some(60.0));
    }

    #[test]
    fn test_double_tap() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("numberOfTaps", 2_i64);
        handler.apply_config(&cfg).unwrap();

        handler.on_touch(&down(0, 50.0, 50.0, 0));
        assert!(handler.on_touch(&up(0, 80)).is_empty());
        assert_eq!(handler.state(), State::Began);

        handler.on_touch(&down(0, 52.0, 50.0, 200));
        let events = handler.on_touch(&up(0, 260));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_stray_up_between_taps_is_ignored() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("numberOfTaps", 2_i64);
        handler.apply_config(&cfg).unwrap();

        handler.on_touch(&down(0, 50.0, 50.0, 0));
        handler.on_touch(&up(0, 80));
        assert_eq!(handler.state(), State::Began);

        // An up for a pointer this handler never tracked must not be
        // judged as a tap
        assert!(handler.on_touch(&up(9, 120)).is_empty());
        assert_eq!(handler.state(), State::Began);

        // The real second tap still completes the sequence
        handler.on_touch(&down(0, 52.0, 50.0, 200));
        let events = handler.on_touch(&up(0, 260));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
    }

    #[test]
    fn test_tap_fails_when_held_past_deadline() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        handler.on_touch(&down(0, 50.0, 50.0, 0));

        let events = handler.tick(600);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_tap_long_press_fails_on_up_without_tick() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        handler.on_touch(&down(0, 50.0, 50.0, 0));
        let events = handler.on_touch(&up(0, 800));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_tap_drift_fails() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        handler.on_touch(&down(0, 50.0, 50.0, 0));
        let events = handler.on_touch(&motion(0, 80.0, 50.0, 40));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
    }

    #[test]
    fn test_double_tap_delay_expiry_fails() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("numberOfTaps", 2_i64);
        handler.apply_config(&cfg).unwrap();

        handler.on_touch(&down(0, 50.0, 50.0, 0));
        handler.on_touch(&up(0, 80));

        let events = handler.tick(700);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));
        assert_eq!(handler.state(), State::Undetermined);
    }

    #[test]
    fn test_two_finger_tap_needs_both_pointers() {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 1);
        let mut cfg = EventDataMap::new();
        cfg.insert("minPointers", 2_i64);
        handler.apply_config(&cfg).unwrap();

        // One finger only: the tap fails on lift
        handler.on_touch(&down(0, 50.0, 50.0, 0));
        let events = handler.on_touch(&up(0, 90));
        assert_eq!(events[0].payload().get_i64("state"), Some(State::Failed.code()));

        // Two fingers together succeed
        handler.on_touch(&down(0, 50.0, 50.0, 200));
        handler.on_touch(&down(1, 70.0, 50.0, 210));
        handler.on_touch(&up(0, 280));
        let events = handler.on_touch(&up(1, 290));
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].payload().get_i64("state"), Some(State::End.code()));
    }
}
