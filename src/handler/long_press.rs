//! Long-press gesture - touch held in place
//!
//! Begins on touch and activates from the host clock once the press has
//! lasted `min_duration_ms`. Drifting outside the slop fails the gesture,
//! or cancels it if it already activated. The payload reports how long the
//! press has been held.

use serde::{Deserialize, Serialize};

use super::{config_f64, config_u64, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPressConfig {
    pub min_duration_ms: u64,
    pub max_dist: f64,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self { min_duration_ms: 500, max_dist: 10.0 }
    }
}

#[derive(Debug, Default)]
pub struct LongPressGesture {
    config: LongPressConfig,
    press_start_ms: u64,
    last_ms: u64,
}

impl LongPressGesture {
    pub fn with_config(config: LongPressConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// How long the press has been held, as of the last event seen
    pub fn duration_ms(&self) -> u64 {
        self.last_ms.saturating_sub(self.press_start_ms)
    }
}

impl Gesture for LongPressGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::LongPress
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match *ctx.ev {
            TouchEvent::Down { time_ms, .. } => {
                if ctx.state == State::Undetermined {
                    self.press_start_ms = time_ms;
                    self.last_ms = time_ms;
                    Verdict::Begin
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Motion { id, time_ms, .. } => {
                self.last_ms = time_ms;
                if let Some(p) = ctx.tracker.get(id) {
                    if p.distance() > self.config.max_dist {
                        return match ctx.state {
                            State::Active => Verdict::Cancel,
                            State::Began => Verdict::Fail,
                            _ => Verdict::Noop,
                        };
                    }
                }
                Verdict::Noop
            }
            TouchEvent::Up { time_ms, .. } => {
                self.last_ms = time_ms;
                if ctx.tracker.is_empty() {
                    match ctx.state {
                        State::Active => Verdict::End,
                        State::Began => Verdict::Fail,
                        _ => Verdict::Noop,
                    }
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Cancel { .. } => Verdict::Noop,
        }
    }

    fn on_tick(&mut self, _tracker: &PointerTracker, state: State, now_ms: u64) -> Verdict {
        if state == State::Began
            && now_ms.saturating_sub(self.press_start_ms) >= self.config.min_duration_ms
        {
            self.last_ms = now_ms;
            return Verdict::Activate;
        }
        Verdict::Noop
    }

    fn reset(&mut self) {
        self.press_start_ms = 0;
        self.last_ms = 0;
    }

    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(ms) = config_u64(config, "minDurationMs")? {
            self.config.min_duration_ms = ms;
        }
        if let Some(d) = config_f64(config, "maxDist")? {
            self.config.max_dist = d;
        }
        Ok(())
    }
}
