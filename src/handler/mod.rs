//! Gesture handlers - stateful recognizers, one per gesture type
//!
//! This module provides:
//! - The `Gesture` trait: per-variant recognition behavior
//! - `Handler<G>`: the generic handler wrapper (tag, lifecycle state,
//!   pointer tracking, event emission)
//! - `GestureHandler`: the tagged enum over all built-in variants
//!
//! A handler is driven entirely by the host: `on_touch` for the raw touch
//! stream and `tick` for time-based transitions (long-press activation, tap
//! sequence expiry, fling deadlines). It emits a state-change event for
//! every lifecycle transition and an update event for every touch seen
//! while active, then resets silently once the sequence is over.

mod fling;
mod long_press;
mod pan;
mod pinch;
mod rotation;
mod tap;

pub use fling::{FlingConfig, FlingDirection, FlingGesture};
pub use long_press::{LongPressConfig, LongPressGesture};
pub use pan::{PanConfig, PanGesture};
pub use pinch::{PinchConfig, PinchGesture};
pub use rotation::{RotationConfig, RotationGesture};
pub use tap::{TapConfig, TapGesture};

use tracing::{debug, warn};

use crate::error::Error;
use crate::event::{self, HandlerEvent};
use crate::geom::Point;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::{PointerTracker, TouchEvent, TouchPoint};

/// The built-in gesture types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Pan,
    Tap,
    LongPress,
    Pinch,
    Rotation,
    Fling,
}

impl HandlerKind {
    pub const ALL: [HandlerKind; 6] = [
        HandlerKind::Pan,
        HandlerKind::Tap,
        HandlerKind::LongPress,
        HandlerKind::Pinch,
        HandlerKind::Rotation,
        HandlerKind::Fling,
    ];

    /// Stable name used in traces, configs and host-facing APIs
    pub fn name(self) -> &'static str {
        match self {
            HandlerKind::Pan => "pan",
            HandlerKind::Tap => "tap",
            HandlerKind::LongPress => "long_press",
            HandlerKind::Pinch => "pinch",
            HandlerKind::Rotation => "rotation",
            HandlerKind::Fling => "fling",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, Error> {
        match name {
            "pan" => Ok(HandlerKind::Pan),
            "tap" => Ok(HandlerKind::Tap),
            "long_press" => Ok(HandlerKind::LongPress),
            "pinch" => Ok(HandlerKind::Pinch),
            "rotation" => Ok(HandlerKind::Rotation),
            "fling" => Ok(HandlerKind::Fling),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What a recognizer asks its handler to do after seeing an event.
///
/// `ActivateAndEnd` is the single-shot pattern used by tap and fling: the
/// gesture both activates and completes on the same touch event, producing
/// two back-to-back state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Noop,
    Begin,
    Activate,
    ActivateAndEnd,
    End,
    Fail,
    Cancel,
}

/// Context handed to a recognizer for each touch event.
///
/// `lifted` carries the final track of the pointer a `TouchEvent::Up` just
/// removed - the tracker no longer holds it, but tap/long-press decisions
/// need its press duration and drift.
pub struct TouchCtx<'a> {
    pub ev: &'a TouchEvent,
    pub tracker: &'a PointerTracker,
    pub lifted: Option<&'a TouchPoint>,
    pub state: State,
}

/// Per-variant recognition behavior.
///
/// Implementations own their config and motion bookkeeping only; lifecycle
/// state, pointer tracking and event emission live in [`Handler`].
pub trait Gesture {
    fn kind(&self) -> HandlerKind;

    /// React to one touch event. The tracker has already been updated.
    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict;

    /// React to the host clock. Default: nothing is time-driven.
    fn on_tick(&mut self, _tracker: &PointerTracker, _state: State, _now_ms: u64) -> Verdict {
        Verdict::Noop
    }

    /// Clear motion bookkeeping for the next recognition cycle
    fn reset(&mut self);

    /// Apply host-supplied config keys. Unknown keys are ignored; a known
    /// key with the wrong value type is an error.
    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error>;
}

/// State transitions produced by one `on_touch`/`tick` call, before they
/// are packaged into host events.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub transitions: Vec<(State, State)>,
    pub emit_update: bool,
}

/// A gesture handler: one recognizer instance with a host-visible tag.
///
/// Generic over the gesture behavior, mirroring the per-variant typing of
/// the extractor seam - `EventDataExtractor<Handler<PanGesture>>` can only
/// ever be handed a pan handler.
#[derive(Debug)]
pub struct Handler<G> {
    tag: i32,
    state: State,
    enabled: bool,
    origin: Point,
    last_pos: Point,
    tracker: PointerTracker,
    gesture: G,
}

impl<G: Gesture> Handler<G> {
    pub fn new(tag: i32, gesture: G) -> Self {
        Self {
            tag,
            state: State::Undetermined,
            enabled: true,
            origin: Point::ZERO,
            last_pos: Point::ZERO,
            tracker: PointerTracker::new(),
            gesture,
        }
    }

    pub fn tag(&self) -> i32 {
        self.tag
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn kind(&self) -> HandlerKind {
        self.gesture.kind()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn gesture(&self) -> &G {
        &self.gesture
    }

    /// Origin the relative `x`/`y` coordinates are reported against.
    /// Defaults to (0, 0), which makes them equal to the absolute ones.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Last known primary-pointer position, relative to the origin
    pub fn x(&self) -> f64 {
        self.last_pos.x - self.origin.x
    }

    pub fn y(&self) -> f64 {
        self.last_pos.y - self.origin.y
    }

    /// Last known primary-pointer position in host screen coordinates
    pub fn absolute_x(&self) -> f64 {
        self.last_pos.x
    }

    pub fn absolute_y(&self) -> f64 {
        self.last_pos.y
    }

    pub fn pointer_count(&self) -> usize {
        self.tracker.count()
    }

    /// Apply a config map: `enabled` here, everything else in the variant
    pub fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(value) = config.get("enabled") {
            self.enabled = value
                .as_bool()
                .ok_or_else(|| Error::bad_config("enabled", "boolean", value.type_name()))?;
        }
        self.gesture.apply_config(config)
    }

    pub(crate) fn process_touch(&mut self, ev: &TouchEvent) -> Outcome {
        let mut outcome = Outcome::default();

        // A handler disabled mid-gesture cancels on the next event it sees
        if !self.enabled {
            if matches!(self.state, State::Began | State::Active) {
                self.transition(State::Cancelled, &mut outcome);
            }
            self.tracker.cancel();
            return outcome;
        }

        let mut lifted = None;
        match *ev {
            TouchEvent::Down { id, position, time_ms } => {
                self.tracker.touch_down(id, position, time_ms);
            }
            TouchEvent::Motion { id, position, time_ms } => {
                self.tracker.touch_motion(id, position, time_ms);
            }
            TouchEvent::Up { id, .. } => {
                lifted = self.tracker.touch_up(id);
            }
            TouchEvent::Cancel { .. } => {
                if matches!(self.state, State::Began | State::Active) {
                    self.transition(State::Cancelled, &mut outcome);
                }
                self.tracker.cancel();
                return outcome;
            }
        }

        // Keep the payload position fresh, including the final Up position
        if let Some(p) = self.tracker.primary() {
            self.last_pos = p.current_pos;
        } else if let Some(l) = &lifted {
            self.last_pos = l.current_pos;
        }

        if !self.state.is_terminal() {
            let ctx = TouchCtx {
                ev,
                tracker: &self.tracker,
                lifted: lifted.as_ref(),
                state: self.state,
            };
            let verdict = self.gesture.on_touch(&ctx);
            self.apply_verdict(verdict, &mut outcome);

            // Active handlers report every touch they see
            if self.state == State::Active {
                outcome.emit_update = true;
            }
        }

        outcome
    }

    pub(crate) fn process_tick(&mut self, now_ms: u64) -> Outcome {
        let mut outcome = Outcome::default();
        if self.enabled && !self.state.is_terminal() {
            let verdict = self.gesture.on_tick(&self.tracker, self.state, now_ms);
            self.apply_verdict(verdict, &mut outcome);
        }
        outcome
    }

    fn apply_verdict(&mut self, verdict: Verdict, outcome: &mut Outcome) {
        match verdict {
            Verdict::Noop => {}
            Verdict::Begin => self.transition(State::Began, outcome),
            Verdict::Activate => self.transition(State::Active, outcome),
            Verdict::ActivateAndEnd => {
                self.transition(State::Active, outcome);
                self.transition(State::End, outcome);
            }
            Verdict::End => self.transition(State::End, outcome),
            Verdict::Fail => self.transition(State::Failed, outcome),
            Verdict::Cancel => self.transition(State::Cancelled, outcome),
        }
    }

    fn transition(&mut self, next: State, outcome: &mut Outcome) {
        if !self.state.can_transition_to(next) {
            warn!(
                tag = self.tag,
                from = self.state.name(),
                to = next.name(),
                "ignoring illegal state transition"
            );
            return;
        }
        let old = self.state;
        self.state = next;
        debug!(tag = self.tag, from = old.name(), to = next.name(), "state transition");
        outcome.transitions.push((old, next));
    }

    /// Once a finished handler has no pointers left, rearm it silently.
    /// Runs after the terminal event has been packaged so the payload still
    /// reads the final gesture values.
    pub(crate) fn finish_cycle(&mut self) {
        if self.state.is_terminal() && self.tracker.is_empty() {
            self.state = State::Undetermined;
            self.gesture.reset();
        }
    }
}

/// Tagged-variant view over the built-in handlers. This is the type the
/// registry stores and the dispatch-table extractor matches on.
#[derive(Debug)]
pub enum GestureHandler {
    Pan(Handler<PanGesture>),
    Tap(Handler<TapGesture>),
    LongPress(Handler<LongPressGesture>),
    Pinch(Handler<PinchGesture>),
    Rotation(Handler<RotationGesture>),
    Fling(Handler<FlingGesture>),
}

macro_rules! each_handler {
    ($self:expr, $h:ident => $body:expr) => {
        match $self {
            GestureHandler::Pan($h) => $body,
            GestureHandler::Tap($h) => $body,
            GestureHandler::LongPress($h) => $body,
            GestureHandler::Pinch($h) => $body,
            GestureHandler::Rotation($h) => $body,
            GestureHandler::Fling($h) => $body,
        }
    };
}

impl GestureHandler {
    /// Build a fresh handler of the given kind with default config
    pub fn new(kind: HandlerKind, tag: i32) -> Self {
        match kind {
            HandlerKind::Pan => GestureHandler::Pan(Handler::new(tag, PanGesture::default())),
            HandlerKind::Tap => GestureHandler::Tap(Handler::new(tag, TapGesture::default())),
            HandlerKind::LongPress => {
                GestureHandler::LongPress(Handler::new(tag, LongPressGesture::default()))
            }
            HandlerKind::Pinch => GestureHandler::Pinch(Handler::new(tag, PinchGesture::default())),
            HandlerKind::Rotation => {
                GestureHandler::Rotation(Handler::new(tag, RotationGesture::default()))
            }
            HandlerKind::Fling => GestureHandler::Fling(Handler::new(tag, FlingGesture::default())),
        }
    }

    pub fn tag(&self) -> i32 {
        each_handler!(self, h => h.tag())
    }

    pub fn state(&self) -> State {
        each_handler!(self, h => h.state())
    }

    pub fn kind(&self) -> HandlerKind {
        each_handler!(self, h => h.kind())
    }

    pub fn enabled(&self) -> bool {
        each_handler!(self, h => h.enabled())
    }

    pub fn set_origin(&mut self, origin: Point) {
        each_handler!(self, h => h.set_origin(origin))
    }

    pub fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        each_handler!(self, h => h.apply_config(config))
    }

    /// Feed one touch event; returns the events to deliver to the host,
    /// in emission order
    pub fn on_touch(&mut self, ev: &TouchEvent) -> Vec<HandlerEvent> {
        let outcome = each_handler!(self, h => h.process_touch(ev));
        let events = self.package(outcome);
        each_handler!(self, h => h.finish_cycle());
        events
    }

    /// Advance the host clock; returns any time-driven events
    pub fn tick(&mut self, now_ms: u64) -> Vec<HandlerEvent> {
        let outcome = each_handler!(self, h => h.process_tick(now_ms));
        let events = self.package(outcome);
        each_handler!(self, h => h.finish_cycle());
        events
    }

    fn package(&self, outcome: Outcome) -> Vec<HandlerEvent> {
        let mut events = Vec::with_capacity(outcome.transitions.len() + 1);
        for (old, new) in outcome.transitions {
            events.push(event::state_change_event(self, old, new));
        }
        if outcome.emit_update {
            events.push(event::gesture_event(self));
        }
        events
    }
}

/// Read an optional numeric config key, widening Int to f64
pub(crate) fn config_f64(map: &EventDataMap, key: &'static str) -> Result<Option<f64>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => match v.as_f64() {
            Some(n) => Ok(Some(n)),
            None => Err(Error::bad_config(key, "number", v.type_name())),
        },
    }
}

pub(crate) fn config_i64(map: &EventDataMap, key: &'static str) -> Result<Option<i64>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => match v.as_i64() {
            Some(n) => Ok(Some(n)),
            None => Err(Error::bad_config(key, "integer", v.type_name())),
        },
    }
}

pub(crate) fn config_usize(map: &EventDataMap, key: &'static str) -> Result<Option<usize>, Error> {
    match config_i64(map, key)? {
        None => Ok(None),
        Some(n) if n >= 0 => Ok(Some(n as usize)),
        Some(_) => Err(Error::bad_config(key, "non-negative integer", "negative integer")),
    }
}

pub(crate) fn config_u64(map: &EventDataMap, key: &'static str) -> Result<Option<u64>, Error> {
    match config_i64(map, key)? {
        None => Ok(None),
        Some(n) if n >= 0 => Ok(Some(n as u64)),
        Some(_) => Err(Error::bad_config(key, "non-negative integer", "negative integer")),
    }
}
