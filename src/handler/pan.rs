//! Pan gesture - continuous drag tracking
//!
//! Tracks the translation of the pointer centroid from where the gesture
//! began. Activation is configurable three ways: a plain minimum distance,
//! directional offset thresholds, or a minimum velocity. Adding or removing
//! a pointer mid-drag rebases the centroid so the reported translation
//! never jumps.

use serde::{Deserialize, Serialize};

use super::{config_f64, config_usize, Gesture, HandlerKind, TouchCtx, Verdict};
use crate::error::Error;
use crate::geom::Point;
use crate::map::EventDataMap;
use crate::state::State;
use crate::touch::TouchEvent;

const DEFAULT_MIN_DIST: f64 = 10.0;
const DEFAULT_MAX_POINTERS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Pointers required before the gesture begins
    pub min_pointers: usize,
    /// More pointers than this fails (or cancels) the gesture
    pub max_pointers: usize,
    /// Translation distance that activates. When unset, 10 px applies
    /// unless an offset or velocity criterion is configured instead.
    pub min_dist: Option<f64>,
    pub active_offset_x_start: Option<f64>,
    pub active_offset_x_end: Option<f64>,
    pub active_offset_y_start: Option<f64>,
    pub active_offset_y_end: Option<f64>,
    pub fail_offset_x_start: Option<f64>,
    pub fail_offset_x_end: Option<f64>,
    pub fail_offset_y_start: Option<f64>,
    pub fail_offset_y_end: Option<f64>,
    /// Centroid speed (px/s) that activates
    pub min_velocity: Option<f64>,
    /// Signed per-axis velocity thresholds: negative means "at most",
    /// positive means "at least"
    pub min_velocity_x: Option<f64>,
    pub min_velocity_y: Option<f64>,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            min_pointers: 1,
            max_pointers: DEFAULT_MAX_POINTERS,
            min_dist: None,
            active_offset_x_start: None,
            active_offset_x_end: None,
            active_offset_y_start: None,
            active_offset_y_end: None,
            fail_offset_x_start: None,
            fail_offset_x_end: None,
            fail_offset_y_start: None,
            fail_offset_y_end: None,
            min_velocity: None,
            min_velocity_x: None,
            min_velocity_y: None,
        }
    }
}

impl PanConfig {
    fn has_custom_activation(&self) -> bool {
        self.active_offset_x_start.is_some()
            || self.active_offset_x_end.is_some()
            || self.active_offset_y_start.is_some()
            || self.active_offset_y_end.is_some()
            || self.min_velocity.is_some()
            || self.min_velocity_x.is_some()
            || self.min_velocity_y.is_some()
    }

    fn effective_min_dist(&self) -> Option<f64> {
        match self.min_dist {
            Some(d) => Some(d),
            None if self.has_custom_activation() => None,
            None => Some(DEFAULT_MIN_DIST),
        }
    }
}

fn velocity_passes(threshold: f64, v: f64) -> bool {
    if threshold < 0.0 {
        v <= threshold
    } else {
        v >= threshold
    }
}

#[derive(Debug, Default)]
pub struct PanGesture {
    config: PanConfig,
    translation: Point,
    velocity: Point,
    last_centroid: Point,
    tracking: bool,
}

impl PanGesture {
    pub fn with_config(config: PanConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn translation_x(&self) -> f64 {
        self.translation.x
    }

    pub fn translation_y(&self) -> f64 {
        self.translation.y
    }

    pub fn velocity_x(&self) -> f64 {
        self.velocity.x
    }

    pub fn velocity_y(&self) -> f64 {
        self.velocity.y
    }

    /// Rebase the centroid without touching the accumulated translation
    fn sync_baseline(&mut self, centroid: Option<Point>) {
        if let Some(c) = centroid {
            self.last_centroid = c;
            self.tracking = true;
        } else {
            self.tracking = false;
        }
    }

    fn should_activate(&self) -> bool {
        let t = self.translation;
        let cfg = &self.config;
        if let Some(s) = cfg.active_offset_x_start {
            if t.x < s {
                return true;
            }
        }
        if let Some(e) = cfg.active_offset_x_end {
            if t.x > e {
                return true;
            }
        }
        if let Some(s) = cfg.active_offset_y_start {
            if t.y < s {
                return true;
            }
        }
        if let Some(e) = cfg.active_offset_y_end {
            if t.y > e {
                return true;
            }
        }
        if let Some(d) = cfg.effective_min_dist() {
            if t.length() >= d {
                return true;
            }
        }
        if let Some(v) = cfg.min_velocity_x {
            if velocity_passes(v, self.velocity.x) {
                return true;
            }
        }
        if let Some(v) = cfg.min_velocity_y {
            if velocity_passes(v, self.velocity.y) {
                return true;
            }
        }
        if let Some(v) = cfg.min_velocity {
            if self.velocity.length() >= v {
                return true;
            }
        }
        false
    }

    fn should_fail(&self) -> bool {
        let t = self.translation;
        let cfg = &self.config;
        if let Some(s) = cfg.fail_offset_x_start {
            if t.x < s {
                return true;
            }
        }
        if let Some(e) = cfg.fail_offset_x_end {
            if t.x > e {
                return true;
            }
        }
        if let Some(s) = cfg.fail_offset_y_start {
            if t.y < s {
                return true;
            }
        }
        if let Some(e) = cfg.fail_offset_y_end {
            if t.y > e {
                return true;
            }
        }
        false
    }
}

impl Gesture for PanGesture {
    fn kind(&self) -> HandlerKind {
        HandlerKind::Pan
    }

    fn on_touch(&mut self, ctx: &TouchCtx<'_>) -> Verdict {
        match ctx.ev {
            TouchEvent::Down { .. } => {
                self.sync_baseline(ctx.tracker.centroid());
                if ctx.tracker.count() > self.config.max_pointers {
                    return if ctx.state == State::Active {
                        Verdict::Cancel
                    } else {
                        Verdict::Fail
                    };
                }
                if ctx.state == State::Undetermined
                    && ctx.tracker.count() >= self.config.min_pointers
                {
                    self.translation = Point::ZERO;
                    Verdict::Begin
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Motion { .. } => {
                if let Some(c) = ctx.tracker.centroid() {
                    if self.tracking {
                        self.translation = self.translation + (c - self.last_centroid);
                    }
                    self.last_centroid = c;
                    self.tracking = true;
                }
                self.velocity = ctx.tracker.centroid_velocity();
                if ctx.state == State::Began {
                    if self.should_fail() {
                        Verdict::Fail
                    } else if self.should_activate() {
                        Verdict::Activate
                    } else {
                        Verdict::Noop
                    }
                } else {
                    Verdict::Noop
                }
            }
            TouchEvent::Up { .. } => {
                if ctx.tracker.count() < self.config.min_pointers {
                    match ctx.state {
                        State::Active => Verdict::End,
                        State::Began => Verdict::Fail,
                        _ => Verdict::Noop,
                    }
                } else {
                    self.sync_baseline(ctx.tracker.centroid());
                    Verdict::Noop
                }
            }
            TouchEvent::Cancel { .. } => Verdict::Noop,
        }
    }

    fn reset(&mut self) {
        self.translation = Point::ZERO;
        self.velocity = Point::ZERO;
        self.tracking = false;
    }

    fn apply_config(&mut self, config: &EventDataMap) -> Result<(), Error> {
        if let Some(n) = config_usize(config, "minPointers")? {
            self.config.min_pointers = n.max(1);
        }
        if let Some(n) = config_usize(config, "maxPointers")? {
            self.config.max_pointers = n;
        }
        if let Some(d) = config_f64(config, "minDist")? {
            self.config.min_dist = Some(d);
        }
        if let Some(v) = config_f64(config, "activeOffsetXStart")? {
            self.config.active_offset_x_start = Some(v);
        }
        if let Some(v) = config_f64(config, "activeOffsetXEnd")? {
            self.config.active_offset_x_end = Some(v);
        }
        if let Some(v) = config_f64(config, "activeOffsetYStart")? {
            self.config.active_offset_y_start = Some(v);
        }
        if let Some(v) = config_f64(config, "activeOffsetYEnd")? {
            self.config.active_offset_y_end = Some(v);
        }
        if let Some(v) = config_f64(config, "failOffsetXStart")? {
            self.config.fail_offset_x_start = Some(v);
        }
        if let Some(v) = config_f64(config, "failOffsetXEnd")? {
            self.config.fail_offset_x_end = Some(v);
        }
        if let Some(v) = config_f64(config, "failOffsetYStart")? {
            self.config.fail_offset_y_start = Some(v);
        }
        if let Some(v) = config_f64(config, "failOffsetYEnd")? {
            self.config.fail_offset_y_end = Some(v);
        }
        if let Some(v) = config_f64(config, "minVelocity")? {
            self.config.min_velocity = Some(v);
        }
        if let Some(v) = config_f64(config, "minVelocityX")? {
            self.config.min_velocity_x = Some(v);
        }
        if let Some(v) = config_f64(config, "minVelocityY")? {
            self.config.min_velocity_y = Some(v);
        }
        Ok(())
    }
}
