//! Recognition tuning from a TOML file
//!
//! Hosts usually configure handlers per instance through config maps; the
//! tuning file sets the baseline those instances start from, e.g. a device
//! profile with a wider touch slop. Missing file or missing sections mean
//! defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Error;
use crate::handler::{
    FlingConfig, FlingGesture, GestureHandler, Handler, HandlerKind, LongPressConfig,
    LongPressGesture, PanConfig, PanGesture, PinchConfig, PinchGesture, RotationConfig,
    RotationGesture, TapConfig, TapGesture,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub pan: PanConfig,
    pub tap: TapConfig,
    pub long_press: LongPressConfig,
    pub pinch: PinchConfig,
    pub rotation: RotationConfig,
    pub fling: FlingConfig,
}

impl Tuning {
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Load from `path`; an absent file is not an error, just defaults
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            debug!(path = %path.display(), "no tuning file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let tuning = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded gesture tuning");
        Ok(tuning)
    }

    /// Build a handler seeded with this tuning's config for its kind
    pub fn build(&self, kind: HandlerKind, tag: i32) -> GestureHandler {
        match kind {
            HandlerKind::Pan => {
                GestureHandler::Pan(Handler::new(tag, PanGesture::with_config(self.pan.clone())))
            }
            HandlerKind::Tap => {
                GestureHandler::Tap(Handler::new(tag, TapGesture::with_config(self.tap.clone())))
            }
            HandlerKind::LongPress => GestureHandler::LongPress(Handler::new(
                tag,
                LongPressGesture::with_config(self.long_press.clone()),
            )),
            HandlerKind::Pinch => GestureHandler::Pinch(Handler::new(
                tag,
                PinchGesture::with_config(self.pinch.clone()),
            )),
            HandlerKind::Rotation => GestureHandler::Rotation(Handler::new(
                tag,
                RotationGesture::with_config(self.rotation.clone()),
            )),
            HandlerKind::Fling => GestureHandler::Fling(Handler::new(
                tag,
                FlingGesture::with_config(self.fling.clone()),
            )),
        }
    }
}
