//! Event data extraction - handler fields into a writable map
//!
//! The seam between recognition and delivery. An extractor reads one
//! handler variant and appends its fields to an [`EventDataMap`]; it never
//! mutates the handler, never removes entries the caller already put in
//! the map, and keeps no state of its own. Hosts that embed their own
//! gesture types implement [`EventDataExtractor`] for them; the built-in
//! variants are also reachable through [`extract_event_data`], which
//! dispatches on the [`GestureHandler`] tag.

use crate::handler::{
    FlingGesture, Gesture, GestureHandler, Handler, LongPressGesture, PanGesture, PinchGesture,
    RotationGesture, TapGesture,
};
use crate::map::EventDataMap;

/// Reads gesture fields from a handler and appends them to the output map.
///
/// Implementations must treat `handler` as read-only and must not retain
/// either argument.
pub trait EventDataExtractor<H> {
    fn extract_event_data(&self, handler: &H, event_data: &mut EventDataMap);
}

/// The field every variant reports
fn extract_common<G: Gesture>(handler: &Handler<G>, event_data: &mut EventDataMap) {
    event_data.insert("numberOfPointers", handler.pointer_count() as i64);
}

fn extract_position<G: Gesture>(handler: &Handler<G>, event_data: &mut EventDataMap) {
    event_data.insert("x", handler.x());
    event_data.insert("y", handler.y());
    event_data.insert("absoluteX", handler.absolute_x());
    event_data.insert("absoluteY", handler.absolute_y());
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PanEventDataExtractor;

impl EventDataExtractor<Handler<PanGesture>> for PanEventDataExtractor {
    fn extract_event_data(&self, handler: &Handler<PanGesture>, event_data: &mut EventDataMap) {
        extract_common(handler, event_data);
        extract_position(handler, event_data);
        let gesture = handler.gesture();
        event_data.insert("translationX", gesture.translation_x());
        event_data.insert("translationY", gesture.translation_y());
        event_data.insert("velocityX", gesture.velocity_x());
        event_data.insert("velocityY", gesture.velocity_y());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TapEventDataExtractor;

impl EventDataExtractor<Handler<TapGesture>> for TapEventDataExtractor {
    fn extract_event_data(&self, handler: &Handler<TapGesture>, event_data: &mut EventDataMap) {
        extract_common(handler, event_data);
        extract_position(handler, event_data);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LongPressEventDataExtractor;

impl EventDataExtractor<Handler<LongPressGesture>> for LongPressEventDataExtractor {
    fn extract_event_data(
        &self,
        handler: &Handler<LongPressGesture>,
        event_data: &mut EventDataMap,
    ) {
        extract_common(handler, event_data);
        extract_position(handler, event_data);
        event_data.insert("duration", handler.gesture().duration_ms() as i64);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PinchEventDataExtractor;

impl EventDataExtractor<Handler<PinchGesture>> for PinchEventDataExtractor {
    fn extract_event_data(&self, handler: &Handler<PinchGesture>, event_data: &mut EventDataMap) {
        extract_common(handler, event_data);
        let gesture = handler.gesture();
        event_data.insert("scale", gesture.scale());
        event_data.insert("focalX", gesture.focal_x());
        event_data.insert("focalY", gesture.focal_y());
        event_data.insert("velocity", gesture.velocity());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RotationEventDataExtractor;

impl EventDataExtractor<Handler<RotationGesture>> for RotationEventDataExtractor {
    fn extract_event_data(
        &self,
        handler: &Handler<RotationGesture>,
        event_data: &mut EventDataMap,
    ) {
        extract_common(handler, event_data);
        let gesture = handler.gesture();
        event_data.insert("rotation", gesture.rotation());
        event_data.insert("anchorX", gesture.anchor_x());
        event_data.insert("anchorY", gesture.anchor_y());
        event_data.insert("velocity", gesture.velocity());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlingEventDataExtractor;

impl EventDataExtractor<Handler<FlingGesture>> for FlingEventDataExtractor {
    fn extract_event_data(&self, handler: &Handler<FlingGesture>, event_data: &mut EventDataMap) {
        extract_common(handler, event_data);
        extract_position(handler, event_data);
    }
}

/// Append the right variant's fields for a tagged handler
pub fn extract_event_data(handler: &GestureHandler, event_data: &mut EventDataMap) {
    match handler {
        GestureHandler::Pan(h) => PanEventDataExtractor.extract_event_data(h, event_data),
        GestureHandler::Tap(h) => TapEventDataExtractor.extract_event_data(h, event_data),
        GestureHandler::LongPress(h) => {
            LongPressEventDataExtractor.extract_event_data(h, event_data)
        }
        GestureHandler::Pinch(h) => PinchEventDataExtractor.extract_event_data(h, event_data),
        GestureHandler::Rotation(h) => {
            RotationEventDataExtractor.extract_event_data(h, event_data)
        }
        GestureHandler::Fling(h) => FlingEventDataExtractor.extract_event_data(h, event_data),
    }
}
