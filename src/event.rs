//! Host-facing event envelopes
//!
//! Two envelopes cross the host boundary: continuous updates while a
//! handler is active (`onGestureHandlerEvent`) and one notification per
//! lifecycle transition (`onGestureHandlerStateChange`). Both start with
//! the handler tag and state, then carry the variant's extracted fields.
//! The extractor runs exactly once per envelope, and the payload key order
//! is the insertion order, so serialized events are byte-stable.

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::extract;
use crate::handler::GestureHandler;
use crate::map::EventDataMap;
use crate::state::State;

pub const GESTURE_EVENT_NAME: &str = "onGestureHandlerEvent";
pub const STATE_CHANGE_EVENT_NAME: &str = "onGestureHandlerStateChange";

/// An event ready for delivery to the host
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerEvent {
    Gesture(EventDataMap),
    StateChange(EventDataMap),
}

impl HandlerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HandlerEvent::Gesture(_) => GESTURE_EVENT_NAME,
            HandlerEvent::StateChange(_) => STATE_CHANGE_EVENT_NAME,
        }
    }

    pub fn payload(&self) -> &EventDataMap {
        match self {
            HandlerEvent::Gesture(payload) | HandlerEvent::StateChange(payload) => payload,
        }
    }

    pub fn into_payload(self) -> EventDataMap {
        match self {
            HandlerEvent::Gesture(payload) | HandlerEvent::StateChange(payload) => payload,
        }
    }
}

impl Serialize for HandlerEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HandlerEvent", 2)?;
        s.serialize_field("name", self.name())?;
        s.serialize_field("payload", self.payload())?;
        s.end()
    }
}

/// Build an update envelope for an active handler
pub fn gesture_event(handler: &GestureHandler) -> HandlerEvent {
    let mut payload = EventDataMap::new();
    payload.insert("handlerTag", i64::from(handler.tag()));
    payload.insert("state", handler.state().code());
    extract::extract_event_data(handler, &mut payload);
    HandlerEvent::Gesture(payload)
}

/// Build a transition envelope. `old`/`new` are explicit rather than read
/// off the handler: by packaging time a finished handler may already have
/// rearmed to Undetermined.
pub fn state_change_event(handler: &GestureHandler, old: State, new: State) -> HandlerEvent {
    let mut payload = EventDataMap::new();
    payload.insert("handlerTag", i64::from(handler.tag()));
    payload.insert("state", new.code());
    payload.insert("oldState", old.code());
    extract::extract_event_data(handler, &mut payload);
    HandlerEvent::StateChange(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::handler::HandlerKind;
    use crate::touch::TouchEvent;

    fn tapped_handler() -> GestureHandler {
        let mut handler = GestureHandler::new(HandlerKind::Tap, 12);
        handler.on_touch(&TouchEvent::Down { id: 0, position: Point::new(5.0, 6.0), time_ms: 0 });
        handler
    }

    #[test]
    fn test_state_change_envelope_key_order() {
        let handler = tapped_handler();
        let event = state_change_event(&handler, State::Undetermined, State::Began);

        let keys: Vec<&str> = event.payload().keys().collect();
        assert_eq!(keys[0], "handlerTag");
        assert_eq!(keys[1], "state");
        assert_eq!(keys[2], "oldState");
        assert_eq!(event.payload().get_i64("handlerTag"), Some(12));
        assert_eq!(event.payload().get_i64("state"), Some(2));
        assert_eq!(event.payload().get_i64("oldState"), Some(0));
    }

    #[test]
    fn test_gesture_envelope_has_no_old_state() {
        let handler = tapped_handler();
        let event = gesture_event(&handler);
        assert_eq!(event.name(), "onGestureHandlerEvent");
        assert!(event.payload().get("oldState").is_none());
        assert_eq!(event.payload().get_i64("handlerTag"), Some(12));
    }

    #[test]
    fn test_event_serializes_with_stable_order() {
        let handler = tapped_handler();
        let event = state_change_event(&handler, State::Undetermined, State::Began);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.starts_with(
            "{\"name\":\"onGestureHandlerStateChange\",\"payload\":{\"handlerTag\":12,\"state\":2,\"oldState\":0,"
        ));
    }

    #[test]
    fn test_into_payload_moves_map_out() {
        let handler = tapped_handler();
        let payload = gesture_event(&handler).into_payload();
        assert_eq!(payload.get_f64("absoluteX"), Some(5.0));
        assert_eq!(payload.get_f64("absoluteY"), Some(6.0));
    }
}
