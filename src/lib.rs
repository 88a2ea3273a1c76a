//! Typed gesture handlers with a writable-map extraction seam
//!
//! gesturewire turns a host's raw touch stream into gesture events that are
//! ready to cross an embedding boundary. The host feeds [`TouchEvent`]s and
//! its clock into tagged handlers; handlers walk the
//! Undetermined/Began/Active lifecycle; every emitted event carries an
//! ordered, string-keyed payload written by the variant's
//! [`EventDataExtractor`].
//!
//! # Architecture
//!
//! ```text
//!  host touch stream              host clock
//!         │                           │
//!         ▼                           ▼
//! ┌──────────────────────────────────────────────┐
//! │ HandlerRegistry (tags → handlers → targets)  │
//! │   ┌──────────────┐  ┌──────────────┐         │
//! │   │ Handler<Pan> │  │ Handler<Tap> │  ...    │
//! │   └──────────────┘  └──────────────┘         │
//! └──────────────────────────────────────────────┘
//!         │ state transitions and updates
//!         ▼
//!  EventDataExtractor ──▶ EventDataMap (ordered)
//!         │
//!         ▼
//!  HandlerEvent envelopes
//!  (onGestureHandlerEvent / onGestureHandlerStateChange)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use gesturewire::{EventDataMap, HandlerRegistry, Point, TouchEvent};
//!
//! let mut registry = HandlerRegistry::new();
//! let mut config = EventDataMap::new();
//! config.insert("minDist", 20.0);
//! registry.create("pan", 1, &config)?;
//! registry.attach(1, 100)?;
//!
//! let touch = TouchEvent::Down { id: 0, position: Point::new(10.0, 10.0), time_ms: 0 };
//! for event in registry.dispatch_touch(100, &touch) {
//!     println!("{}", serde_json::to_string(&event)?);
//! }
//! ```

pub mod error;
pub mod event;
pub mod extract;
pub mod geom;
pub mod handler;
pub mod map;
pub mod registry;
pub mod state;
pub mod touch;
pub mod tuning;

pub use error::Error;
pub use event::{gesture_event, state_change_event, HandlerEvent};
pub use extract::{extract_event_data, EventDataExtractor};
pub use geom::Point;
pub use handler::{GestureHandler, Handler, HandlerKind};
pub use map::{EventDataMap, EventValue};
pub use registry::HandlerRegistry;
pub use state::State;
pub use touch::{PointerTracker, TouchEvent, TouchPoint};
pub use tuning::Tuning;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;
