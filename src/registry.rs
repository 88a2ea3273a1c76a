//! Handler registry - tag lookup, target attachment, event dispatch
//!
//! The host creates handlers with integer tags, attaches them to opaque
//! target ids (a view, a window, a region - the registry does not care),
//! and routes its touch stream per target. Everything is `&mut self` on
//! the host's dispatch thread; there is no interior mutability.

use tracing::debug;

use crate::error::Error;
use crate::event::HandlerEvent;
use crate::handler::{GestureHandler, HandlerKind};
use crate::map::EventDataMap;
use crate::touch::TouchEvent;

/// Build a handler of the given kind with default config
pub fn create_handler(kind: HandlerKind, tag: i32) -> GestureHandler {
    GestureHandler::new(kind, tag)
}

/// Build a handler and apply a config map to it
pub fn create_configured(
    kind: HandlerKind,
    tag: i32,
    config: &EventDataMap,
) -> Result<GestureHandler, Error> {
    let mut handler = GestureHandler::new(kind, tag);
    handler.apply_config(config)?;
    Ok(handler)
}

#[derive(Debug, Default)]
pub struct HandlerRegistry {
    // Registration order; small sets, linear lookup by tag
    handlers: Vec<GestureHandler>,
    // Attach order, which is also dispatch order within a target
    attachments: Vec<(i32, i32)>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn register(&mut self, handler: GestureHandler) -> Result<(), Error> {
        if self.handler(handler.tag()).is_some() {
            return Err(Error::DuplicateTag(handler.tag()));
        }
        debug!(tag = handler.tag(), kind = %handler.kind(), "registered handler");
        self.handlers.push(handler);
        Ok(())
    }

    /// Create from a kind name ("pan", "tap", ...), configure and register
    pub fn create(&mut self, kind_name: &str, tag: i32, config: &EventDataMap) -> Result<(), Error> {
        let kind = HandlerKind::from_name(kind_name)?;
        if self.handler(tag).is_some() {
            return Err(Error::DuplicateTag(tag));
        }
        let handler = create_configured(kind, tag, config)?;
        self.register(handler)
    }

    pub fn update_config(&mut self, tag: i32, config: &EventDataMap) -> Result<(), Error> {
        match self.handler_mut(tag) {
            Some(handler) => handler.apply_config(config),
            None => Err(Error::UnknownTag(tag)),
        }
    }

    /// Attach a handler to a target. Re-attaching moves it, and the new
    /// attachment goes to the back of the target's dispatch order.
    pub fn attach(&mut self, tag: i32, target: i32) -> Result<(), Error> {
        if self.handler(tag).is_none() {
            return Err(Error::UnknownTag(tag));
        }
        self.attachments.retain(|&(t, _)| t != tag);
        self.attachments.push((tag, target));
        debug!(tag, target, "attached handler");
        Ok(())
    }

    pub fn detach(&mut self, tag: i32) {
        self.attachments.retain(|&(t, _)| t != tag);
    }

    pub fn drop_handler(&mut self, tag: i32) -> Result<(), Error> {
        let before = self.handlers.len();
        self.handlers.retain(|h| h.tag() != tag);
        if self.handlers.len() == before {
            return Err(Error::UnknownTag(tag));
        }
        self.detach(tag);
        debug!(tag, "dropped handler");
        Ok(())
    }

    pub fn drop_all(&mut self) {
        self.handlers.clear();
        self.attachments.clear();
    }

    pub fn handler(&self, tag: i32) -> Option<&GestureHandler> {
        self.handlers.iter().find(|h| h.tag() == tag)
    }

    pub fn handler_mut(&mut self, tag: i32) -> Option<&mut GestureHandler> {
        self.handlers.iter_mut().find(|h| h.tag() == tag)
    }

    pub fn tags_for_target(&self, target: i32) -> Vec<i32> {
        self.attachments
            .iter()
            .filter(|&&(_, tgt)| tgt == target)
            .map(|&(tag, _)| tag)
            .collect()
    }

    /// Feed a touch event to every handler attached to `target`, in attach
    /// order, collecting everything they emit
    pub fn dispatch_touch(&mut self, target: i32, ev: &TouchEvent) -> Vec<HandlerEvent> {
        let tags = self.tags_for_target(target);
        let mut events = Vec::new();
        for tag in tags {
            if let Some(handler) = self.handler_mut(tag) {
                events.extend(handler.on_touch(ev));
            }
        }
        events
    }

    /// Advance every registered handler's clock
    pub fn tick(&mut self, now_ms: u64) -> Vec<HandlerEvent> {
        let mut events = Vec::new();
        for handler in &mut self.handlers {
            events.extend(handler.tick(now_ms));
        }
        events
    }
}
