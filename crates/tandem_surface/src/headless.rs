//! Headless in-memory surface.
//!
//! Provides a document model without any embedding host, useful for:
//! - Unit and integration testing of recording and playback
//! - Scripted scenario runs in CI
//!
//! The document is a flat list of rectangular elements. Later elements are
//! painted on top of earlier ones, so hit-testing walks the list backwards.

use crate::error::{SurfaceError, SurfaceResult};
use crate::surface::{
    DispatchOutcome, InputSubscription, LoadState, Surface, SurfaceEvent, SurfaceId,
    SubscriptionId,
};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;
use tandem_core::RawInput;

/// Tag reported for key input when nothing has focus.
pub const DOCUMENT_BODY_TAG: &str = "BODY";

/// Element rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the point lies inside (right and bottom edges exclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// One element of the headless document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeadlessElement {
    pub tag: String,
    pub bounds: ElementBounds,
}

impl HeadlessElement {
    pub fn new(tag: impl Into<String>, bounds: ElementBounds) -> Self {
        Self {
            tag: tag.into(),
            bounds,
        }
    }
}

/// In-memory [`Surface`] implementation.
pub struct HeadlessSurface {
    id: SurfaceId,
    identity: String,
    state: LoadState,
    /// Whether the loaded document may be instrumented.
    accessible: bool,
    elements: Vec<HeadlessElement>,
    focused: Option<usize>,
    subscribers: SmallVec<[(SubscriptionId, Sender<RawInput>); 2]>,
    next_subscription: u64,
    events: VecDeque<SurfaceEvent>,
    dispatched: Vec<RawInput>,
    reloads: u32,
}

impl HeadlessSurface {
    /// Create a surface that is still loading `identity`.
    pub fn new(id: SurfaceId, identity: impl Into<String>) -> Self {
        Self {
            id,
            identity: identity.into(),
            state: LoadState::Loading,
            accessible: true,
            elements: Vec::new(),
            focused: None,
            subscribers: SmallVec::new(),
            next_subscription: 1,
            events: VecDeque::new(),
            dispatched: Vec::new(),
            reloads: 0,
        }
    }

    /// Add an element on top of the existing ones.
    pub fn with_element(mut self, tag: impl Into<String>, bounds: ElementBounds) -> Self {
        self.elements.push(HeadlessElement::new(tag, bounds));
        self
    }

    /// Replace the whole document.
    pub fn set_elements(&mut self, elements: Vec<HeadlessElement>) {
        self.elements = elements;
        self.focused = None;
    }

    /// Mark the document as (in)accessible to instrumentation.
    pub fn set_accessible(&mut self, accessible: bool) {
        self.accessible = accessible;
    }

    /// Complete loading and announce it.
    pub fn finish_load(&mut self) {
        self.state = LoadState::Loaded;
        self.events.push_back(SurfaceEvent::Loaded);
    }

    /// Fail loading and announce it.
    pub fn fail_load(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        self.state = LoadState::Failed(reason.clone());
        self.events.push_back(SurfaceEvent::LoadFailed(reason));
    }

    /// Topmost element under the point.
    pub fn element_at(&self, x: f64, y: f64) -> Option<&HeadlessElement> {
        self.elements.iter().rev().find(|e| e.bounds.contains(x, y))
    }

    /// Focus the first element with the given tag.
    pub fn focus(&mut self, tag: &str) -> bool {
        self.focused = self.elements.iter().position(|e| e.tag == tag);
        self.focused.is_some()
    }

    /// Tag of the element that currently has focus.
    pub fn active_tag(&self) -> &str {
        self.focused
            .and_then(|index| self.elements.get(index))
            .map(|e| e.tag.as_str())
            .unwrap_or(DOCUMENT_BODY_TAG)
    }

    /// Simulate a user click. Returns whether any listener observed it.
    pub fn user_click(&mut self, x: f64, y: f64) -> bool {
        if !self.observable() {
            return false;
        }
        let mut input = RawInput::pointer(x, y);
        if let Some(element) = self.element_at(x, y) {
            input = input.with_target(element.tag.clone());
        }
        self.publish(input)
    }

    /// Simulate a user key press. Returns whether any listener observed it.
    pub fn user_key(&mut self, key: &str, code: &str) -> bool {
        if !self.observable() {
            return false;
        }
        let input = RawInput::key(key, code).with_target(self.active_tag().to_string());
        self.publish(input)
    }

    /// Deliver an arbitrary notification to every live subscriber.
    pub fn publish(&mut self, input: RawInput) -> bool {
        self.subscribers
            .retain(|(_, sender)| sender.send(input.clone()).is_ok());
        !self.subscribers.is_empty()
    }

    /// Synthetic input received so far, with the resolved target tag.
    pub fn dispatched(&self) -> &[RawInput] {
        &self.dispatched
    }

    /// Number of live input subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// How many times the document was reloaded.
    pub fn reload_count(&self) -> u32 {
        self.reloads
    }

    fn observable(&self) -> bool {
        self.state == LoadState::Loaded && self.accessible
    }

    fn ensure_accessible(&self) -> SurfaceResult<()> {
        if self.state != LoadState::Loaded {
            return Err(SurfaceError::NotLoaded);
        }
        if !self.accessible {
            return Err(SurfaceError::Inaccessible(self.identity.clone()));
        }
        Ok(())
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn load_state(&self) -> LoadState {
        self.state.clone()
    }

    fn is_ready(&self) -> bool {
        self.observable()
    }

    fn attach(&mut self) -> SurfaceResult<InputSubscription> {
        self.ensure_accessible()?;
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push((id, sender));
        Ok(InputSubscription::new(id, receiver))
    }

    fn detach(&mut self, subscription: SubscriptionId) -> SurfaceResult<()> {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        if self.subscribers.len() == before {
            return Err(SurfaceError::Detached);
        }
        Ok(())
    }

    fn dispatch_pointer(&mut self, x: f64, y: f64) -> SurfaceResult<DispatchOutcome> {
        self.ensure_accessible()?;
        let tag = self
            .element_at(x, y)
            .map(|e| e.tag.clone())
            .ok_or(SurfaceError::NoTarget)?;

        self.dispatched
            .push(RawInput::pointer(x, y).with_target(tag.clone()));
        Ok(DispatchOutcome {
            target_tag: Some(tag),
        })
    }

    fn dispatch_key(&mut self, key: &str, code: &str) -> SurfaceResult<DispatchOutcome> {
        self.ensure_accessible()?;
        let tag = self.active_tag().to_string();

        self.dispatched
            .push(RawInput::key(key, code).with_target(tag.clone()));
        Ok(DispatchOutcome {
            target_tag: Some(tag),
        })
    }

    fn reload(&mut self) -> SurfaceResult<()> {
        self.subscribers.clear();
        self.focused = None;
        self.state = LoadState::Loading;
        self.reloads += 1;
        self.events.push_back(SurfaceEvent::Unloaded);
        Ok(())
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        self.events.pop_front()
    }
}

impl std::fmt::Debug for HeadlessSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessSurface")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("elements", &self.elements.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
