//! Surface abstraction for recordable and playable documents.

use crate::error::{SurfaceError, SurfaceResult};
use crossbeam_channel::Receiver;
use tandem_core::RawInput;

/// Stable identifier for a surface instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Identifier for one input subscription on a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Document load status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Navigation in progress, no document available.
    Loading,
    /// Document loaded and addressable.
    Loaded,
    /// The document could not be shown.
    Failed(String),
}

/// Lifecycle notifications emitted by a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A document finished loading.
    Loaded,
    /// Loading failed (for example the site refuses to be embedded).
    LoadFailed(String),
    /// The current document was torn down.
    Unloaded,
}

/// Result of a synthetic dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Tag or role of the element that received the input.
    pub target_tag: Option<String>,
}

/// Stream of normalized input observed on a surface.
///
/// Dropping the subscription stops delivery; the surface prunes the
/// matching sender the next time it publishes.
#[derive(Debug)]
pub struct InputSubscription {
    id: SubscriptionId,
    receiver: Receiver<RawInput>,
}

impl InputSubscription {
    pub fn new(id: SubscriptionId, receiver: Receiver<RawInput>) -> Self {
        Self { id, receiver }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Take every notification delivered so far, in arrival order.
    pub fn drain(&self) -> Vec<RawInput> {
        self.receiver.try_iter().collect()
    }

    /// Take the next pending notification, if any.
    pub fn try_next(&self) -> Option<RawInput> {
        self.receiver.try_recv().ok()
    }
}

/// Capability set an embedded document must offer to be recorded or
/// played against.
pub trait Surface: Send {
    /// Get the stable surface identifier.
    fn id(&self) -> SurfaceId;

    /// Identity of the document being shown (usually its address).
    fn identity(&self) -> &str;

    /// Current load status.
    fn load_state(&self) -> LoadState;

    /// Whether a document is loaded and addressable.
    fn is_ready(&self) -> bool {
        self.load_state() == LoadState::Loaded
    }

    /// Subscribe to pointer and key input. Only valid once loaded.
    fn attach(&mut self) -> SurfaceResult<InputSubscription>;

    /// Tear down a subscription.
    fn detach(&mut self, subscription: SubscriptionId) -> SurfaceResult<()>;

    /// Click the topmost element under `(x, y)` in the current document.
    fn dispatch_pointer(&mut self, x: f64, y: f64) -> SurfaceResult<DispatchOutcome>;

    /// Press a key on the currently focused element.
    fn dispatch_key(&mut self, key: &str, code: &str) -> SurfaceResult<DispatchOutcome>;

    /// Reload the document. Existing subscriptions are torn down.
    fn reload(&mut self) -> SurfaceResult<()>;

    /// Next pending lifecycle notification.
    fn poll_event(&mut self) -> Option<SurfaceEvent>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn id(&self) -> SurfaceId {
        (**self).id()
    }

    fn identity(&self) -> &str {
        (**self).identity()
    }

    fn load_state(&self) -> LoadState {
        (**self).load_state()
    }

    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn attach(&mut self) -> SurfaceResult<InputSubscription> {
        (**self).attach()
    }

    fn detach(&mut self, subscription: SubscriptionId) -> SurfaceResult<()> {
        (**self).detach(subscription)
    }

    fn dispatch_pointer(&mut self, x: f64, y: f64) -> SurfaceResult<DispatchOutcome> {
        (**self).dispatch_pointer(x, y)
    }

    fn dispatch_key(&mut self, key: &str, code: &str) -> SurfaceResult<DispatchOutcome> {
        (**self).dispatch_key(key, code)
    }

    fn reload(&mut self) -> SurfaceResult<()> {
        (**self).reload()
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        (**self).poll_event()
    }
}

/// Collapse an adapter failure into "no observation / no effect".
///
/// Failures are logged at debug level and never propagated.
pub fn best_effort<T>(result: SurfaceResult<T>, surface: SurfaceId, operation: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(SurfaceError::NoTarget) => {
            tracing::debug!(%surface, operation, "no target for synthetic input");
            None
        }
        Err(err) => {
            tracing::debug!(%surface, operation, error = %err, "surface unavailable");
            None
        }
    }
}
