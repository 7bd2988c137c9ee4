//! Surface adapter contract
//!
//! A surface is one embedded, independently loaded document (an embedded
//! website view, for example). The engine never touches a surface directly;
//! it goes through the narrow [`Surface`] trait:
//!
//! - **attach** an input subscription once the surface reports itself loaded
//! - **dispatch** synthetic pointer and key input into the current document
//! - **reload** the document, tearing down listeners
//!
//! Every capability may fail when the document is not accessible. Callers
//! treat such failures as "nothing observed" or "no effect" via
//! [`best_effort`].

pub mod error;
#[cfg(feature = "headless")]
pub mod headless;
pub mod surface;

pub use error::{SurfaceError, SurfaceResult};
#[cfg(feature = "headless")]
pub use headless::{ElementBounds, HeadlessElement, HeadlessSurface};
pub use surface::{
    best_effort, DispatchOutcome, InputSubscription, LoadState, SubscriptionId, Surface,
    SurfaceEvent, SurfaceId,
};
