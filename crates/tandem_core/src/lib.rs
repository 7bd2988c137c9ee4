//! Tandem Core Primitives
//!
//! This crate provides the foundational building blocks shared by the
//! recording and playback engine:
//!
//! - **Clocks**: a monotonic millisecond time source, plus a manually
//!   stepped clock for deterministic loops and tests
//! - **Timers**: a revocable timer queue where every scheduled task has its
//!   own handle and a whole queue can be revoked in one step
//! - **Input**: normalized pointer/key notifications as delivered by an
//!   instrumented surface
//!
//! # Example
//!
//! ```rust
//! use tandem_core::{ManualClock, Clock, TimerQueue};
//!
//! let clock = ManualClock::new(0);
//! let mut timers = TimerQueue::new();
//!
//! timers.schedule_after(clock.now_millis(), 500, "second");
//! timers.schedule_after(clock.now_millis(), 0, "first");
//!
//! clock.advance(500);
//! assert_eq!(timers.drain_due(clock.now_millis()), vec!["first", "second"]);
//! ```

pub mod clock;
pub mod input;
pub mod timer;

pub use clock::{Clock, ManualClock, Millis, MonotonicClock};
pub use input::{InputKind, RawInput};
pub use timer::{TimerId, TimerQueue};
