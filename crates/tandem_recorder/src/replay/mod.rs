//! Playback engine for published action records.
//!
//! This module provides:
//! - `SyntheticInput` - translate recorded actions back into surface input
//! - `Player` - schedule a record against one target surface and drive it
//!   from a cooperative loop
//!
//! # Example
//!
//! ```ignore
//! use tandem_recorder::replay::Player;
//!
//! let mut player = Player::new(PlaybackConfig::default());
//! player.play(record.clone(), &follower, clock.now_millis())?;
//!
//! // Every loop iteration:
//! let progress = player.tick(&mut follower, clock.now_millis());
//! if progress.finished {
//!     // back to idle
//! }
//! ```

mod dispatch;
mod player;

pub use dispatch::SyntheticInput;
pub use player::{PlaybackProgress, PlaybackStarted, Player, PLAYBACK_GRACE_MS};
