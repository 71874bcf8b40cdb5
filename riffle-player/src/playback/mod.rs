//! Playback engine, play window and playlist pagination

pub mod engine;
pub mod pager;
pub mod types;
pub mod window;

pub use engine::PlaybackEngine;
pub use pager::{PlaylistPager, RefillRequest};
pub use types::{Origin, PlaybackContext, QueueItem, QueueItemInfo};
pub use window::{Advance, Jump, PlayWindow};
