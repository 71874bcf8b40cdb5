//! HTTP control surface
//!
//! Presentation clients drive the engine through these endpoints and follow
//! it through `GET /events` (SSE) or `GET /playback/state`.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{build_router, run, AppContext};
