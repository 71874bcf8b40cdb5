//! Adaptive transport session
//!
//! Wraps the process-wide audio output. The session attaches to the output
//! on the first manifest load and is then reused for every track change:
//! loading a new manifest replaces the content, never the session.

use super::output::AudioOutput;
use crate::error::{Error, Result};
use tracing::{debug, info};

/// Manifest currently loaded into the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedManifest {
    pub load_id: u64,
    pub manifest_url: String,
}

pub struct TransportSession {
    output: Box<dyn AudioOutput>,
    attached: bool,
    next_load_id: u64,
    active: Option<LoadedManifest>,
}

impl TransportSession {
    pub fn new(output: Box<dyn AudioOutput>) -> Self {
        Self {
            output,
            attached: false,
            next_load_id: 0,
            active: None,
        }
    }

    /// Load a manifest, replacing whatever was loaded before
    ///
    /// On failure the previously loaded content (if any) stays loaded and
    /// `active()` is unchanged.
    pub async fn load_manifest(&mut self, manifest_url: &str) -> Result<u64> {
        if !self.attached {
            info!("Attaching transport session to audio output");
            self.attached = true;
        }

        self.next_load_id += 1;
        let load_id = self.next_load_id;
        debug!("Loading manifest {} as load {}", manifest_url, load_id);

        self.output.load(load_id, manifest_url).await?;
        self.active = Some(LoadedManifest {
            load_id,
            manifest_url: manifest_url.to_string(),
        });
        Ok(load_id)
    }

    pub fn play(&mut self) -> Result<()> {
        if self.active.is_none() {
            return Err(Error::Transport("No manifest loaded".to_string()));
        }
        self.output.play()
    }

    pub fn pause(&mut self) {
        self.output.pause();
    }

    pub fn seek_to(&mut self, position_ms: u64) -> u64 {
        self.output.seek_to(position_ms)
    }

    /// Set volume on the user 0-100 scale
    pub fn set_volume(&mut self, volume: u8) {
        self.output.set_volume(f32::from(volume) / 100.0);
    }

    pub fn position_ms(&self) -> u64 {
        self.output.position_ms()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.output.duration_ms()
    }

    pub fn active(&self) -> Option<&LoadedManifest> {
        self.active.as_ref()
    }

    /// True when `load_id` identifies the content currently loaded
    pub fn is_current_load(&self, load_id: u64) -> bool {
        self.active.as_ref().is_some_and(|a| a.load_id == load_id)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
