//! Clock-driven audio output
//!
//! Models a playable device without decoding audio: the playhead advances
//! with wall-clock time while playing, position notifications are sent at a
//! fixed interval, and end-of-resource fires when the playhead reaches the
//! manifest's duration. Duration comes from probing the HLS manifest.

use super::manifest;
use super::output::{AudioOutput, OutputEvent};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, trace};

#[derive(Debug)]
struct Loaded {
    load_id: u64,
    duration_ms: u64,
}

#[derive(Debug)]
struct ClockInner {
    loaded: Option<Loaded>,
    playing: bool,
    /// Playhead at `anchor`
    position_ms: u64,
    anchor: Instant,
    volume: f32,
    ended_sent: bool,
}

impl ClockInner {
    fn position_now(&self) -> u64 {
        let base = self.position_ms;
        let advanced = if self.playing {
            base + self.anchor.elapsed().as_millis() as u64
        } else {
            base
        };
        match &self.loaded {
            Some(loaded) => advanced.min(loaded.duration_ms),
            None => 0,
        }
    }

    /// Fold elapsed time into `position_ms` and restart the anchor
    fn settle(&mut self) {
        self.position_ms = self.position_now();
        self.anchor = Instant::now();
    }
}

pub struct ClockOutput {
    inner: Arc<Mutex<ClockInner>>,
    events_tx: mpsc::UnboundedSender<OutputEvent>,
    client: reqwest::Client,
    tick_interval: Duration,
    ticker_started: bool,
}

impl ClockOutput {
    /// `manifest_timeout` bounds each manifest request made by `load`
    pub fn new(
        events_tx: mpsc::UnboundedSender<OutputEvent>,
        tick_interval: Duration,
        manifest_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(manifest_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Cannot build HTTP client: {}", e)))?;

        Ok(Self {
            inner: Arc::new(Mutex::new(ClockInner {
                loaded: None,
                playing: false,
                position_ms: 0,
                anchor: Instant::now(),
                volume: 1.0,
                ended_sent: false,
            })),
            events_tx,
            client,
            tick_interval,
            ticker_started: false,
        })
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockInner> {
        // A poisoned lock only means a ticker panicked mid-update; the data is plain values
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start the background ticker (needs a running tokio runtime)
    fn ensure_ticker(&mut self) {
        if self.ticker_started {
            return;
        }
        self.ticker_started = true;

        let inner = Arc::clone(&self.inner);
        let events_tx = self.events_tx.clone();
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;

                let event = {
                    let mut inner = inner.lock().unwrap_or_else(|p| p.into_inner());
                    let Some(load_id) = inner.loaded.as_ref().map(|l| l.load_id) else {
                        continue;
                    };
                    if !inner.playing {
                        continue;
                    }

                    let position_ms = inner.position_now();
                    let duration_ms = inner.loaded.as_ref().map_or(0, |l| l.duration_ms);
                    if position_ms >= duration_ms && !inner.ended_sent {
                        inner.settle();
                        inner.playing = false;
                        inner.ended_sent = true;
                        OutputEvent::Ended { load_id }
                    } else {
                        OutputEvent::PositionChanged { load_id, position_ms }
                    }
                };

                trace!("Clock output tick: {:?}", event);
                if events_tx.send(event).is_err() {
                    debug!("Output event receiver dropped, stopping clock ticker");
                    break;
                }
            }
        });
    }
}

#[async_trait]
impl AudioOutput for ClockOutput {
    async fn load(&mut self, load_id: u64, manifest_url: &str) -> Result<()> {
        self.ensure_ticker();

        let duration = manifest::probe_duration(&self.client, manifest_url).await?;
        let duration_ms = duration.as_millis() as u64;
        if duration_ms == 0 {
            return Err(Error::Transport(format!("Manifest {} has no media", manifest_url)));
        }

        {
            let mut inner = self.lock();
            inner.loaded = Some(Loaded { load_id, duration_ms });
            inner.playing = false;
            inner.position_ms = 0;
            inner.anchor = Instant::now();
            inner.ended_sent = false;
        }

        debug!("Clock output loaded {} ({}ms)", manifest_url, duration_ms);
        let _ = self
            .events_tx
            .send(OutputEvent::DurationChanged { load_id, duration_ms });
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut inner = self.lock();
        if inner.loaded.is_none() {
            return Err(Error::Transport("Clock output has nothing loaded".to_string()));
        }
        if !inner.playing {
            inner.anchor = Instant::now();
            inner.playing = true;
            // Resuming at the end reports the end again
            inner.ended_sent = false;
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = self.lock();
        if inner.playing {
            inner.settle();
            inner.playing = false;
        }
    }

    fn seek_to(&mut self, position_ms: u64) -> u64 {
        let mut inner = self.lock();
        let accepted = match &inner.loaded {
            Some(loaded) => position_ms.min(loaded.duration_ms),
            None => 0,
        };
        inner.position_ms = accepted;
        inner.anchor = Instant::now();
        inner.ended_sent = false;
        accepted
    }

    fn set_volume(&mut self, volume: f32) {
        self.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn position_ms(&self) -> u64 {
        self.lock().position_now()
    }

    fn duration_ms(&self) -> Option<u64> {
        self.lock().loaded.as_ref().map(|l| l.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> (ClockOutput, mpsc::UnboundedReceiver<OutputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let output =
            ClockOutput::new(tx, Duration::from_millis(10), Duration::from_millis(200)).unwrap();
        (output, rx)
    }

    /// Bypass the network probe for state-machine tests
    fn force_loaded(output: &ClockOutput, load_id: u64, duration_ms: u64) {
        let mut inner = output.lock();
        inner.loaded = Some(Loaded { load_id, duration_ms });
        inner.position_ms = 0;
        inner.anchor = Instant::now();
    }

    #[test]
    fn test_play_without_content_is_transport_error() {
        let (mut output, _rx) = output();
        assert!(matches!(output.play(), Err(Error::Transport(_))));
    }

    #[test]
    fn test_seek_clamps_to_duration() {
        let (mut output, _rx) = output();
        force_loaded(&output, 1, 30_000);

        assert_eq!(output.seek_to(45_000), 30_000);
        assert_eq!(output.seek_to(1_200), 1_200);
        assert_eq!(output.position_ms(), 1_200);
    }

    #[test]
    fn test_volume_clamped() {
        let (mut output, _rx) = output();
        output.set_volume(1.7);
        assert_eq!(output.volume(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_reports_end_once() {
        let (mut output, mut rx) = output();
        output.ensure_ticker();
        force_loaded(&output, 7, 50);
        output.play().unwrap();

        let mut ended = 0;
        for _ in 0..20 {
            tokio::time::advance(Duration::from_millis(10)).await;
            tokio::task::yield_now().await;
            while let Ok(event) = rx.try_recv() {
                if event == (OutputEvent::Ended { load_id: 7 }) {
                    ended += 1;
                }
            }
        }
        assert_eq!(ended, 1);
        assert_eq!(output.position_ms(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_at_end_reports_end_again() {
        let (mut output, mut rx) = output();
        output.ensure_ticker();
        force_loaded(&output, 3, 20);
        output.play().unwrap();

        let mut ended = 0;
        for round in 0..2 {
            for _ in 0..5 {
                tokio::time::advance(Duration::from_millis(10)).await;
                tokio::task::yield_now().await;
                while let Ok(event) = rx.try_recv() {
                    if event == (OutputEvent::Ended { load_id: 3 }) {
                        ended += 1;
                    }
                }
            }
            if round == 0 {
                output.play().unwrap();
            }
        }
        assert_eq!(ended, 2);
    }

    #[tokio::test]
    async fn test_unresponsive_manifest_server_times_out() {
        // Accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let (mut output, _rx) = output();
        let url = format!("http://{}/index.m3u8", addr);
        let result = tokio::time::timeout(Duration::from_secs(5), output.load(1, &url)).await;

        assert!(matches!(result, Ok(Err(Error::Transport(_)))));
        assert_eq!(output.duration_ms(), None);
    }
}
