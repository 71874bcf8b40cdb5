//! Recording audio output

use async_trait::async_trait;
use riffle_player::audio::AudioOutput;
use riffle_player::{Error, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct OutputLog {
    /// (load_id, manifest_url) for every successful load
    pub loads: Vec<(u64, String)>,
    pub playing: bool,
    pub position_ms: u64,
    pub duration_ms: Option<u64>,
    pub volume: f32,
    pub play_calls: usize,
    pub pause_calls: usize,
    pub seeks: Vec<u64>,
    /// Duration reported after every load
    pub load_duration_ms: Option<u64>,
    pub failing_manifests: HashSet<String>,
    pub refuse_play: bool,
}

impl Default for OutputLog {
    fn default() -> Self {
        Self {
            loads: Vec::new(),
            playing: false,
            position_ms: 0,
            duration_ms: None,
            volume: 1.0,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
            load_duration_ms: Some(200_000),
            failing_manifests: HashSet::new(),
            refuse_play: false,
        }
    }
}

/// Audio output that only records what the engine asked of it
pub struct FakeOutput {
    log: Arc<Mutex<OutputLog>>,
}

/// Test-side handle onto a `FakeOutput`
#[derive(Clone)]
pub struct OutputProbe {
    log: Arc<Mutex<OutputLog>>,
}

impl FakeOutput {
    pub fn new() -> (Self, OutputProbe) {
        let log = Arc::new(Mutex::new(OutputLog::default()));
        (
            Self {
                log: Arc::clone(&log),
            },
            OutputProbe { log },
        )
    }
}

impl OutputProbe {
    pub fn with<R>(&self, f: impl FnOnce(&mut OutputLog) -> R) -> R {
        let mut log = self.log.lock().unwrap();
        f(&mut log)
    }

    pub fn loads(&self) -> Vec<(u64, String)> {
        self.with(|l| l.loads.clone())
    }

    pub fn last_load_id(&self) -> u64 {
        self.with(|l| l.loads.last().map(|(id, _)| *id).unwrap_or(0))
    }

    pub fn is_playing(&self) -> bool {
        self.with(|l| l.playing)
    }

    pub fn volume(&self) -> f32 {
        self.with(|l| l.volume)
    }

    pub fn fail_manifest(&self, url: &str) {
        self.with(|l| {
            l.failing_manifests.insert(url.to_string());
        });
    }

    pub fn set_load_duration(&self, duration_ms: Option<u64>) {
        self.with(|l| l.load_duration_ms = duration_ms);
    }

    pub fn refuse_play(&self, refuse: bool) {
        self.with(|l| l.refuse_play = refuse);
    }
}

#[async_trait]
impl AudioOutput for FakeOutput {
    async fn load(&mut self, load_id: u64, manifest_url: &str) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        if log.failing_manifests.contains(manifest_url) {
            return Err(Error::Transport(format!("cannot open {}", manifest_url)));
        }
        log.loads.push((load_id, manifest_url.to_string()));
        log.playing = false;
        log.position_ms = 0;
        log.duration_ms = log.load_duration_ms;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut log = self.log.lock().unwrap();
        log.play_calls += 1;
        if log.refuse_play {
            return Err(Error::Transport("output refused to play".to_string()));
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.pause_calls += 1;
        log.playing = false;
    }

    fn seek_to(&mut self, position_ms: u64) -> u64 {
        let mut log = self.log.lock().unwrap();
        let accepted = match log.duration_ms {
            Some(d) => position_ms.min(d),
            None => position_ms,
        };
        log.seeks.push(position_ms);
        log.position_ms = accepted;
        accepted
    }

    fn set_volume(&mut self, volume: f32) {
        self.log.lock().unwrap().volume = volume;
    }

    fn position_ms(&self) -> u64 {
        self.log.lock().unwrap().position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.log.lock().unwrap().duration_ms
    }
}
