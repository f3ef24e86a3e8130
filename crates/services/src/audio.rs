//! Background music and soundboard playback.
//!
//! Playback is fire-and-forget: callers never depend on whether a track actually
//! started. Implementations only track "currently playing: yes/no".

use rand::Rng;
use rand::seq::IndexedRandom;
use std::sync::Mutex;
use tracing::debug;

/// Sound samples for the soundboard button.
pub const BERGEN_SAMPLES: [&str; 7] = [
    "Bergen1.mp3",
    "Bergen2.mp3",
    "Bergen3.mp3",
    "Bergen4.m4a",
    "Bergen5.mp3",
    "Bergen6.mp3",
    "Bergen7.m4a",
];

pub trait AudioController: Send + Sync {
    fn play(&self, track: &str);
    fn pause(&self);
    fn stop(&self);
    fn is_playing(&self) -> bool;

    /// Start `track` unless something is already playing. Returns true if it started.
    fn play_if_idle(&self, track: &str) -> bool {
        if self.is_playing() {
            debug!(track, "audio already playing, continuing");
            return false;
        }
        self.play(track);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PlaybackState {
    track: Option<String>,
    playing: bool,
}

impl PlaybackState {
    fn play(&mut self, track: &str) {
        self.track = Some(track.to_owned());
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn stop(&mut self) {
        self.track = None;
        self.playing = false;
    }
}

/// Tracks playback state without producing sound.
#[derive(Debug, Default)]
pub struct SilentAudio {
    state: Mutex<PlaybackState>,
}

impl SilentAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_track(&self) -> Option<String> {
        self.state.lock().ok().and_then(|s| s.track.clone())
    }
}

impl AudioController for SilentAudio {
    fn play(&self, track: &str) {
        debug!(track, "play");
        if let Ok(mut state) = self.state.lock() {
            state.play(track);
        }
    }

    fn pause(&self) {
        debug!("pause");
        if let Ok(mut state) = self.state.lock() {
            state.pause();
        }
    }

    fn stop(&self) {
        debug!("stop");
        if let Ok(mut state) = self.state.lock() {
            state.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCall {
    Play(String),
    Pause,
    Stop,
}

/// Records every call, for tests.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
    state: Mutex<PlaybackState>,
}

impl RecordingAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: AudioCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl AudioController for RecordingAudio {
    fn play(&self, track: &str) {
        self.record(AudioCall::Play(track.to_owned()));
        if let Ok(mut state) = self.state.lock() {
            state.play(track);
        }
    }

    fn pause(&self) {
        self.record(AudioCall::Pause);
        if let Ok(mut state) = self.state.lock() {
            state.pause();
        }
    }

    fn stop(&self) {
        self.record(AudioCall::Stop);
        if let Ok(mut state) = self.state.lock() {
            state.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.state.lock().map(|s| s.playing).unwrap_or(false)
    }
}

/// The big Bergen button: plays a random sample.
#[derive(Debug, Clone)]
pub struct Soundboard {
    samples: Vec<String>,
}

impl Default for Soundboard {
    fn default() -> Self {
        Self::new(BERGEN_SAMPLES.iter().map(|s| (*s).to_owned()))
    }
}

impl Soundboard {
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = String>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Play a random sample. Returns the sample played, if any.
    pub fn play_random(&self, audio: &dyn AudioController) -> Option<&str> {
        self.play_random_with(audio, &mut rand::rng())
    }

    pub fn play_random_with<R: Rng + ?Sized>(
        &self,
        audio: &dyn AudioController,
        rng: &mut R,
    ) -> Option<&str> {
        let sample = self.samples.choose(rng)?;
        audio.play(sample);
        Some(sample.as_str())
    }
}
