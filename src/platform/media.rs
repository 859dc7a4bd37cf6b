//! Native inner-audio surface consumed by the adapter
//!
//! A host platform exposes an opaque, callback-driven audio player. The
//! adapter only ever talks to it through [`InnerAudio`], and receives its
//! callbacks as [`NativeSignal`] messages pushed through a [`SignalSink`].

use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// The six callback kinds a native player reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeSignal {
    /// First-playable ("canplay")
    Canplay,
    TimeUpdate,
    Play,
    Pause,
    Ended,
    Error,
}

impl NativeSignal {
    /// All signals, in the order the adapter registers callbacks for them
    pub const ALL: [NativeSignal; 6] = [
        NativeSignal::Canplay,
        NativeSignal::TimeUpdate,
        NativeSignal::Play,
        NativeSignal::Pause,
        NativeSignal::Ended,
        NativeSignal::Error,
    ];

    /// Whether the adapter's readiness for the current source depends on it
    pub fn affects_readiness(self) -> bool {
        matches!(self, NativeSignal::Canplay | NativeSignal::TimeUpdate | NativeSignal::Ended)
    }
}

/// Callback handle handed to the native player for one signal kind
///
/// Firing never blocks; the signal is queued until the adapter's next
/// `poll_native` turn.
#[derive(Debug, Clone)]
pub struct SignalSink {
    signal: NativeSignal,
    tx: Sender<NativeSignal>,
}

impl SignalSink {
    pub(crate) fn new(signal: NativeSignal, tx: Sender<NativeSignal>) -> Self {
        SignalSink { signal, tx }
    }

    pub fn signal(&self) -> NativeSignal {
        self.signal
    }

    /// Deliver the callback. Returns false once the owning adapter is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(self.signal).is_ok()
    }
}

/// Native player instance. Each adapter exclusively owns exactly one.
///
/// Operations are fire-and-forget: `play`, `pause` and `resume` return
/// immediately and report their outcome later through callbacks.
pub trait InnerAudio: Send + Sync {
    fn src(&self) -> String;
    fn set_src(&self, src: &str);

    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    fn loop_(&self) -> bool;
    fn set_loop(&self, value: bool);

    fn autoplay(&self) -> bool;
    fn set_autoplay(&self, value: bool);

    /// Playback position in seconds
    fn current_time(&self) -> f64;
    fn seek(&self, seconds: f64);

    /// Media duration in seconds; zero while metadata is unresolved
    fn duration(&self) -> f64;
    fn paused(&self) -> bool;

    fn play(&self);
    fn pause(&self);
    fn resume(&self);

    /// Release the native resources
    fn destroy(&self);

    /// Register the callback for one signal kind, replacing any previous one
    fn on_signal(&self, sink: SignalSink);
}

/// A call observed by [`NoopInnerAudio`], in invocation order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum NativeCall {
    SetSrc { src: String },
    SetVolume { volume: f64 },
    Seek { seconds: f64 },
    Play,
    Pause,
    Resume,
    Destroy,
}

#[derive(Debug)]
struct NoopAudioState {
    src: String,
    volume: f64,
    loop_: bool,
    autoplay: bool,
    current_time: f64,
    duration: f64,
    paused: bool,
    destroyed: bool,
    calls: Vec<NativeCall>,
    sinks: HashMap<NativeSignal, SignalSink>,
}

/// In-memory native player with scriptable callbacks
///
/// Clones share state, so a test can keep a handle while the adapter owns
/// the boxed instance. Nothing fires on its own: drivers set `duration` /
/// `paused` and call [`NoopInnerAudio::fire`] the way a host engine would.
#[derive(Debug, Clone)]
pub struct NoopInnerAudio {
    state: Arc<Mutex<NoopAudioState>>,
}

impl NoopInnerAudio {
    pub fn new() -> Self {
        NoopInnerAudio {
            state: Arc::new(Mutex::new(NoopAudioState {
                src: String::new(),
                volume: 1.0,
                loop_: false,
                autoplay: false,
                current_time: 0.0,
                duration: 0.0,
                paused: true,
                destroyed: false,
                calls: Vec::new(),
                sinks: HashMap::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NoopAudioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_duration(&self, seconds: f64) {
        self.lock().duration = seconds;
    }

    /// Move the playhead without recording a seek
    pub fn set_position(&self, seconds: f64) {
        self.lock().current_time = seconds;
    }

    pub fn set_paused(&self, paused: bool) {
        self.lock().paused = paused;
    }

    /// Invoke the registered callback for `signal`.
    ///
    /// Returns false when no callback is registered, the instance was
    /// destroyed, or the adapter has been dropped.
    pub fn fire(&self, signal: NativeSignal) -> bool {
        let sink = {
            let s = self.lock();
            if s.destroyed {
                return false;
            }
            s.sinks.get(&signal).cloned()
        };
        sink.map(|s| s.fire()).unwrap_or(false)
    }

    /// Fire a callback even after `destroy`, the way a late engine thread might
    pub fn fire_unchecked(&self, signal: NativeSignal) -> bool {
        let sink = self.lock().sinks.get(&signal).cloned();
        sink.map(|s| s.fire()).unwrap_or(false)
    }

    pub fn has_callback(&self, signal: NativeSignal) -> bool {
        self.lock().sinks.contains_key(&signal)
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl Default for NoopInnerAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl InnerAudio for NoopInnerAudio {
    fn src(&self) -> String {
        self.lock().src.clone()
    }

    fn set_src(&self, src: &str) {
        let mut s = self.lock();
        s.src = src.to_string();
        s.calls.push(NativeCall::SetSrc { src: src.to_string() });
    }

    fn volume(&self) -> f64 {
        self.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        let mut s = self.lock();
        s.volume = volume;
        s.calls.push(NativeCall::SetVolume { volume });
    }

    fn loop_(&self) -> bool {
        self.lock().loop_
    }

    fn set_loop(&self, value: bool) {
        self.lock().loop_ = value;
    }

    fn autoplay(&self) -> bool {
        self.lock().autoplay
    }

    fn set_autoplay(&self, value: bool) {
        self.lock().autoplay = value;
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn seek(&self, seconds: f64) {
        let mut s = self.lock();
        s.current_time = seconds;
        s.calls.push(NativeCall::Seek { seconds });
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn paused(&self) -> bool {
        self.lock().paused
    }

    fn play(&self) {
        let mut s = self.lock();
        s.paused = false;
        s.calls.push(NativeCall::Play);
    }

    fn pause(&self) {
        let mut s = self.lock();
        s.paused = true;
        s.calls.push(NativeCall::Pause);
    }

    fn resume(&self) {
        let mut s = self.lock();
        s.paused = false;
        s.calls.push(NativeCall::Resume);
    }

    fn destroy(&self) {
        let mut s = self.lock();
        s.destroyed = true;
        s.paused = true;
        s.calls.push(NativeCall::Destroy);
    }

    fn on_signal(&self, sink: SignalSink) {
        self.lock().sinks.insert(sink.signal(), sink);
    }
}
