//! Media-element adapter over a native inner-audio player
//!
//! The native player reports a handful of coarse callbacks (first-playable,
//! time-update, play, pause, ended, error). `MediaAdapter` turns them into
//! the ordered readiness progression and event set that media-element
//! clients expect:
//!
//! | native signal | events | readiness |
//! |---|---|---|
//! | canplay (first only) | load, loadend, loadedmetadata | at least `HaveCurrentData`, then playability check |
//! | time-update | timeupdate | playability check |
//! | play / pause | play / pause | paused shadow refreshed |
//! | ended | ended | `HaveEnoughData` |
//! | error | error | none |
//!
//! The playability check promotes to `HaveFutureData` once per source, when
//! the duration is known, and emits canplay, canplaythrough, play.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use log::{debug, trace, warn};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::events::{EventTarget, ListenerId, MediaEvent, MediaEventType};
use crate::platform::{AudioPlatform, InnerAudio, NativeSignal, SignalSink};
use crate::{AdapterConfig, ReadyState};

/// Answer of `can_play_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CanPlayType {
    #[serde(rename = "")]
    Empty,
    #[serde(rename = "probably")]
    Probably,
}

impl CanPlayType {
    /// Answer for a MIME type string.
    ///
    /// `audio/mpeg` anywhere in the input is supported. The `audio/mp4` check
    /// never compares its match position, so every other non-empty input
    /// also answers `Probably`.
    pub fn for_mime(mime: &str) -> Self {
        if mime.contains("audio/mpeg") || !mime.is_empty() {
            CanPlayType::Probably
        } else {
            CanPlayType::Empty
        }
    }

    /// Answer for an untyped value; anything but a string is unsupported
    pub fn for_value(value: &serde_json::Value) -> Self {
        match value.as_str() {
            Some(mime) => Self::for_mime(mime),
            None => CanPlayType::Empty,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanPlayType::Empty => "",
            CanPlayType::Probably => "probably",
        }
    }
}

impl std::fmt::Display for CanPlayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable adapter state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterSnapshot {
    pub ready_state: ReadyState,
    pub loaded: bool,
    pub paused: bool,
    pub volume: f64,
    pub logical_volume: f64,
    pub muted: bool,
    pub preload_pending: bool,
    pub current_time: f64,
    pub duration: f64,
    pub src: String,
    #[serde(rename = "loop")]
    pub loop_: bool,
    pub autoplay: bool,
    pub destroyed: bool,
}

/// A standard media-element facade over one exclusively owned native player
pub struct MediaAdapter {
    platform: Arc<dyn AudioPlatform>,
    /// `None` once destroyed
    native: Option<Box<dyn InnerAudio>>,
    signals: Receiver<NativeSignal>,
    listeners: EventTarget<MediaEvent>,
    ready_state: ReadyState,
    loaded: bool,
    paused: bool,
    volume: f64,
    muted: bool,
    preload_mute_active: bool,
}

impl MediaAdapter {
    pub const HAVE_NOTHING: u8 = 0;
    pub const HAVE_METADATA: u8 = 1;
    pub const HAVE_CURRENT_DATA: u8 = 2;
    pub const HAVE_FUTURE_DATA: u8 = 3;
    pub const HAVE_ENOUGH_DATA: u8 = 4;

    pub fn new(platform: Arc<dyn AudioPlatform>) -> Self {
        Self::with_config(platform, AdapterConfig::default())
    }

    pub fn with_src(platform: Arc<dyn AudioPlatform>, src: &str) -> Self {
        Self::with_config(
            platform,
            AdapterConfig {
                src: Some(src.to_string()),
                ..Default::default()
            },
        )
    }

    pub fn with_config(platform: Arc<dyn AudioPlatform>, config: AdapterConfig) -> Self {
        let native = platform.create_inner_audio();
        let (tx, rx) = mpsc::channel();
        for signal in NativeSignal::ALL {
            native.on_signal(SignalSink::new(signal, tx.clone()));
        }

        if let Some(value) = config.loop_ {
            native.set_loop(value);
        }
        if let Some(value) = config.autoplay {
            native.set_autoplay(value);
        }
        if let Some(src) = config.src.as_deref().filter(|s| !s.is_empty()) {
            native.set_src(src);
        }

        let volume = native.volume();
        let paused = native.paused();
        let mut adapter = MediaAdapter {
            platform,
            native: Some(native),
            signals: rx,
            listeners: EventTarget::new(),
            ready_state: ReadyState::HaveNothing,
            loaded: false,
            paused,
            volume,
            muted: false,
            preload_mute_active: false,
        };

        if let Some(volume) = config.volume {
            adapter.set_volume(volume);
        }
        if let Some(muted) = config.muted {
            adapter.set_muted(muted);
        }
        adapter
    }

    fn native(&self) -> Option<&dyn InnerAudio> {
        self.native.as_deref()
    }

    fn live_native(&self, op: &str) -> Result<&dyn InnerAudio> {
        self.native().ok_or_else(|| {
            warn!("{} called on a destroyed adapter", op);
            Error::Destroyed
        })
    }

    // --- native callbacks ---

    /// Drain queued native callbacks in arrival order; returns how many ran
    pub fn poll_native(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(signal) = self.signals.try_recv() {
            self.handle_native_signal(signal);
            handled += 1;
        }
        handled
    }

    /// Translate one native callback into events and readiness changes
    pub fn handle_native_signal(&mut self, signal: NativeSignal) {
        let Some(native) = self.native() else {
            debug!("ignoring {:?} callback after destroy", signal);
            return;
        };
        let native_paused = native.paused();

        match signal {
            NativeSignal::Canplay => self.on_first_playable(),
            NativeSignal::TimeUpdate => {
                self.emit(MediaEventType::Timeupdate);
                self.check_can_play();
            }
            NativeSignal::Play => {
                self.paused = native_paused;
                self.emit(MediaEventType::Play);
            }
            NativeSignal::Pause => {
                self.paused = native_paused;
                self.emit(MediaEventType::Pause);
            }
            NativeSignal::Ended => {
                self.paused = native_paused;
                self.emit(MediaEventType::Ended);
                self.set_ready_state(ReadyState::HaveEnoughData);
            }
            NativeSignal::Error => self.emit(MediaEventType::Error),
        }
    }

    fn on_first_playable(&mut self) {
        if self.loaded {
            debug!("repeated canplay callback ignored");
            return;
        }
        self.loaded = true;
        if self.ready_state < ReadyState::HaveCurrentData {
            self.set_ready_state(ReadyState::HaveCurrentData);
        }
        self.emit(MediaEventType::Load);
        self.emit(MediaEventType::Loadend);
        self.emit(MediaEventType::Loadedmetadata);
        self.check_can_play();
    }

    /// Promote to `HaveFutureData` once the duration is known
    fn check_can_play(&mut self) {
        if self.ready_state >= ReadyState::HaveFutureData {
            return;
        }
        let duration = self.duration();
        // zero (or NaN) means metadata has not resolved yet
        if duration == 0.0 || duration.is_nan() {
            trace!("playability deferred, duration unresolved");
            return;
        }

        if self.preload_mute_active {
            self.preload_mute_active = false;
            // a muted adapter stays silent
            let applied = self.applied_volume();
            if let Some(native) = self.native() {
                native.set_volume(applied);
            }
            debug!("preload finished, native volume restored to {}", applied);
        }
        self.set_ready_state(ReadyState::HaveFutureData);
        self.emit(MediaEventType::Canplay);
        self.emit(MediaEventType::Canplaythrough);
        self.emit(MediaEventType::Play);
    }

    fn set_ready_state(&mut self, state: ReadyState) {
        if self.ready_state != state {
            debug!("readyState {} -> {}", self.ready_state, state);
        }
        self.ready_state = state;
    }

    fn event(&self, event_type: MediaEventType, replayed: bool) -> MediaEvent {
        MediaEvent {
            event_type,
            ready_state: self.ready_state,
            replayed,
        }
    }

    fn emit(&mut self, event_type: MediaEventType) {
        let event = self.event(event_type, false);
        let n = self.listeners.dispatch(event_type.as_str(), &event);
        trace!("dispatched {} to {} listener(s)", event_type, n);
    }

    // --- listeners ---

    /// Register a listener. Event types are matched case-insensitively.
    ///
    /// Listeners for load milestones (load, loadend, loadedmetadata, canplay,
    /// canplaythrough) attached after the source has loaded receive one
    /// immediate, replayed emission of that event.
    pub fn add_event_listener<T, F>(&mut self, event_type: T, listener: F) -> ListenerId
    where
        T: AsRef<str>,
        F: FnMut(&MediaEvent) + Send + 'static,
    {
        let event_type = event_type.as_ref();
        let id = self.listeners.add_listener(event_type, Box::new(listener));

        if self.loaded {
            if let Ok(kind) = event_type.parse::<MediaEventType>() {
                if kind.is_load_milestone() {
                    trace!("replaying {} to late listener", kind);
                    let event = self.event(kind, true);
                    self.listeners.dispatch_to(id, &event);
                }
            }
        }
        id
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove_listener(id)
    }

    // --- playback ---

    pub fn play(&mut self) -> Result<()> {
        self.live_native("play")?.play();
        self.paused = false;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.live_native("pause")?.pause();
        self.paused = true;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.live_native("resume")?.resume();
        Ok(())
    }

    /// Best-effort preload: start playing silently so the native player
    /// reports readiness. The volume comes back with the `HaveFutureData`
    /// transition; until then the player stays silent.
    pub fn load(&mut self) -> Result<()> {
        let native = self.live_native("load")?;
        if self.loaded {
            return Ok(());
        }
        native.set_volume(0.0);
        self.preload_mute_active = true;
        debug!("silent preload started");
        self.play()
    }

    /// Release the native player. Later operations fail with `Error::Destroyed`.
    pub fn destroy(&mut self) -> Result<()> {
        let native = self.native.take().ok_or(Error::Destroyed)?;
        native.destroy();
        self.listeners.clear();
        self.preload_mute_active = false;
        debug!("adapter destroyed");
        Ok(())
    }

    pub fn is_destroyed(&self) -> bool {
        self.native.is_none()
    }

    /// New adapter on a fresh native player carrying over loop, autoplay
    /// and src. Volume, mute state and position are not copied.
    pub fn duplicate(&self) -> Result<MediaAdapter> {
        self.live_native("duplicate")?;
        let mut copy = MediaAdapter::new(self.platform.clone());
        copy.set_loop(self.loop_());
        copy.set_autoplay(self.autoplay());
        copy.set_src(&self.src());
        Ok(copy)
    }

    pub fn can_play_type(&self, mime: &str) -> CanPlayType {
        CanPlayType::for_mime(mime)
    }

    pub fn can_play_type_value(&self, value: &serde_json::Value) -> CanPlayType {
        CanPlayType::for_value(value)
    }

    // --- properties ---

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Whether a silent preload is still waiting for playability
    pub fn preload_pending(&self) -> bool {
        self.preload_mute_active
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn current_time(&self) -> f64 {
        self.native().map(|n| n.current_time()).unwrap_or(0.0)
    }

    pub fn set_current_time(&mut self, seconds: f64) {
        match self.native() {
            Some(native) => native.seek(seconds),
            None => warn!("seek ignored on a destroyed adapter"),
        }
    }

    pub fn duration(&self) -> f64 {
        self.native().map(|n| n.duration()).unwrap_or(0.0)
    }

    pub fn src(&self) -> String {
        self.native().map(|n| n.src()).unwrap_or_default()
    }

    /// Point the native player at a new source, discarding all readiness.
    ///
    /// Queued readiness callbacks (canplay, time-update, ended) from the
    /// previous source are dropped; queued play, pause and error callbacks
    /// are still relayed, before the reset.
    pub fn set_src(&mut self, src: &str) {
        if self.native.is_none() {
            warn!("src ignored on a destroyed adapter");
            return;
        }

        let (relayed, stale): (Vec<_>, Vec<_>) =
            self.signals.try_iter().partition(|s| !s.affects_readiness());
        if !stale.is_empty() {
            debug!("discarded {} stale readiness callback(s) from previous source", stale.len());
        }
        for signal in relayed {
            self.handle_native_signal(signal);
        }

        self.loaded = false;
        self.set_ready_state(ReadyState::HaveNothing);
        if let Some(native) = self.native() {
            native.set_src(src);
        }
    }

    /// List form of `set_src`: the first entry wins
    pub fn set_src_list<S: AsRef<str>>(&mut self, sources: &[S]) {
        let first = sources.first().map(|s| s.as_ref()).unwrap_or("");
        self.set_src(first);
    }

    pub fn loop_(&self) -> bool {
        self.native().map(|n| n.loop_()).unwrap_or(false)
    }

    pub fn set_loop(&mut self, value: bool) {
        match self.native() {
            Some(native) => native.set_loop(value),
            None => warn!("loop ignored on a destroyed adapter"),
        }
    }

    pub fn autoplay(&self) -> bool {
        self.native().map(|n| n.autoplay()).unwrap_or(false)
    }

    pub fn set_autoplay(&mut self, value: bool) {
        match self.native() {
            Some(native) => native.set_autoplay(value),
            None => warn!("autoplay ignored on a destroyed adapter"),
        }
    }

    /// Volume currently applied by the native player.
    ///
    /// Reads 0 while muted or during a silent preload; see [`MediaAdapter::logical_volume`].
    pub fn volume(&self) -> f64 {
        self.native().map(|n| n.volume()).unwrap_or(self.volume)
    }

    /// Volume last requested through `set_volume`
    pub fn logical_volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) {
        if volume.is_nan() {
            warn!("NaN volume ignored");
            return;
        }
        let clamped = volume.clamp(0.0, 1.0);
        if clamped != volume {
            warn!("volume {} clamped to {}", volume, clamped);
        }
        self.volume = clamped;
        if !self.muted {
            if let Some(native) = self.native() {
                native.set_volume(clamped);
            }
        }
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        let applied = self.applied_volume();
        if let Some(native) = self.native() {
            native.set_volume(applied);
        }
    }

    fn applied_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    pub fn snapshot(&self) -> AdapterSnapshot {
        AdapterSnapshot {
            ready_state: self.ready_state,
            loaded: self.loaded,
            paused: self.paused,
            volume: self.volume(),
            logical_volume: self.volume,
            muted: self.muted,
            preload_pending: self.preload_mute_active,
            current_time: self.current_time(),
            duration: self.duration(),
            src: self.src(),
            loop_: self.loop_(),
            autoplay: self.autoplay(),
            destroyed: self.is_destroyed(),
        }
    }
}

impl Drop for MediaAdapter {
    fn drop(&mut self) {
        if let Some(native) = self.native.take() {
            native.destroy();
        }
    }
}

impl std::fmt::Debug for MediaAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAdapter")
            .field("ready_state", &self.ready_state)
            .field("loaded", &self.loaded)
            .field("paused", &self.paused)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .field("preload_mute_active", &self.preload_mute_active)
            .field("destroyed", &self.is_destroyed())
            .field("listeners", &self.listeners)
            .finish()
    }
}
