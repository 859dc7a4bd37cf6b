//! RFox Audio Adapter
//!
//! Presents a host platform's callback-driven "inner audio" player through
//! the behavioural contract of a standard media element: `readyState`
//! levels, ordered load/playability events, and volume/mute/loop/autoplay/
//! currentTime/duration/src property semantics.
//!
//! # Features
//!
//! - **Readiness state machine**: NOTHING → CURRENT_DATA → FUTURE_DATA →
//!   ENOUGH_DATA, reset only by a new `src`
//! - **Event translation**: six native callbacks become the ten standard
//!   media events, in a fixed order
//! - **Late-subscription replay**: load milestones are replayed to listeners
//!   attached after the source loaded
//! - **Silent preload**: `load()` plays at zero volume until the player
//!   reports it can play
//! - **Pluggable backends**: any player implementing [`InnerAudio`] works;
//!   [`NoopAudioPlatform`] is a deterministic in-memory one
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rfaudio::{MediaAdapter, NativeSignal, NoopAudioPlatform, ReadyState};
//!
//! let platform = Arc::new(NoopAudioPlatform::new());
//! let mut audio = MediaAdapter::with_src(platform.clone(), "a.mp3");
//! audio.add_event_listener("canplay", |e: &rfaudio::MediaEvent| {
//!     println!("{} at {}", e.event_type, e.ready_state);
//! });
//!
//! let native = platform.last_instance().unwrap();
//! native.set_duration(3.0);
//! native.fire(NativeSignal::Canplay);
//! audio.poll_native();
//! assert_eq!(audio.ready_state(), ReadyState::HaveFutureData);
//! ```

use serde::{Deserialize, Serialize};

pub mod adapter;
pub mod error;
pub mod events;
pub mod platform;
pub mod ready_state;
pub mod scenario;

pub use adapter::{AdapterSnapshot, CanPlayType, MediaAdapter};
pub use error::{Error, Result};
pub use events::{EventTarget, ListenerId, MediaEvent, MediaEventType};
pub use platform::{
    AudioPlatform, InnerAudio, NativeCall, NativeSignal, NoopAudioPlatform, NoopInnerAudio,
    SignalSink,
};
pub use ready_state::ReadyState;
pub use scenario::{Scenario, ScenarioReport, Step, TraceEntry};

/// Initial settings for a new adapter
///
/// Every field is optional; unset fields leave the native player's own
/// defaults in place. When `volume` is unset the logical volume is seeded
/// from the native player.
///
/// # Examples
///
/// ```
/// let cfg: rfaudio::AdapterConfig =
///     serde_json::from_str(r#"{ "src": "a.mp3", "loop": true }"#).unwrap();
/// assert_eq!(cfg.loop_, Some(true));
/// assert!(cfg.volume.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Source assigned at construction
    pub src: Option<String>,
    #[serde(rename = "loop")]
    pub loop_: Option<bool>,
    pub autoplay: Option<bool>,
    /// Logical volume in [0, 1]
    pub volume: Option<f64>,
    pub muted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_default_config() {
        let config = AdapterConfig::default();
        assert!(config.src.is_none());
        assert!(config.volume.is_none());
        assert!(config.muted.is_none());
    }

    #[test]
    fn test_config_applies_to_native() {
        let platform = Arc::new(NoopAudioPlatform::new());
        let config = AdapterConfig {
            src: Some("intro.mp3".into()),
            loop_: Some(true),
            autoplay: Some(true),
            volume: Some(0.4),
            muted: Some(true),
        };
        let audio = MediaAdapter::with_config(platform.clone(), config);

        let native = platform.last_instance().unwrap();
        assert_eq!(native.src(), "intro.mp3");
        assert!(native.loop_());
        assert!(native.autoplay());
        assert_eq!(audio.logical_volume(), 0.4);
        assert_eq!(audio.volume(), 0.0);
        assert_eq!(audio.ready_state(), ReadyState::HaveNothing);
    }
}
