//! Platform surface: the native inner-audio capability the adapter wraps
//!
//! This module contains the public types and traits a host uses to plug its
//! own audio player into [`crate::MediaAdapter`], plus a deterministic noop
//! platform for tests, benches and scenario replay.

pub mod media;

pub use media::{InnerAudio, NativeCall, NativeSignal, NoopInnerAudio, SignalSink};

use std::sync::{Mutex, MutexGuard};

/// Factory for native player instances ("create instance").
///
/// Every adapter asks for exactly one instance and keeps it for its whole
/// lifetime; `duplicate` asks for a fresh one.
pub trait AudioPlatform: Send + Sync {
    fn create_inner_audio(&self) -> Box<dyn InnerAudio>;
}

/// A noop platform handing out [`NoopInnerAudio`] instances.
///
/// Every created instance stays reachable through [`NoopAudioPlatform::instance`]
/// so a driver can fire callbacks into the adapter that owns it.
pub struct NoopAudioPlatform {
    instances: Mutex<Vec<NoopInnerAudio>>,
}

impl NoopAudioPlatform {
    pub fn new() -> Self {
        NoopAudioPlatform { instances: Mutex::new(Vec::new()) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NoopInnerAudio>> {
        self.instances.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of instances created so far
    pub fn created(&self) -> usize {
        self.lock().len()
    }

    pub fn instance(&self, index: usize) -> Option<NoopInnerAudio> {
        self.lock().get(index).cloned()
    }

    pub fn last_instance(&self) -> Option<NoopInnerAudio> {
        self.lock().last().cloned()
    }
}

impl Default for NoopAudioPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlatform for NoopAudioPlatform {
    fn create_inner_audio(&self) -> Box<dyn InnerAudio> {
        let audio = NoopInnerAudio::new();
        self.lock().push(audio.clone());
        Box::new(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_platform_keeps_handles_to_created_instances() {
        let p = NoopAudioPlatform::new();
        assert_eq!(p.created(), 0);
        assert!(p.last_instance().is_none());

        let boxed = p.create_inner_audio();
        boxed.set_src("a.mp3");
        let handle = p.last_instance().unwrap();
        assert_eq!(handle.src(), "a.mp3");

        let _second = p.create_inner_audio();
        assert_eq!(p.created(), 2);
        assert_eq!(p.instance(0).unwrap().src(), "a.mp3");
        assert_eq!(p.instance(1).unwrap().src(), "");
    }
}
