//! Scripted replay of adapter operations and native callbacks
//!
//! A scenario drives one [`MediaAdapter`] over a [`NoopAudioPlatform`] and
//! records every event the adapter dispatches, in order. It is what the
//! `rfaudio replay` command runs, and a compact way to pin down event
//! sequences in tests.
//!
//! ```
//! let json = r#"{
//!     "config": { "src": "a.mp3" },
//!     "steps": [
//!         { "op": "signal", "signal": "canplay" },
//!         { "op": "set_duration", "seconds": 3.0 },
//!         { "op": "signal", "signal": "time_update" }
//!     ]
//! }"#;
//! let report = rfaudio::Scenario::from_json(json).unwrap().run().unwrap();
//! assert_eq!(report.final_state.ready_state, rfaudio::ReadyState::HaveFutureData);
//! ```

use std::io::Read;
use std::sync::{Arc, Mutex};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::adapter::{AdapterSnapshot, MediaAdapter};
use crate::error::{Error, Result};
use crate::events::{MediaEvent, MediaEventType};
use crate::platform::{NativeCall, NativeSignal, NoopAudioPlatform, NoopInnerAudio};
use crate::AdapterConfig;

fn all_event_types() -> Vec<String> {
    MediaEventType::ALL.iter().map(|t| t.as_str().to_string()).collect()
}

/// A replay script
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: AdapterConfig,
    /// Event types recorded from the start; defaults to all of them
    #[serde(default = "all_event_types")]
    pub listen: Vec<String>,
    pub steps: Vec<Step>,
}

/// One scripted action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// The native player invokes one of its callbacks
    Signal { signal: NativeSignal },
    /// Native duration as later read by the adapter
    SetDuration { seconds: f64 },
    /// Native playhead, without a seek
    SetPosition { seconds: f64 },
    /// Native paused flag, as read on play/pause/ended callbacks
    SetNativePaused { paused: bool },
    /// Attach another recording listener (late subscription)
    Listen { event: String },
    Play,
    Pause,
    Resume,
    Load,
    Destroy,
    /// A string, or a list whose first entry is used
    SetSrc { src: serde_json::Value },
    SetVolume { volume: f64 },
    SetMuted { muted: bool },
    SetLoop { value: bool },
    SetAutoplay { value: bool },
    Seek { seconds: f64 },
    /// Any JSON value; non-strings answer ""
    CanPlayType { mime: serde_json::Value },
    /// Continue the script on a duplicate of the current adapter
    Duplicate,
    Snapshot,
}

/// One line of the recorded trace
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEntry {
    Event {
        step: usize,
        /// Event type the recording listener was attached for
        listener: String,
        event: MediaEvent,
    },
    CanPlayType {
        step: usize,
        answer: String,
    },
    Snapshot {
        step: usize,
        state: AdapterSnapshot,
    },
    Failure {
        step: usize,
        error: String,
    },
}

/// Outcome of a replay
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub trace: Vec<TraceEntry>,
    pub final_state: AdapterSnapshot,
    /// Calls made on the native player of the final adapter
    pub native_calls: Vec<NativeCall>,
}

impl ScenarioReport {
    /// Event types in dispatch order
    pub fn events(&self) -> Vec<MediaEventType> {
        self.trace
            .iter()
            .filter_map(|e| match e {
                TraceEntry::Event { event, .. } => Some(event.event_type),
                _ => None,
            })
            .collect()
    }
}

type Recorded = Arc<Mutex<Vec<(String, MediaEvent)>>>;

struct Runner {
    platform: Arc<NoopAudioPlatform>,
    adapter: MediaAdapter,
    native: NoopInnerAudio,
    recorded: Recorded,
    trace: Vec<TraceEntry>,
}

impl Runner {
    fn attach(&mut self, event_type: &str) {
        let recorded = self.recorded.clone();
        let label = event_type.to_ascii_lowercase();
        self.adapter.add_event_listener(event_type, move |e: &MediaEvent| {
            recorded
                .lock()
                .unwrap_or_else(|p| p.into_inner())
                .push((label.clone(), e.clone()));
        });
    }

    fn flush(&mut self, step: usize) {
        let drained: Vec<_> = self
            .recorded
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .drain(..)
            .collect();
        self.trace.extend(drained.into_iter().map(|(listener, event)| TraceEntry::Event {
            step,
            listener,
            event,
        }));
    }

    fn fail(&mut self, step: usize, err: Error) {
        debug!("step {} failed: {}", step, err);
        self.trace.push(TraceEntry::Failure { step, error: err.to_string() });
    }

    fn apply(&mut self, index: usize, step: &Step, listen: &[String]) -> Result<()> {
        match step {
            Step::Signal { signal } => {
                if !self.native.fire(*signal) {
                    debug!("step {}: {:?} not delivered", index, signal);
                }
                self.adapter.poll_native();
            }
            Step::SetDuration { seconds } => self.native.set_duration(*seconds),
            Step::SetPosition { seconds } => self.native.set_position(*seconds),
            Step::SetNativePaused { paused } => self.native.set_paused(*paused),
            Step::Listen { event } => self.attach(event),
            Step::Play => {
                if let Err(e) = self.adapter.play() {
                    self.fail(index, e);
                }
            }
            Step::Pause => {
                if let Err(e) = self.adapter.pause() {
                    self.fail(index, e);
                }
            }
            Step::Resume => {
                if let Err(e) = self.adapter.resume() {
                    self.fail(index, e);
                }
            }
            Step::Load => {
                if let Err(e) = self.adapter.load() {
                    self.fail(index, e);
                }
            }
            Step::Destroy => {
                if let Err(e) = self.adapter.destroy() {
                    self.fail(index, e);
                }
            }
            Step::SetSrc { src } => match src {
                serde_json::Value::String(s) => self.adapter.set_src(s),
                serde_json::Value::Array(items) => {
                    let list = items
                        .iter()
                        .map(|v| {
                            v.as_str().map(str::to_string).ok_or_else(|| {
                                Error::Scenario(format!("step {}: src list entries must be strings", index))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    self.adapter.set_src_list(&list);
                }
                other => {
                    return Err(Error::Scenario(format!(
                        "step {}: src must be a string or list, got {}",
                        index, other
                    )))
                }
            },
            Step::SetVolume { volume } => self.adapter.set_volume(*volume),
            Step::SetMuted { muted } => self.adapter.set_muted(*muted),
            Step::SetLoop { value } => self.adapter.set_loop(*value),
            Step::SetAutoplay { value } => self.adapter.set_autoplay(*value),
            Step::Seek { seconds } => self.adapter.set_current_time(*seconds),
            Step::CanPlayType { mime } => {
                let answer = self.adapter.can_play_type_value(mime);
                self.trace.push(TraceEntry::CanPlayType {
                    step: index,
                    answer: answer.as_str().to_string(),
                });
            }
            Step::Duplicate => match self.adapter.duplicate() {
                Ok(copy) => {
                    self.adapter = copy;
                    self.native = self
                        .platform
                        .last_instance()
                        .ok_or_else(|| Error::Scenario("duplicate created no native player".into()))?;
                    for event_type in listen {
                        self.attach(event_type);
                    }
                }
                Err(e) => self.fail(index, e),
            },
            Step::Snapshot => {
                let state = self.adapter.snapshot();
                self.trace.push(TraceEntry::Snapshot { step: index, state });
            }
        }
        Ok(())
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Run every step against a fresh adapter on a noop platform
    pub fn run(&self) -> Result<ScenarioReport> {
        let platform = Arc::new(NoopAudioPlatform::new());
        let adapter = MediaAdapter::with_config(platform.clone(), self.config.clone());
        let native = platform
            .last_instance()
            .ok_or_else(|| Error::Scenario("platform created no native player".into()))?;

        let mut runner = Runner {
            platform,
            adapter,
            native,
            recorded: Arc::new(Mutex::new(Vec::new())),
            trace: Vec::new(),
        };
        for event_type in &self.listen {
            runner.attach(event_type);
        }

        for (index, step) in self.steps.iter().enumerate() {
            runner.apply(index, step, &self.listen)?;
            runner.flush(index);
        }
        info!("scenario finished: {} steps, {} trace entries", self.steps.len(), runner.trace.len());

        Ok(ScenarioReport {
            final_state: runner.adapter.snapshot(),
            native_calls: runner.native.calls(),
            trace: runner.trace,
        })
    }
}
