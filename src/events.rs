//! Media events and the listener registry they are dispatched through

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ReadyState;

/// Events a media adapter emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaEventType {
    Load,
    Loadend,
    Loadedmetadata,
    Canplay,
    Canplaythrough,
    Play,
    Pause,
    Ended,
    Timeupdate,
    Error,
}

impl MediaEventType {
    pub const ALL: [MediaEventType; 10] = [
        MediaEventType::Load,
        MediaEventType::Loadend,
        MediaEventType::Loadedmetadata,
        MediaEventType::Canplay,
        MediaEventType::Canplaythrough,
        MediaEventType::Play,
        MediaEventType::Pause,
        MediaEventType::Ended,
        MediaEventType::Timeupdate,
        MediaEventType::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaEventType::Load => "load",
            MediaEventType::Loadend => "loadend",
            MediaEventType::Loadedmetadata => "loadedmetadata",
            MediaEventType::Canplay => "canplay",
            MediaEventType::Canplaythrough => "canplaythrough",
            MediaEventType::Play => "play",
            MediaEventType::Pause => "pause",
            MediaEventType::Ended => "ended",
            MediaEventType::Timeupdate => "timeupdate",
            MediaEventType::Error => "error",
        }
    }

    /// Load milestones that are replayed to listeners attached after loading
    pub fn is_load_milestone(self) -> bool {
        matches!(
            self,
            MediaEventType::Load
                | MediaEventType::Loadend
                | MediaEventType::Canplay
                | MediaEventType::Canplaythrough
                | MediaEventType::Loadedmetadata
        )
    }
}

impl FromStr for MediaEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        MediaEventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown media event type: {}", s))
    }
}

impl AsRef<str> for MediaEventType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for MediaEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event payload delivered to listeners
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaEvent {
    #[serde(rename = "type")]
    pub event_type: MediaEventType,
    /// Adapter readiness at the moment of dispatch
    pub ready_state: ReadyState,
    /// True when synthesized for a listener attached after the milestone
    pub replayed: bool,
}

/// Handle returned by `add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

pub type Listener<E> = Box<dyn FnMut(&E) + Send>;

/// Minimal listener registry keyed by (lower-cased) event type
pub struct EventTarget<E> {
    listeners: HashMap<String, Vec<(ListenerId, Listener<E>)>>,
    next_id: u64,
}

impl<E> EventTarget<E> {
    pub fn new() -> Self {
        EventTarget { listeners: HashMap::new(), next_id: 1 }
    }

    /// Append a listener; listeners of one type run in registration order
    pub fn add_listener(&mut self, event_type: &str, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(event_type.to_ascii_lowercase())
            .or_default()
            .push((id, listener));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(lid, _)| *lid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invoke every listener of `event_type`; returns how many ran
    pub fn dispatch(&mut self, event_type: &str, event: &E) -> usize {
        match self.listeners.get_mut(&event_type.to_ascii_lowercase()) {
            Some(list) => {
                for (_, listener) in list.iter_mut() {
                    listener(event);
                }
                list.len()
            }
            None => 0,
        }
    }

    /// Invoke a single listener, regardless of type
    pub fn dispatch_to(&mut self, id: ListenerId, event: &E) -> bool {
        for list in self.listeners.values_mut() {
            if let Some((_, listener)) = list.iter_mut().find(|(lid, _)| *lid == id) {
                listener(event);
                return true;
            }
        }
        false
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .get(&event_type.to_ascii_lowercase())
            .map(|l| l.len())
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventTarget<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> =
            self.listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("EventTarget").field("listeners", &counts).finish()
    }
}
