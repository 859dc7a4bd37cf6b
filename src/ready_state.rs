//! Readiness levels of a media resource

use serde::{Deserialize, Serialize};

/// How much of the media is known to be usable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            ReadyState::HaveNothing => "HAVE_NOTHING",
            ReadyState::HaveMetadata => "HAVE_METADATA",
            ReadyState::HaveCurrentData => "HAVE_CURRENT_DATA",
            ReadyState::HaveFutureData => "HAVE_FUTURE_DATA",
            ReadyState::HaveEnoughData => "HAVE_ENOUGH_DATA",
        }
    }
}

impl From<ReadyState> for u8 {
    fn from(s: ReadyState) -> u8 {
        s.as_u8()
    }
}

impl TryFrom<u8> for ReadyState {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(ReadyState::HaveNothing),
            1 => Ok(ReadyState::HaveMetadata),
            2 => Ok(ReadyState::HaveCurrentData),
            3 => Ok(ReadyState::HaveFutureData),
            4 => Ok(ReadyState::HaveEnoughData),
            other => Err(format!("invalid readyState {}", other)),
        }
    }
}

impl std::fmt::Display for ReadyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
