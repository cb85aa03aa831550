use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::CameraId;

#[derive(Debug, thiserror::Error)]
#[error("malformed event frame: {0}")]
pub struct FrameError(#[from] serde_json::Error);

/// Detection event category. Unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Pick,
    Return,
    TheftRisk,
    Other(CompactString),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Pick => "pick",
            EventKind::Return => "return",
            EventKind::TheftRisk => "theft_risk",
            EventKind::Other(name) => name,
        }
    }
}

impl From<&str> for EventKind {
    fn from(s: &str) -> Self {
        match s {
            "pick" => EventKind::Pick,
            "return" => EventKind::Return,
            "theft_risk" => EventKind::TheftRisk,
            other => EventKind::Other(other.into()),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = CompactString::deserialize(deserializer)?;
        Ok(EventKind::from(s.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub seq: u64,
    pub ts_ms: u64,
    pub camera_id: CameraId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoMessage {
    pub msg: String,
}

/// One decoded frame of the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Event(EventMessage),
    Info(InfoMessage),
}

impl StreamMessage {
    pub fn parse(data: &str) -> Result<Self, FrameError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn seq(&self) -> Option<u64> {
        match self {
            StreamMessage::Event(event) => Some(event.seq),
            StreamMessage::Info(_) => None,
        }
    }
}
