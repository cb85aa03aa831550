//! Read-only snapshots of the reconciled dashboard state, handed to renderers.

use serde::Serialize;

use crate::{CameraId, CameraStatus, ConnectionState, LogEntry, Slot};

/// Dashboard origin is served securely but the backend is plain HTTP on a
/// remote host. Browsers refuse to load the backend feeds in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportMismatch {
    pub origin: String,
    pub backend: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub slot: Slot,
    pub camera: Option<CameraId>,
    pub feed_url: Option<String>,
    /// `None` when the camera is missing from the latest poll.
    pub status: Option<CameraStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WallSnapshot {
    pub api_base: String,
    pub cameras: Vec<CameraStatus>,
    pub banner: Option<String>,
    pub last_success_ms: Option<u64>,
    pub poll_failures: u64,
    pub slots: Vec<SlotView>,
    pub transport_warning: Option<TransportMismatch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub api_base: String,
    pub connection: ConnectionState,
    pub capacity: usize,
    pub entries: Vec<LogEntry>,
    pub transport_warning: Option<TransportMismatch>,
}
