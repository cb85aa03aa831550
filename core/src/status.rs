use serde::{Deserialize, Serialize};

use crate::CameraId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub camera_id: CameraId,
    pub enabled: bool,
    #[serde(default)]
    pub stats: Option<CameraStats>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraStats {
    pub frames_decoded: u64,
    pub frames_emitted: u64,
    pub last_ts_ms: u64,
}

/// How settled poll results are reconciled when requests overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PollOrdering {
    /// Every settled result is applied in completion order.
    #[default]
    LastSettled,
    /// Results older than the newest applied request are discarded.
    Sequenced,
}

/// Latest camera status snapshot plus the poll failure banner.
///
/// The snapshot is replaced wholesale by each successful poll. A failed poll
/// keeps the previous snapshot and only sets the banner.
#[derive(Debug, Default)]
pub struct StatusBoard {
    cameras: Vec<CameraStatus>,
    banner: Option<String>,
    failures: u64,
    newest_ticket: u64,
    ordering: PollOrdering,
}

impl StatusBoard {
    pub fn new(ordering: PollOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    pub fn cameras(&self) -> &[CameraStatus] {
        &self.cameras
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Failed polls applied since startup.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn camera(&self, camera_id: &CameraId) -> Option<&CameraStatus> {
        self.cameras.iter().find(|cam| &cam.camera_id == camera_id)
    }

    /// Apply a successful poll. Returns `false` when the result was discarded
    /// as stale.
    pub fn replace(&mut self, ticket: u64, cameras: Vec<CameraStatus>) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        self.cameras = cameras;
        self.banner = None;
        true
    }

    /// Apply a failed poll. Returns `false` when the failure was discarded as
    /// stale.
    pub fn fail(&mut self, ticket: u64, message: impl Into<String>) -> bool {
        if !self.accept(ticket) {
            return false;
        }

        self.banner = Some(message.into());
        self.failures += 1;
        true
    }

    /// Returns `true` if a banner was showing.
    pub fn dismiss(&mut self) -> bool {
        self.banner.take().is_some()
    }

    fn accept(&mut self, ticket: u64) -> bool {
        if self.ordering == PollOrdering::Sequenced && ticket < self.newest_ticket {
            return false;
        }

        self.newest_ticket = self.newest_ticket.max(ticket);
        true
    }
}
