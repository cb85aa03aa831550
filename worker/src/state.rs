use camwall_client::{ApiEndpoint, FeedParams, PollOutcome, StreamSignal};
use camwall_core::{
    ConnectionState, EventLog, FeedSnapshot, SecondarySlot, SlotAssignment, SlotView,
    StatusBoard, TransportMismatch, WallSnapshot,
};

use crate::{DashboardConfig, Update};

/// Reconciled dashboard state. Owned by the worker task alone.
pub(crate) struct DashboardState {
    endpoint: ApiEndpoint,
    feed: FeedParams,
    transport_warning: Option<TransportMismatch>,
    board: StatusBoard,
    slots: SlotAssignment,
    log: EventLog,
    connection: ConnectionState,
    last_success_ms: Option<u64>,
    nonce: u64,
}

impl DashboardState {
    pub(crate) fn new(
        config: &DashboardConfig,
        transport_warning: Option<TransportMismatch>,
    ) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            feed: config.feed,
            transport_warning,
            board: StatusBoard::new(config.poll_ordering),
            slots: SlotAssignment::default(),
            log: EventLog::with_capacity(config.log_capacity),
            connection: ConnectionState::default(),
            last_success_ms: None,
            nonce: 0,
        }
    }

    /// Returns `true` if the wall changed.
    pub(crate) fn apply_poll(&mut self, outcome: PollOutcome) -> bool {
        let PollOutcome { ticket, result } = outcome;

        let applied = match result {
            Ok(cameras) => {
                let count = cameras.len();
                let applied = self.board.replace(ticket, cameras);
                if applied {
                    self.last_success_ms = Some(now_ms());
                    tracing::debug!("status poll {ticket} applied, {count} cameras");
                    self.seed_slots();
                }
                applied
            }
            Err(error) => {
                tracing::warn!("{error}");
                self.board.fail(ticket, error.to_string())
            }
        };

        if !applied {
            tracing::debug!("discarding stale status poll {ticket}");
        }
        applied
    }

    fn seed_slots(&mut self) {
        if !self.slots.seed(self.board.cameras()) {
            return;
        }

        let names: Vec<String> = self
            .slots
            .iter()
            .map(|(slot, camera)| format!("{slot}={}", camera.map_or("-", |id| &**id)))
            .collect();
        tracing::info!("slots seeded: {}", names.join(", "));
    }

    pub(crate) fn apply_signal(&mut self, signal: StreamSignal) -> Update {
        match signal {
            StreamSignal::State(state) => {
                if state != self.connection {
                    tracing::info!("event stream {} -> {}", self.connection, state);
                }
                self.connection = state;
                Update::Connection(state)
            }
            StreamSignal::Message(message) => Update::Appended(self.log.push(message).clone()),
        }
    }

    pub(crate) fn swap(&mut self, slot: SecondarySlot) {
        self.slots.swap(slot);
        tracing::debug!("swapped main with {slot}");
    }

    pub(crate) fn refresh_feeds(&mut self) {
        self.nonce += 1;
        tracing::debug!("feed nonce now {}", self.nonce);
    }

    pub(crate) fn dismiss_banner(&mut self) -> bool {
        self.board.dismiss()
    }

    pub(crate) fn wall(&self) -> WallSnapshot {
        let slots = self
            .slots
            .iter()
            .map(|(slot, camera)| SlotView {
                slot,
                camera: camera.cloned(),
                feed_url: camera.map(|id| self.endpoint.mjpeg_url(id, self.feed, self.nonce)),
                status: camera.and_then(|id| self.board.camera(id)).cloned(),
            })
            .collect();

        WallSnapshot {
            api_base: self.endpoint.to_string(),
            cameras: self.board.cameras().to_vec(),
            banner: self.board.banner().map(str::to_string),
            last_success_ms: self.last_success_ms,
            poll_failures: self.board.failures(),
            slots,
            transport_warning: self.transport_warning.clone(),
        }
    }

    pub(crate) fn feed(&self) -> FeedSnapshot {
        FeedSnapshot {
            api_base: self.endpoint.to_string(),
            connection: self.connection,
            capacity: self.log.capacity(),
            entries: self.log.iter().cloned().collect(),
            transport_warning: self.transport_warning.clone(),
        }
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
