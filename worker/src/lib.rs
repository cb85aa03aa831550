mod config;
mod state;
mod subscription;

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Context;
use camwall_client::{
    EventStream, FrameSource, HttpFrameSource, HttpStatusSource, PollOutcome, StatusPoller,
    StatusSource, StreamSignal, check_transport,
};
use camwall_core::{ConnectionState, FeedSnapshot, SecondarySlot, WallSnapshot};
use flume::{Receiver, Sender};
use tokio::{
    sync::{broadcast, oneshot},
    task::JoinHandle,
};

pub use config::DashboardConfig;
pub use subscription::{Subscription, Update};

use state::DashboardState;

const UPDATE_BUFFER_SIZE: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("dashboard worker is not running")]
    WorkerGone,
}

enum Command {
    Polled(PollOutcome),
    Stream(StreamSignal),
    Swap(SecondarySlot),
    RefreshFeeds,
    DismissBanner,
    Wall(oneshot::Sender<WallSnapshot>),
    Feed(oneshot::Sender<FeedSnapshot>),
}

/// The running dashboard: status poller, event stream and the worker task
/// that owns all reconciled state.
///
/// Every mutation travels through the worker inbox and is applied in receipt
/// order. Dropping the dashboard stops the poller, closes the event stream and
/// stops the worker.
pub struct Dashboard {
    inbox: Sender<Command>,
    updates: broadcast::Sender<Update>,
    viewers: Arc<AtomicUsize>,
    log_capacity: usize,
    worker: JoinHandle<()>,
    events: EventStream,
    _poller: StatusPoller,
}

impl Dashboard {
    /// Connects to the backend over HTTP.
    pub fn connect(config: DashboardConfig) -> anyhow::Result<Self> {
        let status = HttpStatusSource::new(&config.endpoint, config.request_timeout)
            .context("failed to build status client")?;
        let frames = HttpFrameSource::new(&config.endpoint, config.request_timeout)
            .context("failed to build event stream client")?;

        Ok(Self::start(config, status, frames))
    }

    pub fn start<S, F>(config: DashboardConfig, status: S, frames: F) -> Self
    where
        S: StatusSource,
        F: FrameSource,
    {
        let transport_warning = config
            .public_origin
            .as_deref()
            .and_then(|origin| check_transport(origin, &config.endpoint));
        if let Some(warning) = &transport_warning {
            tracing::warn!(
                "dashboard origin {} is https but backend {} is plain http, feeds may be blocked",
                warning.origin,
                warning.backend
            );
        }

        // unbounded: poller and stream callbacks must never block
        let (inbox_tx, inbox) = flume::unbounded();
        let (updates, _) = broadcast::channel(UPDATE_BUFFER_SIZE);

        let state = DashboardState::new(&config, transport_warning);
        let worker = tokio::spawn(run(state, inbox, updates.clone()));

        let tx = inbox_tx.clone();
        let poller = StatusPoller::spawn(status, config.poll_interval, move |outcome| {
            tx.send(Command::Polled(outcome)).is_ok()
        });

        let tx = inbox_tx.clone();
        let events = EventStream::connect(frames, config.reconnect_delay, move |signal| {
            tx.send(Command::Stream(signal)).is_ok()
        });

        tracing::info!("dashboard started for backend {}", config.endpoint);

        Self {
            inbox: inbox_tx,
            updates,
            viewers: Arc::default(),
            log_capacity: config.log_capacity.max(1),
            worker,
            events,
            _poller: poller,
        }
    }

    pub fn swap(&self, slot: SecondarySlot) -> Result<(), DashboardError> {
        self.send(Command::Swap(slot))
    }

    pub fn refresh_feeds(&self) -> Result<(), DashboardError> {
        self.send(Command::RefreshFeeds)
    }

    pub fn dismiss_banner(&self) -> Result<(), DashboardError> {
        self.send(Command::DismissBanner)
    }

    pub async fn wall(&self) -> Result<WallSnapshot, DashboardError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Wall(tx))?;
        rx.await.map_err(|_| DashboardError::WorkerGone)
    }

    pub async fn feed(&self) -> Result<FeedSnapshot, DashboardError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Feed(tx))?;
        rx.await.map_err(|_| DashboardError::WorkerGone)
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.updates.subscribe(), self.viewers.clone())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.events.state()
    }

    pub fn log_capacity(&self) -> usize {
        self.log_capacity
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::SeqCst)
    }

    fn send(&self, command: Command) -> Result<(), DashboardError> {
        self.inbox
            .send(command)
            .map_err(|_| DashboardError::WorkerGone)
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.worker.abort();
        tracing::info!("dashboard stopped");
    }
}

async fn run(
    mut state: DashboardState,
    inbox: Receiver<Command>,
    updates: broadcast::Sender<Update>,
) {
    while let Ok(command) = inbox.recv_async().await {
        let update = match command {
            Command::Polled(outcome) => state.apply_poll(outcome).then_some(Update::Wall),
            Command::Stream(signal) => Some(state.apply_signal(signal)),
            Command::Swap(slot) => {
                state.swap(slot);
                Some(Update::Wall)
            }
            Command::RefreshFeeds => {
                state.refresh_feeds();
                Some(Update::Wall)
            }
            Command::DismissBanner => state.dismiss_banner().then_some(Update::Wall),
            Command::Wall(reply) => {
                // the asker may have given up
                let _ = reply.send(state.wall());
                None
            }
            Command::Feed(reply) => {
                let _ = reply.send(state.feed());
                None
            }
        };

        // no subscribers is fine
        if let Some(update) = update {
            let _ = updates.send(update);
        }
    }

    tracing::debug!("dashboard inbox closed");
}

#[cfg(test)]
mod tests {
    use std::{sync::Mutex, time::Duration};

    use bytes::Bytes;
    use camwall_client::{ApiEndpoint, FrameStream, PollError, StatusCode, StreamError};
    use camwall_core::{CameraStatus, Slot};
    use futures_util::StreamExt;
    use tokio::time;

    use super::*;

    type StatusResult = Result<Vec<CameraStatus>, PollError>;
    type Chunk = Result<Bytes, StreamError>;

    /// Every fetch waits for the next scripted response.
    struct FakeStatus {
        responses: flume::Receiver<StatusResult>,
    }

    impl StatusSource for FakeStatus {
        async fn fetch(&self) -> StatusResult {
            match self.responses.recv_async().await {
                Ok(result) => result,
                Err(_) => std::future::pending().await,
            }
        }
    }

    /// A single connection; reopening fails.
    struct FakeFrames {
        chunks: Mutex<Option<flume::Receiver<Chunk>>>,
    }

    impl FrameSource for FakeFrames {
        async fn open(&self) -> Result<FrameStream, StreamError> {
            let chunks = self.chunks.lock().unwrap().take();
            match chunks {
                Some(chunks) => Ok(chunks.into_stream().boxed()),
                None => Err(StreamError::Closed),
            }
        }
    }

    struct Harness {
        dashboard: Dashboard,
        status: flume::Sender<StatusResult>,
        frames: flume::Sender<Chunk>,
    }

    fn harness(configure: impl FnOnce(&mut DashboardConfig)) -> Harness {
        let endpoint = ApiEndpoint::parse("http://10.0.0.5:8000").unwrap();
        let mut config = DashboardConfig::new(endpoint);
        config.poll_interval = Duration::from_millis(10);
        configure(&mut config);

        let (status, responses) = flume::unbounded();
        let (frames, chunks) = flume::unbounded();
        let dashboard = Dashboard::start(
            config,
            FakeStatus { responses },
            FakeFrames {
                chunks: Mutex::new(Some(chunks)),
            },
        );

        Harness {
            dashboard,
            status,
            frames,
        }
    }

    fn cameras(ids: &[&str]) -> StatusResult {
        Ok(ids
            .iter()
            .map(|id| CameraStatus {
                camera_id: (*id).into(),
                enabled: true,
                stats: None,
            })
            .collect())
    }

    fn frame(data: &str) -> Chunk {
        Ok(Bytes::from(format!("data: {data}\n\n")))
    }

    fn slot_ids(wall: &WallSnapshot) -> Vec<Option<String>> {
        wall.slots
            .iter()
            .map(|view| view.camera.as_ref().map(ToString::to_string))
            .collect()
    }

    fn ids(expected: [&str; 3]) -> Vec<Option<String>> {
        expected.iter().map(|id| Some(id.to_string())).collect()
    }

    async fn wall_when(
        dashboard: &Dashboard,
        done: impl Fn(&WallSnapshot) -> bool,
    ) -> WallSnapshot {
        for _ in 0..200 {
            let wall = dashboard.wall().await.unwrap();
            if done(&wall) {
                return wall;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("wall never reached the expected state");
    }

    async fn feed_when(
        dashboard: &Dashboard,
        done: impl Fn(&FeedSnapshot) -> bool,
    ) -> FeedSnapshot {
        for _ in 0..200 {
            let feed = dashboard.feed().await.unwrap();
            if done(&feed) {
                return feed;
            }
            time::sleep(Duration::from_millis(5)).await;
        }
        panic!("feed never reached the expected state");
    }

    async fn next(subscription: &mut Subscription) -> Option<Update> {
        time::timeout(Duration::from_secs(2), subscription.recv())
            .await
            .expect("timed out waiting for update")
    }

    #[tokio::test]
    async fn test_seeds_once_from_first_adequate_poll() {
        let h = harness(|_| {});

        h.status.send(cameras(&["A", "B"])).unwrap();
        let wall = wall_when(&h.dashboard, |wall| wall.cameras.len() == 2).await;
        assert!(wall.slots.iter().all(|view| view.camera.is_none()));

        h.status.send(cameras(&["A", "B", "C"])).unwrap();
        let wall = wall_when(&h.dashboard, |wall| wall.cameras.len() == 3).await;
        assert_eq!(slot_ids(&wall), ids(["A", "B", "C"]));

        h.status.send(cameras(&["C", "A", "B"])).unwrap();
        let first_is_c = |wall: &WallSnapshot| {
            wall.cameras.first().is_some_and(|cam| cam.camera_id == "C")
        };
        let wall = wall_when(&h.dashboard, first_is_c).await;
        assert_eq!(slot_ids(&wall), ids(["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_swap_through_inbox() {
        let h = harness(|_| {});
        h.status.send(cameras(&["A", "B", "C"])).unwrap();
        wall_when(&h.dashboard, |wall| wall.slots[0].camera.is_some()).await;

        h.dashboard.swap(SecondarySlot::First).unwrap();
        let wall = h.dashboard.wall().await.unwrap();
        assert_eq!(slot_ids(&wall), ids(["B", "A", "C"]));

        h.dashboard.swap(SecondarySlot::First).unwrap();
        let wall = h.dashboard.wall().await.unwrap();
        assert_eq!(slot_ids(&wall), ids(["A", "B", "C"]));
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_data() {
        let h = harness(|_| {});
        h.status.send(cameras(&["A", "B", "C"])).unwrap();
        wall_when(&h.dashboard, |wall| wall.cameras.len() == 3).await;

        h.status
            .send(Err(PollError::Status(StatusCode::BAD_GATEWAY)))
            .unwrap();
        let wall = wall_when(&h.dashboard, |wall| wall.banner.is_some()).await;
        assert_eq!(wall.cameras.len(), 3);
        assert_eq!(wall.poll_failures, 1);
        assert_eq!(slot_ids(&wall), ids(["A", "B", "C"]));

        h.dashboard.dismiss_banner().unwrap();
        assert!(h.dashboard.wall().await.unwrap().banner.is_none());
    }

    #[tokio::test]
    async fn test_vanished_camera_renders_without_status() {
        let h = harness(|_| {});
        h.status.send(cameras(&["A", "B", "C"])).unwrap();
        wall_when(&h.dashboard, |wall| wall.cameras.len() == 3).await;

        h.status.send(cameras(&["A", "B"])).unwrap();
        let wall = wall_when(&h.dashboard, |wall| wall.cameras.len() == 2).await;
        let view = &wall.slots[2];
        assert_eq!(view.slot, Slot::Secondary2);
        assert_eq!(view.camera.as_deref(), Some("C"));
        assert!(view.status.is_none());
    }

    #[tokio::test]
    async fn test_refresh_feeds_changes_urls() {
        let h = harness(|config| config.feed.fps = 5);
        h.status.send(cameras(&["A", "B", "C"])).unwrap();
        let wall = wall_when(&h.dashboard, |wall| wall.slots[0].camera.is_some()).await;
        assert_eq!(
            wall.slots[0].feed_url.as_deref(),
            Some("http://10.0.0.5:8000/cameras/A/mjpeg?fps=5&quality=75&_=0")
        );

        h.dashboard.refresh_feeds().unwrap();
        let wall = h.dashboard.wall().await.unwrap();
        assert!(wall.slots.iter().all(|view| view
            .feed_url
            .as_deref()
            .is_some_and(|url| url.ends_with("_=1"))));
    }

    #[tokio::test]
    async fn test_stream_feeds_bounded_log() {
        let h = harness(|config| config.log_capacity = 3);
        assert_eq!(h.dashboard.connection_state(), ConnectionState::Connecting);

        for seq in 1..=5 {
            h.frames
                .send(frame(&format!(
                    r#"{{"seq":{seq},"ts_ms":1,"camera_id":"A","type":"pick"}}"#
                )))
                .unwrap();
        }
        h.frames.send(frame("{broken")).unwrap();

        let feed = feed_when(&h.dashboard, |feed| {
            feed.entries.last().and_then(|entry| entry.message.seq()) == Some(5)
        })
        .await;
        assert_eq!(feed.connection, ConnectionState::Connected);
        assert_eq!(feed.capacity, 3);
        let seqs: Vec<_> = feed.entries.iter().filter_map(|e| e.message.seq()).collect();
        assert_eq!(seqs, [3, 4, 5]);
        assert_eq!(h.dashboard.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_stream_error_is_reported() {
        let h = harness(|_| {});
        h.frames.send(Err(StreamError::Closed)).unwrap();

        let feed = feed_when(&h.dashboard, |feed| feed.connection == ConnectionState::Error).await;
        assert!(feed.entries.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_sees_updates_in_order() {
        let h = harness(|_| {});
        let mut subscription = h.dashboard.subscribe();
        assert_eq!(h.dashboard.viewer_count(), 1);

        h.frames.send(frame(r#"{"msg":"connected"}"#)).unwrap();

        assert!(matches!(next(&mut subscription).await, Some(Update::Resync)));
        assert!(matches!(
            next(&mut subscription).await,
            Some(Update::Connection(ConnectionState::Connected))
        ));
        match next(&mut subscription).await {
            Some(Update::Appended(entry)) => assert_eq!(entry.arrival, 1),
            other => panic!("Expected Appended update, got {other:?}"),
        }

        drop(subscription);
        assert_eq!(h.dashboard.viewer_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_warning_in_snapshots() {
        let h = harness(|config| config.public_origin = Some("https://dash.example.com".into()));

        let wall = h.dashboard.wall().await.unwrap();
        let warning = wall.transport_warning.unwrap();
        assert_eq!(warning.origin, "https://dash.example.com");
        assert_eq!(warning.backend, "http://10.0.0.5:8000");

        let feed = h.dashboard.feed().await.unwrap();
        assert!(feed.transport_warning.is_some());
    }

    #[tokio::test]
    async fn test_no_warning_without_origin() {
        let h = harness(|_| {});
        assert!(h.dashboard.wall().await.unwrap().transport_warning.is_none());
    }
}
