use std::time::Duration;

use bytes::Bytes;
use camwall_core::{ConnectionState, StreamMessage};
use futures_util::{StreamExt, stream::BoxStream};
use reqwest::{Url, header};
use tokio::{sync::watch, task::JoinHandle, time};

use crate::{ApiEndpoint, StreamError, sse::SseDecoder};

pub type FrameStream = BoxStream<'static, Result<Bytes, StreamError>>;

/// Opens one long-lived push connection and yields its raw body.
pub trait FrameSource: Send + Sync + 'static {
    fn open(&self) -> impl Future<Output = Result<FrameStream, StreamError>> + Send;
}

/// `GET {base}/events/stream` as server-sent events.
pub struct HttpFrameSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpFrameSource {
    /// Only the connect phase is bounded; the stream itself has no deadline.
    pub fn new(endpoint: &ApiEndpoint, connect_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: endpoint.stream_url(),
        })
    }
}

impl FrameSource for HttpFrameSource {
    async fn open(&self) -> Result<FrameStream, StreamError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(StreamError::Connect)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Status(status));
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(StreamError::Read))
            .boxed())
    }
}

/// What the stream client reports to its owner, in receipt order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamSignal {
    State(ConnectionState),
    Message(StreamMessage),
}

enum SessionEnd {
    Failed(StreamError),
    SinkClosed,
}

/// Event stream client.
///
/// Malformed frames are dropped here and never reach the sink. After a
/// failure the client stays in [`ConnectionState::Error`] unless a reconnect
/// delay is configured. Dropping the client closes the connection.
pub struct EventStream {
    handle: JoinHandle<()>,
    state: watch::Receiver<ConnectionState>,
}

impl EventStream {
    pub fn connect<S, F>(source: S, reconnect_delay: Option<Duration>, sink: F) -> Self
    where
        S: FrameSource,
        F: FnMut(StreamSignal) -> bool + Send + 'static,
    {
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);
        let handle = tokio::spawn(run(source, state_tx, reconnect_delay, sink));
        Self { handle, state }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::info!("event stream closed");
    }
}

async fn run<S, F>(
    source: S,
    state: watch::Sender<ConnectionState>,
    reconnect_delay: Option<Duration>,
    mut sink: F,
) where
    S: FrameSource,
    F: FnMut(StreamSignal) -> bool + Send + 'static,
{
    loop {
        let error = match session(&source, &state, &mut sink).await {
            SessionEnd::Failed(error) => error,
            SessionEnd::SinkClosed => return,
        };

        tracing::warn!("{error}");
        if !transition(&state, &mut sink, ConnectionState::failed) {
            return;
        }

        let Some(delay) = reconnect_delay else {
            tracing::info!("event stream left in error state, no reconnect configured");
            return;
        };

        time::sleep(delay).await;
        tracing::info!("reconnecting event stream");
        if !transition(&state, &mut sink, ConnectionState::reconnecting) {
            return;
        }
    }
}

async fn session<S, F>(
    source: &S,
    state: &watch::Sender<ConnectionState>,
    sink: &mut F,
) -> SessionEnd
where
    S: FrameSource,
    F: FnMut(StreamSignal) -> bool,
{
    let mut frames = match source.open().await {
        Ok(frames) => frames,
        Err(error) => return SessionEnd::Failed(error),
    };

    tracing::info!("event stream opened");
    if !transition(state, sink, ConnectionState::opened) {
        return SessionEnd::SinkClosed;
    }

    let mut decoder = SseDecoder::default();
    while let Some(chunk) = frames.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(error) => return SessionEnd::Failed(error),
        };

        for event in decoder.push(&chunk) {
            if !event.is_message() {
                tracing::debug!("ignoring '{}' event", event.event);
                continue;
            }

            match StreamMessage::parse(&event.data) {
                Ok(message) => {
                    if !sink(StreamSignal::Message(message)) {
                        return SessionEnd::SinkClosed;
                    }
                }
                Err(error) => tracing::warn!("dropping event frame: {error}"),
            }
        }
    }

    SessionEnd::Failed(StreamError::Closed)
}

fn transition<F>(
    state: &watch::Sender<ConnectionState>,
    sink: &mut F,
    next: fn(ConnectionState) -> ConnectionState,
) -> bool
where
    F: FnMut(StreamSignal) -> bool,
{
    let current = *state.borrow();
    let next = next(current);
    state.send_replace(next);
    sink(StreamSignal::State(next))
}
