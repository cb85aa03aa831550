use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use camwall_core::{ClientMessage, ServerMessage};
use camwall_render::{
    Buffer, CONNECTION_ID, LOG_ID, RenderHtml, STATS_ID, WALL_ID, render_connection, render_log,
    render_stats, render_wall,
};
use camwall_worker::{DashboardError, Subscription, Update};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use serde::Deserialize;

use crate::state::AppState;

/// Which page the socket feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Cameras,
    Events,
}

#[derive(Debug, Deserialize)]
pub struct WsParams {
    view: View,
}

pub async fn websocket_handler(
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, state, params.view))
}

async fn handle_websocket(socket: WebSocket, state: AppState, view: View) {
    let (tx, rx) = socket.split();
    let subscription = state.dashboard().subscribe();
    tracing::info!(
        "websocket opened for {view:?}, {} viewers",
        state.dashboard().viewer_count()
    );

    let mut send_task = tokio::spawn(handle_outgoing_messages(
        tx,
        state.clone(),
        subscription,
        view,
    ));
    let mut recv_task = tokio::spawn(handle_incoming_messages(state.clone(), rx));

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => {
            send_task.abort();
            // The send task owns the subscription; wait for it to drop.
            let _ = send_task.await;
        }
    }

    tracing::info!(
        "websocket closed for {view:?}, {} viewers",
        state.dashboard().viewer_count()
    );
}

async fn handle_outgoing_messages(
    mut sender: SplitSink<WebSocket, Message>,
    state: AppState,
    mut subscription: Subscription,
    view: View,
) {
    let mut fragments = Fragments::new(view);

    while let Some(update) = subscription.recv().await {
        let (messages, fatal) = match fragments.render(&state, update).await {
            Ok(messages) => (messages, false),
            Err(error) => {
                let message = ServerMessage::Error {
                    message: error.to_string(),
                };
                (vec![message], true)
            }
        };

        for msg in messages {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(error) => {
                    tracing::error!("failed to serialize server message: {error}");
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                return;
            }
        }

        if fatal {
            return;
        }
    }
}

async fn handle_incoming_messages(state: AppState, mut receiver: SplitStream<WebSocket>) {
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(error) => {
                        tracing::error!("failed to parse client message: {error}");
                        continue;
                    }
                };

                let dashboard = state.dashboard();
                let result = match client_msg {
                    ClientMessage::Swap { slot } => {
                        tracing::info!("swap main with {slot}");
                        dashboard.swap(slot)
                    }
                    ClientMessage::RefreshFeeds => dashboard.refresh_feeds(),
                    ClientMessage::DismissBanner => dashboard.dismiss_banner(),
                };

                if let Err(error) = result {
                    tracing::error!("failed to send command to dashboard: {error}");
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                tracing::error!("websocket error: {error}");
                break;
            }
        }
    }
}

/// Turns dashboard updates into fragment patches for one page.
struct Fragments {
    view: View,
    /// Newest log entry the page already shows.
    last_arrival: u64,
}

impl Fragments {
    fn new(view: View) -> Self {
        Self {
            view,
            last_arrival: 0,
        }
    }

    async fn render(
        &mut self,
        state: &AppState,
        update: Update,
    ) -> Result<Vec<ServerMessage>, DashboardError> {
        match (self.view, update) {
            (View::Cameras, Update::Wall | Update::Resync) => {
                let wall = state.dashboard().wall().await?;

                let mut stats = Buffer::default();
                render_stats(&wall, &mut stats);
                let mut slots = Buffer::default();
                render_wall(&wall, &mut slots);

                Ok(vec![replace(STATS_ID, stats), replace(WALL_ID, slots)])
            }
            (View::Events, Update::Connection(_) | Update::Resync) => {
                let feed = state.dashboard().feed().await?;
                if let Some(entry) = feed.entries.last() {
                    self.last_arrival = entry.arrival;
                }

                let mut connection = Buffer::default();
                render_connection(feed.connection, &mut connection);
                let mut log = Buffer::default();
                render_log(&feed, &mut log);

                Ok(vec![replace(CONNECTION_ID, connection), replace(LOG_ID, log)])
            }
            (View::Events, Update::Appended(entry)) => {
                // already part of the last snapshot
                if entry.arrival <= self.last_arrival {
                    return Ok(Vec::new());
                }
                self.last_arrival = entry.arrival;

                let mut html = Buffer::default();
                entry.render(&mut html);

                Ok(vec![ServerMessage::Append {
                    target: LOG_ID.to_string(),
                    html: html.into(),
                    keep: state.dashboard().log_capacity(),
                }])
            }
            _ => Ok(Vec::new()),
        }
    }
}

fn replace(target: &str, html: Buffer) -> ServerMessage {
    ServerMessage::Replace {
        target: target.to_string(),
        html: html.into(),
    }
}
