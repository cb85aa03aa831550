use camwall_core::{ConnectionState, EventKind, FeedSnapshot, LogEntry, StreamMessage};

use crate::{Buffer, CONNECTION_ID, LOG_ID, RenderHtml, format_time};

pub fn render_events_page(feed: &FeedSnapshot) -> Buffer {
    let mut html = Buffer::with_header("Event stream", Some("events"));

    html.push_str(r#"<header class="topbar"><a href="/">&larr; Back</a><h1>Event stream</h1><div class="actions"><div id=""#);
    html.push_str(CONNECTION_ID);
    html.push_str(r#"">"#);
    render_connection(feed.connection, &mut html);
    html.push_str(r#"</div><a class="button" href="/cameras">Cameras &rarr;</a></div></header><main class="events-page">"#);

    if let Some(warning) = &feed.transport_warning {
        warning.render(&mut html);
    }

    html.push_str(r#"<div class="log" id=""#);
    html.push_str(LOG_ID);
    html.push_str(r#"" data-keep=""#);
    html.push_str(&feed.capacity.to_string());
    html.push_str(r#"">"#);
    render_log(feed, &mut html);
    html.push_str("</div></main>");

    html.add_footer();
    html
}

/// Contents of the connection indicator fragment.
pub fn render_connection(state: ConnectionState, output: &mut Buffer) {
    state.render(output);
}

/// Contents of the event log fragment.
pub fn render_log(feed: &FeedSnapshot, output: &mut Buffer) {
    if feed.entries.is_empty() {
        output.push_str(r#"<div class="placeholder">"#);
        if feed.connection == ConnectionState::Connected {
            output.push_str("Waiting for events...");
        } else {
            output.push_str("Connecting to event stream...");
        }
        output.push_str("</div>");
        return;
    }

    for entry in &feed.entries {
        entry.render(output);
    }
}

impl RenderHtml for ConnectionState {
    fn render(&self, output: &mut Buffer) {
        output.push_str(r#"<span class="status status-"#);
        output.push_str(self.as_str());
        output.push_str(r#"">"#);
        output.push_str(self.label());
        output.push_str("</span>");
    }
}

impl RenderHtml for LogEntry {
    fn render(&self, output: &mut Buffer) {
        let arrival = self.arrival.to_string();

        let event = match &self.message {
            StreamMessage::Info(info) => {
                output.push_str(r#"<div class="entry info" data-arrival=""#);
                output.push_str(&arrival);
                output.push_str(r#"">[info] "#);
                output.push_html(&info.msg);
                output.push_str("</div>");
                return;
            }
            StreamMessage::Event(event) => event,
        };

        output.push_str(r#"<div class="entry event" data-arrival=""#);
        output.push_str(&arrival);
        output.push_str(r##""><span class="seq">#"##);
        output.push_str(&event.seq.to_string());
        output.push_str(r#"</span><div class="body"><div class="meta"><span class="kind "#);
        output.push_str(kind_class(&event.kind));
        output.push_str(r#"">"#);
        output.push_html(event.kind.as_str());
        output.push_str(r#"</span><span class="camera">"#);
        output.push_html(&event.camera_id);
        output.push_str("</span>");

        if let Some(subject) = &event.subject_id {
            output.push_str(r#"<span class="subject">person:"#);
            output.push_html(subject);
            output.push_str("</span>");
        }

        output.push_str(r#"<span class="time">"#);
        output.push_str(&format_time(event.ts_ms));
        output.push_str("</span></div>");

        if let Some(payload) = event.payload.as_ref().filter(|payload| !payload.is_empty()) {
            match serde_json::to_string(payload) {
                Ok(json) => {
                    output.push_str(r#"<div class="payload">"#);
                    output.push_html(&json);
                    output.push_str("</div>");
                }
                Err(error) => {
                    tracing::warn!("failed to render payload of event {}: {error}", event.seq)
                }
            }
        }

        output.push_str("</div></div>");
    }
}

fn kind_class(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Pick => "kind-pick",
        EventKind::Return => "kind-return",
        EventKind::TheftRisk => "kind-theft_risk",
        EventKind::Other(_) => "kind-other",
    }
}
