use camwall_core::{CameraStatus, ClientMessage, SecondarySlot, Slot, SlotView, WallSnapshot};

use crate::{Buffer, RenderHtml, STATS_ID, WALL_ID, format_count, format_time};

pub fn render_wall_page(wall: &WallSnapshot) -> Buffer {
    let mut html = Buffer::with_header("Camera wall", Some("cameras"));

    html.push_str(r#"<header class="topbar"><a href="/">&larr; Back</a><h1>Camera wall</h1><div class="actions"><form method="post" action="/api/feeds/refresh""#);
    html.push_command(&ClientMessage::RefreshFeeds);
    html.push_str(r#"><button type="submit" title="Restart stalled video feeds">Refresh</button></form><a class="button" href="/events">Events &rarr;</a></div></header>"#);

    html.push_str(r#"<main class="wall-page"><section class="panel stats-panel"><h3>Camera statistics</h3><p class="muted">Live counters from backend</p><p class="muted small">API: <code>"#);
    html.push_html(&wall.api_base);
    html.push_str("</code></p>");
    if let Some(warning) = &wall.transport_warning {
        warning.render(&mut html);
    }

    html.push_str(r#"<div id=""#);
    html.push_str(STATS_ID);
    html.push_str(r#"">"#);
    render_stats(wall, &mut html);
    html.push_str(r#"</div></section><section class="wall" id=""#);
    html.push_str(WALL_ID);
    html.push_str(r#"">"#);
    render_wall(wall, &mut html);
    html.push_str("</section></main>");

    html.add_footer();
    html
}

/// Contents of the statistics fragment.
pub fn render_stats(wall: &WallSnapshot, output: &mut Buffer) {
    if let Some(banner) = &wall.banner {
        output.push_str(r#"<div class="banner error"><span>"#);
        output.push_html(banner);
        output.push_str(r#"</span><form method="post" action="/api/banner/dismiss""#);
        output.push_command(&ClientMessage::DismissBanner);
        output.push_str(r#"><button type="submit">Dismiss</button></form></div>"#);
    }

    if wall.cameras.is_empty() {
        if wall.banner.is_none() {
            output.push_str(r#"<div class="placeholder">Waiting for cameras...</div>"#);
        }
    } else {
        for camera in &wall.cameras {
            camera.render(output);
        }
    }

    output.push_str(r#"<p class="muted small">Last update: "#);
    match wall.last_success_ms {
        Some(ts) => output.push_str(&format_time(ts)),
        None => output.push_str("never"),
    }
    if wall.poll_failures > 0 {
        output.push_str(" &middot; failed polls: ");
        output.push_str(&format_count(Some(wall.poll_failures)));
    }
    output.push_str("</p>");
}

/// Contents of the video wall fragment.
pub fn render_wall(wall: &WallSnapshot, output: &mut Buffer) {
    for view in &wall.slots {
        view.render(output);
    }
}

impl RenderHtml for CameraStatus {
    fn render(&self, output: &mut Buffer) {
        output.push_str(r#"<div class="camera"><div class="camera-head"><span class="camera-id">"#);
        output.push_html(&self.camera_id);
        if self.enabled {
            output.push_str(r#"</span><span class="badge enabled">enabled</span></div>"#);
        } else {
            output.push_str(r#"</span><span class="badge disabled">disabled</span></div>"#);
        }

        let stats = self.stats.as_ref();
        let rows = [
            ("Decoded", stats.map(|s| s.frames_decoded)),
            ("Emitted", stats.map(|s| s.frames_emitted)),
            ("Last TS", stats.map(|s| s.last_ts_ms)),
        ];

        output.push_str("<dl>");
        for (label, value) in rows {
            output.push_str("<dt>");
            output.push_str(label);
            output.push_str("</dt><dd>");
            output.push_str(&format_count(value));
            output.push_str("</dd>");
        }
        output.push_str("</dl></div>");
    }
}

impl RenderHtml for SlotView {
    fn render(&self, output: &mut Buffer) {
        output.push_str(r#"<figure class="slot slot-"#);
        output.push_str(self.slot.as_str());
        output.push_str(r#"" data-slot=""#);
        output.push_str(self.slot.as_str());
        output.push_str(r#""><figcaption><span class="label">"#);
        match &self.camera {
            Some(camera) => output.push_html(camera),
            None => output.push_str(self.slot.as_str()),
        }
        output.push_str("</span>");

        if self.camera.is_some() && self.status.is_none() {
            output.push_str(r#"<span class="badge stale">no data</span>"#);
        }

        if let Some(secondary) = secondary(self.slot) {
            output.push_str(r#"<form method="post" action="/api/slots/"#);
            output.push_str(self.slot.as_str());
            output.push_str(r#"/swap""#);
            output.push_command(&ClientMessage::Swap { slot: secondary });
            output.push_str(r#"><button type="submit" class="swap">Swap with main</button></form>"#);
        }
        output.push_str("</figcaption>");

        match (&self.camera, &self.feed_url) {
            (Some(camera), Some(url)) => {
                output.push_str(r#"<img class="feed" src=""#);
                output.push_attr(url);
                output.push_str(r#"" alt=""#);
                output.push_attr(camera);
                output.push_str(r#"">"#);
            }
            _ => {
                output.push_str(r#"<div class="feed empty">"#);
                if self.slot == Slot::Main {
                    output.push_str("No camera selected");
                } else {
                    output.push_str("No camera");
                }
                output.push_str("</div>");
            }
        }

        output.push_str("</figure>");
    }
}

fn secondary(slot: Slot) -> Option<SecondarySlot> {
    match slot {
        Slot::Main => None,
        Slot::Secondary1 => Some(SecondarySlot::First),
        Slot::Secondary2 => Some(SecondarySlot::Second),
    }
}
