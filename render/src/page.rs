use camwall_core::TransportMismatch;

use crate::{Buffer, RenderHtml};

static HTML_HEADER_START: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>"#;

static HTML_HEADER_END: &str = r#"</title>
    <script src="/assets/dashboard.js" defer></script>
    <link rel="stylesheet" href="/assets/style.css">
</head>
"#;

static HTML_FOOTER: &str = r#"</body></html>"#;

impl Buffer {
    /// Document head plus the opening `<body>`. Pages with a `view` get live
    /// updates over the dashboard websocket.
    pub fn with_header(title: &str, view: Option<&str>) -> Self {
        let mut output = Self::default();
        output.push_str(HTML_HEADER_START);
        output.push_html(title);
        output.push_str(" - camwall");
        output.push_str(HTML_HEADER_END);

        match view {
            Some(view) => {
                output.push_str("<body data-view=\"");
                output.push_attr(view);
                output.push_str("\">");
            }
            None => output.push_str("<body>"),
        }
        output
    }

    pub fn add_footer(&mut self) {
        self.push_str(HTML_FOOTER);
    }
}

impl RenderHtml for TransportMismatch {
    fn render(&self, output: &mut Buffer) {
        output.push_str(
            r#"<div class="banner warning transport">Your dashboard is loaded over <b>HTTPS</b>, but the backend is <b>HTTP</b> (<code>"#,
        );
        output.push_html(&self.backend);
        output.push_str(
            r#"</code>). Browsers block this as mixed content.<div class="hint">Serve the backend over HTTPS and point <code>CAMWALL_API_BASE_URL</code> at the <b>https://</b> address.</div></div>"#,
        );
    }
}

pub fn render_index(api_base: &str) -> Buffer {
    let mut html = Buffer::with_header("Dashboard", None);

    html.push_str(
        r#"<main class="index"><h1>Camera monitoring</h1><p class="muted">Multi-camera real-time monitoring</p>
<nav class="cards">
<a class="card" href="/cameras"><h2>Camera wall</h2><p>Live video feeds with statistics and click-to-swap layout</p></a>
<a class="card" href="/events"><h2>Event stream</h2><p>Real-time detection events and alerts</p></a>
</nav>
<section class="panel"><h3>System status</h3><p>Backend: <code>"#,
    );
    html.push_html(api_base);
    html.push_str("</code></p></section></main>");

    html.add_footer();
    html
}
