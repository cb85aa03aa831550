use anyhow::Context;
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::{get, post},
};
use camwall_worker::Dashboard;
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

mod handlers;
mod origin;
mod state;
mod websocket;

#[cfg(test)]
mod test_support;

pub mod args;

pub use crate::args::Args;
use crate::state::AppState;

const ASSETS_DIR: &str = "server/assets";

pub async fn run(args: Args) -> anyhow::Result<()> {
    let config = args.config()?;

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind to {}", args.bind))?;
    let local_addr = listener.local_addr()?;

    let dashboard = Dashboard::connect(config.clone())?;
    let app = router(AppState::new(dashboard, &config))?;

    tracing::info!("dashboard listening on http://{local_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> anyhow::Result<Router> {
    // video feeds load straight from the backend
    let csp_header = HeaderValue::from_str(&format!(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' {}; connect-src 'self'; font-src 'self'; object-src 'none'; base-uri 'self'; form-action 'self'",
        state.endpoint().origin()
    ))
    .context("backend origin is not a valid header value")?;

    Ok(Router::new()
        .route("/", get(handlers::index))
        .route("/cameras", get(handlers::cameras))
        .route("/events", get(handlers::events))
        .route("/api/slots/{slot}/swap", post(handlers::swap_slot))
        .route("/api/feeds/refresh", post(handlers::refresh_feeds))
        .route("/api/banner/dismiss", post(handlers::dismiss_banner))
        .route("/api/ws", get(websocket::websocket_handler))
        .nest_service("/assets", ServeDir::new(ASSETS_DIR))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_header,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {error}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::{StatusCode, header::ACCEPT, redirect::Policy};
    use serde_json::Value;

    use super::*;
    use crate::test_support::{BACKEND, app_state};

    async fn serve() -> (String, reqwest::Client) {
        let app = router(app_state()).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();
        (format!("http://{addr}"), client)
    }

    async fn wall_json(base: &str, client: &reqwest::Client) -> Value {
        client
            .get(format!("{base}/cameras"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    async fn seeded_wall(base: &str, client: &reqwest::Client) -> Value {
        for _ in 0..100 {
            let wall = wall_json(base, client).await;
            if wall["slots"][0]["camera"].is_string() {
                return wall;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("slots were never seeded");
    }

    fn slot_ids(wall: &Value) -> Vec<&str> {
        wall["slots"]
            .as_array()
            .unwrap()
            .iter()
            .map(|slot| slot["camera"].as_str().unwrap_or("-"))
            .collect()
    }

    #[tokio::test]
    async fn test_index_page() {
        let (base, client) = serve().await;
        let response = client.get(&base).send().await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let csp = response.headers()["content-security-policy"].to_str().unwrap();
        assert!(csp.contains(&format!("img-src 'self' {BACKEND}")));
        assert!(response.text().await.unwrap().contains(r#"href="/cameras""#));
    }

    #[tokio::test]
    async fn test_cameras_content_negotiation() {
        let (base, client) = serve().await;

        let html = client
            .get(format!("{base}/cameras"))
            .header(ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(html.contains(r#"id="stats""#));
        assert!(html.contains(r#"data-view="cameras""#));

        let wall = seeded_wall(&base, &client).await;
        assert_eq!(wall["api_base"], BACKEND);
        assert_eq!(slot_ids(&wall), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_events_json() {
        let (base, client) = serve().await;
        let feed: Value = client
            .get(format!("{base}/events"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(feed["capacity"], 500);
        assert!(feed["entries"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_swap_routes() {
        let (base, client) = serve().await;
        seeded_wall(&base, &client).await;

        let response = client
            .post(format!("{base}/api/slots/main/swap"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = client
            .post(format!("{base}/api/slots/secondary-2/swap"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(slot_ids(&wall_json(&base, &client).await), ["C", "B", "A"]);

        let response = client
            .post(format!("{base}/api/slots/secondary-2/swap"))
            .header(ACCEPT, "text/html")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/cameras");
        assert_eq!(slot_ids(&wall_json(&base, &client).await), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_refresh_feeds_route() {
        let (base, client) = serve().await;
        seeded_wall(&base, &client).await;

        let response = client
            .post(format!("{base}/api/feeds/refresh"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let wall = wall_json(&base, &client).await;
        assert!(wall["slots"][0]["feed_url"]
            .as_str()
            .unwrap()
            .ends_with("_=1"));
    }

    #[tokio::test]
    async fn test_dismiss_without_banner() {
        let (base, client) = serve().await;
        let response = client
            .post(format!("{base}/api/banner/dismiss"))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transport_warning_from_proxy_headers() {
        let (base, client) = serve().await;

        let wall: Value = client
            .get(format!("{base}/cameras"))
            .header("x-forwarded-proto", "https")
            .header("x-forwarded-host", "dash.example.com")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(wall["transport_warning"]["origin"], "https://dash.example.com");
        assert_eq!(wall["transport_warning"]["backend"], BACKEND);

        let wall = wall_json(&base, &client).await;
        assert!(wall["transport_warning"].is_null());
    }

    #[test]
    fn test_script_sends_commands_on_current_socket() {
        let script = include_str!("../assets/dashboard.js");

        // one shared socket, reassigned by every reconnect
        assert_eq!(script.matches("var socket").count(), 1);
        assert!(script.contains("socket = new WebSocket("));
        assert!(script.contains("socket.send(command)"));
    }
}
