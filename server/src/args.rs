use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, ensure};
use camwall_client::{ApiEndpoint, DEFAULT_API_BASE, FeedParams};
use camwall_core::PollOrdering;
use camwall_worker::DashboardConfig;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "camwall-server", about = "Operator dashboard for the camera monitoring backend", long_about = None)]
pub struct Args {
    /// Base URL of the monitoring backend
    #[arg(long, env = "CAMWALL_API_BASE_URL", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Address the dashboard listens on
    #[arg(long, env = "CAMWALL_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Origin browsers load the dashboard from, e.g. https://dash.example.com
    ///
    /// When unset, the origin is taken from each request's Host and
    /// X-Forwarded-Proto headers.
    #[arg(long, env = "CAMWALL_PUBLIC_ORIGIN")]
    pub public_origin: Option<String>,

    /// Camera status poll period
    #[arg(long, env = "CAMWALL_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Frame rate requested for video feeds
    #[arg(long, env = "CAMWALL_FEED_FPS", default_value_t = 10)]
    pub feed_fps: u32,

    /// JPEG quality requested for video feeds (1-100)
    #[arg(long, env = "CAMWALL_FEED_QUALITY", default_value_t = 75, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub feed_quality: u8,

    /// Number of events kept in the log
    #[arg(long, env = "CAMWALL_LOG_CAPACITY", default_value_t = 500)]
    pub log_capacity: usize,

    /// Discard status responses that settle after a newer one
    #[arg(long, env = "CAMWALL_STRICT_POLL_ORDER")]
    pub strict_poll_order: bool,

    /// Re-open a failed event stream after this delay; without it the
    /// stream stays down until restart
    #[arg(long, env = "CAMWALL_RECONNECT_DELAY_MS")]
    pub reconnect_delay_ms: Option<u64>,

    /// Timeout for status requests and for opening the event stream
    #[arg(long, env = "CAMWALL_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,
}

impl Args {
    pub fn config(&self) -> anyhow::Result<DashboardConfig> {
        ensure!(self.poll_interval_ms > 0, "poll interval must be positive");
        ensure!(self.feed_fps > 0, "feed fps must be positive");
        ensure!(self.log_capacity > 0, "log capacity must be positive");
        ensure!(self.request_timeout_ms > 0, "request timeout must be positive");

        let endpoint = ApiEndpoint::parse(&self.api_base).context("invalid --api-base")?;

        Ok(DashboardConfig {
            endpoint,
            public_origin: self.public_origin.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_ordering: if self.strict_poll_order {
                PollOrdering::Sequenced
            } else {
                PollOrdering::LastSettled
            },
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            feed: FeedParams {
                fps: self.feed_fps,
                quality: self.feed_quality,
            },
            log_capacity: self.log_capacity,
            reconnect_delay: self.reconnect_delay_ms.map(Duration::from_millis),
        })
    }
}
