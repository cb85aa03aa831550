use std::time::Duration;

use camwall_client::{ApiEndpoint, FeedParams};
use camwall_core::{DEFAULT_LOG_CAPACITY, PollOrdering};

/// Everything the dashboard needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub endpoint: ApiEndpoint,
    /// Public origin the dashboard is served from, if known up front.
    pub public_origin: Option<String>,
    pub poll_interval: Duration,
    pub poll_ordering: PollOrdering,
    pub request_timeout: Duration,
    pub feed: FeedParams,
    pub log_capacity: usize,
    /// Fixed delay before re-opening a failed event stream. `None` leaves the
    /// stream in the error state.
    pub reconnect_delay: Option<Duration>,
}

impl DashboardConfig {
    pub fn new(endpoint: ApiEndpoint) -> Self {
        Self {
            endpoint,
            public_origin: None,
            poll_interval: Duration::from_millis(1000),
            poll_ordering: PollOrdering::default(),
            request_timeout: Duration::from_secs(10),
            feed: FeedParams::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            reconnect_delay: None,
        }
    }
}
