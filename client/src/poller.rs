use std::{sync::Arc, time::Duration};

use camwall_core::CameraStatus;
use reqwest::{Url, header};
use tokio::{
    task::{JoinHandle, JoinSet},
    time::{self, MissedTickBehavior},
};

use crate::{ApiEndpoint, PollError};

/// Produces the full camera status list on demand.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<CameraStatus>, PollError>> + Send;
}

/// `GET {base}/cameras/status`, never cached.
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpStatusSource {
    pub fn new(endpoint: &ApiEndpoint, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: endpoint.status_url(),
        })
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<Vec<CameraStatus>, PollError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(PollError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status));
        }

        response.json().await.map_err(PollError::Decode)
    }
}

/// Result of one poll, stamped with the order in which it was issued.
#[derive(Debug)]
pub struct PollOutcome {
    pub ticket: u64,
    pub result: Result<Vec<CameraStatus>, PollError>,
}

/// Fixed-period status poller.
///
/// A request is issued on every tick, even while earlier requests are still
/// in flight, and every outcome is handed to the sink as soon as it settles.
/// Dropping the poller cancels the timer and all in-flight requests.
pub struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// The sink returns `false` once nobody is interested in outcomes anymore,
    /// which stops the poller.
    pub fn spawn<S, F>(source: S, period: Duration, sink: F) -> Self
    where
        S: StatusSource,
        F: FnMut(PollOutcome) -> bool + Send + 'static,
    {
        tracing::info!("status poller started, period {}ms", period.as_millis());
        let handle = tokio::spawn(run(Arc::new(source), period, sink));
        Self { handle }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::info!("status poller stopped");
    }
}

async fn run<S, F>(source: Arc<S>, period: Duration, mut sink: F)
where
    S: StatusSource,
    F: FnMut(PollOutcome) -> bool + Send + 'static,
{
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut in_flight = JoinSet::new();
    let mut tickets = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tickets += 1;
                let ticket = tickets;
                let source = source.clone();
                tracing::debug!("issuing status poll {ticket}");
                in_flight.spawn(async move {
                    PollOutcome {
                        ticket,
                        result: source.fetch().await,
                    }
                });
            }
            Some(joined) = in_flight.join_next() => {
                match joined {
                    Ok(outcome) => {
                        if !sink(outcome) {
                            tracing::debug!("poll sink closed, stopping poller");
                            break;
                        }
                    }
                    Err(error) => tracing::error!("status poll task failed: {error}"),
                }
            }
        }
    }
}
