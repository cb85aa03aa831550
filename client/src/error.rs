use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("failed to fetch camera status: {0}")]
    Network(#[source] reqwest::Error),
    #[error("failed to fetch camera status: {0}")]
    Status(StatusCode),
    #[error("failed to decode camera status: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("failed to open event stream: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("event stream rejected: {0}")]
    Status(StatusCode),
    #[error("event stream read failed: {0}")]
    Read(#[source] reqwest::Error),
    #[error("event stream closed by server")]
    Closed,
}
