mod endpoint;
mod error;
mod poller;
mod sse;
mod stream;

pub use endpoint::{ApiEndpoint, DEFAULT_API_BASE, EndpointError, FeedParams, check_transport};
pub use error::{PollError, StreamError};
pub use poller::{HttpStatusSource, PollOutcome, StatusPoller, StatusSource};
pub use reqwest::StatusCode;
pub use sse::{SseDecoder, SseEvent};
pub use stream::{EventStream, FrameSource, FrameStream, HttpFrameSource, StreamSignal};
