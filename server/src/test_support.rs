use camwall_client::{
    ApiEndpoint, FrameSource, FrameStream, PollError, StatusSource, StreamError,
};
use camwall_core::CameraStatus;
use camwall_worker::{Dashboard, DashboardConfig};
use futures_util::{StreamExt, stream};

use crate::state::AppState;

pub(crate) const BACKEND: &str = "http://10.0.0.5:8000";

/// Always answers with the same three cameras.
struct FixedStatus;

impl StatusSource for FixedStatus {
    async fn fetch(&self) -> Result<Vec<CameraStatus>, PollError> {
        Ok(["A", "B", "C"]
            .into_iter()
            .map(|id| CameraStatus {
                camera_id: id.into(),
                enabled: true,
                stats: None,
            })
            .collect())
    }
}

/// Opens and then stays quiet.
struct SilentFrames;

impl FrameSource for SilentFrames {
    async fn open(&self) -> Result<FrameStream, StreamError> {
        Ok(stream::pending().boxed())
    }
}

pub(crate) fn config() -> DashboardConfig {
    DashboardConfig::new(ApiEndpoint::parse(BACKEND).unwrap())
}

pub(crate) fn app_state() -> AppState {
    let config = config();
    let dashboard = Dashboard::start(config.clone(), FixedStatus, SilentFrames);
    AppState::new(dashboard, &config)
}
