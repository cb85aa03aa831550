use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use camwall_client::{ApiEndpoint, check_transport};
use camwall_core::TransportMismatch;
use camwall_worker::{Dashboard, DashboardConfig, DashboardError};

use crate::origin::request_origin;

#[derive(Clone)]
pub(crate) struct AppState(Arc<AppStateInner>);

impl AppState {
    pub fn new(dashboard: Dashboard, config: &DashboardConfig) -> Self {
        Self(Arc::new(AppStateInner {
            dashboard,
            endpoint: config.endpoint.clone(),
            origin_configured: config.public_origin.is_some(),
        }))
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.0.dashboard
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.0.endpoint
    }

    /// Mismatch warning for the origin this request came through. A configured
    /// public origin is already checked once by the dashboard itself.
    pub fn transport_warning(&self, headers: &HeaderMap) -> Option<TransportMismatch> {
        if self.0.origin_configured {
            return None;
        }

        let origin = request_origin(headers)?;
        check_transport(&origin, &self.0.endpoint)
    }
}

struct AppStateInner {
    dashboard: Dashboard,
    endpoint: ApiEndpoint,
    origin_configured: bool,
}

pub(crate) fn unavailable(error: DashboardError) -> StatusCode {
    tracing::error!("{error}");
    StatusCode::SERVICE_UNAVAILABLE
}
