use std::{fmt, net::IpAddr};

use camwall_core::{CameraId, TransportMismatch};
use reqwest::Url;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid backend url '{url}': {reason}")]
    Parse { url: String, reason: String },
    #[error("invalid backend url '{url}': {reason}")]
    Unsupported { url: String, reason: &'static str },
}

/// MJPEG encoding parameters requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedParams {
    pub fps: u32,
    pub quality: u8,
}

impl Default for FeedParams {
    fn default() -> Self {
        Self {
            fps: 10,
            quality: 75,
        }
    }
}

/// Backend base URL, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base: Url,
}

impl ApiEndpoint {
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(url).map_err(|error| EndpointError::Parse {
            url: url.to_string(),
            reason: error.to_string(),
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointError::Unsupported {
                url: url.to_string(),
                reason: "scheme must be http or https",
            });
        }
        if base.query().is_some() || base.fragment().is_some() {
            return Err(EndpointError::Unsupported {
                url: url.to_string(),
                reason: "query and fragment are not allowed",
            });
        }

        Ok(Self { base })
    }

    pub fn scheme(&self) -> &str {
        self.base.scheme()
    }

    /// `scheme://host[:port]`, suitable for a content security policy.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    pub fn status_url(&self) -> Url {
        self.url_for(["cameras", "status"])
    }

    pub fn stream_url(&self) -> Url {
        self.url_for(["events", "stream"])
    }

    /// The nonce only forces the browser to re-open the feed.
    pub fn mjpeg_url(&self, camera_id: &CameraId, feed: FeedParams, nonce: u64) -> String {
        let mut url = self.url_for(["cameras", &**camera_id, "mjpeg"]);
        url.query_pairs_mut()
            .append_pair("fps", &feed.fps.to_string())
            .append_pair("quality", &feed.quality.to_string())
            .append_pair("_", &nonce.to_string());
        url.into()
    }

    fn url_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base.clone();
        // http(s) urls always have a path
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn is_local(&self) -> bool {
        let Some(host) = self.base.host_str() else {
            return false;
        };

        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return ip.is_loopback();
        }

        host.eq_ignore_ascii_case("localhost") || host.to_ascii_lowercase().ends_with(".localhost")
    }
}

impl fmt::Display for ApiEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str().trim_end_matches('/'))
    }
}

/// Detect a dashboard served over https talking to a remote plain-http
/// backend. Advisory only; an unparsable origin yields no warning.
pub fn check_transport(origin: &str, backend: &ApiEndpoint) -> Option<TransportMismatch> {
    let origin_url = match Url::parse(origin) {
        Ok(url) => url,
        Err(error) => {
            tracing::debug!("ignoring unparsable dashboard origin '{origin}': {error}");
            return None;
        }
    };

    let mismatch =
        origin_url.scheme() == "https" && backend.scheme() == "http" && !backend.is_local();

    mismatch.then(|| TransportMismatch {
        origin: origin_url.origin().ascii_serialization(),
        backend: backend.to_string(),
    })
}
