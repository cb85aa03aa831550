use axum::http::{HeaderMap, header};

const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Origin the browser used to reach the dashboard, as far as proxy headers
/// tell.
pub(crate) fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = first_value(headers, X_FORWARDED_HOST)
        .or_else(|| first_value(headers, header::HOST.as_str()))?;
    let scheme = first_value(headers, X_FORWARDED_PROTO).unwrap_or("http");

    Some(format!("{}://{host}", scheme.to_ascii_lowercase()))
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    (!first.is_empty()).then_some(first)
}
