use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::TypedHeader;
use camwall_core::SecondarySlot;
use camwall_render::{Buffer, render_events_page, render_index, render_wall_page};
use headers_accept::Accept;
use mediatype::{
    MediaType,
    names::{HTML, TEXT},
};

use crate::state::{AppState, unavailable};

const CONTENT_TYPE_HTML: MediaType = MediaType::from_parts(TEXT, HTML, None, &[]);

fn wants_html(accept: &Option<TypedHeader<Accept>>) -> bool {
    accept.as_ref().is_some_and(|TypedHeader(accept)| {
        accept
            .media_types()
            .any(|mime| mime.essence() == CONTENT_TYPE_HTML)
    })
}

/// Form posts go back to the wall, scripted callers get a JSON ack.
fn acknowledge(accept: &Option<TypedHeader<Accept>>) -> Response {
    if wants_html(accept) {
        Redirect::to("/cameras").into_response()
    } else {
        Json(serde_json::json!({ "status": "ok" })).into_response()
    }
}

pub async fn index(State(state): State<AppState>) -> Buffer {
    render_index(&state.endpoint().to_string())
}

pub async fn cameras(
    State(state): State<AppState>,
    headers: HeaderMap,
    accept: Option<TypedHeader<Accept>>,
) -> Result<Response, StatusCode> {
    let mut wall = state.dashboard().wall().await.map_err(unavailable)?;
    if wall.transport_warning.is_none() {
        wall.transport_warning = state.transport_warning(&headers);
    }

    if wants_html(&accept) {
        Ok(render_wall_page(&wall).into_response())
    } else {
        Ok(Json(wall).into_response())
    }
}

pub async fn events(
    State(state): State<AppState>,
    headers: HeaderMap,
    accept: Option<TypedHeader<Accept>>,
) -> Result<Response, StatusCode> {
    let mut feed = state.dashboard().feed().await.map_err(unavailable)?;
    if feed.transport_warning.is_none() {
        feed.transport_warning = state.transport_warning(&headers);
    }

    if wants_html(&accept) {
        Ok(render_events_page(&feed).into_response())
    } else {
        Ok(Json(feed).into_response())
    }
}

pub async fn swap_slot(
    Path(slot): Path<String>,
    State(state): State<AppState>,
    accept: Option<TypedHeader<Accept>>,
) -> Result<Response, StatusCode> {
    let slot: SecondarySlot = slot.parse().map_err(|error| {
        tracing::debug!("rejecting swap: {error}");
        StatusCode::NOT_FOUND
    })?;

    tracing::info!("swap main with {slot}");
    state.dashboard().swap(slot).map_err(unavailable)?;

    Ok(acknowledge(&accept))
}

pub async fn refresh_feeds(
    State(state): State<AppState>,
    accept: Option<TypedHeader<Accept>>,
) -> Result<Response, StatusCode> {
    tracing::info!("refresh video feeds");
    state.dashboard().refresh_feeds().map_err(unavailable)?;

    Ok(acknowledge(&accept))
}

pub async fn dismiss_banner(
    State(state): State<AppState>,
    accept: Option<TypedHeader<Accept>>,
) -> Result<Response, StatusCode> {
    state.dashboard().dismiss_banner().map_err(unavailable)?;

    Ok(acknowledge(&accept))
}
