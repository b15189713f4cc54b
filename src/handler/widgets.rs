//! Widget CRUD handlers
//!
//! Each handler works against the injected `WidgetStore` and produces a JSON
//! response or an `ApiError` for the router to render.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::{ApiError, StoreError};
use crate::http;
use crate::logger;
use crate::store::{Widget, WidgetStore};

type HandlerResult = Result<Response<Full<Bytes>>, ApiError>;

#[derive(Debug, Serialize)]
struct WidgetEnvelope<'a> {
    widget: &'a Widget,
}

#[derive(Debug, Serialize)]
struct WidgetList {
    widgets: Vec<Widget>,
    count: usize,
}

pub fn list(store: &WidgetStore) -> HandlerResult {
    let widgets = store.list()?;
    let count = widgets.len();
    Ok(http::json_response(
        StatusCode::OK,
        &WidgetList { widgets, count },
    ))
}

pub fn get(store: &WidgetStore, id: &str) -> HandlerResult {
    let widget = store.get(id).inspect_err(log_miss)?;
    Ok(envelope(StatusCode::OK, &widget))
}

pub fn create(store: &WidgetStore, body: &[u8]) -> HandlerResult {
    let widget = decode(body)?;
    let widget = store.create(widget).inspect_err(|e| {
        logger::log_error(&format!("unable to create widget: {e}"));
    })?;
    tracing::debug!("created widget {}", widget.id);
    Ok(envelope(StatusCode::CREATED, &widget))
}

pub fn update(store: &WidgetStore, id: &str, body: &[u8]) -> HandlerResult {
    if !store.contains(id)? {
        log_miss(&StoreError::NotFound(id.to_string()));
        return Err(ApiError::NotFound);
    }
    let changes = decode(body)?;
    let widget = store.update(id, changes).inspect_err(log_miss)?;
    Ok(envelope(StatusCode::OK, &widget))
}

pub fn delete(store: &WidgetStore, id: &str) -> HandlerResult {
    let widget = store.delete(id).inspect_err(log_miss)?;
    tracing::debug!("deleted widget {}", widget.id);
    Ok(envelope(StatusCode::OK, &widget))
}

/// A JSON `null` body decodes to an empty widget
fn decode(body: &[u8]) -> Result<Widget, ApiError> {
    serde_json::from_slice::<Option<Widget>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            logger::log_warning(&format!("unable to parse widget: {e}"));
            ApiError::from(e)
        })
}

fn envelope(status: StatusCode, widget: &Widget) -> Response<Full<Bytes>> {
    http::json_response(status, &WidgetEnvelope { widget })
}

fn log_miss(err: &StoreError) {
    if let StoreError::NotFound(id) = err {
        tracing::debug!("unable to find widget with id {id}");
    }
}
