//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: resolves (method, path) to a
//! `Route`, reads the body when the route needs one, dispatches to the
//! widget handlers and writes the access log.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::error::ApiError;
use crate::handler::{index, widgets};
use crate::http::{self, body};
use crate::logger::{self, AccessLogEntry};
use crate::store::WidgetStore;

/// Collection path; everything after it is the widget id
pub const WIDGETS_PREFIX: &str = "/widgets/";

const INDEX_ALLOW: &str = "GET, OPTIONS";
const COLLECTION_ALLOW: &str = "GET, POST";
const ITEM_ALLOW: &str = "GET, PUT, DELETE";

/// What a request resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Index,
    ListWidgets,
    GetWidget(&'a str),
    CreateWidget,
    UpdateWidget(&'a str),
    DeleteWidget(&'a str),
}

impl Route<'_> {
    const fn has_body(self) -> bool {
        matches!(self, Self::CreateWidget | Self::UpdateWidget(_))
    }
}

/// Resolve a request line to a route
///
/// The id is whatever follows `/widgets/`, uninterpreted: it may be empty
/// (collection) or contain further slashes.
pub fn resolve<'a>(method: &Method, path: &'a str) -> Result<Route<'a>, ApiError> {
    if path == "/" {
        return match *method {
            Method::GET | Method::OPTIONS => Ok(Route::Index),
            _ => Err(ApiError::MethodNotAllowed { allow: INDEX_ALLOW }),
        };
    }

    let Some(id) = path.strip_prefix(WIDGETS_PREFIX) else {
        return Err(ApiError::NotFound);
    };

    if id.is_empty() {
        match *method {
            Method::GET => Ok(Route::ListWidgets),
            Method::POST => Ok(Route::CreateWidget),
            _ => Err(ApiError::MethodNotAllowed {
                allow: COLLECTION_ALLOW,
            }),
        }
    } else {
        match *method {
            Method::GET => Ok(Route::GetWidget(id)),
            Method::PUT => Ok(Route::UpdateWidget(id)),
            Method::DELETE => Ok(Route::DeleteWidget(id)),
            _ => Err(ApiError::MethodNotAllowed { allow: ITEM_ALLOW }),
        }
    }
}

/// Run a resolved route against the store
pub fn dispatch(
    route: Route<'_>,
    body: &[u8],
    store: &WidgetStore,
) -> Result<Response<Full<Bytes>>, ApiError> {
    match route {
        Route::Index => Ok(index::index()),
        Route::ListWidgets => widgets::list(store),
        Route::GetWidget(id) => widgets::get(store, id),
        Route::CreateWidget => widgets::create(store, body),
        Route::UpdateWidget(id) => widgets::update(store, id, body),
        Route::DeleteWidget(id) => widgets::delete(store, id),
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, req_body) = req.into_parts();
    let path = parts.uri.path();
    tracing::debug!("path: {} method: {}", path, parts.method);

    let result = match resolve(&parts.method, path) {
        Ok(route) if route.has_body() => {
            let max_body_size = state.config.http.max_body_size;
            match body::check_content_length(&parts.headers, max_body_size) {
                Ok(()) => match http::read_body(req_body, max_body_size).await {
                    Ok(bytes) => dispatch(route, &bytes, &state.store),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            }
        }
        Ok(route) => dispatch(route, &[], &state.store),
        Err(e) => Err(e),
    };

    let mut response = result.unwrap_or_else(|e| http::error_response(&e));
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            parts
                .uri
                .path_and_query()
                .map_or_else(|| path.to_string(), ToString::to_string),
        );
        entry.http_version = format!("{:?}", parts.version).trim_start_matches("HTTP/").to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}
