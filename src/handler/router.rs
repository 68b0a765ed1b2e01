//! Request dispatch module
//!
//! Resolves a request path against the asset table and builds the response.
//! Every path answers 200: unknown paths get the application shell so the
//! client-side router can take over.

use crate::assets::{Asset, CONFIG_PATH, INDEX_PATH};
use crate::config::AppState;
use crate::http::csp::{self, Nonce};
use crate::http::{build_asset_response, CachePolicy};
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Request, Response};
use std::borrow::Cow;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// How a request path was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Exact hit on the index document
    Index,
    /// Exact hit on the runtime configuration document
    Config,
    /// Exact hit on any other asset
    Asset,
    /// No match; the index document stands in
    Fallback,
}

impl Resolution {
    fn classify(path: &str, found: bool) -> Self {
        match (found, path) {
            (false, _) => Self::Fallback,
            (true, INDEX_PATH) => Self::Index,
            (true, CONFIG_PATH) => Self::Config,
            (true, _) => Self::Asset,
        }
    }

    /// Whether the response carries a nonce
    pub const fn is_shell(self) -> bool {
        matches!(self, Self::Index | Self::Fallback)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Config => "config",
            Self::Asset => "asset",
            Self::Fallback => "fallback",
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The method is not inspected: every asset is read-only, so every method
/// gets the same answer for the same path.
pub async fn handle_request<B: Body>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (response, resolution) = serve_path(&state, req.uri().path());

    if state.config.logging.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri()
                .path_and_query()
                .map_or_else(|| req.uri().path().to_string(), ToString::to_string),
        );
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.referer = header_string(&req, REFERER);
        entry.user_agent = header_string(&req, USER_AGENT);
        entry.served = resolution.as_str();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Resolve `path` and build its response
///
/// `path` is percent-decoded before lookup; a path that does not decode to
/// UTF-8 is looked up as is.
pub fn serve_path(state: &AppState, path: &str) -> (Response<Full<Bytes>>, Resolution) {
    let path = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
    let hit = state.assets.get(&path);
    let resolution = Resolution::classify(&path, hit.is_some());
    let asset: &Asset = hit.unwrap_or_else(|| state.assets.index());

    let response = if resolution.is_shell() {
        serve_shell(state, asset)
    } else {
        let cache = if resolution == Resolution::Config {
            CachePolicy::Revalidate
        } else {
            CachePolicy::Immutable
        };
        build_asset_response(asset.content.clone(), &asset.mime_type, cache, None)
    };

    (response, resolution)
}

/// Serve the application shell with a fresh nonce
fn serve_shell(state: &AppState, asset: &Asset) -> Response<Full<Bytes>> {
    let nonce = Nonce::generate();
    match state.csp.header_value(&nonce) {
        Some(policy) => build_asset_response(
            Bytes::from(csp::inject_nonce(&asset.content, &nonce)),
            &asset.mime_type,
            CachePolicy::Revalidate,
            Some(&policy),
        ),
        None => build_asset_response(
            asset.content.clone(),
            &asset.mime_type,
            CachePolicy::Revalidate,
            None,
        ),
    }
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
