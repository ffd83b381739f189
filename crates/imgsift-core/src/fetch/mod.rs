//! One retrieval attempt against the endpoint.
//!
//! `Fetch` is the seam the collection loop calls through; `HttpFetcher` is the
//! curl-backed implementation. Every failure is classified so the loop can
//! report it, and none of them is fatal to a run.

mod classify;
mod http;
mod parse;

pub use classify::classify_curl_error;
pub use http::{HttpFetcher, HttpOptions, DEFAULT_HEADERS, DEFAULT_USER_AGENT, MIN_TIMEOUT};

use crate::control::Interrupted;
use crate::format::ImageFormat;
use std::time::Duration;

/// A validated image payload.
#[derive(Debug, Clone)]
pub struct Payload {
    pub bytes: Vec<u8>,
    /// Declared `Content-Type` (always starts with `image/`).
    pub content_type: String,
    /// Best-effort detected format.
    pub format: ImageFormat,
}

impl Payload {
    /// Build a payload from a response body, rejecting anything not declared `image/*`.
    /// Format detection runs here and never fails.
    pub fn validated(bytes: Vec<u8>, content_type: impl Into<String>) -> Result<Self, FetchError> {
        let content_type = content_type.into();
        if !is_image_content_type(&content_type) {
            return Err(FetchError::NotAnImage { content_type });
        }
        let format = crate::format::detect(&bytes, Some(&content_type));
        Ok(Payload {
            bytes,
            content_type,
            format,
        })
    }
}

/// Network-level failure.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// curl reported an error (DNS, connection refused, reset, ...).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Transfer was cut short by a stop request.
    #[error(transparent)]
    Interrupted(#[from] Interrupted),
}

/// Why an attempt produced no payload.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// Response was fine but the declared type is not `image/*`.
    #[error("not an image (Content-Type: {content_type:?})")]
    NotAnImage { content_type: String },
}

/// Whether a declared content-type names an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..6)
        .map(|p| p.eq_ignore_ascii_case("image/"))
        .unwrap_or(false)
}

/// Retrieves one payload per call.
pub trait Fetch {
    fn fetch(&mut self, endpoint: &str) -> Result<Payload, FetchError>;
}

impl<F: Fetch + ?Sized> Fetch for &mut F {
    fn fetch(&mut self, endpoint: &str) -> Result<Payload, FetchError> {
        (**self).fetch(endpoint)
    }
}

impl<F: Fetch + ?Sized> Fetch for Box<F> {
    fn fetch(&mut self, endpoint: &str) -> Result<Payload, FetchError> {
        (**self).fetch(endpoint)
    }
}
