//! curl-backed fetcher.
//!
//! One `Easy` handle is kept for the fetcher's lifetime so connections and
//! header setup are reused across attempts, like a browser session.

use anyhow::{Context, Result};
use std::str;
use std::sync::Arc;
use std::time::Duration;

use super::classify::classify_curl_error;
use super::parse;
use super::{Fetch, FetchError, Payload, TransportError};
use crate::control::StopSignal;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Browser-like request headers some image endpoints insist on.
/// `Accept-Encoding` is not listed: curl negotiates it and decodes the body.
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

const ACCEPT_ENCODING: &str = "gzip, deflate";
const MAX_REDIRECTS: u32 = 10;

/// Shortest timeout the fetcher will apply.
pub const MIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Request settings for `HttpFetcher`.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Whole-attempt limit; exceeding it is a `FetchError::Timeout`.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Added after the defaults; a header with the same name replaces the default.
    pub extra_headers: Vec<(String, String)>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(15),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extra_headers: Vec::new(),
        }
    }
}

impl HttpOptions {
    /// Header lines (`Name: value`) to send, defaults first.
    pub fn header_lines(&self) -> Vec<String> {
        let overridden =
            |name: &str| self.extra_headers.iter().any(|(k, _)| k.trim().eq_ignore_ascii_case(name));
        DEFAULT_HEADERS
            .iter()
            .filter(|(k, _)| !overridden(k))
            .map(|(k, v)| format!("{}: {}", k, v))
            .chain(
                self.extra_headers
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.trim(), v.trim())),
            )
            .collect()
    }
}

pub struct HttpFetcher {
    easy: curl::easy::Easy,
    timeout: Duration,
    stop: Option<Arc<StopSignal>>,
}

fn transport(e: curl::Error) -> FetchError {
    FetchError::Transport(TransportError::Curl(e))
}

impl HttpFetcher {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let mut easy = curl::easy::Easy::new();
        easy.useragent(&options.user_agent).context("set user agent")?;
        easy.accept_encoding(ACCEPT_ENCODING)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        // curl reads a zero timeout as "never time out".
        let connect_timeout = options.connect_timeout.max(MIN_TIMEOUT);
        let timeout = options.timeout.max(MIN_TIMEOUT);
        easy.connect_timeout(connect_timeout)?;
        easy.timeout(timeout)?;
        easy.progress(true)?;

        let mut list = curl::easy::List::new();
        for line in options.header_lines() {
            list.append(&line)
                .with_context(|| format!("invalid header {:?}", line))?;
        }
        easy.http_headers(list)?;

        Ok(HttpFetcher {
            easy,
            timeout,
            stop: None,
        })
    }

    /// Abort in-flight transfers as soon as `stop` is requested.
    pub fn with_stop(mut self, stop: Arc<StopSignal>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().map(|s| s.is_stopped()).unwrap_or(false)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&mut self, endpoint: &str) -> Result<Payload, FetchError> {
        let mut headers: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();
        let stop = self.stop.clone();

        self.easy.url(endpoint).map_err(transport)?;
        self.easy.get(true).map_err(transport)?;

        let performed = {
            let mut transfer = self.easy.transfer();
            transfer
                .header_function(|data| {
                    if let Ok(s) = str::from_utf8(data) {
                        headers.push(s.trim_end().to_string());
                    }
                    true
                })
                .map_err(transport)?;
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer
                .progress_function(move |_, _, _, _| {
                    stop.as_ref().map(|s| !s.is_stopped()).unwrap_or(true)
                })
                .map_err(transport)?;
            transfer.perform()
        };
        if let Err(e) = performed {
            return Err(classify_curl_error(e, self.timeout, self.stop_requested()));
        }

        let code = self.easy.response_code().map_err(transport)?;
        if !(200..300).contains(&code) {
            return Err(TransportError::Http(code).into());
        }

        let content_type = parse::content_type(&headers).unwrap_or_default();
        let payload = Payload::validated(body, content_type)?;
        tracing::debug!(
            bytes = payload.bytes.len(),
            content_type = %payload.content_type,
            format = %payload.format,
            "fetched payload"
        );
        Ok(payload)
    }
}
