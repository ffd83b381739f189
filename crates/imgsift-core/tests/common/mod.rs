#![allow(dead_code)]

pub mod image_server;

use imgsift_core::fetch::{Fetch, FetchError, Payload, TransportError};

/// PNG-looking bytes tagged with `n` so each `n` is distinct content.
pub fn png(n: u32) -> Vec<u8> {
    let mut v = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    v.extend_from_slice(&n.to_le_bytes());
    v
}

/// Returns a new image on every call.
#[derive(Default)]
pub struct NovelFetcher {
    pub calls: u32,
}

impl Fetch for NovelFetcher {
    fn fetch(&mut self, _endpoint: &str) -> Result<Payload, FetchError> {
        self.calls += 1;
        Payload::validated(png(self.calls), "image/png")
    }
}

/// Returns the same bytes every time.
#[derive(Default)]
pub struct SameFetcher {
    pub calls: u32,
}

impl Fetch for SameFetcher {
    fn fetch(&mut self, _endpoint: &str) -> Result<Payload, FetchError> {
        self.calls += 1;
        Payload::validated(png(0), "image/png")
    }
}

/// Fails with a transport error on odd calls, returns a new image on even calls.
#[derive(Default)]
pub struct FlakyFetcher {
    pub calls: u32,
}

impl Fetch for FlakyFetcher {
    fn fetch(&mut self, _endpoint: &str) -> Result<Payload, FetchError> {
        self.calls += 1;
        if self.calls % 2 == 1 {
            return Err(TransportError::Http(503).into());
        }
        Payload::validated(png(self.calls), "image/png")
    }
}

/// Image bytes, but declared as HTML.
#[derive(Default)]
pub struct HtmlFetcher {
    pub calls: u32,
}

impl Fetch for HtmlFetcher {
    fn fetch(&mut self, _endpoint: &str) -> Result<Payload, FetchError> {
        self.calls += 1;
        Payload::validated(png(self.calls), "text/html; charset=utf-8")
    }
}

/// Cycles through `count` fixed images.
pub struct CyclingFetcher {
    pub count: u32,
    pub calls: u32,
}

impl CyclingFetcher {
    pub fn new(count: u32) -> Self {
        Self { count, calls: 0 }
    }
}

impl Fetch for CyclingFetcher {
    fn fetch(&mut self, _endpoint: &str) -> Result<Payload, FetchError> {
        let n = self.calls % self.count;
        self.calls += 1;
        Payload::validated(png(1000 + n), "image/png")
    }
}
