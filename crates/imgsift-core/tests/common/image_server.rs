//! Minimal HTTP/1.1 server for fetcher integration tests.
//!
//! Every GET gets the next body from a rotating list, with a configurable
//! status, content-type and response delay. `GET /redirect...` answers with a
//! 302 to `/` first so redirect handling can be exercised.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct ImageServerOptions {
    pub status: u16,
    /// None omits the Content-Type header.
    pub content_type: Option<&'static str>,
    /// Sleep before answering (for timeout/interrupt tests).
    pub delay: Option<Duration>,
}

impl Default for ImageServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: Some("image/png"),
            delay: None,
        }
    }
}

/// Starts a server in a background thread cycling through `bodies`. Returns the
/// base URL (e.g. "http://127.0.0.1:12345/"). The server runs until the process exits.
pub fn start(bodies: Vec<Vec<u8>>) -> String {
    start_with_options(bodies, ImageServerOptions::default())
}

pub fn start_with_options(bodies: Vec<Vec<u8>>, opts: ImageServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let bodies = Arc::new(bodies);
    let next = Arc::new(AtomicUsize::new(0));
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let bodies = Arc::clone(&bodies);
            let next = Arc::clone(&next);
            thread::spawn(move || handle(stream, &bodies, &next, opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

/// A URL on a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn handle(
    mut stream: std::net::TcpStream,
    bodies: &[Vec<u8>],
    next: &AtomicUsize,
    opts: ImageServerOptions,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    if path.starts_with("/redirect") {
        let _ = stream.write_all(
            b"HTTP/1.1 302 Found\r\nLocation: /\r\nContent-Type: text/html\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    }
    if let Some(d) = opts.delay {
        thread::sleep(d);
    }

    let body: &[u8] = if bodies.is_empty() {
        &[]
    } else {
        let i = next.fetch_add(1, Ordering::SeqCst) % bodies.len();
        &bodies[i]
    };
    let content_type = opts
        .content_type
        .map(|ct| format!("Content-Type: {}\r\n", ct))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {} {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
        opts.status,
        reason(opts.status),
        content_type,
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(body);
}
