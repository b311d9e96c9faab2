//! Shared integration test helpers for tutor-chat.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{plot_response, serve_once};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;

use serde_json::{Value, json};
use tutor_chat::config::Config;

/// `[1.0, 2.0, 3.0]` as little-endian f8.
pub const XS_F8: &str = "AAAAAAAA8D8AAAAAAAAAQAAAAAAAAAhA";

/// `[1.0, 4.0, 9.0]` as little-endian f8.
pub const YS_F8: &str = "AAAAAAAA8D8AAAAAAAAQQAAAAAAAACJA";

/// `<svg xmlns="http://www.w3.org/2000/svg"></svg>` in base64.
pub const SVG_B64: &str = "PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciPjwvc3ZnPg==";

/// A response narrating a plot, echoing part of the payload, with the
/// plotting tool's result attached.
pub fn plot_response(id: &str) -> Value {
    json!({
        "content": { "parts": [
            { "text": format!(
                "Here is the graph of y = x^2.\n```json\n{{\"x\": {{\"bdata\": \"{XS_F8}\", \"dtype\": \"f8\"}}}}\n```\nIt opens upward."
            ) },
            { "functionCall": { "name": "plotting_tool", "args": { "equations": ["x**2"] } } },
            { "functionResponse": { "name": "plotting_tool", "response": {
                "success": true,
                "plot_data": {
                    "data": [{
                        "type": "scatter",
                        "mode": "lines",
                        "name": "x**2",
                        "x": { "bdata": XS_F8, "dtype": "f8" },
                        "y": { "bdata": YS_F8, "dtype": "f8" }
                    }],
                    "layout": { "title": { "text": "Parabola" } }
                },
                "equations": ["x**2"],
                "x_range": [-10, 10],
                "title": "Parabola"
            } } }
        ] },
        "author": "tutor_agent",
        "timestamp": 1_700_000_000.0,
        "id": id
    })
}

/// A response carrying a successful circuit diagram.
pub fn circuit_response(id: &str) -> Value {
    json!({
        "content": { "parts": [
            { "text": "Here is the RC circuit." },
            { "functionResponse": { "name": "circuit_visualization_tool", "response": {
                "success": true,
                "image_data": SVG_B64,
                "title": "RC Low-pass"
            } } }
        ] },
        "author": "tutor_agent",
        "timestamp": 1_700_000_001.0,
        "id": id
    })
}

/// A plain text response.
pub fn text_response(id: &str, text: &str) -> Value {
    json!({
        "content": { "parts": [{ "text": text }] },
        "author": "tutor_agent",
        "timestamp": 1_700_000_002.0,
        "id": id
    })
}

/// A default config pointing at `url` with a token set.
pub fn config_for(url: &str) -> Config {
    Config::default()
        .with_api_url(url)
        .with_auth_token("test-token")
}

/// A local HTTP server that answers exactly one request.
pub struct OneShotServer {
    pub url: String,
    handle: JoinHandle<String>,
}

impl OneShotServer {
    /// Wait for the request to be served and return it, lowercased headers
    /// and body included.
    pub fn request(self) -> String {
        self.handle.join().expect("server thread panicked")
    }
}

/// Serve one request with `status` (e.g. `"200 OK"`) and a JSON `body`.
pub fn serve_once(status: &str, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let url = format!("http://{}", listener.local_addr().expect("local addr"));
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept");
        let request = read_request(&mut stream);
        stream
            .write_all(response.as_bytes())
            .expect("Failed to write response");
        request
    });

    OneShotServer { url, handle }
}

/// An address nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

fn read_request(stream: &mut impl Read) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).expect("Failed to read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_lowercase()
}
