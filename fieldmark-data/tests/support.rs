//! Minimal single-shot HTTP server for exercising the Overpass client.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// A server that answers exactly one request with a canned response.
pub struct StubServer {
    /// Base URL of the server.
    pub url: String,
    handle: JoinHandle<String>,
}

impl StubServer {
    /// Start a server replying with `status` and `body`.
    pub fn start(status: u16, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let url = format!("http://{}/api/interpreter", listener.local_addr().expect("addr"));
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept request");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("read header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().expect("content length");
                    }
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).expect("read body");
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .expect("write response");
            String::from_utf8(request_body).expect("utf-8 body")
        });
        Self { url, handle }
    }

    /// Wait for the request and return its body.
    pub fn request_body(self) -> String {
        self.handle.join().expect("stub server thread")
    }
}

/// URL on which nothing listens.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/api/interpreter")
}

/// Overpass JSON holding a single two-node road.
pub const ROAD_RESPONSE: &str = r#"{"elements": [
    {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "residential", "name": "Tollensstraat"}},
    {"type": "node", "id": 1, "lat": 52.2300, "lon": 6.8500},
    {"type": "node", "id": 2, "lat": 52.2310, "lon": 6.8500}
]}"#;
