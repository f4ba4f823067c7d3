//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a mutable table of routes (path -> status, headers, body). Unknown
//! paths get 404. Every request is counted per path and the raw request head
//! is kept, so tests can assert on what was (or was not) fetched.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
    requests: HashMap<String, String>,
}

#[derive(Clone)]
pub struct PageServer {
    base: String,
    state: Arc<Mutex<State>>,
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start() -> PageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Mutex::new(State::default()));
    let shared = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&shared);
            thread::spawn(move || handle(stream, &state));
        }
    });
    PageServer {
        base: format!("http://127.0.0.1:{}", port),
        state,
    }
}

impl PageServer {
    /// Absolute URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, status: u16, content_type: &str, body: impl Into<Vec<u8>>) {
        self.insert(
            path,
            Route {
                status,
                headers: vec![("Content-Type".to_string(), content_type.to_string())],
                body: body.into(),
            },
        );
    }

    pub fn html(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.route(path, 200, "text/html; charset=utf-8", body);
    }

    pub fn bytes(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.route(path, 200, "application/octet-stream", body);
    }

    pub fn status(&self, path: &str, status: u16) {
        self.route(path, status, "text/plain", format!("status {}", status));
    }

    pub fn redirect(&self, from: &str, to: &str) {
        self.insert(
            from,
            Route {
                status: 302,
                headers: vec![("Location".to_string(), self.url(to))],
                body: Vec::new(),
            },
        );
    }

    /// Number of requests seen for `path`, including ones answered with 404.
    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.state.lock().unwrap().hits.values().sum()
    }

    /// Raw request head of the last request for `path`.
    pub fn last_request(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().requests.get(path).cloned()
    }

    fn insert(&self, path: &str, route: Route) {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), route);
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(head) = read_head(&mut stream) else {
        return;
    };
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let route = {
        let mut st = state.lock().unwrap();
        *st.hits.entry(path.clone()).or_insert(0) += 1;
        st.requests.insert(path.clone(), head.clone());
        st.routes.get(&path).cloned()
    };
    let route = route.unwrap_or_else(|| Route {
        status: 404,
        headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
        body: b"not found".to_vec(),
    });

    let mut response = format!("HTTP/1.1 {} {}\r\n", route.status, reason(route.status));
    for (name, value) in &route.headers {
        response.push_str(&format!("{}: {}\r\n", name, value));
    }
    response.push_str(&format!(
        "Content-Length: {}\r\nConnection: close\r\n\r\n",
        route.body.len()
    ));
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(&route.body);
}

/// Reads until the blank line ending the request head.
fn read_head(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.len() > 64 * 1024 {
            break;
        }
    }
    if buf.is_empty() {
        return None;
    }
    String::from_utf8(buf).ok()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        302 => "Found",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
