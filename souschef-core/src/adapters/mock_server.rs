//! Mock HTTP server for adapter tests
//!
//! Serves canned JSON responses by method + path and records every request so
//! tests can assert on headers, query strings and bodies. Each connection gets
//! one response and is closed.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// Canned response for one method + path (query string ignored)
#[derive(Debug, Clone)]
pub struct MockRoute {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl MockRoute {
    pub fn new(method: &'static str, path: &str, status: u16, body: impl Into<String>) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// A request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub target: String,
    headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

pub struct MockHttpServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockHttpServer {
    /// Start on a random local port
    pub fn start(routes: Vec<MockRoute>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let running_clone = running.clone();
        let requests_clone = requests.clone();

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => handle_connection(stream, &routes, &requests_clone),
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockHttpServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(
    mut stream: TcpStream,
    routes: &[MockRoute],
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    let _ = stream.set_nonblocking(false);
    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, r#"{"error":"bad request"}"#);
        return;
    };

    let path = request.target.split('?').next().unwrap_or("").to_string();
    let route = routes
        .iter()
        .find(|r| r.method == request.method && r.path == path);

    if let Ok(mut log) = requests.lock() {
        log.push(request);
    }

    match route {
        Some(route) => send_response(&mut stream, route.status, &route.body),
        None => send_response(&mut stream, 404, r#"{"error":"no route"}"#),
    }
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    let body_end = (header_end + content_length).min(data.len());
    let body = String::from_utf8_lossy(&data[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn send_response(stream: &mut TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason_phrase(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        _ => "Internal Server Error",
    }
}
