//! Minimal HTTP/1.1 job status server for integration tests.
//!
//! Answers every GET with the next scripted `(status code, body)` pair, then
//! repeats the fallback. Request paths are recorded for assertions.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
pub struct StatusServer {
    base_url: String,
    script: Arc<Mutex<VecDeque<(u16, String)>>>,
    fallback: Arc<(u16, String)>,
    paths: Arc<Mutex<Vec<String>>>,
}

impl StatusServer {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Paths requested so far, in order.
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.paths.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. Returns once it is listening; the
/// base URL ends with `/jobs/`. The server runs until the process exits.
pub fn start(script: Vec<(u16, &str)>, fallback: (u16, &str)) -> StatusServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let server = StatusServer {
        base_url: format!("http://127.0.0.1:{}/jobs/", port),
        script: Arc::new(Mutex::new(
            script.into_iter().map(|(c, b)| (c, b.to_string())).collect(),
        )),
        fallback: Arc::new((fallback.0, fallback.1.to_string())),
        paths: Arc::new(Mutex::new(Vec::new())),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = shared.clone();
            thread::spawn(move || handle(stream, &shared));
        }
    });
    server
}

fn handle(mut stream: std::net::TcpStream, server: &StatusServer) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
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
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    server.paths.lock().unwrap().push(path);

    let (code, body) = server
        .script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| (server.fallback.0, server.fallback.1.clone()));
    let reason = if code < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        code,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
