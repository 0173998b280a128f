//! Line-delimited JSON notification server for integration tests.
//!
//! Records every client frame (`{"op": ..., "group": ...}`) and lets the test
//! broadcast raw lines to all connected clients.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct PushServer {
    address: String,
    clients: Arc<Mutex<Vec<TcpStream>>>,
    frames: Arc<Mutex<Vec<String>>>,
}

impl PushServer {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Client frames received so far, one JSON line each.
    pub fn frames(&self) -> Vec<String> {
        self.frames.lock().unwrap().clone()
    }

    /// Write one line to every connected client.
    pub fn broadcast(&self, line: &str) {
        let mut clients = self.clients.lock().unwrap();
        clients.retain_mut(|c| c.write_all(format!("{}\n", line).as_bytes()).is_ok());
    }

    /// Poll until `frames()` holds `count` entries or `timeout` elapses.
    pub async fn wait_for_frames(&self, count: usize, timeout: Duration) -> Vec<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let frames = self.frames();
            if frames.len() >= count || Instant::now() >= deadline {
                return frames;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

pub fn start() -> PushServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().unwrap();
    let server = PushServer {
        address: format!("127.0.0.1:{}", addr.port()),
        clients: Arc::new(Mutex::new(Vec::new())),
        frames: Arc::new(Mutex::new(Vec::new())),
    };
    let shared = server.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let _ = stream.set_nodelay(true);
            if let Ok(writer) = stream.try_clone() {
                shared.clients.lock().unwrap().push(writer);
            }
            let frames = Arc::clone(&shared.frames);
            thread::spawn(move || {
                for line in BufReader::new(stream).lines() {
                    match line {
                        Ok(line) if !line.trim().is_empty() => frames.lock().unwrap().push(line),
                        Ok(_) => {}
                        Err(_) => break,
                    }
                }
            });
        }
    });
    server
}
