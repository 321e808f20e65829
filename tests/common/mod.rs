#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use birdlg::dispatcher::ProxyTransport;
use birdlg::error::{LookupError, TransportError};
use birdlg::asn_cache::{TxtResolver, WhoisQuery};
use reqwest::{StatusCode, Url};

pub fn read_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|err| panic!("reading {:?}: {}", path, err))
}

/// A one-shot HTTP server on 127.0.0.1 answering every request with the
/// same status line and body. Request targets are recorded.
pub struct MockProxy {
    pub port: u16,
    pub requests: Arc<Mutex<Vec<String>>>,
}

pub fn spawn_proxy(status: &str, body: &str) -> MockProxy {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let status = status.to_string();
    let body = body.to_string();
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => {}
                }
            }
            let target = request_line.split_whitespace().nth(1).unwrap_or("").to_string();
            seen.lock().unwrap().push(target);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            // The client may hang up early once it has read enough.
            let _ = stream.write_all(response.as_bytes());
        }
    });

    MockProxy { port, requests }
}

/// A WHOIS server answering each connection with `answer`. Queries are recorded.
pub fn spawn_whois(answer: &str) -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let queries = Arc::new(Mutex::new(Vec::new()));

    let answer = answer.to_string();
    let seen = Arc::clone(&queries);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut buf = [0u8; 256];
            let n = stream.read(&mut buf).unwrap_or(0);
            seen.lock().unwrap().push(String::from_utf8_lossy(&buf[..n]).into_owned());
            let _ = stream.write_all(answer.as_bytes());
        }
    });

    (port, queries)
}

/// Answers by backend host with a fixed body after a fixed delay. Unknown
/// hosts fail with a 502.
#[derive(Default)]
pub struct FakeTransport {
    bodies: HashMap<String, (Duration, String)>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        FakeTransport::default()
    }

    pub fn with_backend(mut self, host: &str, delay_ms: u64, body: &str) -> Self {
        self.bodies
            .insert(host.to_string(), (Duration::from_millis(delay_ms), body.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ProxyTransport for FakeTransport {
    fn get(&self, url: &Url) -> Result<String, TransportError> {
        let host = url.host_str().unwrap_or("").to_string();
        self.calls.lock().unwrap().push(url.to_string());
        match self.bodies.get(&host) {
            Some((delay, body)) => {
                thread::sleep(*delay);
                Ok(body.clone())
            }
            None => Err(TransportError::Status(StatusCode::BAD_GATEWAY)),
        }
    }
}

/// Counts lookups; answers from a fixed table, fails otherwise.
#[derive(Clone, Default)]
pub struct FakeTxt {
    pub answers: HashMap<String, Vec<String>>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl TxtResolver for FakeTxt {
    fn txt_records(&self, name: &str) -> Result<Vec<String>, LookupError> {
        self.calls.lock().unwrap().push(name.to_string());
        self.answers.get(name).cloned().ok_or(LookupError::Empty)
    }
}

#[derive(Clone, Default)]
pub struct FakeWhois {
    pub answers: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl WhoisQuery for FakeWhois {
    fn query(&self, query: &str) -> Result<String, LookupError> {
        self.calls.lock().unwrap().push(query.to_string());
        self.answers.get(query).cloned().ok_or(LookupError::Empty)
    }
}
