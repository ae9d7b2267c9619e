#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: String,
    pub authorization: Option<String>,
}

/// Minimal HTTP/1.1 stand-in for a WAPI endpoint. Every connection gets one
/// response and is closed; bare TCP connects are counted but otherwise
/// ignored.
pub struct FakeWapi {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
}

impl FakeWapi {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
    {
        Self::start_raw(move |target| {
            let (status, body) = handler(target);
            format!(
                "HTTP/1.1 {status} Fake\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
        })
    }

    /// The handler returns the complete response bytes, written as-is.
    pub fn start_raw<F>(handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let log = Arc::clone(&requests);
        let accepted = Arc::clone(&connections);
        let handler = Arc::new(handler);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                accepted.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, handler.as_ref(), &log));
            }
        });

        Self {
            addr,
            requests,
            connections,
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/wapi/v2.7", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, object: &str) -> usize {
        let prefix = format!("/wapi/v2.7/{object}?");
        self.requests()
            .iter()
            .filter(|r| r.target.starts_with(&prefix))
            .count()
    }
}

fn handle<F>(mut stream: TcpStream, handler: &F, log: &Mutex<Vec<RecordedRequest>>)
where
    F: Fn(&str) -> String,
{
    let Ok(clone) = stream.try_clone() else { return };
    let mut reader = BufReader::new(clone);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }

    let mut authorization = None;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.eq_ignore_ascii_case("authorization")
        {
            authorization = Some(value.trim().to_string());
        }
    }

    let target = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string();
    let response = handler(&target);
    log.lock().unwrap().push(RecordedRequest {
        target,
        authorization,
    });

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// Accepts connections and never answers, holding each one open until the
/// client gives up.
pub struct SilentListener {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
}

impl SilentListener {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let accepted = Arc::clone(&connections);

        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                accepted.fetch_add(1, Ordering::SeqCst);
                held.push(stream);
            }
        });

        Self { addr, connections }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/wapi/v2.7", self.addr)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Routes `network` and `ipv4address` requests to fixed answers.
pub fn routes(
    network: (u16, &str),
    address: (u16, &str),
) -> impl Fn(&str) -> (u16, String) + Send + Sync + 'static {
    let network = (network.0, network.1.to_string());
    let address = (address.0, address.1.to_string());
    move |target: &str| {
        if target.starts_with("/wapi/v2.7/network?") {
            network.clone()
        } else if target.starts_with("/wapi/v2.7/ipv4address?") {
            address.clone()
        } else {
            (404, r#"{"Error": "AdmConProtoError: Unknown object type"}"#.to_string())
        }
    }
}
