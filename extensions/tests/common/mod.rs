#![allow(dead_code)]

use std::{
    collections::VecDeque,
    env,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};

// Helper function to get an environment variable or skip the test
pub fn get_env_or_skip(var_name: &str, test_name: &str) -> Option<String> {
    dotenv::dotenv().ok(); // Load .env file if present

    match env::var(var_name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => {
            println!("Skipping integration test {} - {} environment variable not set.", test_name, var_name);
            None // Signal to skip
        }
    }
}

/// A canned answer of the stub server.
#[derive(Clone, Debug)]
pub enum StubResponse {
    Reply { status: u16, body: String },
    /// Waits before answering, to provoke client timeouts.
    Delayed { delay: Duration, status: u16, body: String },
}

impl StubResponse {
    pub fn json(body: serde_json::Value) -> Self {
        StubResponse::Reply { status: 200, body: body.to_string() }
    }

    pub fn status(status: u16, body: &str) -> Self {
        StubResponse::Reply { status, body: body.to_string() }
    }
}

/// A request as the stub server received it.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim().to_string())
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

/// Minimal HTTP/1.1 server that answers each connection with the next canned response.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind stub server");
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::new(Mutex::new(VecDeque::from(responses)));

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else { break };
                let response = queue.lock().unwrap().pop_front();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, response, recorded).await;
                });
            }
        });

        Self { base_url, requests, handle }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    response: Option<StubResponse>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let request = read_request(&mut stream).await?;
    recorded.lock().unwrap().push(request);

    let (status, body) = match response {
        Some(StubResponse::Reply { status, body }) => (status, body),
        Some(StubResponse::Delayed { delay, status, body }) => {
            tokio::time::sleep(delay).await;
            (status, body)
        }
        None => (500, "no canned response left".to_string()),
    };

    let raw = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    stream.write_all(raw.as_bytes()).await?;
    stream.shutdown().await
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    let header_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let partial = RecordedRequest { head, body: Vec::new() };
    let content_length = partial.header("content-length").and_then(|v| v.parse::<usize>().ok());
    let chunked = partial
        .header("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"));

    loop {
        let body = &buf[header_end..];
        let complete = match content_length {
            Some(len) => body.len() >= len,
            None if chunked => body.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if complete {
            break;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(RecordedRequest {
        body: buf[header_end..].to_vec(),
        ..partial
    })
}
