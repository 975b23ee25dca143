//! Loopback HTTP listener that receives the OAuth redirect.
//!
//! The listener answers every request but only `/callback` is meaningful: the
//! first callback's outcome (code or error) is handed to the waiting login flow
//! through a one-shot channel. Connections are served on their own tasks so an
//! idle browser preconnect cannot stall the real redirect.

use log::{debug, warn};
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};

use crate::constants::{CALLBACK_PATH, CALLBACK_SUCCESS_PAGE};
use crate::error::{Error, Result};

/// Outcome delivered to the login flow: the authorization code or the reason there is none.
pub type CallbackResult = Result<String>;

type ResultSlot = Arc<Mutex<Option<oneshot::Sender<CallbackResult>>>>;

const MAX_REQUEST_HEAD: usize = 8 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Handle to a running callback listener.
///
/// Shutting down is idempotent; dropping the handle aborts the listener task.
pub struct CallbackServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CallbackServer {
    /// Bind `addr` and start serving in the background.
    ///
    /// Returns the server handle and the receiver that yields the first callback outcome.
    pub async fn bind(addr: &str, expected_state: String) -> Result<(Self, oneshot::Receiver<CallbackResult>)> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::io(format!("failed to start local server on {}", addr), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| Error::io("failed to read local server address", e))?;

        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let slot: ResultSlot = Arc::new(Mutex::new(Some(result_tx)));
        let handle = tokio::spawn(serve(listener, Arc::from(expected_state), slot, shutdown_rx));

        debug!("OAuth callback listener bound to {}", local_addr);
        Ok((
            Self {
                local_addr,
                shutdown_tx: Some(shutdown_tx),
                handle: Some(handle),
            },
            result_rx,
        ))
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and give in-flight responses up to `grace` to finish.
    pub async fn shutdown(&mut self, grace: Duration) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(mut handle) = self.handle.take() {
            if tokio::time::timeout(grace, &mut handle).await.is_err() {
                warn!("OAuth callback listener did not stop within {:?}, aborting", grace);
                handle.abort();
            }
        }
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn serve(listener: TcpListener, expected_state: Arc<str>, slot: ResultSlot, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    debug!("OAuth callback connection from {}", peer);
                    connections.spawn(handle_connection(stream, expected_state.clone(), slot.clone()));
                }
                Err(e) => warn!("OAuth callback listener accept failed: {}", e),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drop(listener);
    while connections.join_next().await.is_some() {}
}

async fn handle_connection(mut stream: TcpStream, expected_state: Arc<str>, slot: ResultSlot) {
    let (method, target) = match tokio::time::timeout(READ_TIMEOUT, read_request_line(&mut stream)).await {
        Ok(Ok(Some(line))) => line,
        Ok(Ok(None)) => return,
        Ok(Err(e)) => {
            debug!("Failed to read OAuth callback request: {}", e);
            return;
        }
        Err(_) => {
            debug!("OAuth callback connection idle, closing");
            return;
        }
    };

    let url = match Url::parse(&format!("http://localhost{}", target)) {
        Ok(url) if url.path() == CALLBACK_PATH => url,
        _ => {
            let _ = respond(&mut stream, 404, "Not Found", "text/plain", "Not found").await;
            return;
        }
    };

    if method != "GET" {
        let _ = respond(&mut stream, 405, "Method Not Allowed", "text/plain", "Method not allowed").await;
        return;
    }

    let outcome = evaluate_callback(&url, &expected_state);
    let written = match &outcome {
        Ok(_) => respond(&mut stream, 200, "OK", "text/html", CALLBACK_SUCCESS_PAGE).await,
        Err(Error::StateMismatch) => respond(&mut stream, 400, "Bad Request", "text/plain", "State mismatch").await,
        Err(Error::MissingCode) => respond(&mut stream, 400, "Bad Request", "text/plain", "No code").await,
        Err(_) => respond(&mut stream, 400, "Bad Request", "text/plain", "Authorization failed").await,
    };
    if let Err(e) = written {
        debug!("Failed to answer OAuth callback: {}", e);
    }

    let sender = slot.lock().ok().and_then(|mut guard| guard.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => debug!("Ignoring repeated OAuth callback"),
    }
}

/// Validate callback query parameters: state first, then `error`, then `code`.
pub fn evaluate_callback(url: &Url, expected_state: &str) -> CallbackResult {
    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if param("state").as_deref() != Some(expected_state) {
        return Err(Error::StateMismatch);
    }
    if let Some(error) = param("error").filter(|e| !e.is_empty()) {
        return Err(Error::AuthorizationDenied(error));
    }
    param("code").filter(|c| !c.is_empty()).ok_or(Error::MissingCode)
}

/// Read the request head and return `(method, target)` from its first line.
async fn read_request_line(stream: &mut TcpStream) -> std::io::Result<Option<(String, String)>> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    let head = String::from_utf8_lossy(&buf);
    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => Ok(Some((method.to_string(), target.to_string()))),
        _ => Ok(None),
    }
}

async fn respond(stream: &mut TcpStream, status: u16, reason: &str, content_type: &str, body: &str) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        content_type,
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}
