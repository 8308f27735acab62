//! TCP IPC client for talking to a picker host process.
//!
//! Calls on one client are serialized by a tokio `Mutex` around the stream.
//! A call whose future is dropped while the host is still working leaves that
//! host's reply in flight; the next call skips it by sequence number.

use super::protocol::{read_frame, write_message, BridgeCall, BridgeReply, CallEnvelope};
use crate::config::IpcConfig;
use crate::{PickerError, Result};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Marks the connection broken if dropped before `done`.
///
/// Held only while a frame is partly written or read, which is the one point
/// where dropping a call would leave the stream off a frame boundary.
struct MidFrame<'a> {
    broken: &'a AtomicBool,
    finished: bool,
}

impl<'a> MidFrame<'a> {
    fn enter(broken: &'a AtomicBool) -> Self {
        Self {
            broken,
            finished: false,
        }
    }

    fn done(mut self) {
        self.finished = true;
    }
}

impl Drop for MidFrame<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.broken.store(true, Ordering::Release);
        }
    }
}

/// IPC client connected to a host's server.
#[derive(Debug)]
pub struct IpcClient {
    stream: Mutex<TcpStream>,
    addr: SocketAddr,
    next_seq: AtomicU64,
    broken: AtomicBool,
}

impl IpcClient {
    /// Connect to a host's IPC server within `IpcConfig::CONNECT_TIMEOUT`.
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = tokio::time::timeout(IpcConfig::CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| PickerError::HostUnavailable {
                message: format!("timed out connecting to {}", addr),
            })?
            .map_err(|e| PickerError::HostUnavailable {
                message: format!("failed to connect to {}: {}", addr, e),
            })?;

        debug!("IPC client connected to {}", addr);

        Ok(Self {
            stream: Mutex::new(stream),
            addr,
            next_seq: AtomicU64::new(1),
            broken: AtomicBool::new(false),
        })
    }

    /// Make one call and wait for its reply.
    ///
    /// Replies to earlier, abandoned calls are discarded. A broken connection
    /// is reported as `HostUnavailable`; an error from the host is mapped back
    /// through `PickerError::from_rpc_error`.
    pub async fn call(&self, call: BridgeCall) -> Result<serde_json::Value> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let envelope = CallEnvelope::new(seq, &call)?;

        let lost = |e: PickerError| PickerError::HostUnavailable {
            message: format!("connection to {} lost: {}", self.addr, e),
        };

        let mut stream = self.stream.lock().await;
        if self.broken.load(Ordering::Acquire) {
            return Err(PickerError::HostUnavailable {
                message: format!("connection to {} was interrupted mid-message", self.addr),
            });
        }

        let writing = MidFrame::enter(&self.broken);
        write_message(&mut *stream, &envelope).await.map_err(lost)?;
        writing.done();

        loop {
            // Readiness consumes nothing, so a call dropped here is safe.
            stream.readable().await.map_err(|e| lost(e.into()))?;

            let reading = MidFrame::enter(&self.broken);
            let frame = read_frame(&mut *stream).await.map_err(lost)?;
            reading.done();

            let frame = frame.ok_or_else(|| PickerError::HostUnavailable {
                message: format!("host at {} closed the connection", self.addr),
            })?;

            let reply: BridgeReply =
                serde_json::from_slice(&frame).map_err(|e| PickerError::Json {
                    message: format!("Failed to parse IPC reply: {}", e),
                    source: Some(e),
                })?;

            match reply.seq {
                Some(got) if got < seq => {
                    debug!(
                        "Discarding reply #{} from {} while waiting for #{}",
                        got, self.addr, seq
                    );
                }
                Some(got) if got > seq => {
                    warn!("Reply #{} from {} is ahead of call #{}", got, self.addr, seq);
                    return Err(PickerError::Remote {
                        code: -32603,
                        message: format!("reply #{} does not answer call #{}", got, seq),
                    });
                }
                _ => return reply.into_result(),
            }
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::server::{IpcDispatch, IpcServer};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpListener;

    struct TestDispatch;

    #[async_trait::async_trait]
    impl IpcDispatch for TestDispatch {
        async fn dispatch(&self, call: BridgeCall) -> Result<serde_json::Value> {
            match call {
                BridgeCall::GetHandle { id } if id == "cancel" => Err(PickerError::Cancelled),
                BridgeCall::GetHandle { id } => Ok(json!(id)),
                other => Err(PickerError::MethodNotFound {
                    method: other.method().to_string(),
                }),
            }
        }
    }

    fn get(id: &str) -> BridgeCall {
        BridgeCall::GetHandle { id: id.to_string() }
    }

    #[tokio::test]
    async fn test_client_call_success() {
        let mut handle = IpcServer::start(Arc::new(TestDispatch)).await.unwrap();
        let client = IpcClient::connect(handle.addr()).await.unwrap();

        assert_eq!(client.call(get("a")).await.unwrap(), json!("a"));
        assert_eq!(client.call(get("a\\b")).await.unwrap(), json!("a\\b"));

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_client_maps_remote_errors() {
        let mut handle = IpcServer::start(Arc::new(TestDispatch)).await.unwrap();
        let client = IpcClient::connect(handle.addr()).await.unwrap();

        let err = client.call(get("cancel")).await.unwrap_err();
        assert!(err.is_cancellation());

        let err = client
            .call(BridgeCall::RemoveHandle { id: "a".to_string() })
            .await
            .unwrap_err();
        assert!(matches!(err, PickerError::Remote { code: -32601, .. }));

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_reply_to_abandoned_call_is_skipped() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Answers only once both calls have arrived, oldest first.
        let host = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut seqs = Vec::new();
            for _ in 0..2 {
                let frame = read_frame(&mut stream).await.unwrap().unwrap();
                let envelope: CallEnvelope = serde_json::from_slice(&frame).unwrap();
                seqs.push(envelope.seq);
            }
            write_message(&mut stream, &BridgeReply::ok(seqs[0], json!("stale")))
                .await
                .unwrap();
            write_message(&mut stream, &BridgeReply::ok(seqs[1], json!("fresh")))
                .await
                .unwrap();
            stream
        });

        let client = IpcClient::connect(addr).await.unwrap();
        let abandoned = tokio::time::timeout(Duration::from_millis(30), client.call(get("x")));
        assert!(abandoned.await.is_err());

        let result = tokio::time::timeout(Duration::from_secs(5), client.call(get("y")))
            .await
            .expect("second call should be answered")
            .unwrap();
        assert_eq!(result, json!("fresh"));

        drop(host.await.unwrap());
    }

    #[tokio::test]
    async fn test_client_connect_to_dead_server_is_host_unavailable() {
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        match IpcClient::connect(addr).await {
            Err(PickerError::HostUnavailable { .. }) => {}
            other => panic!("Expected HostUnavailable, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_client_detects_server_shutdown() {
        let mut handle = IpcServer::start(Arc::new(TestDispatch)).await.unwrap();
        let client = IpcClient::connect(handle.addr()).await.unwrap();
        assert!(client.call(get("a")).await.is_ok());

        handle.shutdown();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(client.call(get("a")).await.is_err());
    }
}
