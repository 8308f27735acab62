//! TCP IPC server run by the picker host.
//!
//! Binds an OS-assigned port on `127.0.0.1`. Each connection gets its own
//! task, which answers that connection's calls one at a time.

use super::protocol::{read_frame, write_message, BridgeCall, BridgeReply, CallEnvelope};
use crate::config::IpcConfig;
use crate::{PickerError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Answers calls on the host side.
#[async_trait::async_trait]
pub trait IpcDispatch: Send + Sync + 'static {
    async fn dispatch(&self, call: BridgeCall) -> Result<serde_json::Value>;
}

/// A running server. Dropping the handle stops it.
pub struct IpcServerHandle {
    pub addr: SocketAddr,
    stop: watch::Sender<bool>,
    accept_task: Option<JoinHandle<()>>,
}

impl IpcServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting and close every open connection.
    pub fn shutdown(&mut self) {
        self.stop.send_replace(true);
    }
}

impl Drop for IpcServerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

pub struct IpcServer;

impl IpcServer {
    /// Start serving `dispatch` on a fresh loopback port.
    pub async fn start<D: IpcDispatch>(dispatch: Arc<D>) -> Result<IpcServerHandle> {
        let listener = TcpListener::bind(IpcConfig::BIND_ADDR).await?;
        let addr = listener.local_addr()?;
        let (stop, stopped) = watch::channel(false);

        info!("Picker IPC server listening on {}", addr);

        let accept_task = tokio::spawn(Self::accept_loop(listener, dispatch, stopped));

        Ok(IpcServerHandle {
            addr,
            stop,
            accept_task: Some(accept_task),
        })
    }

    async fn accept_loop<D: IpcDispatch>(
        listener: TcpListener,
        dispatch: Arc<D>,
        mut stopped: watch::Receiver<bool>,
    ) {
        let slots = Arc::new(Semaphore::new(IpcConfig::MAX_CONNECTIONS));

        loop {
            let (stream, peer) = tokio::select! {
                _ = stopped.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        error!("IPC accept error: {}", e);
                        continue;
                    }
                },
            };

            let Ok(slot) = slots.clone().try_acquire_owned() else {
                warn!(
                    "Rejecting IPC connection from {}: {} connections already open",
                    peer,
                    IpcConfig::MAX_CONNECTIONS
                );
                continue;
            };

            let dispatch = dispatch.clone();
            let stopped = stopped.clone();
            tokio::spawn(async move {
                debug!("IPC connection from {}", peer);
                if let Err(e) = Self::serve_connection(stream, dispatch.as_ref(), stopped).await {
                    debug!("IPC connection {} ended: {}", peer, e);
                }
                drop(slot);
            });
        }

        info!("Picker IPC server stopped");
    }

    async fn serve_connection<D: IpcDispatch>(
        mut stream: TcpStream,
        dispatch: &D,
        mut stopped: watch::Receiver<bool>,
    ) -> Result<()> {
        loop {
            let frame = tokio::select! {
                _ = stopped.changed() => return Ok(()),
                frame = read_frame(&mut stream) => match frame? {
                    Some(frame) => frame,
                    None => return Ok(()),
                },
            };

            let reply = Self::answer(&frame, dispatch).await;
            write_message(&mut stream, &reply).await?;
        }
    }

    async fn answer<D: IpcDispatch>(frame: &[u8], dispatch: &D) -> BridgeReply {
        let envelope: CallEnvelope = match serde_json::from_slice(frame) {
            Ok(envelope) => envelope,
            Err(e) => return BridgeReply::failed(None, &PickerError::from(e)),
        };
        let seq = envelope.seq;

        let call = match BridgeCall::from_value(envelope.call) {
            Ok(call) => call,
            Err(e) => return BridgeReply::failed(Some(seq), &e),
        };
        debug!("IPC call #{} {}", seq, call.method());

        match dispatch.dispatch(call).await {
            Ok(result) => BridgeReply::ok(seq, result),
            Err(e) => BridgeReply::failed(Some(seq), &e),
        }
    }
}
