//! [`PickerHost`] that forwards the pick call to a host process over IPC.

use super::client::IpcClient;
use super::protocol::BridgeCall;
use crate::config::WireConfig;
use crate::host::{PickRequest, PickerHost};
use crate::{PickerError, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use tracing::debug;

/// Picker host reached through an [`IpcClient`].
#[derive(Debug)]
pub struct IpcPickerHost {
    client: IpcClient,
}

impl IpcPickerHost {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        Ok(Self {
            client: IpcClient::connect(addr).await?,
        })
    }

    pub fn new(client: IpcClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PickerHost for IpcPickerHost {
    async fn pick_files(&self, request: &PickRequest) -> Result<String> {
        debug!("Forwarding {} to {}", WireConfig::PICK_METHOD, self.client.addr());
        let result = self
            .client
            .call(BridgeCall::PickFilesAsync(request.clone()))
            .await?;

        match result {
            serde_json::Value::String(response) => Ok(response),
            serde_json::Value::Null => Ok(String::new()),
            other => Err(PickerError::Remote {
                code: -32603,
                message: format!(
                    "expected a string from {}, got {}",
                    WireConfig::PICK_METHOD,
                    other
                ),
            }),
        }
    }
}
