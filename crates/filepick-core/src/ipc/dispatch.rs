//! Host-side method table: the picker call plus the handle registry contract.

use super::protocol::BridgeCall;
use super::server::IpcDispatch;
use crate::config::{IpcConfig, WireConfig};
use crate::host::PickerHost;
use crate::registry::HandleRegistry;
use crate::{PickerError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Serves `pickFilesAsync`, `addHandle`, `removeHandle` and `getHandle`.
///
/// Handles travel as JSON, so `H` is whatever serializable token the host uses
/// to refer to its native objects.
pub struct BridgeDispatch<H> {
    registry: HandleRegistry<H>,
    picker: Option<Arc<dyn PickerHost>>,
}

impl<H> BridgeDispatch<H> {
    /// Registry-only dispatch; `pickFilesAsync` reports `MethodNotFound`.
    pub fn new(registry: HandleRegistry<H>) -> Self {
        Self {
            registry,
            picker: None,
        }
    }

    /// Also serve `pickFilesAsync` through `picker`.
    pub fn with_picker(mut self, picker: Arc<dyn PickerHost>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn registry(&self) -> &HandleRegistry<H> {
        &self.registry
    }
}

#[async_trait::async_trait]
impl<H> IpcDispatch for BridgeDispatch<H>
where
    H: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn dispatch(&self, call: BridgeCall) -> Result<Value> {
        match call {
            BridgeCall::PickFilesAsync(request) => {
                let picker = self.picker.as_ref().ok_or_else(|| PickerError::MethodNotFound {
                    method: WireConfig::PICK_METHOD.to_string(),
                })?;
                let response = picker.pick_files(&request).await?;
                Ok(Value::String(response))
            }
            BridgeCall::AddHandle { id, handle } => {
                let handle: H =
                    serde_json::from_value(handle).map_err(|e| PickerError::InvalidParams {
                        message: format!("{}: {}", IpcConfig::ADD_HANDLE_METHOD, e),
                    })?;
                let id = self.registry.add_handle_str(&id, handle)?;
                debug!("Host registered handle for file {}", id);
                Ok(Value::Null)
            }
            BridgeCall::RemoveHandle { id } => {
                self.registry.remove_handle_str(&id);
                Ok(Value::Null)
            }
            BridgeCall::GetHandle { id } => match self.registry.get_handle_str(&id) {
                Some(handle) => Ok(serde_json::to_value(handle.as_ref())?),
                None => Ok(Value::Null),
            },
        }
    }
}
