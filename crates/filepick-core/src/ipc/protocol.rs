//! Messages exchanged between the picker and its host process.
//!
//! Every message is one frame: a big-endian `u32` byte count followed by that
//! many bytes of UTF-8 JSON.
//!
//! ```text
//! picker -> host   {"seq":7,"call":{"method":"pickFilesAsync","params":{...}}}
//! host -> picker   {"seq":7,"result":"<encoded selection>"}
//!                  {"seq":7,"error":{"code":-32004,"message":"..."}}
//! ```
//!
//! A reply carries the `seq` of the call it answers. The host answers the calls
//! of one connection in the order they arrive; `seq` is absent only when the
//! host could not read the call at all.

use crate::config::{IpcConfig, WireConfig};
use crate::host::PickRequest;
use crate::{PickerError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A method call on the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum BridgeCall {
    /// Show the native picker.
    PickFilesAsync(PickRequest),
    /// Store `handle` under `id` in the host's registry.
    AddHandle { id: String, handle: Value },
    RemoveHandle { id: String },
    GetHandle { id: String },
}

impl BridgeCall {
    const METHODS: [&'static str; 4] = [
        WireConfig::PICK_METHOD,
        IpcConfig::ADD_HANDLE_METHOD,
        IpcConfig::REMOVE_HANDLE_METHOD,
        IpcConfig::GET_HANDLE_METHOD,
    ];

    pub fn method(&self) -> &'static str {
        match self {
            BridgeCall::PickFilesAsync(_) => WireConfig::PICK_METHOD,
            BridgeCall::AddHandle { .. } => IpcConfig::ADD_HANDLE_METHOD,
            BridgeCall::RemoveHandle { .. } => IpcConfig::REMOVE_HANDLE_METHOD,
            BridgeCall::GetHandle { .. } => IpcConfig::GET_HANDLE_METHOD,
        }
    }

    /// Read a call, telling an unknown method apart from bad parameters.
    pub fn from_value(value: Value) -> Result<Self> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if !Self::METHODS.contains(&method.as_str()) {
            return Err(PickerError::MethodNotFound { method });
        }

        serde_json::from_value(value).map_err(|e| PickerError::InvalidParams {
            message: format!("{}: {}", method, e),
        })
    }
}

/// Outgoing call with its sequence number.
///
/// The call stays untyped here so the host can still answer with the right
/// `seq` when the call itself does not parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEnvelope {
    pub seq: u64,
    pub call: Value,
}

impl CallEnvelope {
    pub fn new(seq: u64, call: &BridgeCall) -> Result<Self> {
        Ok(Self {
            seq,
            call: serde_json::to_value(call)?,
        })
    }
}

/// Error object of a failed call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyError {
    pub code: i32,
    pub message: String,
}

/// The host's answer to one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeReply {
    #[serde(default)]
    pub seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

impl BridgeReply {
    pub fn ok(seq: u64, result: Value) -> Self {
        Self {
            seq: Some(seq),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(seq: Option<u64>, err: &PickerError) -> Self {
        Self {
            seq,
            result: None,
            error: Some(ReplyError {
                code: err.to_rpc_error_code(),
                message: err.to_string(),
            }),
        }
    }

    /// The call's outcome. A `null` result reads back as absent.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            Some(err) => Err(PickerError::from_rpc_error(err.code, err.message)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Read one frame. `None` means the peer closed the connection between frames.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if len > IpcConfig::MAX_MESSAGE_SIZE {
        return Err(PickerError::InvalidParams {
            message: format!(
                "IPC message of {} bytes exceeds the {} byte limit",
                len,
                IpcConfig::MAX_MESSAGE_SIZE
            ),
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

/// Serialize `message` and write it as one frame.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(message)?;
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|len| *len as usize <= IpcConfig::MAX_MESSAGE_SIZE)
        .ok_or_else(|| PickerError::InvalidParams {
            message: format!("IPC message of {} bytes is too large", payload.len()),
        })?;

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pick_request() -> PickRequest {
        PickRequest {
            multiple: true,
            allow_all_types: false,
            file_type_map: "{'image/png':['.png']}".to_string(),
        }
    }

    #[test]
    fn test_call_wire_shape() {
        let call = BridgeCall::PickFilesAsync(pick_request());
        let value = serde_json::to_value(&call).unwrap();

        assert_eq!(value["method"], WireConfig::PICK_METHOD);
        assert_eq!(value["params"]["allowAllTypes"], false);
        assert_eq!(value["params"]["fileTypeMap"], "{'image/png':['.png']}");

        let add = BridgeCall::AddHandle {
            id: "x".to_string(),
            handle: json!({"slot": 1}),
        };
        let value = serde_json::to_value(&add).unwrap();
        assert_eq!(value["method"], add.method());
        assert_eq!(value["params"]["handle"]["slot"], 1);
    }

    #[test]
    fn test_method_names_match_config() {
        let calls = [
            BridgeCall::PickFilesAsync(pick_request()),
            BridgeCall::AddHandle {
                id: String::new(),
                handle: Value::Null,
            },
            BridgeCall::RemoveHandle { id: String::new() },
            BridgeCall::GetHandle { id: String::new() },
        ];

        for call in calls {
            let value = serde_json::to_value(&call).unwrap();
            assert_eq!(value["method"], call.method());
            assert_eq!(BridgeCall::from_value(value).unwrap(), call);
        }
    }

    #[test]
    fn test_unknown_method_and_bad_params() {
        let err = BridgeCall::from_value(json!({"method": "formatDisk", "params": {}}))
            .unwrap_err();
        assert!(matches!(
            err,
            PickerError::MethodNotFound { ref method } if method == "formatDisk"
        ));

        let err = BridgeCall::from_value(json!({"method": "getHandle", "params": {}}))
            .unwrap_err();
        assert_eq!(err.to_rpc_error_code(), -32602);
    }

    #[test]
    fn test_failed_reply_maps_back_to_error() {
        let reply = BridgeReply::failed(Some(3), &PickerError::Cancelled);
        let json = serde_json::to_string(&reply).unwrap();
        assert!(!json.contains("\"result\""));

        let parsed: BridgeReply = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.seq, Some(3));
        assert!(parsed.into_result().unwrap_err().is_cancellation());
    }

    #[test]
    fn test_null_result_reads_back_as_null() {
        let json = serde_json::to_string(&BridgeReply::ok(1, Value::Null)).unwrap();
        let parsed: BridgeReply = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.into_result().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_message_keeps_backslashes() {
        let reply = BridgeReply::ok(9, json!(r"id\name\type\\id2\name2\type2"));
        let mut buf = Vec::new();
        write_message(&mut buf, &reply).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let frame = read_frame(&mut cursor).await.unwrap().unwrap();
        let parsed: BridgeReply = serde_json::from_slice(&frame).unwrap();
        assert_eq!(parsed, reply);
    }

    #[tokio::test]
    async fn test_read_frame_at_eof_is_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_frame(&mut cursor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_rejects_oversized_length() {
        let mut buf = ((IpcConfig::MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 8]);

        let mut cursor = std::io::Cursor::new(buf);
        assert!(matches!(
            read_frame(&mut cursor).await,
            Err(PickerError::InvalidParams { .. })
        ));
    }
}
