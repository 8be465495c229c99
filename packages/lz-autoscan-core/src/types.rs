use alloy::primitives::{Address, Bytes, B256};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Treats an explicit JSON `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Executor status reported by the explorer for a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExecutionStatus {
    Waiting,
    Other(String),
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        ExecutionStatus::Other(String::new())
    }
}

impl From<String> for ExecutionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "WAITING" => ExecutionStatus::Waiting,
            _ => ExecutionStatus::Other(value),
        }
    }
}

impl From<ExecutionStatus> for String {
    fn from(status: ExecutionStatus) -> Self {
        match status {
            ExecutionStatus::Waiting => "WAITING".to_string(),
            ExecutionStatus::Other(value) => value,
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Waiting => f.write_str("WAITING"),
            ExecutionStatus::Other(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ExecutionStatus,
}

/// A message record as listed by the explorer. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub src_tx_hash: String,
    #[serde(default)]
    pub executor_result: Option<ExecutorResult>,
}

impl ScanMessage {
    pub fn status(&self) -> Option<&ExecutionStatus> {
        self.executor_result.as_ref().map(|r| &r.status)
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.status(), Some(ExecutionStatus::Waiting))
    }
}

/// One page of the explorer listing. Records are kept raw so a malformed one
/// can be dropped without losing the rest of the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<serde_json::Value>,
}

impl MessagesResponse {
    pub fn into_messages(self) -> Vec<ScanMessage> {
        self.messages
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| match serde_json::from_value(record) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("Skipping unreadable message record #{}: {}", index, e);
                    None
                }
            })
            .collect()
    }
}

/// Hex fields scraped from a transaction page. Either may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPayload {
    pub sender32: Option<String>,
    pub payload: Option<String>,
}

impl ExtractedPayload {
    pub fn is_complete(&self) -> bool {
        self.sender32.is_some() && self.payload.is_some()
    }

    pub fn payload_len_bytes(&self) -> Option<usize> {
        self.payload.as_ref().map(|p| p.len().saturating_sub(2) / 2)
    }
}

/// Arguments of one `lzReceive` submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub dst_eid: u32,
    pub sender: B256,
    pub payload: Bytes,
    pub executor: Address,
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<ScanMessage> {
        serde_json::from_str::<MessagesResponse>(json).unwrap().into_messages()
    }

    #[test]
    fn test_messages_response_without_messages_key() {
        assert!(parse(r#"{"total": 0}"#).is_empty());
    }

    #[test]
    fn test_messages_response_with_null_messages() {
        assert!(parse(r#"{"messages": null}"#).is_empty());
    }

    #[test]
    fn test_scan_message_status() {
        let messages = parse(r#"{
            "messages": [
                {"srcTxHash": "0xaa", "executorResult": {"status": "WAITING"}, "guid": "0x01"},
                {"srcTxHash": "0xbb", "executorResult": {"status": "SUCCEEDED"}},
                {"srcTxHash": "0xcc"},
                {"srcTxHash": "0xdd", "executorResult": {}},
                {"srcTxHash": "0xee", "executorResult": null}
            ]
        }"#);
        assert_eq!(messages.len(), 5);
        assert!(messages[0].is_waiting());
        assert_eq!(
            messages[1].status(),
            Some(&ExecutionStatus::Other("SUCCEEDED".to_string()))
        );
        assert!(!messages[1].is_waiting());
        assert!(messages[2].status().is_none());
        assert!(!messages[2].is_waiting());
        assert!(!messages[3].is_waiting());
        assert!(messages[4].status().is_none());
    }

    #[test]
    fn test_null_fields_do_not_drop_the_page() {
        let messages = parse(r#"{
            "messages": [
                {"srcTxHash": "0xaa", "executorResult": {"status": "WAITING"}},
                {"srcTxHash": "0xbb", "executorResult": {"status": null}},
                {"srcTxHash": null, "executorResult": {"status": "WAITING"}}
            ]
        }"#);
        assert_eq!(messages.len(), 3);
        assert!(messages[0].is_waiting());
        assert!(!messages[1].is_waiting());
        assert_eq!(messages[1].status(), Some(&ExecutionStatus::default()));
        assert_eq!(messages[2].src_tx_hash, "");
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let messages = parse(r#"{
            "messages": [
                {"srcTxHash": 12, "executorResult": {"status": "WAITING"}},
                "garbage",
                {"srcTxHash": "0xaa", "executorResult": {"status": "WAITING"}}
            ]
        }"#);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].src_tx_hash, "0xaa");
        assert!(messages[0].is_waiting());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ExecutionStatus::Waiting.to_string(), "WAITING");
        assert_eq!(ExecutionStatus::Other("DELIVERED".to_string()).to_string(), "DELIVERED");
    }

    #[test]
    fn test_status_is_case_sensitive() {
        assert_eq!(ExecutionStatus::from("waiting".to_string()), ExecutionStatus::Other("waiting".to_string()));
        assert_eq!(String::from(ExecutionStatus::Waiting), "WAITING");
    }

    #[test]
    fn test_payload_len_bytes() {
        let extracted = ExtractedPayload {
            sender32: None,
            payload: Some(format!("0x{}", "ab".repeat(100))),
        };
        assert!(!extracted.is_complete());
        assert_eq!(extracted.payload_len_bytes(), Some(100));
    }
}
