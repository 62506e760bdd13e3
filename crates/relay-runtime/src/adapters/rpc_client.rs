//! # JSON-RPC Ledger Client
//!
//! Talks to the external ledger's JSON-RPC endpoint. Implements both the
//! gateway's `LedgerSubmitter` and the monitor's `ReceiptSource`.
//!
//! | Port method | RPC method |
//! |-------------|------------|
//! | `submit` | `starknet_addInvokeTransaction` |
//! | `get_receipt` | `starknet_getTransactionReceipt` (code 29 = not found) |
//! | `current_head` | `starknet_blockNumber` |

use async_trait::async_trait;
use lr_01_error_classifier::{retry_with_backoff, ErrorClassifier, RetryPolicy};
use lr_03_submission_gateway::{LedgerSubmitter, SignedSubmission, SubmitError};
use lr_04_confirmation_monitor::{QueryError, ReceiptSource};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};
use shared_types::{ExecutionStatus, FinalityStatus, LedgerTxId, Receipt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// The ledger does not know this transaction hash.
pub const TXN_HASH_NOT_FOUND: i64 = 29;

/// Error codes meaning the ledger refused the transaction itself.
const REJECTION_CODES: &[i64] = &[40, 41, 52, 53, 54, 55];

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Why a call failed, before it is mapped onto a port's error type.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RpcFailure {
    Transport(String),
    Rpc { code: i64, message: String },
    Malformed(String),
}

impl From<RpcFailure> for QueryError {
    fn from(failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Transport(m) => QueryError::Transport(m),
            RpcFailure::Rpc { code, message } => QueryError::Rpc { code, message },
            RpcFailure::Malformed(m) => QueryError::Malformed(m),
        }
    }
}

impl From<RpcFailure> for SubmitError {
    fn from(failure: RpcFailure) -> Self {
        match failure {
            RpcFailure::Transport(m) => SubmitError::Transport(m),
            RpcFailure::Rpc { code, message } if REJECTION_CODES.contains(&code) => {
                SubmitError::Rejected(message)
            }
            RpcFailure::Rpc { code, message } => SubmitError::Rpc { code, message },
            RpcFailure::Malformed(m) => SubmitError::Rpc {
                code: -32700,
                message: format!("malformed response: {}", m),
            },
        }
    }
}

/// JSON-RPC adapter for the external ledger.
pub struct JsonRpcLedgerClient {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
    classifier: ErrorClassifier,
    retry: RetryPolicy,
}

impl JsonRpcLedgerClient {
    /// Create a client with a request timeout.
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Self {
        // reqwest::Client::new() is infallible; fall back to it if the builder fails
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
            classifier: ErrorClassifier::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Backoff applied to head lookups.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Endpoint in use.
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcFailure> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        debug!(method, id, "JSON-RPC request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(e.to_string()))?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcFailure::Malformed(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(RpcFailure::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        rpc_response
            .result
            .ok_or_else(|| RpcFailure::Malformed("RPC response missing result".into()))
    }
}

#[async_trait]
impl LedgerSubmitter for JsonRpcLedgerClient {
    async fn submit(&self, signed: &SignedSubmission) -> Result<LedgerTxId, SubmitError> {
        let result: Value = self
            .call("starknet_addInvokeTransaction", invoke_params(signed))
            .await?;
        result
            .get("transaction_hash")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SubmitError::from(RpcFailure::Malformed("missing transaction_hash".into()))
            })
    }
}

#[async_trait]
impl ReceiptSource for JsonRpcLedgerClient {
    async fn get_receipt(&self, tx_id: &str) -> Result<Option<Receipt>, QueryError> {
        let result = self
            .call::<_, Value>(
                "starknet_getTransactionReceipt",
                json!({ "transaction_hash": tx_id }),
            )
            .await;
        match result {
            Ok(value) => Ok(Some(parse_receipt(&value))),
            Err(RpcFailure::Rpc { code, .. }) if code == TXN_HASH_NOT_FOUND => Ok(None),
            Err(failure) => Err(failure.into()),
        }
    }

    async fn current_head(&self) -> Result<u64, QueryError> {
        retry_with_backoff(&self.retry, &self.classifier, || async move {
            self.call::<_, u64>("starknet_blockNumber", Vec::<()>::new())
                .await
                .map_err(QueryError::from)
        })
        .await
    }
}

/// Parameters for an INVOKE v1 transaction carrying one call.
fn invoke_params(signed: &SignedSubmission) -> Value {
    let call = &signed.call;
    let mut calldata = vec![
        "0x1".to_string(),
        call.target.clone(),
        selector(&call.entrypoint),
        format!("{:#x}", call.calldata.len()),
    ];
    calldata.extend(call.calldata.iter().cloned());

    json!({
        "invoke_transaction": {
            "type": "INVOKE",
            "version": "0x1",
            "sender_address": signed.sender.as_str(),
            "calldata": calldata,
            "max_fee": signed.max_fee,
            "signature": signed.signature,
            "nonce": signed.nonce,
        }
    })
}

/// Entry-point selector: Keccak-256 of the name, truncated to 250 bits.
fn selector(name: &str) -> String {
    let mut hash: [u8; 32] = Keccak256::digest(name.as_bytes()).into();
    hash[0] &= 0x03;
    let hex: String = hash.iter().map(|b| format!("{:02x}", b)).collect();
    let trimmed = hex.trim_start_matches('0');
    format!("0x{}", if trimmed.is_empty() { "0" } else { trimmed })
}

/// Read a receipt object. Unknown or missing fields fall back to defaults.
fn parse_receipt(value: &Value) -> Receipt {
    let text = |key: &str| value.get(key).and_then(Value::as_str);
    let status = |key: &str| -> Value { text(key).map(Value::from).unwrap_or(Value::Null) };

    // Older providers report finality under `status`.
    let execution_status = serde_json::from_value::<ExecutionStatus>(status("execution_status"))
        .unwrap_or_default();
    let finality_status = serde_json::from_value::<FinalityStatus>(status("finality_status"))
        .or_else(|_| serde_json::from_value::<FinalityStatus>(status("status")))
        .unwrap_or_default();

    let fee = match value.get("actual_fee") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Object(obj)) => obj.get("amount").and_then(Value::as_str).map(str::to_string),
        _ => None,
    };

    Receipt {
        execution_status,
        finality_status,
        block_number: value.get("block_number").and_then(Value::as_u64),
        fee,
        revert_reason: text("revert_reason").map(str::to_string),
    }
}
