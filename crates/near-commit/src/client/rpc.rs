//! Low-level JSON-RPC client for NEAR.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::transport::{HttpTransport, Transport};
use crate::error::RpcError;
use crate::types::{
    AccessKeyView, AccountId, AccountView, BlockReference, BlockView, EpochValidatorInfo,
    FinalExecutionOutcome, PublicKey, StatusResponse, ViewFunctionResult,
};

/// Retry configuration for read-only RPC calls.
///
/// Only transport failures are retried. Broadcasts are never retried.
#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based): doubles each time,
    /// capped at `max_delay_ms`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(
            self.initial_delay_ms
                .saturating_mul(factor)
                .min(self.max_delay_ms),
        )
    }
}

/// JSON-RPC error structure.
/// NEAR RPC returns structured errors with name/cause/info pattern.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    cause: Option<ErrorCause>,
}

#[derive(Debug, Deserialize)]
struct ErrorCause {
    name: String,
    #[serde(default)]
    info: Option<serde_json::Value>,
}

/// Low-level JSON-RPC client for NEAR.
///
/// Cloning shares the transport.
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    retry_config: RetryConfig,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create an HTTP client for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(url)), RetryConfig::default())
    }

    /// Create an HTTP client with custom retry configuration.
    pub fn with_retry_config(url: impl Into<String>, retry_config: RetryConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new(url)), retry_config)
    }

    /// Create a client over any transport.
    pub fn with_transport(transport: Arc<dyn Transport>, retry_config: RetryConfig) -> Self {
        Self {
            transport,
            retry_config,
            request_id: AtomicU64::new(0),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Make a raw RPC call, retrying transport failures.
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<R, RpcError> {
        self.call_inner(method, &params, None, true).await
    }

    async fn call_inner<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
        query_path: Option<&str>,
        retry: bool,
    ) -> Result<R, RpcError> {
        let max_retries = if retry { self.retry_config.max_retries } else { 0 };
        let mut attempt = 0;

        loop {
            match self.try_call(method, params, query_path).await {
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = self.retry_config.delay(attempt);
                    warn!(
                        method,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying RPC request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Single attempt to make an RPC call.
    async fn try_call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
        query_path: Option<&str>,
    ) -> Result<R, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, endpoint = self.endpoint(), "RPC request");

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let mut envelope = self.transport.post(&request).await?;

        if let Some(error) = envelope.get_mut("error").map(serde_json::Value::take) {
            let error: JsonRpcError = serde_json::from_value(error)
                .map_err(|e| RpcError::InvalidResponse(format!("Malformed error object: {}", e)))?;
            debug!(method, id, code = error.code, "RPC error response");
            return Err(parse_rpc_error(&error, query_path));
        }

        let result = envelope
            .get_mut("result")
            .map(serde_json::Value::take)
            .ok_or_else(|| RpcError::InvalidResponse("Missing result in response".to_string()))?;
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Run a legacy `query` with `[path, data]` params.
    ///
    /// A result carrying an `error` string is mapped according to the path:
    /// missing keys and accounts on `access_key/` and `account/` paths,
    /// contract failures on `call/` paths.
    pub async fn query(&self, path: &str, data: &str) -> Result<serde_json::Value, RpcError> {
        let params = serde_json::json!([path, data]);
        let result: serde_json::Value = self.call_inner("query", &params, Some(path), true).await?;

        if let Some(message) = result.get("error").and_then(|e| e.as_str()) {
            return Err(classify_query_error(path, message));
        }
        Ok(result)
    }

    async fn query_as<R: DeserializeOwned>(&self, path: &str, data: &str) -> Result<R, RpcError> {
        let result = self.query(path, data).await?;
        serde_json::from_value(result).map_err(|e| RpcError::InvalidResponse(e.to_string()))
    }

    /// View account information at the latest final state.
    pub async fn view_account(&self, account_id: &AccountId) -> Result<AccountView, RpcError> {
        self.query_as(&format!("account/{}", account_id), "").await
    }

    /// View one access key of an account.
    pub async fn view_access_key(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyView, RpcError> {
        self.query_as(&format!("access_key/{}/{}", account_id, public_key), "")
            .await
    }

    /// Call a view function. `args` are the raw argument bytes (usually JSON).
    pub async fn view_call(
        &self,
        contract_id: &AccountId,
        method_name: &str,
        args: &[u8],
    ) -> Result<ViewFunctionResult, RpcError> {
        let data = bs58::encode(args).into_string();
        self.query_as(&format!("call/{}/{}", contract_id, method_name), &data)
            .await
    }

    // ========================================================================
    // Block and node methods
    // ========================================================================

    pub async fn block(&self, block: BlockReference) -> Result<BlockView, RpcError> {
        self.call("block", block.to_rpc_params()).await
    }

    pub async fn status(&self) -> Result<StatusResponse, RpcError> {
        self.call("status", serde_json::json!([null])).await
    }

    /// Validators of the current epoch.
    pub async fn validators(&self) -> Result<EpochValidatorInfo, RpcError> {
        self.call("validators", serde_json::json!([null])).await
    }

    /// The genesis configuration, as returned by the node.
    pub async fn genesis_config(&self) -> Result<serde_json::Value, RpcError> {
        self.call("EXPERIMENTAL_genesis_config", serde_json::json!([null]))
            .await
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Submit a signed transaction and wait until it commits.
    ///
    /// Never retried: a lost response does not mean the transaction was
    /// not included, and a second submission of the same bytes would be
    /// rejected or, with a fresh nonce, executed twice.
    pub async fn broadcast_commit(
        &self,
        signed_tx_base64: &str,
    ) -> Result<FinalExecutionOutcome, RpcError> {
        let params = serde_json::json!([signed_tx_base64]);
        self.call_inner("broadcast_tx_commit", &params, None, false)
            .await
    }
}

impl Clone for RpcClient {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            retry_config: self.retry_config.clone(),
            request_id: AtomicU64::new(0),
        }
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("endpoint", &self.endpoint())
            .field("retry_config", &self.retry_config)
            .finish()
    }
}

// ============================================================================
// Error mapping
// ============================================================================

/// Split an `access_key/{account}/{public_key}` path.
fn access_key_path(path: &str) -> Option<(AccountId, PublicKey)> {
    let rest = path.strip_prefix("access_key/")?;
    let (account, key) = rest.split_once('/')?;
    Some((account.parse().ok()?, key.parse().ok()?))
}

/// The account a query path is about.
fn path_account(path: &str) -> Option<AccountId> {
    let (_, rest) = path.split_once('/')?;
    rest.split('/').next()?.parse().ok()
}

/// Map a query-level `error` string (or legacy string `data`) using the
/// query path it came from.
fn classify_query_error(path: &str, message: &str) -> RpcError {
    let missing = message.contains("does not exist");

    if path.starts_with("access_key/") && missing {
        if let Some((account_id, public_key)) = access_key_path(path) {
            if message.contains("access key") {
                return RpcError::AccessKeyNotFound {
                    account_id,
                    public_key,
                };
            }
            return RpcError::AccountNotFound(account_id);
        }
    }

    if path.starts_with("account/") && missing {
        if let Some(account_id) = path_account(path) {
            return RpcError::AccountNotFound(account_id);
        }
    }

    if let Some(rest) = path.strip_prefix("call/") {
        if let Some((contract, method)) = rest.split_once('/') {
            if let Ok(contract_id) = contract.parse() {
                return RpcError::ContractExecution {
                    contract_id,
                    method_name: Some(method.to_string()),
                    message: message.to_string(),
                };
            }
        }
    }

    RpcError::Query {
        path: path.to_string(),
        message: message.to_string(),
    }
}

fn info_str<'a>(info: Option<&'a serde_json::Value>, key: &str) -> Option<&'a str> {
    info.and_then(|i| i.get(key)).and_then(|v| v.as_str())
}

/// Parse an RPC error into a specific error type.
fn parse_rpc_error(error: &JsonRpcError, query_path: Option<&str>) -> RpcError {
    if let Some(cause) = &error.cause {
        let info = cause.info.as_ref();
        let data = &error.data;

        match cause.name.as_str() {
            "UNKNOWN_ACCOUNT" => {
                let account_id = info_str(info, "requested_account_id")
                    .and_then(|a| a.parse().ok())
                    .or_else(|| query_path.and_then(path_account));
                if let Some(account_id) = account_id {
                    return RpcError::AccountNotFound(account_id);
                }
            }
            "UNKNOWN_ACCESS_KEY" => {
                let from_path = query_path.and_then(access_key_path);
                let account_id = info_str(info, "requested_account_id")
                    .and_then(|a| a.parse().ok())
                    .or_else(|| from_path.as_ref().map(|(a, _)| a.clone()));
                let public_key = info_str(info, "public_key")
                    .and_then(|k| k.parse().ok())
                    .or_else(|| from_path.as_ref().map(|(_, k)| *k));
                if let (Some(account_id), Some(public_key)) = (account_id, public_key) {
                    return RpcError::AccessKeyNotFound {
                        account_id,
                        public_key,
                    };
                }
            }
            "UNKNOWN_BLOCK" => {
                let block_ref = data
                    .as_ref()
                    .and_then(|d| d.as_str())
                    .unwrap_or(&error.message);
                return RpcError::UnknownBlock(block_ref.to_string());
            }
            "CONTRACT_EXECUTION_ERROR" => {
                let contract_id = info_str(info, "contract_id")
                    .and_then(|c| c.parse().ok())
                    .or_else(|| query_path.and_then(path_account));
                if let Some(contract_id) = contract_id {
                    return RpcError::ContractExecution {
                        contract_id,
                        method_name: info_str(info, "method_name").map(String::from),
                        message: info_str(info, "vm_error")
                            .unwrap_or(&error.message)
                            .to_string(),
                    };
                }
            }
            "INVALID_TRANSACTION" => {
                if let Some(invalid_nonce) = data
                    .as_ref()
                    .and_then(extract_invalid_nonce)
                    .or_else(|| info.and_then(extract_invalid_nonce))
                {
                    return invalid_nonce;
                }
                return RpcError::invalid_transaction(&error.message, data.clone());
            }
            "TIMEOUT_ERROR" => {
                return RpcError::RequestTimeout {
                    message: error.message.clone(),
                    transaction_hash: info_str(info, "transaction_hash").map(String::from),
                };
            }
            _ => {}
        }
    }

    // Legacy nodes put a bare message string in `data`.
    if let (Some(path), Some(message)) = (query_path, error.data.as_ref().and_then(|d| d.as_str()))
    {
        if message.contains("does not exist") {
            return classify_query_error(path, message);
        }
    }

    RpcError::Rpc {
        code: error.code,
        message: error.message.clone(),
        data: error.data.clone(),
    }
}

/// Extract an InvalidNonce error from the nested error structure:
/// `TxExecutionError.InvalidTxError.InvalidNonce` or `InvalidTxError.InvalidNonce`.
fn extract_invalid_nonce(data: &serde_json::Value) -> Option<RpcError> {
    let invalid_tx_error = data
        .get("TxExecutionError")
        .and_then(|e| e.get("InvalidTxError"))
        .or_else(|| data.get("InvalidTxError"))?;
    let invalid_nonce = invalid_tx_error.get("InvalidNonce")?;

    let ak_nonce = invalid_nonce.get("ak_nonce")?.as_u64()?;
    let tx_nonce = invalid_nonce.get("tx_nonce")?.as_u64()?;

    Some(RpcError::InvalidNonce { tx_nonce, ak_nonce })
}
