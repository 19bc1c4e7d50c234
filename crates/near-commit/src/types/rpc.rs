//! RPC response types.

use serde::Deserialize;

use super::{AccountId, CryptoHash, Gas, NearToken, PublicKey};

/// Cost per byte of storage in yoctoNEAR (10^19, i.e. 0.00001 NEAR/byte).
pub const STORAGE_AMOUNT_PER_BYTE: u128 = 10_000_000_000_000_000_000;

// ============================================================================
// Account types
// ============================================================================

/// Account information from `query` on `account/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountView {
    /// Total liquid balance.
    pub amount: NearToken,
    /// Staked balance.
    pub locked: NearToken,
    /// Hash of deployed contract code (zeros if none).
    pub code_hash: CryptoHash,
    /// Storage used in bytes.
    pub storage_usage: u64,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

impl AccountView {
    fn storage_required(&self) -> NearToken {
        NearToken::from_yoctonear(
            STORAGE_AMOUNT_PER_BYTE.saturating_mul(u128::from(self.storage_usage)),
        )
    }

    /// Spendable balance.
    ///
    /// Staked tokens count towards the storage requirement, so:
    /// available = amount - max(0, storage_required - locked)
    pub fn available(&self) -> NearToken {
        self.amount.saturating_sub(self.storage_cost())
    }

    /// Liquid NEAR reserved for storage: max(0, storage_required - locked).
    pub fn storage_cost(&self) -> NearToken {
        self.storage_required().saturating_sub(self.locked)
    }

    pub fn has_contract(&self) -> bool {
        !self.code_hash.is_zero()
    }
}

/// Access key information from `query` on `access_key/{id}/{pk}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessKeyView {
    pub nonce: u64,
    pub permission: AccessKeyPermissionView,
    /// Block the key state was read at.
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

/// Access key permission as reported by RPC.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AccessKeyPermissionView {
    FullAccess,
    FunctionCall {
        allowance: Option<NearToken>,
        receiver_id: AccountId,
        /// Empty means every method.
        method_names: Vec<String>,
    },
}

impl AccessKeyPermissionView {
    pub fn is_full_access(&self) -> bool {
        matches!(self, Self::FullAccess)
    }

    /// Short human description, used in permission errors.
    pub fn describe(&self) -> String {
        match self {
            Self::FullAccess => "FullAccess".to_string(),
            Self::FunctionCall {
                receiver_id,
                method_names,
                ..
            } if method_names.is_empty() => format!("FunctionCall({})", receiver_id),
            Self::FunctionCall {
                receiver_id,
                method_names,
                ..
            } => format!("FunctionCall({}: {})", receiver_id, method_names.join(", ")),
        }
    }
}

/// Result of a view call: raw bytes plus the block it was evaluated at.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewFunctionResult {
    pub result: Vec<u8>,
    #[serde(default)]
    pub logs: Vec<String>,
    pub block_height: u64,
    pub block_hash: CryptoHash,
}

// ============================================================================
// Block types
// ============================================================================

/// Height and hash of a block the client has observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarker {
    pub height: u64,
    pub hash: CryptoHash,
}

/// Block information from the `block` method.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockView {
    /// Block producer.
    pub author: AccountId,
    pub header: BlockHeaderView,
}

impl BlockView {
    pub fn marker(&self) -> BlockMarker {
        BlockMarker {
            height: self.header.height,
            hash: self.header.hash,
        }
    }
}

/// The subset of the block header the client relies on.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeaderView {
    pub height: u64,
    pub hash: CryptoHash,
    pub prev_hash: CryptoHash,
    pub epoch_id: CryptoHash,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default)]
    pub chunks_included: u64,
    #[serde(default)]
    pub gas_price: Option<NearToken>,
}

// ============================================================================
// Execution outcome types
// ============================================================================

/// Result of `broadcast_tx_commit`.
#[derive(Debug, Clone, Deserialize)]
pub struct FinalExecutionOutcome {
    /// Overall status. Absent only in malformed responses.
    #[serde(default)]
    pub status: Option<ExecutionStatus>,
    #[serde(default)]
    pub transaction_outcome: Option<ExecutionOutcomeWithId>,
    /// Every receipt spawned by the transaction, in execution order.
    #[serde(default)]
    pub receipts_outcome: Vec<ExecutionOutcomeWithId>,
}

impl FinalExecutionOutcome {
    /// Check if the transaction or any of its receipts failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.status, Some(ExecutionStatus::Failure(_)))
            || self
                .receipts_outcome
                .iter()
                .any(|r| r.outcome.status.is_failure())
    }

    pub fn transaction_hash(&self) -> Option<&CryptoHash> {
        self.transaction_outcome.as_ref().map(|o| &o.id)
    }

    /// All outcomes: the transaction first, then receipts in order.
    pub fn outcomes(&self) -> impl Iterator<Item = &ExecutionOutcomeWithId> {
        self.transaction_outcome
            .iter()
            .chain(self.receipts_outcome.iter())
    }

    /// Total gas burnt across the transaction and its receipts.
    pub fn total_gas_used(&self) -> Gas {
        Gas::from_gas(
            self.outcomes()
                .map(|o| o.outcome.gas_burnt.as_gas())
                .fold(0u64, u64::saturating_add),
        )
    }
}

/// Execution status of a transaction or receipt.
///
/// Failures are kept as raw JSON: the error tree is open-ended and only
/// ever rendered for humans.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ExecutionStatus {
    Unknown,
    Pending,
    Failure(serde_json::Value),
    /// Base64 of the returned bytes; empty for no value.
    SuccessValue(String),
    SuccessReceiptId(CryptoHash),
}

impl ExecutionStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Execution outcome with ID.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionOutcomeWithId {
    /// Receipt or transaction ID.
    pub id: CryptoHash,
    pub outcome: ExecutionOutcome,
    pub block_hash: CryptoHash,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionOutcome {
    pub executor_id: AccountId,
    #[serde(default)]
    pub gas_burnt: Gas,
    #[serde(default)]
    pub tokens_burnt: NearToken,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(default)]
    pub receipt_ids: Vec<CryptoHash>,
    pub status: ExecutionStatus,
}

/// Decoded return value of a committed call.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    /// The call returned nothing.
    Void,
    Json(serde_json::Value),
}

impl DecodedValue {
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// The JSON value, if any.
    pub fn json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Void => None,
            Self::Json(value) => Some(value),
        }
    }
}

// ============================================================================
// Node types
// ============================================================================

/// Node status response.
///
/// Only the chain identity and the latest block are required; nodes differ
/// in which of the remaining fields they report.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub protocol_version: u32,
    #[serde(default)]
    pub latest_protocol_version: Option<u32>,
    pub chain_id: String,
    #[serde(default)]
    pub genesis_hash: Option<CryptoHash>,
    #[serde(default)]
    pub validator_account_id: Option<AccountId>,
    pub sync_info: SyncInfo,
    #[serde(default)]
    pub version: Option<NodeVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncInfo {
    pub latest_block_hash: CryptoHash,
    pub latest_block_height: u64,
    #[serde(default)]
    pub latest_block_time: Option<String>,
    #[serde(default)]
    pub syncing: bool,
    #[serde(default)]
    pub earliest_block_height: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeVersion {
    pub version: String,
    #[serde(default)]
    pub build: Option<String>,
}

/// Validators of the current and next epoch.
#[derive(Debug, Clone, Deserialize)]
pub struct EpochValidatorInfo {
    pub current_validators: Vec<CurrentEpochValidatorInfo>,
    pub next_validators: Vec<ValidatorStakeView>,
    pub epoch_start_height: u64,
    #[serde(default)]
    pub epoch_height: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentEpochValidatorInfo {
    pub account_id: AccountId,
    pub public_key: PublicKey,
    pub stake: NearToken,
    #[serde(default)]
    pub is_slashed: bool,
    #[serde(default)]
    pub num_produced_blocks: u64,
    #[serde(default)]
    pub num_expected_blocks: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorStakeView {
    pub account_id: AccountId,
    pub public_key: PublicKey,
    pub stake: NearToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_account_view(amount: u128, locked: u128, storage_usage: u64) -> AccountView {
        AccountView {
            amount: NearToken::from_yoctonear(amount),
            locked: NearToken::from_yoctonear(locked),
            code_hash: CryptoHash::default(),
            storage_usage,
            block_height: 0,
            block_hash: CryptoHash::default(),
        }
    }

    // ========================================================================
    // AccountView tests
    // ========================================================================

    #[test]
    fn test_available_balance_with_storage_no_stake() {
        // 1000 bytes = 0.01 NEAR reserved out of 1 NEAR
        let view = make_account_view(10u128.pow(24), 0, 1000);
        let expected = 10u128.pow(24) - STORAGE_AMOUNT_PER_BYTE * 1000;
        assert_eq!(view.available(), NearToken::from_yoctonear(expected));
        assert_eq!(
            view.storage_cost(),
            NearToken::from_yoctonear(STORAGE_AMOUNT_PER_BYTE * 1000)
        );
    }

    #[test]
    fn test_available_balance_stake_covers_storage() {
        let view = make_account_view(10u128.pow(24), 10u128.pow(24), 1000);
        assert_eq!(view.available(), view.amount);
        assert_eq!(view.storage_cost(), NearToken::ZERO);
    }

    #[test]
    fn test_account_view_from_rpc_json() {
        let json = serde_json::json!({
            "amount": "1000000000000000000000000",
            "locked": "0",
            "code_hash": "11111111111111111111111111111111",
            "storage_usage": 182,
            "storage_paid_at": 0,
            "block_height": 100,
            "block_hash": CryptoHash::hash(b"b").to_string(),
        });
        let view: AccountView = serde_json::from_value(json).unwrap();
        assert_eq!(view.amount, NearToken::ONE_NEAR);
        assert!(!view.has_contract());
    }

    // ========================================================================
    // Access key tests
    // ========================================================================

    #[test]
    fn test_permission_view_parsing() {
        let full: AccessKeyPermissionView = serde_json::from_str("\"FullAccess\"").unwrap();
        assert!(full.is_full_access());

        let fc: AccessKeyPermissionView = serde_json::from_value(serde_json::json!({
            "FunctionCall": {
                "allowance": null,
                "receiver_id": "app.testnet",
                "method_names": ["a", "b"]
            }
        }))
        .unwrap();
        assert!(!fc.is_full_access());
        assert_eq!(fc.describe(), "FunctionCall(app.testnet: a, b)");
    }

    // ========================================================================
    // Execution outcome tests
    // ========================================================================

    fn outcome(status: serde_json::Value, logs: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "id": CryptoHash::hash(logs.join(",").as_bytes()).to_string(),
            "block_hash": CryptoHash::ZERO.to_string(),
            "outcome": {
                "executor_id": "alice.testnet",
                "gas_burnt": 2_428_000_000_000u64,
                "tokens_burnt": "242800000000000000000",
                "logs": logs,
                "receipt_ids": [],
                "status": status,
            }
        })
    }

    #[test]
    fn test_final_outcome_parsing() {
        let json = serde_json::json!({
            "status": { "SuccessValue": "" },
            "transaction_outcome": outcome(serde_json::json!({ "SuccessReceiptId": CryptoHash::ZERO.to_string() }), &[]),
            "receipts_outcome": [
                outcome(serde_json::json!({ "SuccessValue": "" }), &["hello"]),
            ],
        });
        let parsed: FinalExecutionOutcome = serde_json::from_value(json).unwrap();
        assert!(!parsed.is_failure());
        assert_eq!(parsed.outcomes().count(), 2);
        assert_eq!(parsed.total_gas_used().as_gas(), 2 * 2_428_000_000_000);
        assert!(parsed.transaction_hash().is_some());
    }

    #[test]
    fn test_receipt_failure_counts_as_failure() {
        let json = serde_json::json!({
            "status": { "SuccessValue": "" },
            "receipts_outcome": [
                outcome(serde_json::json!({ "Failure": { "ActionError": {} } }), &[]),
            ],
        });
        let parsed: FinalExecutionOutcome = serde_json::from_value(json).unwrap();
        assert!(parsed.is_failure());
    }

    #[test]
    fn test_status_response_full() {
        let status: StatusResponse = serde_json::from_value(serde_json::json!({
            "protocol_version": 73,
            "latest_protocol_version": 74,
            "chain_id": "testnet",
            "genesis_hash": CryptoHash::hash(b"genesis").to_string(),
            "validator_account_id": null,
            "sync_info": {
                "latest_block_hash": CryptoHash::hash(b"tip").to_string(),
                "latest_block_height": 190_000_000u64,
                "latest_block_time": "2026-10-19T08:00:00.000000000Z",
                "syncing": false,
                "earliest_block_height": 189_000_000u64,
            },
            "version": { "version": "2.3.0", "build": "2.3.0", "rustc_version": "1.82.0" },
            "uptime_sec": 1200,
        }))
        .unwrap();
        assert_eq!(status.chain_id, "testnet");
        assert_eq!(status.latest_protocol_version, Some(74));
        assert_eq!(status.genesis_hash, Some(CryptoHash::hash(b"genesis")));
        assert_eq!(status.sync_info.latest_block_height, 190_000_000);
        assert_eq!(
            status.version.and_then(|v| v.build).as_deref(),
            Some("2.3.0")
        );
    }

    #[test]
    fn test_status_response_minimal() {
        let status: StatusResponse = serde_json::from_value(serde_json::json!({
            "protocol_version": 73,
            "chain_id": "localnet",
            "sync_info": {
                "latest_block_hash": CryptoHash::hash(b"tip").to_string(),
                "latest_block_height": 12,
            },
        }))
        .unwrap();
        assert_eq!(status.latest_protocol_version, None);
        assert!(status.version.is_none());
        assert!(!status.sync_info.syncing);
        assert_eq!(status.sync_info.latest_block_time, None);
    }

    #[test]
    fn test_unit_statuses_parse() {
        let status: ExecutionStatus = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(status, ExecutionStatus::Unknown);
        let status: ExecutionStatus = serde_json::from_str("\"Pending\"").unwrap();
        assert_eq!(status, ExecutionStatus::Pending);
    }

    #[test]
    fn test_decoded_value_accessors() {
        assert!(DecodedValue::Void.is_void());
        assert_eq!(DecodedValue::Void.json(), None);
        let value = DecodedValue::Json(serde_json::json!(42));
        assert_eq!(value.json(), Some(&serde_json::json!(42)));
    }
}
