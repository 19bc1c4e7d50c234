//! Error types for near-commit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) — Main error type, returned by the commit pipeline
//!   - [`TransportError`] — Connection, timeout, or HTTP-level failures (retryable)
//!   - [`RpcError`] — Well-formed JSON-RPC rejections (unknown account, bad nonce, ...)
//!   - [`ExecutionFailure`] — Transaction accepted but execution failed on-chain
//!   - [`EncodingError`] — Binary codec or result-decoding violations
//!   - [`ParseKeyError`] — Unusable key material
//!   - [`AmountError`] — Malformed minimal-unit or decimal amounts
//!   - [`ParseAccountIdError`] — Invalid account ID format
//!   - [`CredentialsError`] — Credential file loading failures
//!
//! # Pattern Matching
//!
//! ```rust,no_run
//! use near_commit::*;
//!
//! # async fn example() -> Result<(), Error> {
//! let near = Near::testnet().build();
//!
//! match near.account("maybe-exists.testnet").await {
//!     Ok(view) => println!("Balance: {}", view.amount),
//!     Err(Error::AccountNotFound(account)) => {
//!         println!("Account {} doesn't exist", account);
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;

use thiserror::Error;

use crate::types::{AccountId, PublicKey};

/// Error parsing an account ID.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAccountIdError {
    #[error("Account ID is empty")]
    Empty,

    #[error("Account ID '{0}' is too long (max 64 characters)")]
    TooLong(String),

    #[error("Account ID '{0}' is too short (min 2 characters for named accounts)")]
    TooShort(String),

    #[error("Account ID '{0}' contains invalid character '{1}'")]
    InvalidChar(String, char),

    #[error("Account ID '{0}' has invalid format")]
    InvalidFormat(String),
}

/// Error parsing or using key material.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseKeyError {
    #[error("Invalid key format: expected 'ed25519:<base58>'")]
    InvalidFormat,

    #[error("Unsupported key type: '{0}'")]
    UnknownKeyType(String),

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid curve point: key bytes do not represent a valid point on the curve")]
    InvalidCurvePoint,

    #[error("Key mismatch: expected {expected}, got {actual}")]
    KeyMismatch { expected: String, actual: String },
}

/// Error parsing a crypto hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid hash length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

/// Error converting between decimal and minimal-unit amounts.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AmountError {
    #[error("Minimal units must be an integer, got '{0}'")]
    DecimalPoint(String),

    #[error("Malformed sign in amount '{0}'")]
    MalformedSign(String),

    #[error("Invalid number in amount: '{0}'")]
    InvalidNumber(String),

    #[error("Amount must be a finite, non-negative number, got {0}")]
    NotRepresentable(f64),

    #[error("Amount overflow: value too large")]
    Overflow,

    #[error("Ambiguous amount '{0}'. Use explicit units like '5 NEAR' or '1000 yocto'")]
    AmbiguousAmount(String),
}

/// Binary codec and result-decoding violations.
///
/// These are fatal: they indicate a schema mismatch or a protocol-level
/// inconsistency, never a condition the caller can correct by retrying.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Unexpected end of input: needed {needed} bytes at offset {offset}, {remaining} left")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("Invalid discriminant {tag} (expected < {variants})")]
    InvalidDiscriminant { tag: u8, variants: usize },

    #[error("Invalid option tag {0} (expected 0 or 1)")]
    InvalidOptionTag(u8),

    #[error("Invalid UTF-8 in string field")]
    InvalidUtf8,

    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),

    #[error("Value does not match schema: expected {expected}")]
    SchemaMismatch { expected: &'static str },

    #[error("Fixed-length field expects {expected} bytes, got {actual}")]
    FixedLength { expected: usize, actual: usize },

    #[error("Sequence of {0} zero-width elements")]
    ZeroWidthSequence(usize),

    #[error("Length {0} does not fit a u32 prefix")]
    LengthOverflow(usize),

    #[error("Invalid base64 payload: {0}")]
    Base64(String),

    #[error("Invalid JSON payload: {0}")]
    Json(String),

    #[error("Outcome has neither a failure nor a success value: {0}")]
    UnexpectedOutcome(String),

    #[error("Invalid field value: {0}")]
    InvalidField(String),
}

/// Error produced by a signing backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Error loading a credentials record.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("Credentials not found at {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid credentials JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid credential format: {0}")]
    InvalidFormat(String),

    #[error("Path error: {0}")]
    PathError(String),
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Network-level failure: the request never produced a JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    Body(String),

    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Request(e) => e.is_timeout() || e.is_connect(),
            TransportError::Status { status, .. } => is_retryable_status(*status),
            TransportError::Body(_) => false,
            TransportError::Unavailable(_) => true,
        }
    }
}

/// Check if an HTTP status code is retryable.
pub(crate) fn is_retryable_status(status: u16) -> bool {
    // 408 Request Timeout, 429 Too Many Requests, 5xx Server Errors
    status == 408 || status == 429 || (500..600).contains(&status)
}

// ============================================================================
// RPC Errors
// ============================================================================

/// RPC-specific errors.
#[derive(Debug, Error)]
pub enum RpcError {
    // ─── Network/Transport ───
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ─── Generic RPC Error ───
    #[error("RPC error: {message} (code: {code})")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    // ─── Account Errors ───
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Access key not found: {account_id} / {public_key}")]
    AccessKeyNotFound {
        account_id: AccountId,
        public_key: PublicKey,
    },

    // ─── Query Errors ───
    #[error("Query '{path}' failed: {message}")]
    Query { path: String, message: String },

    #[error("Contract execution failed on {contract_id}: {message}")]
    ContractExecution {
        contract_id: AccountId,
        method_name: Option<String>,
        message: String,
    },

    #[error("Block not found: {0}")]
    UnknownBlock(String),

    // ─── Transaction Errors ───
    #[error("Invalid transaction: {message}")]
    InvalidTransaction {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Invalid nonce: transaction nonce {tx_nonce} must be greater than access key nonce {ak_nonce}")]
    InvalidNonce { tx_nonce: u64, ak_nonce: u64 },

    #[error("Request timeout: {message}")]
    RequestTimeout {
        message: String,
        transaction_hash: Option<String>,
    },
}

impl RpcError {
    /// Check if this error is retryable.
    ///
    /// Only transport failures qualify. Application-level rejections are
    /// surfaced verbatim: resending with the same nonce and block hash fails
    /// the same way.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if this error came from the transport layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }

    /// The JSON-RPC error code, when the node returned one verbatim.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Create an invalid transaction error.
    pub fn invalid_transaction(
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        RpcError::InvalidTransaction {
            message: message.into(),
            details,
        }
    }
}

// ============================================================================
// Execution Failure
// ============================================================================

/// A transaction that the network accepted but whose execution failed.
///
/// `logs` holds every log line from every receipt in chain order, with a
/// description line appended after each failing receipt's own logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionFailure {
    /// Description of the failure that decided the outcome.
    pub message: String,
    /// Collected logs and failure descriptions.
    pub logs: Vec<String>,
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction failed: {}", self.message)?;
        for line in &self.logs {
            write!(f, "\n  {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExecutionFailure {}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for near-commit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error("No signer configured. Call .signer() or .credentials() on NearBuilder.")]
    NoSigner,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    // ─── Parsing ───
    #[error(transparent)]
    InvalidAccountId(#[from] ParseAccountIdError),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(#[from] ParseKeyError),

    #[error("Invalid amount format: {0}")]
    InvalidAmountFormat(#[from] AmountError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─── Network ───
    #[error(transparent)]
    Transport(TransportError),

    #[error(transparent)]
    Rpc(RpcError),

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Access key not found: {account_id} / {public_key}")]
    AccessKeyNotFound {
        account_id: AccountId,
        public_key: PublicKey,
    },

    // ─── Signing ───
    #[error("The key {public_key} is not full access for account '{account_id}' ({permission})")]
    InsufficientPermission {
        account_id: AccountId,
        public_key: PublicKey,
        permission: String,
    },

    #[error(transparent)]
    Signing(#[from] SignerError),

    // ─── Transaction ───
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error(transparent)]
    ExecutionFailure(#[from] ExecutionFailure),

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(#[from] EncodingError),
}

impl From<RpcError> for Error {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Transport(e) => Error::Transport(e),
            RpcError::AccountNotFound(account_id) => Error::AccountNotFound(account_id),
            RpcError::AccessKeyNotFound {
                account_id,
                public_key,
            } => Error::AccessKeyNotFound {
                account_id,
                public_key,
            },
            other => Error::Rpc(other),
        }
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transport(err)
    }
}

impl Error {
    /// Returns true if the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}
