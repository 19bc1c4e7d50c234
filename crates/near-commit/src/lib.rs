//! Transaction construction, signing and commit pipeline for NEAR Protocol.
//!
//! **near-commit** turns an intent ("call method M on contract C with these
//! arguments, attaching gas and deposit, signed by account A") into a
//! canonical binary transaction, signs it, commits it over JSON-RPC and
//! interprets the execution outcome across every receipt it spawned.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use near_commit::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), near_commit::Error> {
//!     let near = Near::testnet()
//!         .credentials("ed25519:...", "alice.testnet")?
//!         .build();
//!
//!     let value = near
//!         .call(
//!             "counter.testnet",
//!             "increment",
//!             &serde_json::json!({ "by": 2 }),
//!             Gas::tgas(30),
//!             NearToken::ZERO,
//!         )
//!         .await?;
//!     println!("returned: {:?}", value);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. [`AccessKeyResolver`] reads the signer's nonce, permission and a
//!    recent block hash.
//! 2. [`TransactionBuilder`] assembles the transaction with `nonce + 1`.
//! 3. [`SigningKey`] signs the SHA-256 of the [`codec`] encoding.
//! 4. [`RpcClient`] commits it with `broadcast_tx_commit`.
//! 5. [`ReceiptInterpreter`] turns the outcome into a [`DecodedValue`] or
//!    an [`ExecutionFailure`](error::ExecutionFailure).
//!
//! # Amounts
//!
//! [`NearToken`] and [`MinimalUnits`] are exact `u128` integers; their
//! string forms are the external contract. [`AmountConverter`] bridges
//! human decimals and minimal units with an explicit precision boundary:
//!
//! ```
//! use near_commit::{AmountConverter, MinimalUnits};
//!
//! let near = AmountConverter::NEAR;
//! assert_eq!(
//!     near.to_minimal_units(1.0).unwrap(),
//!     "1000000000000000000000000".parse::<MinimalUnits>().unwrap()
//! );
//! assert_eq!(near.to_decimal("500000000000000000000000").unwrap(), 0.5);
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod tokens;
pub mod types;

pub use error::{Error, RpcError};
pub use types::*;

pub use client::{
    AccessKeyInfo, AccessKeyResolver, CallDefinition, ContractSession, EnvSigner, FileSigner,
    HttpTransport, InMemorySigner, LastSeenBlock, Near, NearBuilder, ReceiptInterpreter,
    RetryConfig, RpcClient, Signer, SigningKey, TransactionBuilder, Transport, ViewDefinition,
};

pub use tokens::{FtMetadata, StorageBalance};
