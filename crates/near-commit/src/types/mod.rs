//! Core types for NEAR Protocol.
//!
//! Identifiers, keys, amounts and the transaction model, plus the RPC
//! response shapes the client reads.

mod account;
mod action;
mod amount;
mod block_reference;
mod hash;
mod key;
mod network;
mod rpc;
mod transaction;
mod units;

pub use account::AccountId;
pub use action::{AccessKey, AccessKeyPermission, Action, FunctionCallPermission};
pub use amount::{AmountConverter, MinimalUnits};
pub use block_reference::{BlockReference, Finality};
pub use hash::CryptoHash;
pub use key::{KeyPair, KeyType, PublicKey, SecretKey, Signature};
pub use network::{Network, endpoints};
pub use rpc::{
    AccessKeyPermissionView, AccessKeyView, AccountView, BlockHeaderView, BlockMarker, BlockView,
    CurrentEpochValidatorInfo, DecodedValue, EpochValidatorInfo, ExecutionOutcome,
    ExecutionOutcomeWithId, ExecutionStatus, FinalExecutionOutcome, NodeVersion,
    STORAGE_AMOUNT_PER_BYTE, StatusResponse, SyncInfo, ValidatorStakeView, ViewFunctionResult,
};
pub use transaction::{SignedTransaction, Transaction};
pub use units::{Gas, NearToken};
