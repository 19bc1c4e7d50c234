//! Access key resolution.
//!
//! Every transaction reads its access key fresh: nonce and block hash come
//! from the same query, so the transaction is always built against the
//! state the node reported at one block. Nothing is cached between calls.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::rpc::RpcClient;
use crate::error::Error;
use crate::types::{AccessKeyPermissionView, AccountId, BlockMarker, CryptoHash, PublicKey};

/// The most recent block this client has observed.
///
/// Advisory only: it is updated by reads and never used to sign.
#[derive(Clone, Debug, Default)]
pub struct LastSeenBlock(Arc<RwLock<Option<BlockMarker>>>);

impl LastSeenBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<BlockMarker> {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `marker` unless a higher block has already been seen.
    ///
    /// A marker is a plain value, so a panic in another holder cannot leave
    /// it half-written; a poisoned lock is used as is.
    pub fn observe(&self, marker: BlockMarker) {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        match *guard {
            Some(current) if current.height > marker.height => {}
            _ => *guard = Some(marker),
        }
    }
}

/// The state of a full-access key, read at one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKeyInfo {
    /// Last nonce used by this key.
    pub nonce: u64,
    /// Hash of the block the key was read at; transactions reference it.
    pub block_hash: CryptoHash,
    pub block_height: u64,
    pub permission: AccessKeyPermissionView,
}

impl AccessKeyInfo {
    /// The nonce for the next transaction signed with this key.
    pub fn next_nonce(&self) -> Result<u64, Error> {
        self.nonce.checked_add(1).ok_or_else(|| {
            Error::InvalidTransaction(format!("access key nonce {} is exhausted", self.nonce))
        })
    }

    pub fn block(&self) -> BlockMarker {
        BlockMarker {
            height: self.block_height,
            hash: self.block_hash,
        }
    }
}

/// Reads access keys that are allowed to sign arbitrary transactions.
#[derive(Clone, Debug)]
pub struct AccessKeyResolver {
    rpc: Arc<RpcClient>,
    last_seen: LastSeenBlock,
}

impl AccessKeyResolver {
    pub fn new(rpc: Arc<RpcClient>, last_seen: LastSeenBlock) -> Self {
        Self { rpc, last_seen }
    }

    /// Fetch the key and require full access.
    ///
    /// # Errors
    ///
    /// - [`Error::AccountNotFound`] if the account does not exist
    /// - [`Error::AccessKeyNotFound`] if the key is not registered on it
    /// - [`Error::InsufficientPermission`] if it is a function-call key
    pub async fn resolve(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<AccessKeyInfo, Error> {
        let view = self.rpc.view_access_key(account_id, public_key).await?;

        debug!(
            account_id = %account_id,
            public_key = %public_key,
            nonce = view.nonce,
            block_height = view.block_height,
            "resolved access key"
        );

        let info = AccessKeyInfo {
            nonce: view.nonce,
            block_hash: view.block_hash,
            block_height: view.block_height,
            permission: view.permission,
        };
        self.last_seen.observe(info.block());

        if !info.permission.is_full_access() {
            return Err(Error::InsufficientPermission {
                account_id: account_id.clone(),
                public_key: *public_key,
                permission: info.permission.describe(),
            });
        }

        Ok(info)
    }
}
