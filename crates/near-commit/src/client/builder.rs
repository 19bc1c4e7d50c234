//! Transaction assembly.

use crate::error::Error;
use crate::types::{AccountId, Action, CryptoHash, PublicKey, Transaction};

/// Assembles unsigned transactions.
///
/// Pure: no I/O, no nonce bookkeeping. The caller supplies the nonce,
/// normally [`AccessKeyInfo::next_nonce`](super::AccessKeyInfo::next_nonce).
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// Build a transaction.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidTransaction`] for an empty action list or a zero
    /// nonce. Nonce 0 is never valid since access keys start above it.
    pub fn build(
        signer_id: AccountId,
        public_key: PublicKey,
        receiver_id: AccountId,
        nonce: u64,
        actions: Vec<Action>,
        block_hash: CryptoHash,
    ) -> Result<Transaction, Error> {
        if actions.is_empty() {
            return Err(Error::InvalidTransaction(
                "transaction must contain at least one action".to_string(),
            ));
        }
        if nonce == 0 {
            return Err(Error::InvalidTransaction(
                "transaction nonce must be greater than zero".to_string(),
            ));
        }

        Ok(Transaction::new(
            signer_id,
            public_key,
            nonce,
            receiver_id,
            block_hash,
            actions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gas, NearToken, SecretKey};

    fn ids() -> (AccountId, AccountId) {
        ("alice.testnet".parse().unwrap(), "counter.testnet".parse().unwrap())
    }

    #[test]
    fn test_build_keeps_fields_in_order() {
        let (signer, receiver) = ids();
        let pk = SecretKey::generate_ed25519().public_key();
        let block_hash = CryptoHash::hash(b"recent");
        let actions = vec![Action::function_call(
            "increment",
            b"{}".to_vec(),
            Gas::DEFAULT,
            NearToken::ZERO,
        )];

        let tx = TransactionBuilder::build(
            signer.clone(),
            pk,
            receiver.clone(),
            8,
            actions.clone(),
            block_hash,
        )
        .unwrap();

        assert_eq!(tx.signer_id, signer);
        assert_eq!(tx.public_key, pk);
        assert_eq!(tx.nonce, 8);
        assert_eq!(tx.receiver_id, receiver);
        assert_eq!(tx.block_hash, block_hash);
        assert_eq!(tx.actions, actions);
    }

    #[test]
    fn test_build_rejects_empty_actions() {
        let (signer, receiver) = ids();
        let pk = SecretKey::generate_ed25519().public_key();
        let err = TransactionBuilder::build(signer, pk, receiver, 1, vec![], CryptoHash::ZERO)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransaction(_)));
    }

    #[test]
    fn test_build_rejects_zero_nonce() {
        let (signer, receiver) = ids();
        let pk = SecretKey::generate_ed25519().public_key();
        let err = TransactionBuilder::build(
            signer,
            pk,
            receiver,
            0,
            vec![Action::transfer(NearToken::ONE_YOCTO)],
            CryptoHash::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTransaction(_)));
    }
}
