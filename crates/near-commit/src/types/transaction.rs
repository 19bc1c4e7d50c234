//! Transaction types.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::codec::{self, Schema, Value, WireFormat};
use crate::error::EncodingError;

use super::action::account_id;
use super::{AccountId, Action, CryptoHash, KeyPair, PublicKey, Signature};

/// An unsigned transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// The account that signs and pays for the transaction.
    pub signer_id: AccountId,
    /// The public key of the signer.
    pub public_key: PublicKey,
    /// Must be greater than the access key's current nonce.
    pub nonce: u64,
    pub receiver_id: AccountId,
    /// A recent block hash; the transaction expires relative to it.
    pub block_hash: CryptoHash,
    pub actions: Vec<Action>,
}

impl Transaction {
    pub fn new(
        signer_id: AccountId,
        public_key: PublicKey,
        nonce: u64,
        receiver_id: AccountId,
        block_hash: CryptoHash,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            signer_id,
            public_key,
            nonce,
            receiver_id,
            block_hash,
            actions,
        }
    }

    /// The canonical encoding of this transaction.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        codec::to_vec(self)
    }

    /// SHA-256 of the canonical encoding. This is the signed message and
    /// the transaction hash reported by the chain.
    pub fn get_hash(&self) -> Result<CryptoHash, EncodingError> {
        Ok(CryptoHash::hash(&self.to_bytes()?))
    }

    /// Get the hash together with the encoded size.
    pub fn get_hash_and_size(&self) -> Result<(CryptoHash, usize), EncodingError> {
        let bytes = self.to_bytes()?;
        Ok((CryptoHash::hash(&bytes), bytes.len()))
    }

    /// Sign this transaction with a key pair.
    pub fn sign(self, key_pair: &KeyPair) -> Result<SignedTransaction, EncodingError> {
        let hash = self.get_hash()?;
        let signature = key_pair.sign(hash.as_bytes());
        Ok(SignedTransaction {
            transaction: self,
            signature,
        })
    }
}

/// A signed transaction ready to be sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
}

impl SignedTransaction {
    /// Get the hash of the signed transaction (transaction hash).
    pub fn get_hash(&self) -> Result<CryptoHash, EncodingError> {
        self.transaction.get_hash()
    }

    /// Check the signature against the transaction's own public key.
    pub fn verify(&self) -> bool {
        self.get_hash().is_ok_and(|hash| {
            self.signature
                .verify(hash.as_bytes(), &self.transaction.public_key)
        })
    }

    /// Serialize to bytes for RPC submission.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodingError> {
        codec::to_vec(self)
    }

    /// Serialize to base64 for RPC submission.
    pub fn to_base64(&self) -> Result<String, EncodingError> {
        Ok(STANDARD.encode(self.to_bytes()?))
    }

    /// Deserialize from bytes produced by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EncodingError> {
        codec::from_slice(bytes)
    }

    /// Deserialize from base64 produced by [`to_base64`](Self::to_base64).
    pub fn from_base64(s: &str) -> Result<Self, EncodingError> {
        let bytes = STANDARD
            .decode(s)
            .map_err(|e| EncodingError::Base64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

// ============================================================================
// Wire format
// ============================================================================

impl WireFormat for Transaction {
    fn schema() -> &'static Schema {
        &codec::wire::TRANSACTION
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![
            Value::Str(self.signer_id.to_string()),
            self.public_key.to_value(),
            Value::U64(self.nonce),
            Value::Str(self.receiver_id.to_string()),
            Value::Bytes(self.block_hash.as_bytes().to_vec()),
            Value::Seq(self.actions.iter().map(WireFormat::to_value).collect()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let [signer_id, public_key, nonce, receiver_id, block_hash, actions] =
            value.into_fields()?;
        Ok(Self {
            signer_id: account_id(signer_id)?,
            public_key: PublicKey::from_value(public_key)?,
            nonce: nonce.into_u64()?,
            receiver_id: account_id(receiver_id)?,
            block_hash: CryptoHash::from_bytes(block_hash.into_array()?),
            actions: actions
                .into_seq()?
                .into_iter()
                .map(Action::from_value)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl WireFormat for SignedTransaction {
    fn schema() -> &'static Schema {
        &codec::wire::SIGNED_TRANSACTION
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![self.transaction.to_value(), self.signature.to_value()])
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let [transaction, signature] = value.into_fields()?;
        Ok(Self {
            transaction: Transaction::from_value(transaction)?,
            signature: Signature::from_value(signature)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gas, NearToken};

    fn sample(key_pair: &KeyPair) -> Transaction {
        Transaction::new(
            "alice.testnet".parse().unwrap(),
            *key_pair.public_key(),
            7,
            "bob.testnet".parse().unwrap(),
            CryptoHash::hash(b"block"),
            vec![
                Action::transfer(NearToken::from_near(1)),
                Action::function_call("ping", b"{}".to_vec(), Gas::DEFAULT, NearToken::ZERO),
            ],
        )
    }

    #[test]
    fn test_transaction_hash() {
        let key_pair = KeyPair::generate();
        let tx = sample(&key_pair);
        let hash = tx.get_hash().unwrap();
        assert!(!hash.is_zero());
        assert_eq!(hash, CryptoHash::hash(&tx.to_bytes().unwrap()));
    }

    #[test]
    fn test_transaction_layout_prefix() {
        let key_pair = KeyPair::generate();
        let bytes = sample(&key_pair).to_bytes().unwrap();
        assert_eq!(&bytes[..4], &13u32.to_le_bytes());
        assert_eq!(&bytes[4..17], b"alice.testnet");
        // key curve tag then 32 key bytes
        assert_eq!(bytes[17], 0);
        assert_eq!(&bytes[18..50], key_pair.public_key().as_bytes());
        assert_eq!(&bytes[50..58], &7u64.to_le_bytes());
    }

    #[test]
    fn test_sign_and_verify() {
        let key_pair = KeyPair::generate();
        let signed = sample(&key_pair).sign(&key_pair).unwrap();
        assert!(signed.verify());

        let mut tampered = signed.clone();
        tampered.transaction.nonce += 1;
        assert!(!tampered.verify());
    }

    #[test]
    fn test_signing_is_deterministic() {
        let key_pair = KeyPair::generate();
        let a = sample(&key_pair).sign(&key_pair).unwrap();
        let b = sample(&key_pair).sign(&key_pair).unwrap();
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn test_signed_round_trip() {
        let key_pair = KeyPair::generate();
        let signed = sample(&key_pair).sign(&key_pair).unwrap();
        let encoded = signed.to_base64().unwrap();
        let decoded = SignedTransaction::from_base64(&encoded).unwrap();
        assert_eq!(decoded, signed);

        let bytes = signed.to_bytes().unwrap();
        // signature: curve tag + 64 bytes at the end
        assert_eq!(bytes[bytes.len() - 65], 0);
        assert_eq!(&bytes[bytes.len() - 64..], signed.signature.as_bytes());
    }

    #[test]
    fn test_decode_rejects_truncation_and_garbage() {
        let key_pair = KeyPair::generate();
        let bytes = sample(&key_pair).sign(&key_pair).unwrap().to_bytes().unwrap();
        assert!(matches!(
            SignedTransaction::from_bytes(&bytes[..bytes.len() - 1]),
            Err(EncodingError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            SignedTransaction::from_base64("not base64!"),
            Err(EncodingError::Base64(_))
        ));
    }
}
