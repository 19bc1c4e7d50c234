//! Signer trait and implementations.
//!
//! A `Signer` knows which account it signs for and hands out a
//! [`SigningKey`] that pairs the public key with the capability to sign.
//!
//! # Implementations
//!
//! - [`InMemorySigner`] - Single key stored in memory
//! - [`FileSigner`] - Key loaded from a credentials record on disk
//! - [`EnvSigner`] - Key loaded from environment variables
//!
//! # Nonces
//!
//! Signers never fetch or track nonces. The pipeline reads the access key
//! nonce fresh for every transaction, so two transactions signed
//! concurrently with the same (account, key) pair can be assigned the same
//! nonce and one of them will be rejected. Callers must serialize signing
//! per (account, key).
//!
//! # Example
//!
//! ```rust,no_run
//! use near_commit::{Near, InMemorySigner, NearToken};
//!
//! # async fn example() -> Result<(), near_commit::Error> {
//! let signer = InMemorySigner::new("alice.testnet", "ed25519:...")?;
//!
//! let near = Near::testnet().signer(signer).build();
//! near.transfer("bob.testnet", NearToken::near(1)).await?;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{CredentialsError, Error, ParseKeyError, SignerError};
use crate::types::{AccountId, PublicKey, SecretKey, Signature, SignedTransaction, Transaction};

// ============================================================================
// Signer Trait
// ============================================================================

/// Trait for signing transactions.
///
/// Implementations must be safe to share across tasks, but sharing one
/// signer does not make concurrent submissions safe: callers must serialize
/// signing per (account, key) pair, otherwise transactions race on the
/// access key nonce.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use near_commit::{Signer, SigningKey, AccountId, SecretKey};
///
/// struct MyCustomSigner {
///     account_id: AccountId,
///     secret_key: SecretKey,
/// }
///
/// impl Signer for MyCustomSigner {
///     fn account_id(&self) -> &AccountId {
///         &self.account_id
///     }
///
///     fn key(&self) -> SigningKey {
///         SigningKey::new(self.secret_key.clone())
///     }
/// }
/// ```
pub trait Signer: Send + Sync {
    /// The account this signer signs for.
    fn account_id(&self) -> &AccountId;

    /// Get a key for signing.
    fn key(&self) -> SigningKey;
}

impl Signer for Arc<dyn Signer> {
    fn account_id(&self) -> &AccountId {
        (**self).account_id()
    }

    fn key(&self) -> SigningKey {
        (**self).key()
    }
}

// ============================================================================
// SigningKey
// ============================================================================

/// A key that can sign messages.
///
/// Bundles a public key with a signing backend. In-memory keys sign
/// immediately; other backends (hardware wallets, KMS) may suspend.
pub struct SigningKey {
    public_key: PublicKey,
    backend: Arc<dyn SigningBackend>,
}

impl SigningKey {
    /// Create a new signing key from a secret key.
    pub fn new(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            public_key,
            backend: Arc::new(SecretKeyBackend { secret_key }),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Sign a raw message.
    pub async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError> {
        self.backend.sign(message).await
    }

    /// Sign a transaction.
    ///
    /// The message is the SHA-256 digest of the transaction's canonical
    /// encoding. Fails with [`Error::InvalidKeyMaterial`] when the
    /// transaction names a different public key than this one.
    pub async fn sign_transaction(&self, transaction: Transaction) -> Result<SignedTransaction, Error> {
        if transaction.public_key != self.public_key {
            return Err(Error::InvalidKeyMaterial(ParseKeyError::KeyMismatch {
                expected: transaction.public_key.to_string(),
                actual: self.public_key.to_string(),
            }));
        }

        let hash = transaction.get_hash()?;
        let signature = self.sign(hash.as_bytes()).await?;
        Ok(SignedTransaction {
            transaction,
            signature,
        })
    }
}

impl Clone for SigningKey {
    fn clone(&self) -> Self {
        Self {
            public_key: self.public_key,
            backend: self.backend.clone(),
        }
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("public_key", &self.public_key)
            .finish()
    }
}

// ============================================================================
// SigningBackend (internal)
// ============================================================================

trait SigningBackend: Send + Sync {
    fn sign(
        &self,
        message: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<Signature, SignerError>> + Send + '_>>;
}

struct SecretKeyBackend {
    secret_key: SecretKey,
}

impl SigningBackend for SecretKeyBackend {
    fn sign(
        &self,
        message: &[u8],
    ) -> Pin<Box<dyn Future<Output = Result<Signature, SignerError>> + Send + '_>> {
        let sig = self.secret_key.sign(message);
        Box::pin(async move { Ok(sig) })
    }
}

// ============================================================================
// InMemorySigner
// ============================================================================

/// A signer with a single key stored in memory.
///
/// # Example
///
/// ```rust
/// use near_commit::{InMemorySigner, SecretKey};
///
/// let key = SecretKey::generate_ed25519();
/// let signer = InMemorySigner::new("alice.testnet", key.to_string()).unwrap();
/// ```
#[derive(Clone)]
pub struct InMemorySigner {
    account_id: AccountId,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl InMemorySigner {
    /// Create a new signer with an account ID and secret key.
    ///
    /// # Errors
    ///
    /// Returns an error if the account ID or secret key cannot be parsed.
    pub fn new(account_id: impl AsRef<str>, secret_key: impl AsRef<str>) -> Result<Self, Error> {
        let account_id: AccountId = account_id.as_ref().parse()?;
        let secret_key: SecretKey = secret_key.as_ref().parse()?;
        Ok(Self::from_secret_key(account_id, secret_key))
    }

    /// Create a signer from a SecretKey directly.
    pub fn from_secret_key(account_id: AccountId, secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            account_id,
            secret_key,
            public_key,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl std::fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySigner")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key)
            .finish()
    }
}

impl Signer for InMemorySigner {
    fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn key(&self) -> SigningKey {
        SigningKey::new(self.secret_key.clone())
    }
}

// ============================================================================
// FileSigner
// ============================================================================

/// A signer that loads its key from a near-cli credentials record.
///
/// The record is `{"account_id", "public_key", "private_key"}`;
/// `secret_key` is accepted in place of `private_key`. When `public_key` is
/// present it must match the key derived from the private key.
///
/// # Example
///
/// ```rust,no_run
/// use near_commit::FileSigner;
///
/// // Load from ~/.near-credentials/testnet/alice.testnet.json
/// let signer = FileSigner::new("testnet", "alice.testnet").unwrap();
/// ```
#[derive(Clone)]
pub struct FileSigner {
    inner: InMemorySigner,
}

/// Credential file format compatible with near-cli.
#[derive(Deserialize)]
struct CredentialFile {
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
    #[serde(alias = "secret_key")]
    private_key: String,
}

impl FileSigner {
    /// Load credentials from `~/.near-credentials/{network}/{account_id}.json`.
    #[cfg(feature = "file-signer")]
    pub fn new(network: impl AsRef<str>, account_id: impl AsRef<str>) -> Result<Self, Error> {
        let home = dirs::home_dir().ok_or_else(|| {
            CredentialsError::PathError("Could not determine home directory".to_string())
        })?;
        let path = home
            .join(".near-credentials")
            .join(network.as_ref())
            .join(format!("{}.json", account_id.as_ref()));

        Self::from_file(&path, account_id)
    }

    /// Load credentials from a specific file path.
    ///
    /// `account_id` wins over the record's own `account_id`, which is only
    /// checked for validity.
    pub fn from_file(path: impl AsRef<Path>, account_id: impl AsRef<str>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CredentialsError::NotFound(path.display().to_string()).into());
        }
        let content = std::fs::read_to_string(path).map_err(CredentialsError::Io)?;
        Self::from_json(&content, account_id)
    }

    /// Load credentials from the JSON text of a credentials record.
    pub fn from_json(content: &str, account_id: impl AsRef<str>) -> Result<Self, Error> {
        let cred: CredentialFile =
            serde_json::from_str(content).map_err(CredentialsError::Json)?;

        if let Some(recorded) = &cred.account_id {
            recorded.parse::<AccountId>().map_err(|e| {
                CredentialsError::InvalidFormat(format!("account_id: {}", e))
            })?;
        }

        let inner = InMemorySigner::new(account_id, &cred.private_key)?;

        if let Some(recorded) = &cred.public_key {
            let recorded: PublicKey = recorded.parse()?;
            if &recorded != inner.public_key() {
                return Err(Error::InvalidKeyMaterial(ParseKeyError::KeyMismatch {
                    expected: recorded.to_string(),
                    actual: inner.public_key().to_string(),
                }));
            }
        }

        Ok(Self { inner })
    }

    pub fn public_key(&self) -> &PublicKey {
        self.inner.public_key()
    }
}

impl std::fmt::Debug for FileSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSigner")
            .field("account_id", &self.inner.account_id)
            .field("public_key", &self.inner.public_key)
            .finish()
    }
}

impl Signer for FileSigner {
    fn account_id(&self) -> &AccountId {
        self.inner.account_id()
    }

    fn key(&self) -> SigningKey {
        self.inner.key()
    }
}

// ============================================================================
// EnvSigner
// ============================================================================

/// A signer that loads credentials from environment variables.
///
/// By default, reads `NEAR_ACCOUNT_ID` and `NEAR_PRIVATE_KEY`.
#[derive(Clone)]
pub struct EnvSigner {
    inner: InMemorySigner,
}

impl EnvSigner {
    /// Load from `NEAR_ACCOUNT_ID` and `NEAR_PRIVATE_KEY`.
    pub fn new() -> Result<Self, Error> {
        Self::from_env_vars("NEAR_ACCOUNT_ID", "NEAR_PRIVATE_KEY")
    }

    /// Load from custom environment variable names.
    ///
    /// Both variables must be set.
    pub fn from_env_vars(account_var: &str, key_var: &str) -> Result<Self, Error> {
        Self::try_from_env_vars(account_var, key_var)?.ok_or_else(|| {
            Error::Config(format!(
                "Environment variables {} and {} not set",
                account_var, key_var
            ))
        })
    }

    /// Load if configured: `Ok(None)` when neither variable is set, a
    /// [`Error::Config`] when only one of them is.
    pub fn try_from_env_vars(account_var: &str, key_var: &str) -> Result<Option<Self>, Error> {
        Self::from_values(
            (account_var, std::env::var(account_var).ok()),
            (key_var, std::env::var(key_var).ok()),
        )
    }

    /// Build from already-read `(name, value)` pairs.
    pub(crate) fn from_values(
        account: (&str, Option<String>),
        key: (&str, Option<String>),
    ) -> Result<Option<Self>, Error> {
        match (account, key) {
            ((_, Some(account_id)), (_, Some(private_key))) => {
                let inner = InMemorySigner::new(&account_id, &private_key)?;
                Ok(Some(Self { inner }))
            }
            ((account_var, Some(_)), (key_var, None)) => Err(Error::Config(format!(
                "{} is set but {} is missing",
                account_var, key_var
            ))),
            ((account_var, None), (key_var, Some(_))) => Err(Error::Config(format!(
                "{} is set but {} is missing",
                key_var, account_var
            ))),
            ((_, None), (_, None)) => Ok(None),
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        self.inner.public_key()
    }
}

impl std::fmt::Debug for EnvSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvSigner")
            .field("account_id", &self.inner.account_id)
            .field("public_key", &self.inner.public_key)
            .finish()
    }
}

impl Signer for EnvSigner {
    fn account_id(&self) -> &AccountId {
        self.inner.account_id()
    }

    fn key(&self) -> SigningKey {
        self.inner.key()
    }
}
