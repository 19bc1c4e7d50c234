//! The main Near client.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use super::access_key::{AccessKeyInfo, AccessKeyResolver, LastSeenBlock};
use super::builder::TransactionBuilder;
use super::receipt::ReceiptInterpreter;
use super::rpc::{RetryConfig, RpcClient};
use super::session::ContractSession;
use super::signer::{EnvSigner, InMemorySigner, Signer};
use super::transport::{HttpTransport, Transport};
use crate::error::{EncodingError, Error};
use crate::types::{
    AccountId, AccountView, Action, BlockMarker, BlockReference, BlockView, DecodedValue,
    EpochValidatorInfo, FinalExecutionOutcome, Finality, Gas, NearToken, Network, PublicKey,
    StatusResponse,
};

/// The main client for submitting transactions to NEAR and reading state.
///
/// Built explicitly through [`NearBuilder`]; all configuration lives in the
/// value. Clones share the RPC client and the last-seen block marker.
///
/// # Concurrency
///
/// Every write resolves the access key nonce fresh and signs with
/// `nonce + 1`. Two writes in flight for the same (account, key) pair can
/// read the same nonce, and the network rejects one of them. Callers must
/// serialize writes per signing key, for example with a single task that
/// owns the client or a `tokio::sync::Mutex` around it.
///
/// # Cancellation
///
/// [`send_actions`](Self::send_actions) waits until the transaction and all
/// of its receipts have executed. Dropping the future stops the wait, not
/// the transaction: once the node accepted it, it runs to completion.
///
/// # Example
///
/// ```rust,no_run
/// use near_commit::*;
///
/// # async fn example() -> Result<(), near_commit::Error> {
/// let near = Near::testnet()
///     .credentials("ed25519:...", "alice.testnet")?
///     .build();
///
/// near.transfer("bob.testnet", NearToken::near(1)).await?;
///
/// let count = near.view("counter.testnet", "get_num", &serde_json::json!({})).await?;
/// println!("count = {}", count);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Near {
    rpc: Arc<RpcClient>,
    signer: Option<Arc<dyn Signer>>,
    network: Network,
    last_seen: LastSeenBlock,
}

impl Near {
    /// Create a builder for mainnet.
    pub fn mainnet() -> NearBuilder {
        NearBuilder::new(Network::Mainnet)
    }

    /// Create a builder for testnet.
    pub fn testnet() -> NearBuilder {
        NearBuilder::new(Network::Testnet)
    }

    /// Create a builder with a custom RPC URL.
    pub fn custom(rpc_url: impl Into<String>) -> NearBuilder {
        NearBuilder::new(Network::Custom(rpc_url.into()))
    }

    /// Create a builder for any network.
    pub fn with_network(network: Network) -> NearBuilder {
        NearBuilder::new(network)
    }

    /// Create a configured client from environment variables.
    ///
    /// - `NEAR_NETWORK` (optional): `mainnet`, `testnet`, `betanet`, `local`
    ///   or an RPC URL. Defaults to testnet.
    /// - `NEAR_ACCOUNT_ID` and `NEAR_PRIVATE_KEY` (optional): when both are
    ///   set the client can sign; when neither is, it is read-only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if only one of the credential variables is
    /// set or the network is not recognized, and a key error if the private
    /// key is malformed.
    pub fn from_env() -> Result<Near, Error> {
        Self::from_vars(
            std::env::var("NEAR_NETWORK").ok(),
            std::env::var("NEAR_ACCOUNT_ID").ok(),
            std::env::var("NEAR_PRIVATE_KEY").ok(),
        )
    }

    fn from_vars(
        network: Option<String>,
        account_id: Option<String>,
        private_key: Option<String>,
    ) -> Result<Near, Error> {
        let network = match network.as_deref() {
            Some(value) => value.parse::<Network>().map_err(Error::Config)?,
            None => Network::Testnet,
        };
        let mut builder = Near::with_network(network);

        let signer = EnvSigner::from_values(
            ("NEAR_ACCOUNT_ID", account_id),
            ("NEAR_PRIVATE_KEY", private_key),
        )?;
        if let Some(signer) = signer {
            builder = builder.signer(signer);
        }

        Ok(builder.build())
    }

    /// Get the underlying RPC client.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// The RPC endpoint, for display.
    pub fn rpc_url(&self) -> &str {
        self.rpc.endpoint()
    }

    /// Get the signer's account ID, if a signer is configured.
    pub fn account_id(&self) -> Option<&AccountId> {
        self.signer.as_ref().map(|s| s.account_id())
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The highest block any read through this client has observed.
    ///
    /// Advisory: writes always resolve a fresh block hash.
    pub fn last_seen_block(&self) -> Option<BlockMarker> {
        self.last_seen.get()
    }

    /// Bind this client to a contract.
    pub fn contract(&self, contract_id: impl AsRef<str>) -> Result<ContractSession, Error> {
        Ok(ContractSession::new(
            self.clone(),
            contract_id.as_ref().parse()?,
        ))
    }

    fn signer(&self) -> Result<&Arc<dyn Signer>, Error> {
        self.signer.as_ref().ok_or(Error::NoSigner)
    }

    fn resolver(&self) -> AccessKeyResolver {
        AccessKeyResolver::new(self.rpc.clone(), self.last_seen.clone())
    }

    // ========================================================================
    // Read Operations
    // ========================================================================

    /// Call a view function and return its JSON result.
    ///
    /// An empty or `null` result is returned as the empty string.
    pub async fn view<A: Serialize + ?Sized>(
        &self,
        contract_id: impl AsRef<str>,
        method: &str,
        args: &A,
    ) -> Result<serde_json::Value, Error> {
        let value = self.view_raw(contract_id, method, args).await?;
        Ok(view_sentinel(value))
    }

    /// Call a view function and deserialize its result.
    ///
    /// Unlike [`view`](Self::view), an empty or `null` result is handed to
    /// `T` as JSON `null`, so `Option<T>` reads it as `None`.
    pub async fn view_as<T: DeserializeOwned, A: Serialize + ?Sized>(
        &self,
        contract_id: impl AsRef<str>,
        method: &str,
        args: &A,
    ) -> Result<T, Error> {
        let value = self.view_raw(contract_id, method, args).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn view_raw<A: Serialize + ?Sized>(
        &self,
        contract_id: impl AsRef<str>,
        method: &str,
        args: &A,
    ) -> Result<serde_json::Value, Error> {
        let contract_id: AccountId = contract_id.as_ref().parse()?;
        let args = serde_json::to_vec(args)?;

        let result = self.rpc.view_call(&contract_id, method, &args).await?;
        self.last_seen.observe(BlockMarker {
            height: result.block_height,
            hash: result.block_hash,
        });

        decode_view_bytes(&result.result)
    }

    /// Get account state.
    pub async fn account(&self, account_id: impl AsRef<str>) -> Result<AccountView, Error> {
        let account_id: AccountId = account_id.as_ref().parse()?;
        let view = self.rpc.view_account(&account_id).await?;
        self.last_seen.observe(BlockMarker {
            height: view.block_height,
            hash: view.block_hash,
        });
        Ok(view)
    }

    /// Resolve a full-access key the way a write would.
    pub async fn access_key(
        &self,
        account_id: impl AsRef<str>,
        public_key: &PublicKey,
    ) -> Result<AccessKeyInfo, Error> {
        let account_id: AccountId = account_id.as_ref().parse()?;
        self.resolver().resolve(&account_id, public_key).await
    }

    pub async fn block(&self, block: impl Into<BlockReference>) -> Result<BlockView, Error> {
        let block = self.rpc.block(block.into()).await?;
        self.last_seen.observe(block.marker());
        Ok(block)
    }

    /// The latest block at optimistic finality.
    pub async fn latest_block(&self) -> Result<BlockView, Error> {
        self.block(Finality::Optimistic).await
    }

    pub async fn status(&self) -> Result<StatusResponse, Error> {
        Ok(self.rpc.status().await?)
    }

    pub async fn validators(&self) -> Result<EpochValidatorInfo, Error> {
        Ok(self.rpc.validators().await?)
    }

    pub async fn genesis_config(&self) -> Result<serde_json::Value, Error> {
        Ok(self.rpc.genesis_config().await?)
    }

    // ========================================================================
    // Write Operations
    // ========================================================================

    /// Transfer NEAR to another account.
    pub async fn transfer(&self, receiver: impl AsRef<str>, amount: NearToken) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::InvalidTransaction(
                "transfer amount must be greater than zero".to_string(),
            ));
        }
        self.send_actions(receiver, vec![Action::transfer(amount)])
            .await
            .map(drop)
    }

    /// Call a contract method and decode its return value.
    pub async fn call<A: Serialize + ?Sized>(
        &self,
        contract_id: impl AsRef<str>,
        method: &str,
        args: &A,
        gas: Gas,
        deposit: NearToken,
    ) -> Result<DecodedValue, Error> {
        let args = serde_json::to_vec(args)?;
        self.send_actions(
            contract_id,
            vec![Action::function_call(method, args, gas, deposit)],
        )
        .await
    }

    /// Delete the signer's account, sending its balance to `beneficiary`.
    pub async fn delete_account(&self, beneficiary: impl AsRef<str>) -> Result<(), Error> {
        let beneficiary_id: AccountId = beneficiary.as_ref().parse()?;
        let account_id = self.signer()?.account_id().clone();
        self.send_actions(account_id, vec![Action::delete_account(beneficiary_id)])
            .await
            .map(drop)
    }

    /// Sign and commit a transaction, then interpret its outcome.
    ///
    /// Resolves the signer's access key, builds the transaction with the
    /// next nonce, signs it and waits for it to commit. Callers must not run
    /// two of these concurrently for the same signing key.
    pub async fn send_actions(
        &self,
        receiver_id: impl AsRef<str>,
        actions: Vec<Action>,
    ) -> Result<DecodedValue, Error> {
        let outcome = self.commit(receiver_id, actions).await?;
        ReceiptInterpreter::interpret(&outcome)
    }

    /// Sign and commit a transaction, returning the raw outcome.
    ///
    /// The outcome may describe an on-chain failure; use
    /// [`ReceiptInterpreter::interpret`] to turn it into a result.
    pub async fn commit(
        &self,
        receiver_id: impl AsRef<str>,
        actions: Vec<Action>,
    ) -> Result<FinalExecutionOutcome, Error> {
        let signer = self.signer()?;
        let receiver_id: AccountId = receiver_id.as_ref().parse()?;
        let signer_id = signer.account_id().clone();
        let key = signer.key();

        let access_key = self.resolver().resolve(&signer_id, key.public_key()).await?;
        let transaction = TransactionBuilder::build(
            signer_id,
            *key.public_key(),
            receiver_id,
            access_key.next_nonce()?,
            actions,
            access_key.block_hash,
        )?;

        let signed = key.sign_transaction(transaction).await?;
        let tx_hash = signed.get_hash()?;
        info!(
            signer_id = %signed.transaction.signer_id,
            receiver_id = %signed.transaction.receiver_id,
            nonce = signed.transaction.nonce,
            tx_hash = %tx_hash,
            "broadcasting transaction"
        );

        let outcome = self.rpc.broadcast_commit(&signed.to_base64()?).await?;
        info!(
            tx_hash = %tx_hash,
            failed = outcome.is_failure(),
            gas_burnt = %outcome.total_gas_used(),
            "transaction committed"
        );
        Ok(outcome)
    }
}

/// Decode view-call bytes as JSON. Empty bytes decode to `null`.
fn decode_view_bytes(bytes: &[u8]) -> Result<serde_json::Value, Error> {
    if bytes.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    let text = std::str::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8)?;
    let value = serde_json::from_str(text).map_err(|e| EncodingError::Json(e.to_string()))?;
    Ok(value)
}

/// The untyped view result: JSON `null` becomes `""`.
fn view_sentinel(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Null => serde_json::Value::String(String::new()),
        other => other,
    }
}

impl std::fmt::Debug for Near {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Near")
            .field("rpc", &self.rpc)
            .field("network", &self.network)
            .field("account_id", &self.account_id())
            .finish()
    }
}

/// Builder for creating a [`Near`] client.
///
/// # Example
///
/// ```rust,ignore
/// use near_commit::*;
///
/// // Read-only client
/// let near = Near::testnet().build();
///
/// // Client with credentials and a request timeout
/// let near = Near::testnet()
///     .credentials("ed25519:...", "alice.testnet")?
///     .timeout(std::time::Duration::from_secs(60))?
///     .build();
/// ```
pub struct NearBuilder {
    network: Network,
    signer: Option<Arc<dyn Signer>>,
    retry_config: RetryConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl NearBuilder {
    fn new(network: Network) -> Self {
        Self {
            network,
            signer: None,
            retry_config: RetryConfig::default(),
            transport: None,
        }
    }

    /// Set the signer for transactions.
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Set up signing using a private key string and account ID.
    pub fn credentials(
        mut self,
        private_key: impl AsRef<str>,
        account_id: impl AsRef<str>,
    ) -> Result<Self, Error> {
        let signer = InMemorySigner::new(account_id, private_key)?;
        self.signer = Some(Arc::new(signer));
        Ok(self)
    }

    /// Sign with the near-cli credentials record at
    /// `~/.near-credentials/{network}/{account_id}.json`.
    #[cfg(feature = "file-signer")]
    pub fn credentials_file(
        mut self,
        network: impl AsRef<str>,
        account_id: impl AsRef<str>,
    ) -> Result<Self, Error> {
        let signer = super::signer::FileSigner::new(network, account_id)?;
        self.signer = Some(Arc::new(signer));
        Ok(self)
    }

    /// Set the retry configuration for reads.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Fail any request that takes longer than `timeout`.
    ///
    /// Applies to broadcasts too, which otherwise wait for as long as the
    /// node takes to commit. A timed-out broadcast may still execute.
    pub fn timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        let transport = HttpTransport::with_timeout(self.network.rpc_url(), timeout)?;
        self.transport = Some(Arc::new(transport));
        Ok(self)
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client.
    pub fn build(self) -> Near {
        let rpc = match self.transport {
            Some(transport) => RpcClient::with_transport(transport, self.retry_config),
            None => RpcClient::with_retry_config(self.network.rpc_url(), self.retry_config),
        };
        Near {
            rpc: Arc::new(rpc),
            signer: self.signer,
            network: self.network,
            last_seen: LastSeenBlock::new(),
        }
    }
}

impl From<NearBuilder> for Near {
    fn from(builder: NearBuilder) -> Self {
        builder.build()
    }
}
