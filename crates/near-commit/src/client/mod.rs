//! Client for submitting transactions and reading state.
//!
//! [`Near`] ties the pipeline together:
//! [`AccessKeyResolver`] → [`TransactionBuilder`] → [`SigningKey`] →
//! [`RpcClient::broadcast_commit`] → [`ReceiptInterpreter`].

mod access_key;
mod builder;
mod near;
mod receipt;
mod rpc;
mod session;
mod signer;
mod transport;

pub use access_key::{AccessKeyInfo, AccessKeyResolver, LastSeenBlock};
pub use builder::TransactionBuilder;
pub use near::{Near, NearBuilder};
pub use receipt::{ReceiptInterpreter, describe_failure};
pub use rpc::{RetryConfig, RpcClient};
pub use session::{CallDefinition, ContractSession, DEFAULT_CALL_GAS, ViewDefinition};
pub use signer::{EnvSigner, FileSigner, InMemorySigner, Signer, SigningKey};
pub use transport::{HttpTransport, Transport, TransportFuture};
