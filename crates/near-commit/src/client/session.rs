//! Contract sessions and call definitions.
//!
//! A [`ContractSession`] pairs a [`Near`] client with one contract account.
//! Contract-specific methods are not modelled as types; instead, free
//! functions (see [`tokens::ft`](crate::tokens::ft)) build
//! [`CallDefinition`] and [`ViewDefinition`] values that any session can
//! run.
//!
//! # Example
//!
//! ```rust,no_run
//! use near_commit::*;
//! use near_commit::tokens::ft;
//!
//! # async fn example() -> Result<(), near_commit::Error> {
//! let near = Near::testnet()
//!     .credentials("ed25519:...", "alice.testnet")?
//!     .build();
//! let token = near.contract("token.testnet")?;
//!
//! let bob: AccountId = "bob.testnet".parse()?;
//! let balance: String = token.read_as(&ft::ft_balance_of(&bob)).await?;
//! token.execute(&ft::ft_transfer(&bob, 5_000u128.into(), None)).await?;
//! # let _ = balance;
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::near::Near;
use crate::error::Error;
use crate::types::{AccountId, DecodedValue, Gas, NearToken};

/// Gas attached to a call when the definition does not say otherwise.
pub const DEFAULT_CALL_GAS: Gas = Gas::from_tgas(200);

/// A state-changing contract call: method, JSON arguments, gas and deposit.
#[derive(Clone, Debug, PartialEq)]
pub struct CallDefinition {
    pub method_name: String,
    pub args: serde_json::Value,
    pub gas: Gas,
    pub deposit: NearToken,
}

impl CallDefinition {
    /// A call with [`DEFAULT_CALL_GAS`] and no deposit.
    pub fn new(method_name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            method_name: method_name.into(),
            args,
            gas: DEFAULT_CALL_GAS,
            deposit: NearToken::ZERO,
        }
    }

    pub fn gas(mut self, gas: Gas) -> Self {
        self.gas = gas;
        self
    }

    pub fn deposit(mut self, deposit: NearToken) -> Self {
        self.deposit = deposit;
        self
    }
}

/// A read-only contract call.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewDefinition {
    pub method_name: String,
    pub args: serde_json::Value,
}

impl ViewDefinition {
    pub fn new(method_name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            method_name: method_name.into(),
            args,
        }
    }
}

/// A [`Near`] client bound to one contract.
#[derive(Clone, Debug)]
pub struct ContractSession {
    near: Near,
    contract_id: AccountId,
}

impl ContractSession {
    pub fn new(near: Near, contract_id: AccountId) -> Self {
        Self { near, contract_id }
    }

    pub fn contract_id(&self) -> &AccountId {
        &self.contract_id
    }

    pub fn near(&self) -> &Near {
        &self.near
    }

    /// Call a view method. See [`Near::view`].
    pub async fn view<A: Serialize + ?Sized>(
        &self,
        method: &str,
        args: &A,
    ) -> Result<serde_json::Value, Error> {
        self.near.view(&self.contract_id, method, args).await
    }

    pub async fn view_as<T: DeserializeOwned, A: Serialize + ?Sized>(
        &self,
        method: &str,
        args: &A,
    ) -> Result<T, Error> {
        self.near.view_as(&self.contract_id, method, args).await
    }

    /// Call a method in a signed transaction. See [`Near::call`].
    pub async fn call<A: Serialize + ?Sized>(
        &self,
        method: &str,
        args: &A,
        gas: Gas,
        deposit: NearToken,
    ) -> Result<DecodedValue, Error> {
        self.near
            .call(&self.contract_id, method, args, gas, deposit)
            .await
    }

    /// Run a call definition.
    pub async fn execute(&self, call: &CallDefinition) -> Result<DecodedValue, Error> {
        self.call(&call.method_name, &call.args, call.gas, call.deposit)
            .await
    }

    /// Run a view definition.
    pub async fn read(&self, view: &ViewDefinition) -> Result<serde_json::Value, Error> {
        self.view(&view.method_name, &view.args).await
    }

    pub async fn read_as<T: DeserializeOwned>(&self, view: &ViewDefinition) -> Result<T, Error> {
        self.view_as(&view.method_name, &view.args).await
    }
}
