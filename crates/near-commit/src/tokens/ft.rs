//! NEP-141 fungible token call definitions.
//!
//! Each function builds the call for one standard method; run it with
//! [`ContractSession::execute`](crate::client::ContractSession::execute) or
//! [`ContractSession::read`](crate::client::ContractSession::read).
//! Token amounts are minimal-unit integers, sent as decimal strings.

use serde::{Deserialize, Serialize};

use crate::client::{CallDefinition, ViewDefinition};
use crate::types::{AccountId, Gas, MinimalUnits, NearToken};

/// Gas attached to `ft_transfer` and `ft_transfer_call`.
pub const FT_TRANSFER_GAS: Gas = Gas::from_tgas(200);

/// NEP-141 Fungible Token metadata, as returned by `ft_metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FtMetadata {
    /// Standard specification version (e.g., "ft-1.0.0")
    pub spec: String,
    pub name: String,
    pub symbol: String,
    /// Optional icon as a data URI.
    #[serde(default)]
    pub icon: Option<String>,
    /// Optional URL to off-chain JSON metadata.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub reference_hash: Option<String>,
    pub decimals: u8,
}

/// NEP-145 storage balance of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBalance {
    pub total: NearToken,
    pub available: NearToken,
}

/// Transfer tokens to `receiver_id`. Attaches the 1 yoctoNEAR NEP-141
/// requires, which forces a full-access key.
pub fn ft_transfer(
    receiver_id: &AccountId,
    amount: MinimalUnits,
    memo: Option<&str>,
) -> CallDefinition {
    CallDefinition::new(
        "ft_transfer",
        serde_json::json!({
            "receiver_id": receiver_id,
            "amount": amount,
            "memo": memo,
        }),
    )
    .gas(FT_TRANSFER_GAS)
    .deposit(NearToken::ONE_YOCTO)
}

/// Transfer tokens and call `ft_on_transfer(sender_id, amount, msg)` on the
/// receiver. Unused tokens are refunded by `ft_resolve_transfer`.
pub fn ft_transfer_call(
    receiver_id: &AccountId,
    amount: MinimalUnits,
    msg: &str,
    memo: Option<&str>,
) -> CallDefinition {
    CallDefinition::new(
        "ft_transfer_call",
        serde_json::json!({
            "receiver_id": receiver_id,
            "amount": amount,
            "memo": memo,
            "msg": msg,
        }),
    )
    .gas(FT_TRANSFER_GAS)
    .deposit(NearToken::ONE_YOCTO)
}

/// Returns the total supply as a decimal string.
pub fn ft_total_supply() -> ViewDefinition {
    ViewDefinition::new("ft_total_supply", serde_json::json!({}))
}

/// Returns the balance of `account_id` as a decimal string.
pub fn ft_balance_of(account_id: &AccountId) -> ViewDefinition {
    ViewDefinition::new(
        "ft_balance_of",
        serde_json::json!({ "account_id": account_id }),
    )
}

/// Returns [`FtMetadata`].
pub fn ft_metadata() -> ViewDefinition {
    ViewDefinition::new("ft_metadata", serde_json::json!({}))
}

/// Returns `Option<StorageBalance>`; `None` means the account is not
/// registered and cannot receive tokens.
pub fn storage_balance_of(account_id: &AccountId) -> ViewDefinition {
    ViewDefinition::new(
        "storage_balance_of",
        serde_json::json!({ "account_id": account_id }),
    )
}

/// Initialize a freshly deployed token contract, minting `owner_supply`
/// to `owner_id`.
pub fn new(owner_id: &AccountId, owner_supply: MinimalUnits) -> CallDefinition {
    CallDefinition::new(
        "new",
        serde_json::json!({
            "owner_id": owner_id,
            "owner_supply": owner_supply,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> AccountId {
        "bob.testnet".parse().unwrap()
    }

    #[test]
    fn test_ft_transfer_definition() {
        let call = ft_transfer(&bob(), MinimalUnits::new(1_500_000), Some("rent"));
        assert_eq!(call.method_name, "ft_transfer");
        assert_eq!(call.gas, Gas::tgas(200));
        assert_eq!(call.deposit, NearToken::yocto(1));
        assert_eq!(
            call.args,
            serde_json::json!({ "receiver_id": "bob.testnet", "amount": "1500000", "memo": "rent" })
        );
    }

    #[test]
    fn test_ft_transfer_call_definition() {
        let call = ft_transfer_call(&bob(), MinimalUnits::new(7), "swap", None);
        assert_eq!(call.method_name, "ft_transfer_call");
        assert_eq!(call.deposit, NearToken::ONE_YOCTO);
        assert_eq!(call.args["msg"], "swap");
        assert_eq!(call.args["amount"], "7");
        assert!(call.args["memo"].is_null());
    }

    #[test]
    fn test_view_definitions() {
        assert_eq!(ft_total_supply().method_name, "ft_total_supply");
        assert_eq!(ft_metadata().args, serde_json::json!({}));
        assert_eq!(ft_balance_of(&bob()).args["account_id"], "bob.testnet");
        assert_eq!(storage_balance_of(&bob()).method_name, "storage_balance_of");
    }

    #[test]
    fn test_new_definition() {
        let owner: AccountId = "owner.testnet".parse().unwrap();
        let call = new(&owner, "1000000000000000000000000000".parse().unwrap());
        assert_eq!(call.method_name, "new");
        assert_eq!(call.deposit, NearToken::ZERO);
        assert_eq!(call.args["owner_supply"], "1000000000000000000000000000");
    }

    #[test]
    fn test_metadata_deserializes_without_optionals() {
        let meta: FtMetadata = serde_json::from_value(serde_json::json!({
            "spec": "ft-1.0.0",
            "name": "Cheddar",
            "symbol": "CHDR",
            "decimals": 24,
        }))
        .unwrap();
        assert_eq!(meta.symbol, "CHDR");
        assert_eq!(meta.icon, None);
    }
}
