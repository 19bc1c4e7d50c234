//! NEAR account ID type with validation.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseAccountIdError;

/// A NEAR account identifier.
///
/// Valid account IDs:
/// - Named: "alice.near", "bob.testnet", "sub.account.near"
/// - Implicit (64 lowercase hex chars): "0123456789abcdef..."
/// - EVM implicit (0x + 40 lowercase hex chars): "0x1234..."
///
/// Validation runs on every construction path, including deserialization,
/// so an `AccountId` held anywhere in the pipeline is always usable as a
/// signer, receiver, or beneficiary.
///
/// # Examples
///
/// ```
/// use near_commit::AccountId;
///
/// let named: AccountId = "alice.testnet".parse().unwrap();
/// assert!(named.is_named());
///
/// let implicit = "0".repeat(64).parse::<AccountId>().unwrap();
/// assert!(implicit.is_implicit());
///
/// assert!("Alice.testnet".parse::<AccountId>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Parse and validate an account ID.
    pub fn new(s: impl Into<String>) -> Result<Self, ParseAccountIdError> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    fn validate(s: &str) -> Result<(), ParseAccountIdError> {
        if s.is_empty() {
            return Err(ParseAccountIdError::Empty);
        }

        if s.len() > 64 {
            return Err(ParseAccountIdError::TooLong(s.to_string()));
        }

        if let Some(hex) = s.strip_prefix("0x") {
            if hex.len() != 40 {
                return Err(ParseAccountIdError::InvalidFormat(s.to_string()));
            }
            if let Some(c) = hex.chars().find(|c| !is_lower_hex(*c)) {
                return Err(ParseAccountIdError::InvalidChar(s.to_string(), c));
            }
            return Ok(());
        }

        if s.len() == 64 && s.chars().all(is_lower_hex) {
            return Ok(());
        }

        if s.len() < 2 {
            return Err(ParseAccountIdError::TooShort(s.to_string()));
        }

        if let Some(c) = s
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | '0'..='9' | '_' | '-' | '.'))
        {
            return Err(ParseAccountIdError::InvalidChar(s.to_string(), c));
        }

        // Every dot-separated segment is non-empty and starts and ends with
        // an alphanumeric character.
        for part in s.split('.') {
            let (Some(first), Some(last)) = (part.chars().next(), part.chars().last()) else {
                return Err(ParseAccountIdError::InvalidFormat(s.to_string()));
            };
            if matches!(first, '-' | '_') || matches!(last, '-' | '_') {
                return Err(ParseAccountIdError::InvalidFormat(s.to_string()));
            }
        }

        Ok(())
    }

    /// Check if this is an implicit account (64 hex chars).
    pub fn is_implicit(&self) -> bool {
        self.0.len() == 64 && self.0.chars().all(is_lower_hex)
    }

    /// Check if this is an EVM implicit account (0x prefix).
    pub fn is_evm_implicit(&self) -> bool {
        self.0.starts_with("0x") && self.0.len() == 42
    }

    /// Check if this is a named account.
    pub fn is_named(&self) -> bool {
        !self.is_implicit() && !self.is_evm_implicit()
    }

    /// Check if this is a top-level account (no dots, like "near" or "testnet").
    pub fn is_top_level(&self) -> bool {
        self.is_named() && !self.0.contains('.')
    }

    /// Check if this is a subaccount of another account.
    pub fn is_sub_account_of(&self, parent: &AccountId) -> bool {
        self.is_named()
            && parent.is_named()
            && self
                .0
                .strip_suffix(parent.as_str())
                .is_some_and(|prefix| prefix.len() > 1 && prefix.ends_with('.'))
    }

    /// Get as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_lower_hex(c: char) -> bool {
    matches!(c, '0'..='9' | 'a'..='f')
}

impl FromStr for AccountId {
    type Err = ParseAccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for AccountId {
    type Error = ParseAccountIdError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = ParseAccountIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_named_accounts() {
        for id in ["alice.near", "bob.testnet", "a1", "sub_1.acc-2.near", "near"] {
            assert!(AccountId::new(id).is_ok(), "{} should be valid", id);
        }
    }

    #[test]
    fn test_invalid_accounts() {
        assert_eq!(AccountId::new(""), Err(ParseAccountIdError::Empty));
        assert!(matches!(
            AccountId::new("a"),
            Err(ParseAccountIdError::TooShort(_))
        ));
        assert!(matches!(
            AccountId::new("a".repeat(65)),
            Err(ParseAccountIdError::TooLong(_))
        ));
        assert!(matches!(
            AccountId::new("Alice.near"),
            Err(ParseAccountIdError::InvalidChar(_, 'A'))
        ));
        for id in [".alice", "alice.", "a..b", "-alice.near", "alice_.near", "al.-ice"] {
            assert!(
                matches!(AccountId::new(id), Err(ParseAccountIdError::InvalidFormat(_))),
                "{} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_implicit_accounts() {
        let implicit = AccountId::new("ab".repeat(32)).unwrap();
        assert!(implicit.is_implicit());
        assert!(!implicit.is_named());

        let evm = AccountId::new(format!("0x{}", "1f".repeat(20))).unwrap();
        assert!(evm.is_evm_implicit());

        assert!(AccountId::new("0x1234").is_err());
        assert!(AccountId::new(format!("0x{}", "G".repeat(40))).is_err());
    }

    #[test]
    fn test_sub_account() {
        let parent: AccountId = "alice.near".parse().unwrap();
        let child: AccountId = "app.alice.near".parse().unwrap();
        let lookalike: AccountId = "malice.near".parse().unwrap();
        assert!(child.is_sub_account_of(&parent));
        assert!(!lookalike.is_sub_account_of(&parent));
        assert!(!parent.is_sub_account_of(&parent));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AccountId = serde_json::from_str("\"alice.testnet\"").unwrap();
        assert_eq!(ok.as_str(), "alice.testnet");
        assert!(serde_json::from_str::<AccountId>("\"NOT VALID\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"alice.testnet\"");
    }
}
