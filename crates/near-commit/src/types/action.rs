//! Transaction action types.

use crate::codec::{self, Schema, Value, WireFormat};
use crate::error::EncodingError;

use super::{AccountId, Gas, NearToken, PublicKey};

/// Access key permission.
///
/// Variant order is part of the wire format: 0 = FunctionCall, 1 = FullAccess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccessKeyPermission {
    /// Function call access with restrictions. (discriminant = 0)
    FunctionCall(FunctionCallPermission),
    /// Full access to the account. (discriminant = 1)
    FullAccess,
}

impl AccessKeyPermission {
    /// Create a function call permission.
    pub fn function_call(
        receiver_id: AccountId,
        method_names: Vec<String>,
        allowance: Option<NearToken>,
    ) -> Self {
        Self::FunctionCall(FunctionCallPermission {
            allowance,
            receiver_id,
            method_names,
        })
    }
}

/// Function call access key permission details.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionCallPermission {
    /// Maximum amount this key can spend (None = unlimited).
    pub allowance: Option<NearToken>,
    /// Contract that can be called.
    pub receiver_id: AccountId,
    /// Methods that can be called (empty = all methods).
    pub method_names: Vec<String>,
}

/// Access key attached to an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessKey {
    pub nonce: u64,
    pub permission: AccessKeyPermission,
}

impl AccessKey {
    /// Create a full access key.
    pub fn full_access() -> Self {
        Self {
            nonce: 0,
            permission: AccessKeyPermission::FullAccess,
        }
    }

    /// Create a function call access key.
    pub fn function_call(
        receiver_id: AccountId,
        method_names: Vec<String>,
        allowance: Option<NearToken>,
    ) -> Self {
        Self {
            nonce: 0,
            permission: AccessKeyPermission::function_call(receiver_id, method_names, allowance),
        }
    }
}

/// A transaction action.
///
/// Discriminants match the protocol:
/// 0 = CreateAccount, 1 = DeployContract, 2 = FunctionCall, 3 = Transfer,
/// 4 = Stake, 5 = AddKey, 6 = DeleteKey, 7 = DeleteAccount
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    CreateAccount,
    DeployContract {
        code: Vec<u8>,
    },
    FunctionCall {
        method_name: String,
        /// Arguments, usually UTF-8 JSON.
        args: Vec<u8>,
        gas: Gas,
        deposit: NearToken,
    },
    Transfer {
        deposit: NearToken,
    },
    Stake {
        stake: NearToken,
        public_key: PublicKey,
    },
    AddKey {
        public_key: PublicKey,
        access_key: AccessKey,
    },
    DeleteKey {
        public_key: PublicKey,
    },
    DeleteAccount {
        /// Receives the remaining balance.
        beneficiary_id: AccountId,
    },
}

impl Action {
    pub fn create_account() -> Self {
        Self::CreateAccount
    }

    pub fn deploy_contract(code: Vec<u8>) -> Self {
        Self::DeployContract { code }
    }

    pub fn function_call(
        method_name: impl Into<String>,
        args: Vec<u8>,
        gas: Gas,
        deposit: NearToken,
    ) -> Self {
        Self::FunctionCall {
            method_name: method_name.into(),
            args,
            gas,
            deposit,
        }
    }

    pub fn transfer(deposit: NearToken) -> Self {
        Self::Transfer { deposit }
    }

    pub fn stake(stake: NearToken, public_key: PublicKey) -> Self {
        Self::Stake { stake, public_key }
    }

    /// Create an AddKey action for full access.
    pub fn add_full_access_key(public_key: PublicKey) -> Self {
        Self::AddKey {
            public_key,
            access_key: AccessKey::full_access(),
        }
    }

    /// Create an AddKey action for function call access.
    pub fn add_function_call_key(
        public_key: PublicKey,
        receiver_id: AccountId,
        method_names: Vec<String>,
        allowance: Option<NearToken>,
    ) -> Self {
        Self::AddKey {
            public_key,
            access_key: AccessKey::function_call(receiver_id, method_names, allowance),
        }
    }

    pub fn delete_key(public_key: PublicKey) -> Self {
        Self::DeleteKey { public_key }
    }

    pub fn delete_account(beneficiary_id: AccountId) -> Self {
        Self::DeleteAccount { beneficiary_id }
    }

    /// The wire discriminant of this action.
    pub fn discriminant(&self) -> u8 {
        match self {
            Self::CreateAccount => 0,
            Self::DeployContract { .. } => 1,
            Self::FunctionCall { .. } => 2,
            Self::Transfer { .. } => 3,
            Self::Stake { .. } => 4,
            Self::AddKey { .. } => 5,
            Self::DeleteKey { .. } => 6,
            Self::DeleteAccount { .. } => 7,
        }
    }

    /// The protocol name of this action, e.g. `"FunctionCall"`.
    pub fn kind(&self) -> &'static str {
        match &codec::wire::ACTION {
            Schema::Enum(variants) => variants
                .get(usize::from(self.discriminant()))
                .map_or("Unknown", |v| v.name),
            _ => "Unknown",
        }
    }
}

// ============================================================================
// Wire format
// ============================================================================

pub(crate) fn account_id(value: Value) -> Result<AccountId, EncodingError> {
    let s = value.into_string()?;
    AccountId::new(s).map_err(|e| EncodingError::InvalidField(e.to_string()))
}

fn token(value: Value) -> Result<NearToken, EncodingError> {
    value.into_u128().map(NearToken::from_yoctonear)
}

impl WireFormat for AccessKeyPermission {
    fn schema() -> &'static Schema {
        &codec::wire::ACCESS_KEY_PERMISSION
    }

    fn to_value(&self) -> Value {
        match self {
            Self::FunctionCall(p) => Value::variant(
                0,
                Value::Struct(vec![
                    Value::optional(p.allowance.map(|a| Value::U128(a.as_yoctonear()))),
                    Value::Str(p.receiver_id.to_string()),
                    Value::Seq(p.method_names.iter().cloned().map(Value::Str).collect()),
                ]),
            ),
            Self::FullAccess => Value::variant(1, Value::Unit),
        }
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        match value.into_variant()? {
            (0, body) => {
                let [allowance, receiver_id, method_names] = body.into_fields()?;
                Ok(Self::FunctionCall(FunctionCallPermission {
                    allowance: allowance.into_option()?.map(token).transpose()?,
                    receiver_id: account_id(receiver_id)?,
                    method_names: method_names
                        .into_seq()?
                        .into_iter()
                        .map(Value::into_string)
                        .collect::<Result<_, _>>()?,
                }))
            }
            (1, _) => Ok(Self::FullAccess),
            (tag, _) => Err(EncodingError::InvalidDiscriminant { tag, variants: 2 }),
        }
    }
}

impl WireFormat for AccessKey {
    fn schema() -> &'static Schema {
        &codec::wire::ACCESS_KEY
    }

    fn to_value(&self) -> Value {
        Value::Struct(vec![Value::U64(self.nonce), self.permission.to_value()])
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let [nonce, permission] = value.into_fields()?;
        Ok(Self {
            nonce: nonce.into_u64()?,
            permission: AccessKeyPermission::from_value(permission)?,
        })
    }
}

impl WireFormat for Action {
    fn schema() -> &'static Schema {
        &codec::wire::ACTION
    }

    fn to_value(&self) -> Value {
        let body = match self {
            Self::CreateAccount => Value::Unit,
            Self::DeployContract { code } => Value::Struct(vec![Value::Bytes(code.clone())]),
            Self::FunctionCall {
                method_name,
                args,
                gas,
                deposit,
            } => Value::Struct(vec![
                Value::Str(method_name.clone()),
                Value::Bytes(args.clone()),
                Value::U64(gas.as_gas()),
                Value::U128(deposit.as_yoctonear()),
            ]),
            Self::Transfer { deposit } => Value::Struct(vec![Value::U128(deposit.as_yoctonear())]),
            Self::Stake { stake, public_key } => Value::Struct(vec![
                Value::U128(stake.as_yoctonear()),
                public_key.to_value(),
            ]),
            Self::AddKey {
                public_key,
                access_key,
            } => Value::Struct(vec![public_key.to_value(), access_key.to_value()]),
            Self::DeleteKey { public_key } => Value::Struct(vec![public_key.to_value()]),
            Self::DeleteAccount { beneficiary_id } => {
                Value::Struct(vec![Value::Str(beneficiary_id.to_string())])
            }
        };
        Value::variant(self.discriminant(), body)
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let (tag, body) = value.into_variant()?;
        let action = match tag {
            0 => Self::CreateAccount,
            1 => {
                let [code] = body.into_fields()?;
                Self::DeployContract {
                    code: code.into_bytes()?,
                }
            }
            2 => {
                let [method_name, args, gas, deposit] = body.into_fields()?;
                Self::FunctionCall {
                    method_name: method_name.into_string()?,
                    args: args.into_bytes()?,
                    gas: Gas::from_gas(gas.into_u64()?),
                    deposit: token(deposit)?,
                }
            }
            3 => {
                let [deposit] = body.into_fields()?;
                Self::Transfer {
                    deposit: token(deposit)?,
                }
            }
            4 => {
                let [stake, public_key] = body.into_fields()?;
                Self::Stake {
                    stake: token(stake)?,
                    public_key: PublicKey::from_value(public_key)?,
                }
            }
            5 => {
                let [public_key, access_key] = body.into_fields()?;
                Self::AddKey {
                    public_key: PublicKey::from_value(public_key)?,
                    access_key: AccessKey::from_value(access_key)?,
                }
            }
            6 => {
                let [public_key] = body.into_fields()?;
                Self::DeleteKey {
                    public_key: PublicKey::from_value(public_key)?,
                }
            }
            7 => {
                let [beneficiary_id] = body.into_fields()?;
                Self::DeleteAccount {
                    beneficiary_id: account_id(beneficiary_id)?,
                }
            }
            tag => return Err(EncodingError::InvalidDiscriminant { tag, variants: 8 }),
        };
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SecretKey;

    fn all_actions() -> Vec<Action> {
        let pk = SecretKey::generate_ed25519().public_key();
        let contract: AccountId = "contract.testnet".parse().unwrap();
        vec![
            Action::create_account(),
            Action::deploy_contract(vec![0, 97, 115, 109]),
            Action::function_call("ft_transfer", b"{}".to_vec(), Gas::DEFAULT, NearToken::ONE_YOCTO),
            Action::transfer(NearToken::from_near(1)),
            Action::stake(NearToken::from_near(100), pk),
            Action::add_full_access_key(pk),
            Action::add_function_call_key(
                pk,
                contract,
                vec!["get".to_string()],
                Some(NearToken::from_near(1)),
            ),
            Action::delete_key(pk),
            Action::delete_account("bob.testnet".parse().unwrap()),
        ]
    }

    #[test]
    fn test_discriminant_matches_wire_table() {
        for action in all_actions() {
            assert_eq!(
                codec::wire::ACTION.variant_index(action.kind()),
                Some(action.discriminant())
            );
        }
    }

    #[test]
    fn test_every_action_round_trips() {
        for action in all_actions() {
            let bytes = codec::to_vec(&action).unwrap();
            assert_eq!(bytes[0], action.discriminant());
            let decoded: Action = codec::from_slice(&bytes).unwrap();
            assert_eq!(decoded, action, "{}", action.kind());
        }
    }

    #[test]
    fn test_transfer_layout() {
        let bytes = codec::to_vec(&Action::transfer(NearToken::from_yoctonear(5))).unwrap();
        let mut expected = vec![3u8];
        expected.extend_from_slice(&5u128.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_function_call_layout() {
        let action = Action::function_call("m", b"{}".to_vec(), Gas::from_gas(7), NearToken::ZERO);
        let bytes = codec::to_vec(&action).unwrap();
        let mut expected = vec![2u8];
        expected.extend_from_slice(&1u32.to_le_bytes());
        expected.push(b'm');
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(b"{}");
        expected.extend_from_slice(&7u64.to_le_bytes());
        expected.extend_from_slice(&0u128.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_unknown_action_tag_rejected() {
        let err = codec::from_slice::<Action>(&[8]).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidDiscriminant { tag: 8, .. }));
    }

    #[test]
    fn test_invalid_beneficiary_rejected() {
        let mut bytes = vec![7u8];
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"BAD");
        let err = codec::from_slice::<Action>(&bytes).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidField(_)));
    }
}
