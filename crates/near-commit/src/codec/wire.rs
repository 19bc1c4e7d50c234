//! NEAR transaction wire format.
//!
//! ```text
//! SignedTransaction
//! ├── Transaction
//! │   ├── signer_id     string
//! │   ├── public_key    u8 curve tag (0 = ed25519) + [u8; 32]
//! │   ├── nonce         u64
//! │   ├── receiver_id   string
//! │   ├── block_hash    [u8; 32]
//! │   └── actions       u32 count + Action*
//! └── signature         u8 curve tag + [u8; 64]
//! ```
//!
//! Action discriminants follow the protocol's numbering and must never be
//! reordered.

use super::{Field, Schema, Variant};

/// Public key: curve tag followed by the raw key.
pub const PUBLIC_KEY: Schema = Schema::Enum(&[Variant {
    name: "ed25519",
    schema: &Schema::Fixed(32),
}]);

/// Signature: curve tag followed by the raw signature.
pub const SIGNATURE: Schema = Schema::Enum(&[Variant {
    name: "ed25519",
    schema: &Schema::Fixed(64),
}]);

pub const CRYPTO_HASH: Schema = Schema::Fixed(32);

pub const FUNCTION_CALL_PERMISSION: Schema = Schema::Struct(&[
    Field {
        name: "allowance",
        schema: &Schema::Option(&Schema::U128),
    },
    Field {
        name: "receiver_id",
        schema: &Schema::Str,
    },
    Field {
        name: "method_names",
        schema: &Schema::Seq(&Schema::Str),
    },
]);

pub const ACCESS_KEY_PERMISSION: Schema = Schema::Enum(&[
    Variant {
        name: "FunctionCall",
        schema: &FUNCTION_CALL_PERMISSION,
    },
    Variant {
        name: "FullAccess",
        schema: &Schema::Unit,
    },
]);

pub const ACCESS_KEY: Schema = Schema::Struct(&[
    Field {
        name: "nonce",
        schema: &Schema::U64,
    },
    Field {
        name: "permission",
        schema: &ACCESS_KEY_PERMISSION,
    },
]);

pub const ACTION: Schema = Schema::Enum(&[
    Variant {
        name: "CreateAccount",
        schema: &Schema::Unit,
    },
    Variant {
        name: "DeployContract",
        schema: &Schema::Struct(&[Field {
            name: "code",
            schema: &Schema::Bytes,
        }]),
    },
    Variant {
        name: "FunctionCall",
        schema: &Schema::Struct(&[
            Field {
                name: "method_name",
                schema: &Schema::Str,
            },
            Field {
                name: "args",
                schema: &Schema::Bytes,
            },
            Field {
                name: "gas",
                schema: &Schema::U64,
            },
            Field {
                name: "deposit",
                schema: &Schema::U128,
            },
        ]),
    },
    Variant {
        name: "Transfer",
        schema: &Schema::Struct(&[Field {
            name: "deposit",
            schema: &Schema::U128,
        }]),
    },
    Variant {
        name: "Stake",
        schema: &Schema::Struct(&[
            Field {
                name: "stake",
                schema: &Schema::U128,
            },
            Field {
                name: "public_key",
                schema: &PUBLIC_KEY,
            },
        ]),
    },
    Variant {
        name: "AddKey",
        schema: &Schema::Struct(&[
            Field {
                name: "public_key",
                schema: &PUBLIC_KEY,
            },
            Field {
                name: "access_key",
                schema: &ACCESS_KEY,
            },
        ]),
    },
    Variant {
        name: "DeleteKey",
        schema: &Schema::Struct(&[Field {
            name: "public_key",
            schema: &PUBLIC_KEY,
        }]),
    },
    Variant {
        name: "DeleteAccount",
        schema: &Schema::Struct(&[Field {
            name: "beneficiary_id",
            schema: &Schema::Str,
        }]),
    },
]);

pub const TRANSACTION: Schema = Schema::Struct(&[
    Field {
        name: "signer_id",
        schema: &Schema::Str,
    },
    Field {
        name: "public_key",
        schema: &PUBLIC_KEY,
    },
    Field {
        name: "nonce",
        schema: &Schema::U64,
    },
    Field {
        name: "receiver_id",
        schema: &Schema::Str,
    },
    Field {
        name: "block_hash",
        schema: &CRYPTO_HASH,
    },
    Field {
        name: "actions",
        schema: &Schema::Seq(&ACTION),
    },
]);

pub const SIGNED_TRANSACTION: Schema = Schema::Struct(&[
    Field {
        name: "transaction",
        schema: &TRANSACTION,
    },
    Field {
        name: "signature",
        schema: &SIGNATURE,
    },
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_discriminants_follow_protocol() {
        let expected = [
            "CreateAccount",
            "DeployContract",
            "FunctionCall",
            "Transfer",
            "Stake",
            "AddKey",
            "DeleteKey",
            "DeleteAccount",
        ];
        for (i, name) in expected.iter().enumerate() {
            assert_eq!(ACTION.variant_index(name), Some(i as u8), "{}", name);
        }
    }

    #[test]
    fn test_transaction_field_order() {
        let Schema::Struct(fields) = TRANSACTION else {
            panic!("transaction must be a struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            [
                "signer_id",
                "public_key",
                "nonce",
                "receiver_id",
                "block_hash",
                "actions"
            ]
        );
    }

    #[test]
    fn test_full_access_is_second_permission() {
        assert_eq!(ACCESS_KEY_PERMISSION.variant_index("FunctionCall"), Some(0));
        assert_eq!(ACCESS_KEY_PERMISSION.variant_index("FullAccess"), Some(1));
    }
}
