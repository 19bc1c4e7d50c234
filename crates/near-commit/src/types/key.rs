//! Cryptographic key types for NEAR.
//!
//! Only Ed25519 keys are supported. Keys use the `ed25519:<base58>` text
//! form everywhere (credentials files, RPC paths, JSON).

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use ed25519_dalek::{Signer as _, SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{self, Schema, Value, WireFormat};
use crate::error::{EncodingError, ParseKeyError};

/// Key type identifier. The discriminant is the wire curve tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyType {
    /// Ed25519 key.
    Ed25519 = 0,
}

impl KeyType {
    /// Get the string prefix for this key type.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
        }
    }

    /// Get the expected public key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            KeyType::Ed25519 => 32,
        }
    }

    /// Get the expected signature length in bytes.
    pub fn signature_len(&self) -> usize {
        match self {
            KeyType::Ed25519 => 64,
        }
    }
}

impl FromStr for KeyType {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(KeyType::Ed25519),
            other => Err(ParseKeyError::UnknownKeyType(other.to_string())),
        }
    }
}

/// Split `"<type>:<base58>"` and decode the payload.
fn parse_prefixed(s: &str) -> Result<(KeyType, Vec<u8>), ParseKeyError> {
    let (key_type, data) = s.split_once(':').ok_or(ParseKeyError::InvalidFormat)?;
    let key_type: KeyType = key_type.parse()?;
    let data = bs58::decode(data)
        .into_vec()
        .map_err(|e| ParseKeyError::InvalidBase58(e.to_string()))?;
    Ok((key_type, data))
}

// ============================================================================
// PublicKey
// ============================================================================

/// Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Create an Ed25519 public key from raw 32 bytes.
    pub fn ed25519_from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the key type.
    pub fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PublicKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, data) = parse_prefixed(s)?;
        let bytes: [u8; 32] =
            data.as_slice()
                .try_into()
                .map_err(|_| ParseKeyError::InvalidLength {
                    expected: key_type.key_len(),
                    actual: data.len(),
                })?;
        VerifyingKey::from_bytes(&bytes).map_err(|_| ParseKeyError::InvalidCurvePoint)?;
        Ok(Self(bytes))
    }
}

impl TryFrom<&str> for PublicKey {
    type Error = ParseKeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key_type().as_str(),
            bs58::encode(&self.0).into_string()
        )
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl WireFormat for PublicKey {
    fn schema() -> &'static Schema {
        &codec::wire::PUBLIC_KEY
    }

    fn to_value(&self) -> Value {
        Value::variant(KeyType::Ed25519 as u8, Value::Bytes(self.0.to_vec()))
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let (_curve, body) = value.into_variant()?;
        Ok(Self(body.into_array()?))
    }
}

// ============================================================================
// SecretKey
// ============================================================================

/// Ed25519 secret key (the 32-byte seed).
///
/// `Debug` never prints key material. `Display` produces the full
/// `ed25519:<base58>` export form and must not be logged.
#[derive(Clone)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Generate a new random Ed25519 key.
    pub fn generate_ed25519() -> Self {
        Self(SigningKey::generate(&mut OsRng).to_bytes())
    }

    /// Create an Ed25519 secret key from a raw 32-byte seed.
    pub fn ed25519_from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the key type.
    pub fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(SigningKey::from_bytes(&self.0).verifying_key().to_bytes())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(SigningKey::from_bytes(&self.0).sign(message).to_bytes())
    }
}

impl FromStr for SecretKey {
    type Err = ParseKeyError;

    /// Accepts either the 32-byte seed or the 64-byte `seed || public key`
    /// form written by near-cli. In the 64-byte form the embedded public key
    /// must match the one derived from the seed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (_key_type, data) = parse_prefixed(s)?;
        let (seed, embedded) = match data.len() {
            32 => (&data[..], None),
            64 => (&data[..32], Some(&data[32..])),
            actual => {
                return Err(ParseKeyError::InvalidLength {
                    expected: 64,
                    actual,
                });
            }
        };

        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(seed);
        let key = Self(bytes);

        if let Some(embedded) = embedded {
            let derived = key.public_key();
            if derived.as_bytes().as_slice() != embedded {
                return Err(ParseKeyError::KeyMismatch {
                    expected: derived.to_string(),
                    actual: format!("ed25519:{}", bs58::encode(embedded).into_string()),
                });
            }
        }

        Ok(key)
    }
}

impl TryFrom<&str> for SecretKey {
    type Error = ParseKeyError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut expanded = self.0.to_vec();
        expanded.extend_from_slice(self.public_key().as_bytes());
        write!(
            f,
            "{}:{}",
            self.key_type().as_str(),
            bs58::encode(expanded).into_string()
        )
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({}:***)", self.key_type().as_str())
    }
}

// ============================================================================
// KeyPair
// ============================================================================

/// A secret key together with its derived public key.
///
/// Signing is deterministic: the same message always yields the same
/// signature.
#[derive(Clone)]
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random key pair.
    pub fn generate() -> Self {
        Self::from_secret_key(SecretKey::generate_ed25519())
    }

    /// Build a key pair from a secret key.
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key();
        Self {
            secret_key,
            public_key,
        }
    }

    /// Get the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Get the secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Sign a message (for transactions, the 32-byte transaction hash).
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.secret_key.sign(message)
    }
}

impl FromStr for KeyPair {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_secret_key(s.parse()?))
    }
}

impl Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Signature
// ============================================================================

/// Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Create an Ed25519 signature from raw 64 bytes.
    pub fn ed25519_from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the key type.
    pub fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    /// Get the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Verify this signature against a message and public key.
    pub fn verify(&self, message: &[u8], public_key: &PublicKey) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
            return false;
        };
        let signature = ed25519_dalek::Signature::from_bytes(&self.0);
        verifying_key.verify_strict(message, &signature).is_ok()
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.key_type().as_str(),
            bs58::encode(&self.0).into_string()
        )
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

impl WireFormat for Signature {
    fn schema() -> &'static Schema {
        &codec::wire::SIGNATURE
    }

    fn to_value(&self) -> Value {
        Value::variant(KeyType::Ed25519 as u8, Value::Bytes(self.0.to_vec()))
    }

    fn from_value(value: Value) -> Result<Self, EncodingError> {
        let (_curve, body) = value.into_variant()?;
        Ok(Self(body.into_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_sign() {
        let pair = KeyPair::generate();
        let message = b"hello";
        let signature = pair.sign(message);
        assert!(signature.verify(message, pair.public_key()));
        assert!(!signature.verify(b"other", pair.public_key()));
        assert!(!signature.verify(message, KeyPair::generate().public_key()));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let pair = KeyPair::generate();
        assert_eq!(pair.sign(b"m"), pair.sign(b"m"));
    }

    #[test]
    fn test_public_key_round_trip() {
        let pk = SecretKey::generate_ed25519().public_key();
        let parsed: PublicKey = pk.to_string().parse().unwrap();
        assert_eq!(pk, parsed);
        assert!(pk.to_string().starts_with("ed25519:"));
    }

    #[test]
    fn test_secret_key_accepts_seed_and_expanded_forms() {
        let sk = SecretKey::generate_ed25519();
        let expanded = sk.to_string();
        let from_expanded: SecretKey = expanded.parse().unwrap();
        assert_eq!(from_expanded.public_key(), sk.public_key());

        let seed_only = format!("ed25519:{}", bs58::encode(sk.0).into_string());
        let from_seed: SecretKey = seed_only.parse().unwrap();
        assert_eq!(from_seed.public_key(), sk.public_key());
    }

    #[test]
    fn test_secret_key_rejects_mismatched_public_half() {
        let sk = SecretKey::generate_ed25519();
        let other = SecretKey::generate_ed25519().public_key();
        let mut bytes = sk.0.to_vec();
        bytes.extend_from_slice(other.as_bytes());
        let forged = format!("ed25519:{}", bs58::encode(bytes).into_string());
        assert!(matches!(
            forged.parse::<SecretKey>(),
            Err(ParseKeyError::KeyMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_key_material() {
        assert_eq!(
            "nocolon".parse::<SecretKey>().unwrap_err(),
            ParseKeyError::InvalidFormat
        );
        assert!(matches!(
            "secp256k1:abc".parse::<SecretKey>(),
            Err(ParseKeyError::UnknownKeyType(_))
        ));
        assert!(matches!(
            "ed25519:0OIl".parse::<SecretKey>(),
            Err(ParseKeyError::InvalidBase58(_))
        ));
        let short = format!("ed25519:{}", bs58::encode([7u8; 16]).into_string());
        assert_eq!(
            short.parse::<SecretKey>().unwrap_err(),
            ParseKeyError::InvalidLength {
                expected: 64,
                actual: 16
            }
        );
        let short_pk = format!("ed25519:{}", bs58::encode([7u8; 31]).into_string());
        assert_eq!(
            short_pk.parse::<PublicKey>().unwrap_err(),
            ParseKeyError::InvalidLength {
                expected: 32,
                actual: 31
            }
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let pair = KeyPair::generate();
        let secret = pair.secret_key().to_string();
        let secret_payload = secret.trim_start_matches("ed25519:");
        assert!(!format!("{:?}", pair.secret_key()).contains(secret_payload));
        assert!(!format!("{:?}", pair).contains(secret_payload));
    }

    #[test]
    fn test_public_key_wire_layout() {
        let pk = PublicKey::ed25519_from_bytes([5u8; 32]);
        let bytes = codec::to_vec(&pk).unwrap();
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..], &[5u8; 32]);
        assert_eq!(codec::from_slice::<PublicKey>(&bytes).unwrap(), pk);
    }

    #[test]
    fn test_signature_wire_rejects_unknown_curve() {
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&[0u8; 64]);
        assert!(matches!(
            codec::from_slice::<Signature>(&bytes),
            Err(EncodingError::InvalidDiscriminant { tag: 1, .. })
        ));
    }
}
