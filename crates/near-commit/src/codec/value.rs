//! Dynamic values produced and consumed by the codec.

use crate::error::EncodingError;

/// A decoded value, shaped by the [`Schema`](super::Schema) it was read with.
///
/// `Bytes` carries both length-prefixed and fixed-length byte fields.
/// `Struct` fields are positional, in the order of the schema's field table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    U8(u8),
    U32(u32),
    U64(u64),
    U128(u128),
    Str(String),
    Bytes(Vec<u8>),
    Unit,
    Option(Option<Box<Value>>),
    Seq(Vec<Value>),
    Struct(Vec<Value>),
    Enum(u8, Box<Value>),
}

impl Value {
    /// Build an enum value.
    pub fn variant(tag: u8, body: Value) -> Self {
        Value::Enum(tag, Box::new(body))
    }

    /// Build an optional value.
    pub fn optional(value: Option<Value>) -> Self {
        Value::Option(value.map(Box::new))
    }

    pub fn into_u8(self) -> Result<u8, EncodingError> {
        match self {
            Value::U8(v) => Ok(v),
            _ => Err(mismatch("u8")),
        }
    }

    pub fn into_u32(self) -> Result<u32, EncodingError> {
        match self {
            Value::U32(v) => Ok(v),
            _ => Err(mismatch("u32")),
        }
    }

    pub fn into_u64(self) -> Result<u64, EncodingError> {
        match self {
            Value::U64(v) => Ok(v),
            _ => Err(mismatch("u64")),
        }
    }

    pub fn into_u128(self) -> Result<u128, EncodingError> {
        match self {
            Value::U128(v) => Ok(v),
            _ => Err(mismatch("u128")),
        }
    }

    pub fn into_string(self) -> Result<String, EncodingError> {
        match self {
            Value::Str(v) => Ok(v),
            _ => Err(mismatch("string")),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>, EncodingError> {
        match self {
            Value::Bytes(v) => Ok(v),
            _ => Err(mismatch("bytes")),
        }
    }

    /// Take a fixed-size byte array out of a `Bytes` value.
    pub fn into_array<const N: usize>(self) -> Result<[u8; N], EncodingError> {
        let bytes = self.into_bytes()?;
        if bytes.len() != N {
            return Err(EncodingError::FixedLength {
                expected: N,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&bytes);
        Ok(out)
    }

    pub fn into_option(self) -> Result<Option<Value>, EncodingError> {
        match self {
            Value::Option(v) => Ok(v.map(|b| *b)),
            _ => Err(mismatch("option")),
        }
    }

    pub fn into_seq(self) -> Result<Vec<Value>, EncodingError> {
        match self {
            Value::Seq(v) => Ok(v),
            _ => Err(mismatch("sequence")),
        }
    }

    /// Split a struct value into exactly `N` positional fields.
    ///
    /// ```
    /// use near_commit::codec::Value;
    ///
    /// let value = Value::Struct(vec![Value::U8(1), Value::U64(2)]);
    /// let [a, b] = value.into_fields().unwrap();
    /// assert_eq!(a, Value::U8(1));
    /// assert_eq!(b, Value::U64(2));
    /// ```
    pub fn into_fields<const N: usize>(self) -> Result<[Value; N], EncodingError> {
        match self {
            Value::Struct(fields) => fields.try_into().map_err(|_| mismatch("struct field count")),
            _ => Err(mismatch("struct")),
        }
    }

    /// Split an enum value into its discriminant and body.
    pub fn into_variant(self) -> Result<(u8, Value), EncodingError> {
        match self {
            Value::Enum(tag, body) => Ok((tag, *body)),
            _ => Err(mismatch("enum")),
        }
    }
}

fn mismatch(expected: &'static str) -> EncodingError {
    EncodingError::SchemaMismatch { expected }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_fields_wrong_count() {
        let value = Value::Struct(vec![Value::U8(1)]);
        let err = value.into_fields::<2>().unwrap_err();
        assert_eq!(
            err,
            EncodingError::SchemaMismatch {
                expected: "struct field count"
            }
        );
    }

    #[test]
    fn test_into_array_length_checked() {
        assert_eq!(Value::Bytes(vec![1, 2]).into_array::<2>().unwrap(), [1, 2]);
        assert_eq!(
            Value::Bytes(vec![1, 2, 3]).into_array::<2>().unwrap_err(),
            EncodingError::FixedLength {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_accessor_mismatch() {
        assert!(Value::U8(1).into_u64().is_err());
        assert!(Value::Str("x".into()).into_bytes().is_err());
        assert_eq!(
            Value::optional(Some(Value::U32(7))).into_option().unwrap(),
            Some(Value::U32(7))
        );
    }
}
