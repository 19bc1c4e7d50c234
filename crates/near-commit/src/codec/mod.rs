//! Schema-driven canonical binary codec.
//!
//! Every byte that gets signed goes through this module. A [`Schema`] table
//! describes the layout, [`encode`] walks a [`Value`] against it, and
//! [`decode`] reads bytes back into a [`Value`]. Typed structures implement
//! [`WireFormat`] to convert to and from values, and use [`to_vec`] /
//! [`from_slice`] as their entry points.
//!
//! The layout is borsh-compatible: little-endian integers, u32 length and
//! count prefixes, one-byte option tags and enum discriminants.
//!
//! ```
//! use near_commit::codec::{self, Field, Schema, Value};
//!
//! const POINT: Schema = Schema::Struct(&[
//!     Field { name: "x", schema: &Schema::U32 },
//!     Field { name: "label", schema: &Schema::Str },
//! ]);
//!
//! let value = Value::Struct(vec![Value::U32(7), Value::Str("hi".into())]);
//! let bytes = codec::encode(&value, &POINT).unwrap();
//! assert_eq!(bytes, [7, 0, 0, 0, 2, 0, 0, 0, b'h', b'i']);
//! assert_eq!(codec::decode(&bytes, &POINT).unwrap(), value);
//! ```

mod schema;
mod value;
pub mod wire;

pub use schema::{Field, Schema, Variant};
pub use value::Value;

use crate::error::EncodingError;

/// A type with a fixed wire layout.
pub trait WireFormat: Sized {
    /// The schema table describing this type's layout.
    fn schema() -> &'static Schema;

    /// Convert into a codec value shaped by [`WireFormat::schema`].
    fn to_value(&self) -> Value;

    /// Rebuild from a value decoded with [`WireFormat::schema`].
    fn from_value(value: Value) -> Result<Self, EncodingError>;
}

/// Serialize a typed value.
pub fn to_vec<T: WireFormat>(value: &T) -> Result<Vec<u8>, EncodingError> {
    encode(&value.to_value(), T::schema())
}

/// Deserialize a typed value, rejecting trailing bytes.
pub fn from_slice<T: WireFormat>(bytes: &[u8]) -> Result<T, EncodingError> {
    T::from_value(decode(bytes, T::schema())?)
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value against a schema.
///
/// Fails if the value's shape does not match the schema, if a fixed-length
/// field has the wrong size, or if a length does not fit its u32 prefix.
pub fn encode(value: &Value, schema: &Schema) -> Result<Vec<u8>, EncodingError> {
    let mut out = Vec::new();
    write_value(&mut out, value, schema)?;
    Ok(out)
}

fn write_value(out: &mut Vec<u8>, value: &Value, schema: &Schema) -> Result<(), EncodingError> {
    match (schema, value) {
        (Schema::U8, Value::U8(v)) => out.push(*v),
        (Schema::U32, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (Schema::U64, Value::U64(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (Schema::U128, Value::U128(v)) => out.extend_from_slice(&v.to_le_bytes()),
        (Schema::Str, Value::Str(s)) => {
            write_len(out, s.len())?;
            out.extend_from_slice(s.as_bytes());
        }
        (Schema::Bytes, Value::Bytes(b)) => {
            write_len(out, b.len())?;
            out.extend_from_slice(b);
        }
        (Schema::Fixed(n), Value::Bytes(b)) => {
            if b.len() != *n {
                return Err(EncodingError::FixedLength {
                    expected: *n,
                    actual: b.len(),
                });
            }
            out.extend_from_slice(b);
        }
        (Schema::Unit, Value::Unit) => {}
        (Schema::Option(_), Value::Option(None)) => out.push(0),
        (Schema::Option(inner), Value::Option(Some(v))) => {
            out.push(1);
            write_value(out, v, inner)?;
        }
        (Schema::Seq(inner), Value::Seq(items)) => {
            write_len(out, items.len())?;
            for item in items {
                write_value(out, item, inner)?;
            }
        }
        (Schema::Struct(fields), Value::Struct(values)) => {
            if fields.len() != values.len() {
                return Err(EncodingError::SchemaMismatch {
                    expected: "struct field count",
                });
            }
            for (field, v) in fields.iter().zip(values) {
                write_value(out, v, field.schema)?;
            }
        }
        (Schema::Enum(variants), Value::Enum(tag, body)) => {
            let variant =
                variants
                    .get(usize::from(*tag))
                    .ok_or(EncodingError::InvalidDiscriminant {
                        tag: *tag,
                        variants: variants.len(),
                    })?;
            out.push(*tag);
            write_value(out, body, variant.schema)?;
        }
        (schema, _) => {
            return Err(EncodingError::SchemaMismatch {
                expected: schema.kind(),
            });
        }
    }
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<(), EncodingError> {
    let len = u32::try_from(len).map_err(|_| EncodingError::LengthOverflow(len))?;
    out.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a complete buffer against a schema.
///
/// Short buffers, bad option tags, unknown discriminants, invalid UTF-8 and
/// trailing bytes are all reported as [`EncodingError`]; nothing is
/// truncated or skipped.
pub fn decode(bytes: &[u8], schema: &Schema) -> Result<Value, EncodingError> {
    let mut reader = Reader::new(bytes);
    let value = reader.read_value(schema)?;
    if reader.remaining() > 0 {
        return Err(EncodingError::TrailingBytes(reader.remaining()));
    }
    Ok(value)
}

/// Cursor over an input buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], EncodingError> {
        if n > self.remaining() {
            return Err(EncodingError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], EncodingError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn read_len(&mut self) -> Result<usize, EncodingError> {
        let len = u32::from_le_bytes(self.array()?);
        usize::try_from(len).map_err(|_| EncodingError::LengthOverflow(usize::MAX))
    }

    fn read_value(&mut self, schema: &Schema) -> Result<Value, EncodingError> {
        let value = match schema {
            Schema::U8 => Value::U8(self.array::<1>()?[0]),
            Schema::U32 => Value::U32(u32::from_le_bytes(self.array()?)),
            Schema::U64 => Value::U64(u64::from_le_bytes(self.array()?)),
            Schema::U128 => Value::U128(u128::from_le_bytes(self.array()?)),
            Schema::Str => {
                let len = self.read_len()?;
                let bytes = self.take(len)?;
                let s = std::str::from_utf8(bytes).map_err(|_| EncodingError::InvalidUtf8)?;
                Value::Str(s.to_owned())
            }
            Schema::Bytes => {
                let len = self.read_len()?;
                Value::Bytes(self.take(len)?.to_vec())
            }
            Schema::Fixed(n) => Value::Bytes(self.take(*n)?.to_vec()),
            Schema::Unit => Value::Unit,
            Schema::Option(inner) => match self.array::<1>()?[0] {
                0 => Value::Option(None),
                1 => Value::optional(Some(self.read_value(inner)?)),
                tag => return Err(EncodingError::InvalidOptionTag(tag)),
            },
            Schema::Seq(inner) => {
                let count = self.read_len()?;
                // A forged count must not drive allocation or iteration.
                let width = inner.min_width();
                if width == 0 {
                    if count > 0 {
                        return Err(EncodingError::ZeroWidthSequence(count));
                    }
                } else if count.saturating_mul(width) > self.remaining() {
                    return Err(EncodingError::UnexpectedEof {
                        offset: self.pos,
                        needed: count.saturating_mul(width),
                        remaining: self.remaining(),
                    });
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_value(inner)?);
                }
                Value::Seq(items)
            }
            Schema::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields.iter() {
                    values.push(self.read_value(field.schema)?);
                }
                Value::Struct(values)
            }
            Schema::Enum(variants) => {
                let tag = self.array::<1>()?[0];
                let variant =
                    variants
                        .get(usize::from(tag))
                        .ok_or(EncodingError::InvalidDiscriminant {
                            tag,
                            variants: variants.len(),
                        })?;
                Value::variant(tag, self.read_value(variant.schema)?)
            }
        };
        Ok(value)
    }
}
