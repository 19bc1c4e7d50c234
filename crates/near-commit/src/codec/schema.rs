//! Type descriptors for the binary codec.

/// A type descriptor driving [`encode`](super::encode) and [`decode`](super::decode).
///
/// Descriptors are plain `const` tables: composite kinds refer to their
/// children through `&'static` references, so a whole wire format is
/// declared once and shared by the encoder and decoder.
///
/// | Kind | Layout |
/// |------|--------|
/// | `U8`, `U32`, `U64`, `U128` | little-endian, fixed width |
/// | `Str` | u32 byte length + UTF-8 bytes |
/// | `Bytes` | u32 byte length + raw bytes |
/// | `Fixed(n)` | exactly `n` raw bytes, no prefix |
/// | `Unit` | nothing |
/// | `Option(t)` | `0`, or `1` followed by `t` |
/// | `Seq(t)` | u32 element count + each element |
/// | `Struct(fields)` | each field in table order |
/// | `Enum(variants)` | u8 variant index + that variant's body |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    U8,
    U32,
    U64,
    U128,
    Str,
    Bytes,
    Fixed(usize),
    Unit,
    Option(&'static Schema),
    Seq(&'static Schema),
    Struct(&'static [Field]),
    Enum(&'static [Variant]),
}

impl Schema {
    /// Short name of the descriptor kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Schema::U8 => "u8",
            Schema::U32 => "u32",
            Schema::U64 => "u64",
            Schema::U128 => "u128",
            Schema::Str => "string",
            Schema::Bytes => "bytes",
            Schema::Fixed(_) => "fixed bytes",
            Schema::Unit => "unit",
            Schema::Option(_) => "option",
            Schema::Seq(_) => "sequence",
            Schema::Struct(_) => "struct",
            Schema::Enum(_) => "enum",
        }
    }

    /// The fewest bytes any value of this schema encodes to.
    ///
    /// Decoding uses it to reject sequence counts the remaining input
    /// cannot possibly hold.
    pub fn min_width(&self) -> usize {
        match self {
            Schema::U8 | Schema::Option(_) | Schema::Enum(_) => 1,
            Schema::U32 | Schema::Str | Schema::Bytes | Schema::Seq(_) => 4,
            Schema::U64 => 8,
            Schema::U128 => 16,
            Schema::Fixed(n) => *n,
            Schema::Unit => 0,
            Schema::Struct(fields) => fields
                .iter()
                .fold(0usize, |acc, f| acc.saturating_add(f.schema.min_width())),
        }
    }

    /// Look up a variant index by name. Returns `None` for non-enum schemas.
    pub fn variant_index(&self, name: &str) -> Option<u8> {
        match self {
            Schema::Enum(variants) => variants
                .iter()
                .position(|v| v.name == name)
                .and_then(|i| u8::try_from(i).ok()),
            _ => None,
        }
    }
}

/// A named struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub schema: &'static Schema,
}

/// A named enum variant. Its wire discriminant is its position in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Variant {
    pub name: &'static str,
    pub schema: &'static Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: Schema = Schema::Enum(&[
        Variant {
            name: "Red",
            schema: &Schema::Unit,
        },
        Variant {
            name: "Rgb",
            schema: &Schema::Fixed(3),
        },
    ]);

    #[test]
    fn test_variant_index() {
        assert_eq!(COLOR.variant_index("Red"), Some(0));
        assert_eq!(COLOR.variant_index("Rgb"), Some(1));
        assert_eq!(COLOR.variant_index("Blue"), None);
        assert_eq!(Schema::U8.variant_index("Red"), None);
    }

    #[test]
    fn test_min_width() {
        assert_eq!(Schema::Unit.min_width(), 0);
        assert_eq!(Schema::Struct(&[]).min_width(), 0);
        assert_eq!(Schema::Seq(&Schema::U128).min_width(), 4);
        assert_eq!(Schema::Option(&Schema::U128).min_width(), 1);
        // Only the tag is guaranteed: the smallest variant body is empty.
        assert_eq!(COLOR.min_width(), 1);
        assert_eq!(
            Schema::Struct(&[
                Field {
                    name: "a",
                    schema: &Schema::U64,
                },
                Field {
                    name: "b",
                    schema: &Schema::Fixed(32),
                },
            ])
            .min_width(),
            40
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Schema::Str.kind(), "string");
        assert_eq!(Schema::Option(&Schema::U8).kind(), "option");
        assert_eq!(COLOR.kind(), "enum");
    }
}
