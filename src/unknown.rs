//! Opaque storage for fields that are not part of a message's schema.
//!
//! Peers built against a newer revision of `ydb_common.proto` may send
//! fields this crate does not know about. They are kept here, keyed by field
//! number, and written back out after the known fields on encode.

use std::collections::btree_map::{self, BTreeMap};
use std::slice;

use bytes::{Buf, BufMut, Bytes};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message};

/// The unknown fields of a decoded message, ordered by field number.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct UnknownFieldSet {
    fields: BTreeMap<u32, Vec<UnknownField>>,
}

/// A single unknown field value, stored in its wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnknownField {
    /// A field with the `Varint` wire type.
    Varint(u64),
    /// A field with the `SixtyFourBit` wire type.
    SixtyFourBit(u64),
    /// A field with the `LengthDelimited` wire type.
    LengthDelimited(Bytes),
    /// A group, with its own nested unknown fields.
    Group(UnknownFieldSet),
    /// A field with the `ThirtyTwoBit` wire type.
    ThirtyTwoBit(u32),
}

impl UnknownField {
    /// The wire type this value is encoded with.
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownField::Varint(_) => WireType::Varint,
            UnknownField::SixtyFourBit(_) => WireType::SixtyFourBit,
            UnknownField::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownField::Group(_) => WireType::StartGroup,
            UnknownField::ThirtyTwoBit(_) => WireType::ThirtyTwoBit,
        }
    }
}

/// An iterator over `(field number, value)` pairs of an [`UnknownFieldSet`].
#[derive(Debug)]
pub struct UnknownFieldIter<'a> {
    tags_iter: btree_map::Iter<'a, u32, Vec<UnknownField>>,
    current_tag: Option<(u32, slice::Iter<'a, UnknownField>)>,
}

impl UnknownFieldSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns `true` if no unknown fields were seen.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of unknown values, counting repeats of the same field.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Values recorded for field number `tag`, in the order they were read.
    pub fn get(&self, tag: u32) -> &[UnknownField] {
        self.fields.get(&tag).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends a value for field number `tag`.
    pub fn push(&mut self, tag: u32, field: UnknownField) {
        self.fields.entry(tag).or_default().push(field);
    }

    /// Gets an iterator over the fields contained in this set.
    pub fn iter(&self) -> UnknownFieldIter<'_> {
        UnknownFieldIter {
            tags_iter: self.fields.iter(),
            current_tag: None,
        }
    }
}

impl<'a> IntoIterator for &'a UnknownFieldSet {
    type Item = (u32, &'a UnknownField);
    type IntoIter = UnknownFieldIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> Iterator for UnknownFieldIter<'a> {
    type Item = (u32, &'a UnknownField);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((tag, iter)) = &mut self.current_tag {
                if let Some(value) = iter.next() {
                    return Some((*tag, value));
                }
                self.current_tag = None;
            }
            let (tag, values) = self.tags_iter.next()?;
            self.current_tag = Some((*tag, values.iter()));
        }
    }
}

fn read_fixed<const N: usize>(buf: &mut impl Buf) -> Result<[u8; N], DecodeError> {
    let mut value = [0; N];
    if buf.remaining() < N {
        return Err(DecodeError::new("buffer underflow"));
    }
    buf.copy_to_slice(&mut value);
    Ok(value)
}

impl Message for UnknownFieldSet {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        for (tag, field) in self {
            match field {
                UnknownField::Varint(value) => {
                    encoding::encode_key(tag, WireType::Varint, buf);
                    encoding::encode_varint(*value, buf);
                }
                UnknownField::SixtyFourBit(value) => {
                    encoding::encode_key(tag, WireType::SixtyFourBit, buf);
                    buf.put_u64_le(*value);
                }
                UnknownField::LengthDelimited(value) => {
                    encoding::bytes::encode(tag, value, buf);
                }
                UnknownField::Group(value) => {
                    encoding::group::encode(tag, value, buf);
                }
                UnknownField::ThirtyTwoBit(value) => {
                    encoding::encode_key(tag, WireType::ThirtyTwoBit, buf);
                    buf.put_u32_le(*value);
                }
            }
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        let field = match wire_type {
            WireType::Varint => UnknownField::Varint(encoding::decode_varint(buf)?),
            WireType::SixtyFourBit => {
                UnknownField::SixtyFourBit(u64::from_le_bytes(read_fixed(buf)?))
            }
            WireType::LengthDelimited => {
                let mut value = Bytes::new();
                encoding::bytes::merge(wire_type, &mut value, buf, ctx)?;
                UnknownField::LengthDelimited(value)
            }
            WireType::StartGroup => {
                let mut value = UnknownFieldSet::new();
                encoding::group::merge(tag, wire_type, &mut value, buf, ctx)?;
                UnknownField::Group(value)
            }
            WireType::EndGroup => {
                return Err(DecodeError::new("unexpected end group tag"));
            }
            WireType::ThirtyTwoBit => {
                UnknownField::ThirtyTwoBit(u32::from_le_bytes(read_fixed(buf)?))
            }
        };

        self.push(tag, field);
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.iter()
            .map(|(tag, field)| match field {
                UnknownField::Varint(value) => {
                    encoding::key_len(tag) + encoding::encoded_len_varint(*value)
                }
                UnknownField::SixtyFourBit(_) => encoding::key_len(tag) + 8,
                UnknownField::LengthDelimited(value) => encoding::bytes::encoded_len(tag, value),
                UnknownField::Group(value) => encoding::group::encoded_len(tag, value),
                UnknownField::ThirtyTwoBit(_) => encoding::key_len(tag) + 4,
            })
            .sum()
    }

    fn clear(&mut self) {
        self.fields.clear();
    }
}
