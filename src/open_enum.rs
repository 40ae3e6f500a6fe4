use std::fmt::{self, Debug};
use std::hash::{Hash, Hasher};

use bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message, UnknownEnumValue};

/// The value of a proto3 enum, which may lie outside the declared set.
///
/// proto3 enums are open: a decoder must keep integers it has no name for
/// rather than reject them, so that a newer peer's values survive a round
/// trip through an older client.
///
/// As a standalone message an `OpenEnum` is laid out like
/// `google.protobuf.Int32Value`: the raw value in field 1, omitted when zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpenEnum<T> {
    /// A value with a name in the generated enum type.
    Known(T),
    /// A value the generated enum type has no variant for.
    Unknown(Unknown),
}

impl<T> Default for OpenEnum<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::Known(T::default())
    }
}

impl<T> From<T> for OpenEnum<T> {
    fn from(value: T) -> Self {
        Self::Known(value)
    }
}

impl<T> OpenEnum<T> {
    /// Converts a raw integer, as read from the wire, into an open enum value.
    pub fn from_raw(value: i32) -> Self
    where
        i32: TryInto<T>,
    {
        match value.try_into() {
            Ok(v) => Self::Known(v),
            Err(_) => Self::Unknown(Unknown(value)),
        }
    }

    /// Converts an open enum value into its raw integer representation.
    pub fn into_raw(self) -> i32
    where
        T: Into<i32>,
    {
        match self {
            Self::Known(v) => v.into(),
            Self::Unknown(u) => u.0,
        }
    }

    /// Borrowing form of [`into_raw`](Self::into_raw).
    pub fn to_raw(&self) -> i32
    where
        T: Clone + Into<i32>,
    {
        match self {
            Self::Known(v) => v.clone().into(),
            Self::Unknown(u) => u.0,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// If the value is known, returns it in `Ok`, otherwise returns an `Err`
    /// with the raw value.
    pub fn get(&self) -> Result<T, UnknownEnumValue>
    where
        T: Clone,
    {
        match self {
            Self::Known(v) => Ok(v.clone()),
            Self::Unknown(u) => Err(UnknownEnumValue(u.0)),
        }
    }

    /// Returns the known value, or `None` if the value is unknown.
    pub fn known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            Self::Unknown(_) => None,
        }
    }

    /// Returns the known value, or the enum's default if the value is unknown.
    pub fn unwrap_or_default(self) -> T
    where
        T: Default,
    {
        self.known().unwrap_or_default()
    }

    /// Replaces the stored value with a known one.
    pub fn set(&mut self, value: T) {
        *self = Self::Known(value);
    }
}

impl<T: Hash> Hash for OpenEnum<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            OpenEnum::Known(v) => v.hash(state),
            OpenEnum::Unknown(u) => u.0.hash(state),
        }
    }
}

impl<T> Message for OpenEnum<T>
where
    T: Clone + Into<i32> + Debug + Send + Sync,
    i32: TryInto<T>,
{
    fn encode_raw(&self, buf: &mut impl BufMut) {
        self.to_raw().encode_raw(buf)
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        if tag == 1 && wire_type != WireType::Varint {
            return encoding::skip_field(wire_type, tag, buf, ctx);
        }
        // Start from the current value so a skipped field leaves it untouched.
        let mut raw = self.to_raw();
        <i32 as Message>::merge_field(&mut raw, tag, wire_type, buf, ctx)?;
        *self = OpenEnum::from_raw(raw);
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.to_raw().encoded_len()
    }

    fn clear(&mut self) {
        *self = OpenEnum::from_raw(0);
    }
}

/// An enum value with no name in the generated type.
///
/// Only constructed by [`OpenEnum::from_raw`], which guarantees the value
/// really is unknown.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Unknown(i32);

impl Unknown {
    pub fn value(self) -> i32 {
        self.0
    }
}

impl Debug for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Unknown> for i32 {
    fn from(value: Unknown) -> Self {
        value.0
    }
}

impl From<Unknown> for UnknownEnumValue {
    fn from(value: Unknown) -> Self {
        UnknownEnumValue(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ydb::feature_flag::Status;

    #[test]
    fn test_from_raw() {
        assert_eq!(
            OpenEnum::<Status>::from_raw(2),
            OpenEnum::Known(Status::Disabled)
        );
        let unknown = OpenEnum::<Status>::from_raw(42);
        assert!(!unknown.is_known());
        assert_eq!(unknown.to_raw(), 42);
        assert_eq!(unknown.get(), Err(UnknownEnumValue(42)));
        assert_eq!(unknown.unwrap_or_default(), Status::Unspecified);
    }

    #[test]
    fn test_default_is_unspecified() {
        let value = OpenEnum::<Status>::default();
        assert_eq!(value, OpenEnum::Known(Status::Unspecified));
        assert_eq!(value.encoded_len(), 0);
    }

    #[test]
    fn test_skipped_field_keeps_value() {
        // 1: varint 1, 2: varint 9
        let value = OpenEnum::<Status>::decode(&[0x08u8, 0x01, 0x10, 0x09][..]).unwrap();
        assert_eq!(value, OpenEnum::Known(Status::Enabled));
    }

    #[test]
    fn test_value_with_other_wire_type_is_skipped() {
        // 1: fixed64 0, then 1: varint 2
        let mut bytes = vec![0x09u8, 0, 0, 0, 0, 0, 0, 0, 0];
        let value = OpenEnum::<Status>::decode(&*bytes).unwrap();
        assert_eq!(value, OpenEnum::Known(Status::Unspecified));

        bytes.extend_from_slice(&[0x08, 0x02]);
        let value = OpenEnum::<Status>::decode(&*bytes).unwrap();
        assert_eq!(value, OpenEnum::Known(Status::Disabled));

        assert!(OpenEnum::<Status>::decode(&[0x09u8, 0, 0][..]).is_err());
    }

    #[test]
    fn test_into_raw_and_set() {
        let mut value = OpenEnum::from(Status::Enabled);
        assert_eq!(value.into_raw(), 1);
        value.set(Status::Disabled);
        assert_eq!(value.into_raw(), 2);
        assert_eq!(OpenEnum::<Status>::from_raw(-7).into_raw(), -7);

        let mut unknown = OpenEnum::<Status>::from_raw(99);
        unknown.set(Status::Enabled);
        assert!(unknown.is_known());
        assert_eq!(unknown.encode_to_vec(), [0x08, 0x01]);
    }

    #[test]
    fn test_negative_raw_value() {
        let value = OpenEnum::<Status>::from_raw(-1);
        let bytes = value.encode_to_vec();
        assert_eq!(bytes.len(), 11);
        assert_eq!(OpenEnum::<Status>::decode(&*bytes).unwrap(), value);
    }

    #[test]
    fn test_clear() {
        let mut value = OpenEnum::from(Status::Enabled);
        value.clear();
        assert_eq!(value, OpenEnum::Known(Status::Unspecified));
    }
}
