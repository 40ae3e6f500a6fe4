//! Messages of the `Ydb` package declared in
//! `ydb/public/api/protos/ydb_common.proto`.

use bytes::{Buf, BufMut};
use prost::encoding::{self, DecodeContext, WireType};
use prost::{DecodeError, Message, Name};

use crate::unknown::UnknownFieldSet;

/// Protobuf package of every type in this module.
pub const PACKAGE: &str = "Ydb";

/// Domain used when building type URLs for `google.protobuf.Any`.
pub const TYPE_URL_DOMAIN: &str = "type.googleapis.com";

/// Carries the [`Status`](feature_flag::Status) enum shared by the YDB API's
/// feature toggles. The message itself has no fields.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct FeatureFlag {
    pub unknown_fields: UnknownFieldSet,
}

/// Nested message and enum types in `FeatureFlag`.
pub mod feature_flag {
    use crate::open_enum::OpenEnum;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Status {
        Unspecified = 0,
        Enabled = 1,
        Disabled = 2,
    }

    impl Status {
        /// String value of the enum field names used in the ProtoBuf definition.
        ///
        /// The values are not transformed in any way and thus are considered stable
        /// (if the ProtoBuf definition does not change) and safe for programmatic use.
        pub fn as_str_name(&self) -> &'static str {
            match self {
                Status::Unspecified => "STATUS_UNSPECIFIED",
                Status::Enabled => "ENABLED",
                Status::Disabled => "DISABLED",
            }
        }

        /// Creates an enum from field names used in the ProtoBuf definition.
        pub fn from_str_name(value: &str) -> ::core::option::Option<Self> {
            match value {
                "STATUS_UNSPECIFIED" => Some(Self::Unspecified),
                "ENABLED" => Some(Self::Enabled),
                "DISABLED" => Some(Self::Disabled),
                _ => None,
            }
        }
    }

    /// A status as stored or sent on its own: unknown integers are kept.
    pub type StatusValue = OpenEnum<Status>;
}

impl Message for FeatureFlag {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        self.unknown_fields.merge_field(tag, wire_type, buf, ctx)
    }

    fn encoded_len(&self) -> usize {
        self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        self.unknown_fields.clear();
    }
}

impl Name for FeatureFlag {
    const NAME: &'static str = "FeatureFlag";
    const PACKAGE: &'static str = PACKAGE;

    fn full_name() -> String {
        "Ydb.FeatureFlag".into()
    }

    fn type_url() -> String {
        "type.googleapis.com/Ydb.FeatureFlag".into()
    }
}

/// Resource usage reported back for a single operation.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct CostInfo {
    /// Total amount of request units (RU), consumed by the operation.
    pub consumed_units: f64,
    pub unknown_fields: UnknownFieldSet,
}

impl CostInfo {
    pub fn new(consumed_units: f64) -> CostInfo {
        CostInfo {
            consumed_units,
            ..Default::default()
        }
    }
}

impl Message for CostInfo {
    fn encode_raw(&self, buf: &mut impl BufMut) {
        // Only +0.0 is the proto3 default; -0.0 and NaN are written out.
        if self.consumed_units.to_bits() != 0 {
            encoding::double::encode(1, &self.consumed_units, buf);
        }
        self.unknown_fields.encode_raw(buf);
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError> {
        const STRUCT_NAME: &str = "CostInfo";
        match tag {
            1 if wire_type == WireType::SixtyFourBit => {
                encoding::double::merge(wire_type, &mut self.consumed_units, buf, ctx).map_err(
                    |mut error| {
                        error.push(STRUCT_NAME, "consumed_units");
                        error
                    },
                )
            }
            // A known number with another wire type is kept like any unknown field.
            _ => self.unknown_fields.merge_field(tag, wire_type, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let consumed_units = if self.consumed_units.to_bits() != 0 {
            encoding::double::encoded_len(1, &self.consumed_units)
        } else {
            0
        };
        consumed_units + self.unknown_fields.encoded_len()
    }

    fn clear(&mut self) {
        self.consumed_units = 0.0;
        self.unknown_fields.clear();
    }
}

impl Name for CostInfo {
    const NAME: &'static str = "CostInfo";
    const PACKAGE: &'static str = PACKAGE;

    fn full_name() -> String {
        "Ydb.CostInfo".into()
    }

    fn type_url() -> String {
        "type.googleapis.com/Ydb.CostInfo".into()
    }
}

#[cfg(test)]
mod tests {
    use super::feature_flag::Status;
    use super::*;
    use crate::unknown::UnknownField;

    #[test]
    fn test_status_names() {
        for status in [Status::Unspecified, Status::Enabled, Status::Disabled] {
            assert_eq!(Status::from_str_name(status.as_str_name()), Some(status));
        }
        assert_eq!(Status::from_str_name("enabled"), None);
        assert_eq!(Status::default(), Status::Unspecified);
        assert_eq!(i32::from(Status::Disabled), 2);
        assert!(Status::try_from(3).is_err());
    }

    #[test]
    fn test_cost_info_wire_layout() {
        let bytes = CostInfo::new(3.5).encode_to_vec();
        assert_eq!(
            bytes,
            [0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x40]
        );
        assert!(CostInfo::new(0.0).encode_to_vec().is_empty());
    }

    #[test]
    fn test_negative_zero_is_written() {
        let value = CostInfo::new(-0.0);
        assert_eq!(value.encoded_len(), 9);
        let decoded = CostInfo::decode(&*value.encode_to_vec()).unwrap();
        assert!(decoded.consumed_units.is_sign_negative());
    }

    #[test]
    fn test_last_value_wins() {
        let mut bytes = CostInfo::new(1.0).encode_to_vec();
        bytes.extend(CostInfo::new(2.0).encode_to_vec());
        assert_eq!(CostInfo::decode(&*bytes).unwrap().consumed_units, 2.0);
    }

    #[test]
    fn test_truncated_consumed_units() {
        let error = CostInfo::decode(&[0x09u8, 0x00, 0x00][..]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "failed to decode Protobuf message: CostInfo.consumed_units: buffer underflow"
        );
    }

    #[test]
    fn test_consumed_units_with_other_wire_type_is_kept() {
        let bytes: [u8; 2] = [0x08, 0x01];
        let value = CostInfo::decode(&bytes[..]).unwrap();
        assert_eq!(value.consumed_units, 0.0);
        assert_eq!(value.unknown_fields.get(1), &[UnknownField::Varint(1)]);
        assert_eq!(value.encode_to_vec(), bytes);

        // The double that follows still lands in the known field.
        let mut bytes = bytes.to_vec();
        bytes.extend(CostInfo::new(2.5).encode_to_vec());
        let value = CostInfo::decode(&*bytes).unwrap();
        assert_eq!(value.consumed_units, 2.5);
        assert_eq!(value.unknown_fields.len(), 1);
    }

    #[test]
    fn test_feature_flag_keeps_everything_as_unknown() {
        let bytes: [u8; 2] = [0x08, 0x01];
        let flag = FeatureFlag::decode(&bytes[..]).unwrap();
        assert_eq!(flag.unknown_fields.get(1), &[UnknownField::Varint(1)]);
        assert_eq!(flag.encode_to_vec(), bytes);
    }

    #[test]
    fn test_names() {
        assert_eq!(CostInfo::full_name(), "Ydb.CostInfo");
        assert_eq!(FeatureFlag::type_url(), "type.googleapis.com/Ydb.FeatureFlag");
        assert_eq!(
            CostInfo::type_url(),
            format!("{}/{}", TYPE_URL_DOMAIN, CostInfo::full_name())
        );
    }
}
