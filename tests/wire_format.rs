use proptest::prelude::*;

use ydb_common_protos::prost::Message;
use ydb_common_protos::{
    decode, encode, CodecConfig, CostInfo, DecodingErrorKind, FeatureFlag, Status, StatusValue,
    UnknownField, UnknownFieldPolicy,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Compares doubles by bit pattern so NaN and -0.0 count as round-tripping.
fn same_cost(a: &CostInfo, b: &CostInfo) -> bool {
    a.consumed_units.to_bits() == b.consumed_units.to_bits() && a.unknown_fields == b.unknown_fields
}

proptest! {
    #[test]
    fn cost_info_round_trips(bits in any::<u64>()) {
        let value = CostInfo::new(f64::from_bits(bits));
        let decoded: CostInfo = decode(encode(&value).unwrap().as_slice()).unwrap();
        prop_assert!(same_cost(&value, &decoded));
    }

    #[test]
    fn status_round_trips(raw in any::<i32>()) {
        let value = StatusValue::from_raw(raw);
        let decoded: StatusValue = decode(encode(&value).unwrap().as_slice()).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(decoded.to_raw(), raw);
    }

    #[test]
    fn unknown_field_keeps_known_value(
        units in any::<f64>().prop_filter("comparable", |v| !v.is_nan()),
        tag in 2u32..536_870_911,
        payload in any::<u64>(),
    ) {
        let mut bytes = CostInfo::new(units).encode_to_vec();
        ydb_common_protos::prost::encoding::encode_key(
            tag,
            ydb_common_protos::prost::encoding::WireType::Varint,
            &mut bytes,
        );
        ydb_common_protos::prost::encoding::encode_varint(payload, &mut bytes);

        let decoded: CostInfo = decode(bytes.as_slice()).unwrap();
        let expected = [UnknownField::Varint(payload)];
        prop_assert_eq!(decoded.consumed_units, units);
        prop_assert_eq!(decoded.unknown_fields.get(tag), &expected[..]);
        prop_assert_eq!(encode(&decoded).unwrap(), bytes);
    }
}

#[test]
fn cost_info_concrete_encoding() {
    init_logger();
    let bytes = encode(&CostInfo::new(3.5)).unwrap();
    assert_eq!(bytes, [0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x40]);
    let decoded: CostInfo = decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded.consumed_units, 3.5);
}

#[test]
fn empty_input_is_default() {
    init_logger();
    let cost: CostInfo = decode(&b""[..]).unwrap();
    assert_eq!(cost.consumed_units, 0.0);
    assert_eq!(cost, CostInfo::default());

    let flag: FeatureFlag = decode(&b""[..]).unwrap();
    assert!(flag.unknown_fields.is_empty());

    let status: StatusValue = decode(&b""[..]).unwrap();
    assert_eq!(status.known(), Some(Status::Unspecified));
}

#[test]
fn unset_and_explicit_zero_are_identical() {
    // A peer that writes the default explicitly must decode the same as one
    // that leaves the field out.
    let explicit: [u8; 9] = [0x09, 0, 0, 0, 0, 0, 0, 0, 0];
    let from_explicit: CostInfo = decode(&explicit[..]).unwrap();
    let from_unset: CostInfo = decode(&b""[..]).unwrap();
    assert_eq!(from_explicit, from_unset);
    assert!(encode(&from_explicit).unwrap().is_empty());
}

#[test]
fn enabled_status_round_trips_to_one() {
    let bytes = encode(&StatusValue::from(Status::Enabled)).unwrap();
    assert_eq!(bytes, [0x08, 0x01]);
    let decoded: StatusValue = decode(bytes.as_slice()).unwrap();
    assert_eq!(decoded.to_raw(), 1);
    assert_eq!(decoded.known(), Some(Status::Enabled));
}

#[test]
fn out_of_range_status_is_preserved() {
    let decoded: StatusValue = decode(&[0x08u8, 0x07][..]).unwrap();
    assert!(!decoded.is_known());
    assert_eq!(decoded.to_raw(), 7);
    assert_eq!(encode(&decoded).unwrap(), [0x08, 0x07]);
}

#[test]
fn unknown_fields_in_feature_flag() {
    // 1: varint 1, 15: "new"
    let bytes = [0x08, 0x01, 0x7a, 0x03, b'n', b'e', b'w'];
    let flag: FeatureFlag = decode(&bytes[..]).unwrap();
    assert_eq!(flag.unknown_fields.len(), 2);
    assert_eq!(encode(&flag).unwrap(), bytes);

    let codec = CodecConfig::new()
        .unknown_fields(UnknownFieldPolicy::Discard)
        .build();
    let flag: FeatureFlag = codec.decode(&bytes[..]).unwrap();
    assert_eq!(flag, FeatureFlag::default());
}

#[test]
fn truncated_input_is_an_error() {
    init_logger();
    for bytes in [
        &[0x09u8][..],
        &[0x09, 0x00, 0x00, 0x00][..],
        &[0x10][..],
        &[0x10, 0x80][..],
        &[0x12, 0x05, 0x01][..],
    ] {
        let error = decode::<CostInfo>(bytes).unwrap_err();
        assert!(error.is_malformed(), "{:02x?}: {}", bytes, error);
    }
}

#[test]
fn invalid_wire_type_is_an_error() {
    for bytes in [&[0x0eu8][..], &[0x0f][..], &[0x16][..]] {
        let error = decode::<CostInfo>(bytes).unwrap_err();
        assert!(
            matches!(error.kind(), DecodingErrorKind::Malformed(_)),
            "{:02x?}: {}",
            bytes,
            error
        );
    }
}

#[test]
fn consumed_units_with_other_wire_type_is_preserved() {
    init_logger();
    // 1: varint 1, 1: "ab", 1: fixed32 0
    let bytes = [0x08, 0x01, 0x0a, 0x02, b'a', b'b', 0x0d, 0, 0, 0, 0];
    let decoded: CostInfo = decode(&bytes[..]).unwrap();
    assert_eq!(decoded.consumed_units, 0.0);
    assert_eq!(decoded.unknown_fields.get(1).len(), 3);
    assert_eq!(encode(&decoded).unwrap(), bytes);

    let status: StatusValue = decode(&[0x09u8, 0, 0, 0, 0, 0, 0, 0, 0, 0x08, 0x01][..]).unwrap();
    assert_eq!(status.known(), Some(Status::Enabled));
}

#[test]
fn size_limit_applies_to_both_directions() {
    let codec = CodecConfig::new().max_message_len(8).build();
    assert!(matches!(
        codec.encode(&CostInfo::new(1.0)).unwrap_err().kind(),
        ydb_common_protos::EncodingErrorKind::TooLarge { len: 9, limit: 8 }
    ));
    assert!(matches!(
        codec
            .decode::<CostInfo>(&[0x09u8, 0, 0, 0, 0, 0, 0, 0xf0, 0x3f][..])
            .unwrap_err()
            .kind(),
        DecodingErrorKind::TooLarge { len: 9, limit: 8 }
    ));
}
