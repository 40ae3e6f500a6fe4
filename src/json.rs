//! Proto3 JSON mapping for the `Ydb` common types.
//!
//! Follows the canonical protobuf JSON encoding: lowerCamelCase field names
//! on output (the proto field names are accepted on input), default values
//! omitted, enum values written by name, and non-finite doubles written as
//! the strings `"NaN"`, `"Infinity"` and `"-Infinity"`. Unknown fields are
//! not representable in JSON and are neither written nor read.

use std::fmt;

use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Unexpected, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::open_enum::OpenEnum;
use crate::ydb::feature_flag::Status;
use crate::ydb::{CostInfo, FeatureFlag};

const STATUS_NAMES: &[&str] = &["STATUS_UNSPECIFIED", "ENABLED", "DISABLED"];

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str_name())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match deserializer.deserialize_any(StatusVisitor)? {
            OpenEnum::Known(status) => Ok(status),
            OpenEnum::Unknown(unknown) => Err(de::Error::invalid_value(
                Unexpected::Signed(unknown.value().into()),
                &"a declared Ydb.FeatureFlag.Status number",
            )),
        }
    }
}

impl Serialize for OpenEnum<Status> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OpenEnum::Known(status) => status.serialize(serializer),
            OpenEnum::Unknown(unknown) => serializer.serialize_i32(unknown.value()),
        }
    }
}

impl<'de> Deserialize<'de> for OpenEnum<Status> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StatusVisitor)
    }
}

struct StatusVisitor;

impl<'de> Visitor<'de> for StatusVisitor {
    type Value = OpenEnum<Status>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Ydb.FeatureFlag.Status name or number")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Status::from_str_name(value)
            .map(OpenEnum::Known)
            .ok_or_else(|| E::unknown_variant(value, STATUS_NAMES))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        i32::try_from(value)
            .map(OpenEnum::from_raw)
            .map_err(|_| E::invalid_value(Unexpected::Signed(value), &self))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        i32::try_from(value)
            .map(OpenEnum::from_raw)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
    }
}

/// A double in its proto3 JSON form.
struct JsonDouble(f64);

impl Serialize for JsonDouble {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value == f64::INFINITY {
            serializer.serialize_str("Infinity")
        } else if value == f64::NEG_INFINITY {
            serializer.serialize_str("-Infinity")
        } else {
            serializer.serialize_f64(value)
        }
    }
}

impl<'de> Deserialize<'de> for JsonDouble {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonDoubleVisitor)
    }
}

struct JsonDoubleVisitor;

impl<'de> Visitor<'de> for JsonDoubleVisitor {
    type Value = JsonDouble;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, \"NaN\", \"Infinity\" or \"-Infinity\"")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(JsonDouble(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(JsonDouble(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(JsonDouble(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        match value {
            "NaN" => Ok(JsonDouble(f64::NAN)),
            "Infinity" => Ok(JsonDouble(f64::INFINITY)),
            "-Infinity" => Ok(JsonDouble(f64::NEG_INFINITY)),
            _ => value
                .trim()
                .parse()
                .ok()
                .filter(|v: &f64| v.is_finite())
                .map(JsonDouble)
                .ok_or_else(|| E::invalid_value(Unexpected::Str(value), &self)),
        }
    }
}

impl Serialize for CostInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.consumed_units.to_bits() != 0;
        let mut map = serializer.serialize_map(Some(usize::from(present)))?;
        if present {
            map.serialize_entry("consumedUnits", &JsonDouble(self.consumed_units))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CostInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CostInfoVisitor)
    }
}

struct CostInfoVisitor;

impl<'de> Visitor<'de> for CostInfoVisitor {
    type Value = CostInfo;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Ydb.CostInfo object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut msg = CostInfo::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "consumedUnits" | "consumed_units" => {
                    // `null` stands for the default value.
                    let value: Option<JsonDouble> = map.next_value()?;
                    msg.consumed_units = value.map_or(0.0, |v| v.0);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(msg)
    }
}

impl Serialize for FeatureFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

impl<'de> Deserialize<'de> for FeatureFlag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FeatureFlagVisitor)
    }
}

struct FeatureFlagVisitor;

impl<'de> Visitor<'de> for FeatureFlagVisitor {
    type Value = FeatureFlag;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a Ydb.FeatureFlag object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(FeatureFlag::default())
    }
}
