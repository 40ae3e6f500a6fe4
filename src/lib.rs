#![doc(html_root_url = "https://docs.rs/ydb-common-protos/0.1.0")]
#![doc = include_str!("../README.md")]

// Re-export the protobuf runtime so users can name `Message` and `Name`
// without depending on a matching prost version themselves.
pub use prost;
pub use prost_types;

mod codec;
mod error;
#[cfg(feature = "serde")]
mod json;
mod open_enum;
mod unknown;

pub mod descriptor;
pub mod registry;
pub mod ydb;

pub use crate::codec::{decode, encode, Codec, CodecConfig, SchemaMessage, UnknownFieldPolicy};
pub use crate::error::{DecodingError, DecodingErrorKind, EncodingError, EncodingErrorKind};
pub use crate::open_enum::{OpenEnum, Unknown};
pub use crate::registry::{pack_any, unpack_any, DynMessage, TypeEntry, TypeKind, TypeRegistry};
pub use crate::unknown::{UnknownField, UnknownFieldIter, UnknownFieldSet};
pub use crate::ydb::feature_flag::{Status, StatusValue};
pub use crate::ydb::{CostInfo, FeatureFlag};
