//! Process-wide lookup of the `Ydb` common types by name.
//!
//! The registry lets code that only has a type name or an `Any` type URL in
//! hand (log dumpers, debuggers, generic RPC tooling) decode and print a
//! message without knowing its Rust type. It is built on first access and
//! never modified afterwards, so lookups take no locks.

use std::any::Any as StdAny;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

use log::debug;
use once_cell::sync::Lazy;
use prost::{Message, Name};
use prost_types::Any;

use crate::codec::{Codec, SchemaMessage};
use crate::error::{DecodingError, EncodingError};
use crate::ydb::feature_flag::Status;
use crate::ydb::{CostInfo, FeatureFlag};

/// A decoded message whose concrete type is only known at runtime.
pub trait DynMessage: Debug + Send + Sync {
    /// Fully qualified protobuf name, e.g. `Ydb.CostInfo`.
    fn full_name(&self) -> String;

    /// Re-encodes the message.
    fn encode_dyn(&self) -> Vec<u8>;

    /// Access to the concrete type, for downcasting.
    fn as_any(&self) -> &dyn StdAny;
}

impl<M> DynMessage for M
where
    M: Message + Name + 'static,
{
    fn full_name(&self) -> String {
        <M as Name>::full_name()
    }

    fn encode_dyn(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn as_any(&self) -> &dyn StdAny {
        self
    }
}

impl dyn DynMessage {
    /// Returns the message as `M` if that is its concrete type.
    pub fn downcast_ref<M: 'static>(&self) -> Option<&M> {
        self.as_any().downcast_ref()
    }
}

type DecodeFn = fn(&Codec, &[u8]) -> Result<Box<dyn DynMessage>, DecodingError>;

fn decode_boxed<M>(codec: &Codec, buf: &[u8]) -> Result<Box<dyn DynMessage>, DecodingError>
where
    M: SchemaMessage + Name + 'static,
{
    Ok(Box::new(codec.decode::<M>(buf)?))
}

/// Whether a registered name refers to a message or an enum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Message,
    Enum,
}

/// A registered message or enum type.
pub struct TypeEntry {
    full_name: String,
    type_url: String,
    kind: TypeKind,
    values: &'static [(&'static str, i32)],
    decode: Option<DecodeFn>,
}

impl TypeEntry {
    fn message<M>() -> TypeEntry
    where
        M: SchemaMessage + Name + 'static,
    {
        TypeEntry {
            full_name: <M as Name>::full_name(),
            type_url: M::type_url(),
            kind: TypeKind::Message,
            values: &[],
            decode: Some(decode_boxed::<M> as DecodeFn),
        }
    }

    fn enumeration(full_name: &str, values: &'static [(&'static str, i32)]) -> TypeEntry {
        TypeEntry {
            full_name: full_name.to_owned(),
            type_url: format!("{}/{}", crate::ydb::TYPE_URL_DOMAIN, full_name),
            kind: TypeKind::Enum,
            values,
            decode: None,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Declared `(name, number)` pairs of an enum; empty for messages.
    pub fn values(&self) -> &'static [(&'static str, i32)] {
        self.values
    }

    /// Name of an enum value, or `None` for numbers outside the declared set.
    pub fn value_name(&self, number: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| *name)
    }

    /// Number of a named enum value.
    pub fn value_number(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, number)| *number)
    }

    /// Decodes `buf` as this message type with the default codec.
    pub fn decode(&self, buf: &[u8]) -> Result<Box<dyn DynMessage>, DecodingError> {
        self.decode_with(&Codec::default(), buf)
    }

    /// Decodes `buf` as this message type.
    pub fn decode_with(
        &self,
        codec: &Codec,
        buf: &[u8],
    ) -> Result<Box<dyn DynMessage>, DecodingError> {
        match self.decode {
            Some(decode) => decode(codec, buf),
            None => Err(DecodingError::unknown_type(&self.full_name)),
        }
    }
}

impl fmt::Debug for TypeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEntry")
            .field("full_name", &self.full_name)
            .field("kind", &self.kind)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

const STATUS_VALUES: &[(&str, i32)] = &[
    ("STATUS_UNSPECIFIED", Status::Unspecified as i32),
    ("ENABLED", Status::Enabled as i32),
    ("DISABLED", Status::Disabled as i32),
];

/// Registered types, keyed by fully qualified name.
#[derive(Debug)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeEntry>,
}

static GLOBAL: Lazy<TypeRegistry> = Lazy::new(|| {
    let mut registry = TypeRegistry {
        types: BTreeMap::new(),
    };
    registry.insert(TypeEntry::message::<FeatureFlag>());
    registry.insert(TypeEntry::enumeration("Ydb.FeatureFlag.Status", STATUS_VALUES));
    registry.insert(TypeEntry::message::<CostInfo>());
    debug!(
        "registered {} types from {}",
        registry.types.len(),
        crate::descriptor::FILE_NAME
    );
    registry
});

impl TypeRegistry {
    /// The process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        &GLOBAL
    }

    fn insert(&mut self, entry: TypeEntry) {
        self.types.insert(entry.full_name.clone(), entry);
    }

    /// Finds a type by fully qualified name (`Ydb.CostInfo`), descriptor-style
    /// name (`.Ydb.CostInfo`) or type URL (`type.googleapis.com/Ydb.CostInfo`).
    pub fn lookup(&self, name: &str) -> Option<&TypeEntry> {
        // A type URL's name is everything after the last '/'.
        let name = name.rsplit('/').next().unwrap_or(name);
        let name = name.strip_prefix('.').unwrap_or(name);
        self.types.get(name)
    }

    /// All registered types, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &TypeEntry> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Decodes `buf` as the message type registered under `name`.
    pub fn decode(&self, name: &str, buf: &[u8]) -> Result<Box<dyn DynMessage>, DecodingError> {
        self.lookup(name)
            .ok_or_else(|| DecodingError::unknown_type(name))?
            .decode(buf)
    }

    /// Decodes the payload of `any` according to its type URL.
    pub fn decode_any(&self, any: &Any) -> Result<Box<dyn DynMessage>, DecodingError> {
        self.decode(&any.type_url, &any.value)
    }
}

/// Packs `msg` into a `google.protobuf.Any`.
pub fn pack_any<M: Name>(msg: &M) -> Result<Any, EncodingError> {
    Ok(Any {
        type_url: M::type_url(),
        value: crate::codec::encode(msg)?,
    })
}

/// Unpacks a `google.protobuf.Any` holding an `M`.
///
/// The type URL's domain is not compared, only the type name after it.
pub fn unpack_any<M>(any: &Any) -> Result<M, DecodingError>
where
    M: SchemaMessage + Name,
{
    let expected = M::type_url();
    if type_name(&any.type_url) != type_name(&expected) {
        return Err(DecodingError::unexpected_type_url(expected, &any.type_url));
    }
    crate::codec::decode(any.value.as_slice())
}

fn type_name(type_url: &str) -> &str {
    type_url.rsplit('/').next().unwrap_or(type_url)
}
