//! The `FileDescriptorProto` of `ydb_common.proto`.
//!
//! Generic tooling (gRPC reflection, dynamic decoders, debuggers) needs the
//! schema itself rather than the Rust types. The bytes below are the exact
//! serialization every other YDB SDK registers for this file, so peers that
//! compare descriptors see the same schema.

use prost::Message;
use prost_types::{DescriptorProto, FileDescriptorProto, FileDescriptorSet};

use crate::error::DecodingError;

/// Path of the schema file, relative to the YDB source root.
pub const FILE_NAME: &str = "ydb/public/api/protos/ydb_common.proto";

/// Serialized `google.protobuf.FileDescriptorProto` of [`FILE_NAME`].
pub const FILE_DESCRIPTOR: &[u8] = b"\x0a&ydb/public/api/protos/ydb_common.proto\x12\x03Ydb\
\x22J\x0a\x0bFeatureFlag\x22;\x0a\x06Status\x12\x16\x0a\x12STATUS_UNSPECIFIED\x10\x00\
\x12\x0b\x0a\x07ENABLED\x10\x01\x12\x0c\x0a\x08DISABLED\x10\x02\
\x22\x22\x0a\x08CostInfo\x12\x16\x0a\x0econsumed_units\x18\x01 \x01(\x01\
B(\x0a\x15com.yandex.ydb.commonB\x0cCommonProtos\xf8\x01\x01\
b\x06proto3";

/// Decodes [`FILE_DESCRIPTOR`].
pub fn file_descriptor_proto() -> Result<FileDescriptorProto, DecodingError> {
    Ok(FileDescriptorProto::decode(FILE_DESCRIPTOR)?)
}

/// A descriptor set containing only this file; it has no imports.
pub fn file_descriptor_set() -> Result<FileDescriptorSet, DecodingError> {
    Ok(FileDescriptorSet {
        file: vec![file_descriptor_proto()?],
    })
}

/// [`file_descriptor_set`] serialized, as gRPC reflection services expect it.
pub fn encoded_file_descriptor_set() -> Vec<u8> {
    // A set is `repeated FileDescriptorProto file = 1`, so wrapping the
    // already-encoded file is enough.
    let mut buf = Vec::with_capacity(FILE_DESCRIPTOR.len() + 3);
    prost::encoding::bytes::encode(1, &FILE_DESCRIPTOR.to_vec(), &mut buf);
    buf
}

/// Looks up a top-level or nested message by its fully qualified name, with
/// or without the leading dot.
pub fn message_descriptor(full_name: &str) -> Result<Option<DescriptorProto>, DecodingError> {
    let file = file_descriptor_proto()?;
    let full_name = full_name.strip_prefix('.').unwrap_or(full_name);
    let relative = match full_name
        .strip_prefix(file.package())
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(relative) => relative,
        None => return Ok(None),
    };

    let mut candidates = file.message_type;
    let mut found = None;
    for part in relative.split('.') {
        found = candidates.into_iter().find(|message| message.name() == part);
        match &found {
            Some(message) => candidates = message.nested_type.clone(),
            None => return Ok(None),
        }
    }
    Ok(found)
}
