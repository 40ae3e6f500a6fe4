//! Encoding and decoding `Ydb` messages with a configurable policy.

use std::any;
use std::mem;

use bytes::{Buf, BufMut};
use log::{debug, trace};
use prost::Message;

use crate::error::{DecodingError, EncodingError};
use crate::open_enum::OpenEnum;
use crate::unknown::UnknownFieldSet;
use crate::ydb::{CostInfo, FeatureFlag};

/// What to do with fields that are not part of a message's schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UnknownFieldPolicy {
    /// Keep them and write them back out when the message is re-encoded.
    #[default]
    Preserve,
    /// Drop them after decoding.
    Discard,
}

/// A message this crate knows how to decode, and whose unknown fields the
/// codec can inspect.
pub trait SchemaMessage: Message + Default {
    /// The message's preserved unknown fields, if it keeps any.
    fn unknown_fields_mut(&mut self) -> Option<&mut UnknownFieldSet> {
        None
    }
}

impl SchemaMessage for FeatureFlag {
    fn unknown_fields_mut(&mut self) -> Option<&mut UnknownFieldSet> {
        Some(&mut self.unknown_fields)
    }
}

impl SchemaMessage for CostInfo {
    fn unknown_fields_mut(&mut self) -> Option<&mut UnknownFieldSet> {
        Some(&mut self.unknown_fields)
    }
}

impl<T> SchemaMessage for OpenEnum<T>
where
    OpenEnum<T>: Message + Default,
{
}

/// Configuration for a [`Codec`].
///
/// ```
/// use ydb_common_protos::{CodecConfig, UnknownFieldPolicy};
///
/// let codec = CodecConfig::new()
///     .unknown_fields(UnknownFieldPolicy::Discard)
///     .max_message_len(4096)
///     .build();
/// assert_eq!(codec.max_message_len(), Some(4096));
/// ```
#[derive(Clone, Debug)]
pub struct CodecConfig {
    unknown_fields: UnknownFieldPolicy,
    max_message_len: Option<usize>,
}

impl CodecConfig {
    /// Creates a new configuration with default options.
    pub fn new() -> CodecConfig {
        CodecConfig::default()
    }

    /// Configures how fields missing from the schema are handled on decode.
    ///
    /// Defaults to [`UnknownFieldPolicy::Preserve`].
    pub fn unknown_fields(&mut self, policy: UnknownFieldPolicy) -> &mut Self {
        self.unknown_fields = policy;
        self
    }

    /// Configures the largest encoded message, in bytes, the codec will
    /// produce or accept.
    ///
    /// By default messages of any length are accepted.
    pub fn max_message_len(&mut self, len: usize) -> &mut Self {
        self.max_message_len = Some(len);
        self
    }

    pub fn build(&self) -> Codec {
        Codec {
            config: self.clone(),
        }
    }
}

impl Default for CodecConfig {
    fn default() -> CodecConfig {
        CodecConfig {
            unknown_fields: UnknownFieldPolicy::default(),
            max_message_len: None,
        }
    }
}

/// Encodes and decodes messages according to a [`CodecConfig`].
#[derive(Clone, Debug, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn unknown_field_policy(&self) -> UnknownFieldPolicy {
        self.config.unknown_fields
    }

    /// The configured size limit, or `None` if there is none.
    pub fn max_message_len(&self) -> Option<usize> {
        self.config.max_message_len
    }

    fn check_encoded_len<M: Message>(&self, msg: &M) -> Result<usize, EncodingError> {
        let len = msg.encoded_len();
        match self.config.max_message_len {
            Some(limit) if len > limit => {
                debug!(
                    "refusing to encode {}: {} bytes over limit of {}",
                    any::type_name::<M>(),
                    len,
                    limit
                );
                Err(EncodingError::too_large(len, limit))
            }
            _ => Ok(len),
        }
    }

    /// Encodes `msg` into a new buffer.
    pub fn encode<M: Message>(&self, msg: &M) -> Result<Vec<u8>, EncodingError> {
        let len = self.check_encoded_len(msg)?;
        let mut buf = Vec::with_capacity(len);
        msg.encode(&mut buf)?;
        trace!("encoded {} ({} bytes)", any::type_name::<M>(), len);
        Ok(buf)
    }

    /// Encodes `msg` into `buf`, failing if `buf` lacks capacity.
    pub fn encode_to<M: Message>(&self, msg: &M, buf: &mut impl BufMut) -> Result<(), EncodingError> {
        let len = self.check_encoded_len(msg)?;
        msg.encode(buf)?;
        trace!("encoded {} ({} bytes)", any::type_name::<M>(), len);
        Ok(())
    }

    /// Encodes `msg` prefixed with its length as a varint.
    pub fn encode_length_delimited<M: Message>(&self, msg: &M) -> Result<Vec<u8>, EncodingError> {
        self.check_encoded_len(msg)?;
        Ok(msg.encode_length_delimited_to_vec())
    }

    /// Decodes a message of type `M` from `buf`.
    pub fn decode<M: SchemaMessage>(&self, buf: impl Buf) -> Result<M, DecodingError> {
        let mut msg = M::default();
        self.merge(&mut msg, buf)?;
        Ok(msg)
    }

    /// Decodes a length-delimited message of type `M` from `buf`.
    pub fn decode_length_delimited<M: SchemaMessage>(
        &self,
        mut buf: impl Buf,
    ) -> Result<M, DecodingError> {
        let len = prost::decode_length_delimiter(&mut buf)?;
        if len > buf.remaining() {
            return Err(prost::DecodeError::new("buffer underflow").into());
        }
        self.decode(buf.take(len))
    }

    /// Merges the fields in `buf` into `msg`.
    ///
    /// Known fields present in `buf` overwrite those in `msg`. Unknown fields
    /// read from `buf` are appended to those already in `msg`, or dropped
    /// under [`UnknownFieldPolicy::Discard`]; fields `msg` already holds are
    /// kept either way.
    pub fn merge<M: SchemaMessage>(&self, msg: &mut M, buf: impl Buf) -> Result<(), DecodingError> {
        let len = buf.remaining();
        if let Some(limit) = self.config.max_message_len.filter(|limit| len > *limit) {
            debug!(
                "refusing to decode {}: {} bytes over limit of {}",
                any::type_name::<M>(),
                len,
                limit
            );
            return Err(DecodingError::too_large(len, limit));
        }

        let discard = self.config.unknown_fields == UnknownFieldPolicy::Discard;
        let existing = if discard {
            msg.unknown_fields_mut().map(mem::take)
        } else {
            None
        };

        let result = msg.merge(buf);

        if let Some(existing) = existing {
            if let Some(unknown) = msg.unknown_fields_mut() {
                if !unknown.is_empty() {
                    debug!(
                        "discarding {} unknown field(s) of {}",
                        unknown.len(),
                        any::type_name::<M>()
                    );
                }
                *unknown = existing;
            }
        }

        if let Err(error) = result {
            debug!("failed to decode {}: {}", any::type_name::<M>(), error);
            return Err(error.into());
        }

        trace!("decoded {} ({} bytes)", any::type_name::<M>(), len);
        Ok(())
    }
}

/// Encodes `msg` with the default [`Codec`].
pub fn encode<M: Message>(msg: &M) -> Result<Vec<u8>, EncodingError> {
    Codec::default().encode(msg)
}

/// Decodes a message of type `M` with the default [`Codec`].
pub fn decode<M: SchemaMessage>(buf: impl Buf) -> Result<M, DecodingError> {
    Codec::default().decode(buf)
}
