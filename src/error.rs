//! Encoding and decoding errors for the `Ydb` common messages.

use std::error::Error;
use std::fmt;

/// A `Ydb` message encoding error.
///
/// `EncodingError` indicates that a message could not be written as
/// declared, either because the destination buffer is too small or because
/// the encoded message exceeds the codec's size limit.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodingError {
    inner: Box<EncodingErrorKind>,
}

/// The cause of an [`EncodingError`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodingErrorKind {
    /// The destination buffer does not have room for the encoded message.
    InsufficientCapacity { required: usize, remaining: usize },
    /// The encoded message is larger than the configured limit.
    TooLarge { len: usize, limit: usize },
}

impl EncodingError {
    pub(crate) fn too_large(len: usize, limit: usize) -> EncodingError {
        EncodingErrorKind::TooLarge { len, limit }.into()
    }

    /// Get details about the encoding error.
    pub fn kind(&self) -> &EncodingErrorKind {
        &self.inner
    }
}

impl From<EncodingErrorKind> for EncodingError {
    fn from(kind: EncodingErrorKind) -> EncodingError {
        EncodingError {
            inner: Box::new(kind),
        }
    }
}

impl From<prost::EncodeError> for EncodingError {
    fn from(error: prost::EncodeError) -> EncodingError {
        EncodingErrorKind::InsufficientCapacity {
            required: error.required_capacity(),
            remaining: error.remaining(),
        }
        .into()
    }
}

impl fmt::Debug for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingError")
            .field("kind", &self.inner)
            .finish()
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to encode Ydb message: ")?;
        match &*self.inner {
            EncodingErrorKind::InsufficientCapacity {
                required,
                remaining,
            } => write!(
                f,
                "insufficient buffer capacity (required: {}, remaining: {})",
                required, remaining
            ),
            EncodingErrorKind::TooLarge { len, limit } => write!(
                f,
                "message length {} exceeds limit of {} bytes",
                len, limit
            ),
        }
    }
}

impl Error for EncodingError {}

/// A `Ydb` message decoding error.
///
/// `DecodingError` indicates that the input buffer does not contain a valid
/// message of the requested type. Wire-level failures keep the underlying
/// [`prost::DecodeError`] as their source, which carries the field path
/// where decoding stopped.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodingError {
    inner: Box<DecodingErrorKind>,
}

/// The cause of a [`DecodingError`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodingErrorKind {
    /// Truncated input, or an invalid key or varint.
    Malformed(prost::DecodeError),
    /// The input is larger than the configured limit.
    TooLarge { len: usize, limit: usize },
    /// A packed `Any` carries a different message type than requested.
    UnexpectedTypeUrl { expected: String, actual: String },
    /// No message type is registered under the given name.
    UnknownType(String),
}

impl DecodingError {
    pub(crate) fn too_large(len: usize, limit: usize) -> DecodingError {
        DecodingErrorKind::TooLarge { len, limit }.into()
    }

    pub(crate) fn unexpected_type_url(
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> DecodingError {
        DecodingErrorKind::UnexpectedTypeUrl {
            expected: expected.into(),
            actual: actual.into(),
        }
        .into()
    }

    pub(crate) fn unknown_type(name: impl Into<String>) -> DecodingError {
        DecodingErrorKind::UnknownType(name.into()).into()
    }

    /// Get details about the decoding error.
    pub fn kind(&self) -> &DecodingErrorKind {
        &self.inner
    }

    /// Returns `true` if the input was not a valid protobuf encoding.
    pub fn is_malformed(&self) -> bool {
        matches!(*self.inner, DecodingErrorKind::Malformed(_))
    }
}

impl From<DecodingErrorKind> for DecodingError {
    fn from(kind: DecodingErrorKind) -> DecodingError {
        DecodingError {
            inner: Box::new(kind),
        }
    }
}

impl From<prost::DecodeError> for DecodingError {
    fn from(error: prost::DecodeError) -> DecodingError {
        DecodingErrorKind::Malformed(error).into()
    }
}

impl fmt::Debug for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodingError")
            .field("kind", &self.inner)
            .finish()
    }
}

impl fmt::Display for DecodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.inner {
            // prost already names the failure and the field path.
            DecodingErrorKind::Malformed(error) => fmt::Display::fmt(error, f),
            DecodingErrorKind::TooLarge { len, limit } => write!(
                f,
                "failed to decode Ydb message: input length {} exceeds limit of {} bytes",
                len, limit
            ),
            DecodingErrorKind::UnexpectedTypeUrl { expected, actual } => write!(
                f,
                "failed to decode Ydb message: expected type URL: \"{}\" (got: \"{}\")",
                expected, actual
            ),
            DecodingErrorKind::UnknownType(name) => write!(
                f,
                "failed to decode Ydb message: no message type registered for \"{}\"",
                name
            ),
        }
    }
}

impl Error for DecodingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &*self.inner {
            DecodingErrorKind::Malformed(error) => Some(error),
            _ => None,
        }
    }
}
