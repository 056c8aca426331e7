//! Error types returned by this crate's wire codec, container binder, and client.

use crate::coe::CoeAbortCode;

/// Top level error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A value did not fit into the wire width declared for its field.
    EncodeError(etg1510_wire::WireError),

    /// A response's declared shape did not match the bytes actually received.
    DecodeError(etg1510_wire::WireError),

    /// A container had no enabled entries to bind bytes onto.
    NothingEnabled,

    /// A container declared more entries than the response payload could satisfy.
    ShapeMismatch {
        /// Number of entries the container expected.
        expected: usize,
        /// Number of values actually unpacked from the payload.
        got: usize,
    },

    /// A decoded value's kind did not match the entry it was being bound to.
    TypeMismatch {
        /// The entry's declared format.
        expected: crate::container::FormatCode,
    },

    /// The 3 second UDP session timeout elapsed while waiting for a response.
    Timeout,

    /// An index was requested that has no mapping member in the OD catalogue.
    UnknownIndex(u16),

    /// The peer responded to an SDO Information Service request with an error (opcode 7).
    SdoInfoError(CoeAbortCode),

    /// A mailbox response carried an SDO abort code.
    Aborted {
        /// The index the request was addressed to.
        index: u16,
        /// The sub-index the request was addressed to.
        sub_index: u8,
        /// The abort code the peer returned.
        code: CoeAbortCode,
    },

    /// A response body ended before its declared length, ending an iteration walk.
    EndOfStream,

    /// The UDP socket could not be created or used.
    Io(std::io::ErrorKind),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EncodeError(e) => write!(f, "encode error: {e}"),
            Self::DecodeError(e) => write!(f, "decode error: {e}"),
            Self::NothingEnabled => write!(f, "container has no enabled entries"),
            Self::ShapeMismatch { expected, got } => write!(
                f,
                "container expected {expected} entries but payload produced {got}"
            ),
            Self::TypeMismatch { expected } => {
                write!(f, "value kind did not match entry format {expected:?}")
            }
            Self::Timeout => write!(f, "timed out waiting for a mailbox response"),
            Self::UnknownIndex(index) => {
                write!(f, "index {index:#06x} is not in the OD catalogue")
            }
            Self::SdoInfoError(code) => write!(f, "SDO information service error: {code}"),
            Self::Aborted {
                index,
                sub_index,
                code,
            } => write!(f, "SDO upload of {index:#06x}:{sub_index} aborted: {code}"),
            Self::EndOfStream => write!(f, "response body ended before its declared length"),
            Self::Io(kind) => write!(f, "I/O error: {kind:?}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<etg1510_wire::WireError> for Error {
    fn from(value: etg1510_wire::WireError) -> Self {
        match value {
            etg1510_wire::WireError::EncodeError { .. } => Self::EncodeError(value),
            _ => Self::DecodeError(value),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.kind())
    }
}
