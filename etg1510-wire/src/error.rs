//! Encode/decode errors.

/// Wire encode/decode errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The destination buffer was too short to hold the packed representation of a value.
    BufferTooShort {
        /// Number of bytes required.
        required: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// A value did not fit into the declared bit width of a field.
    EncodeError {
        /// The field's declared width in bits.
        width: usize,
    },
    /// The source buffer did not contain enough bytes to decode a value.
    DecodeError {
        /// Number of bytes required.
        required: usize,
        /// Number of bytes available.
        available: usize,
    },
    /// A discriminant was read that does not correspond to any known variant.
    InvalidDiscriminant(u64),
}

#[cfg(feature = "std")]
impl std::error::Error for WireError {}

impl core::fmt::Display for WireError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferTooShort {
                required,
                available,
            } => write!(
                f,
                "buffer too short: need {required} bytes, have {available}"
            ),
            Self::EncodeError { width } => {
                write!(f, "value does not fit in a {width}-bit field")
            }
            Self::DecodeError {
                required,
                available,
            } => write!(
                f,
                "not enough bytes to decode: need {required}, have {available}"
            ),
            Self::InvalidDiscriminant(raw) => {
                write!(f, "{raw:#x} is not a valid discriminant for this type")
            }
        }
    }
}
