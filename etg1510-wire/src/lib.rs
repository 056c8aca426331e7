//! Traits used to pack/unpack structs and enums onto the ETG.1510 mailbox wire format.
//!
//! Fields are little-endian and bit-packed rather than byte-aligned; see
//! [`WireReadWrite::pack_to_slice`] and [`WireRead::unpack_from_slice`].

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]

mod error;
mod impls;
pub mod bits;

pub use error::WireError;
pub use etg1510_wire_derive::WireReadWrite;

/// A type that can be decoded from the beginning of a byte slice.
pub trait WireRead: Sized {
    /// Unpack this type from the beginning of the given buffer.
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError>;

    /// The length in bytes of this item once packed.
    fn packed_len(&self) -> usize;
}

/// A type that can be both packed onto, and unpacked from, the wire.
pub trait WireReadWrite: WireRead {
    /// Pack the type into the beginning of `buf`, returning the written slice.
    fn pack_to_slice<'buf>(&self, buf: &'buf mut [u8]) -> Result<&'buf [u8], WireError> {
        let len = self.packed_len();

        if buf.len() < len {
            return Err(WireError::BufferTooShort {
                required: len,
                available: buf.len(),
            });
        }

        Ok(self.pack_to_slice_unchecked(buf))
    }

    /// Pack the type into the beginning of `buf`.
    ///
    /// # Panics
    ///
    /// Implementations must panic if `buf` is too short to hold the packed data.
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8];
}

/// Implemented for types whose packed length is known at compile time.
pub trait WireReadWriteSized: WireReadWrite {
    /// Packed size in bytes.
    const PACKED_LEN: usize;

    /// A fixed-size buffer, `[u8; Self::PACKED_LEN]`, sized to hold one packed instance.
    type Buffer: AsRef<[u8]> + AsMut<[u8]>;

    /// Pack this item into a freshly allocated, correctly sized buffer.
    fn pack(&self) -> Self::Buffer;

    /// Produce a zeroed buffer of the correct size for this type.
    fn buffer() -> Self::Buffer;
}
