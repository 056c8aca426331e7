//! Builtin implementations for primitive and collection types.

use crate::{WireError, WireRead, WireReadWrite, WireReadWriteSized};

macro_rules! impl_primitive_wire_field {
    ($ty:ty, $size:expr) => {
        impl WireRead for $ty {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
                buf.get(0..$size)
                    .ok_or(WireError::DecodeError {
                        required: $size,
                        available: buf.len(),
                    })
                    .map(|raw| {
                        let mut bytes = [0u8; $size];
                        bytes.copy_from_slice(raw);
                        Self::from_le_bytes(bytes)
                    })
            }

            fn packed_len(&self) -> usize {
                $size
            }
        }

        impl WireReadWrite for $ty {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                let chunk = &mut buf[0..$size];

                chunk.copy_from_slice(&self.to_le_bytes());

                chunk
            }
        }

        impl WireReadWriteSized for $ty {
            const PACKED_LEN: usize = $size;

            type Buffer = [u8; $size];

            fn pack(&self) -> Self::Buffer {
                self.to_le_bytes()
            }

            fn buffer() -> Self::Buffer {
                [0u8; $size]
            }
        }
    };
}

impl_primitive_wire_field!(u8, 1);
impl_primitive_wire_field!(u16, 2);
impl_primitive_wire_field!(u32, 4);
impl_primitive_wire_field!(u64, 8);
impl_primitive_wire_field!(i8, 1);
impl_primitive_wire_field!(i16, 2);
impl_primitive_wire_field!(i32, 4);
impl_primitive_wire_field!(i64, 8);

impl WireRead for bool {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.first()
            .ok_or(WireError::DecodeError {
                required: 1,
                available: 0,
            })
            .map(|byte| *byte != 0)
    }

    fn packed_len(&self) -> usize {
        1
    }
}

impl WireReadWrite for bool {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        buf[0] = *self as u8;

        &buf[0..1]
    }
}

impl WireReadWriteSized for bool {
    const PACKED_LEN: usize = 1;

    type Buffer = [u8; 1];

    fn pack(&self) -> Self::Buffer {
        [*self as u8]
    }

    fn buffer() -> Self::Buffer {
        [0u8; 1]
    }
}

impl WireRead for () {
    fn unpack_from_slice(_buf: &[u8]) -> Result<Self, WireError> {
        Ok(())
    }

    fn packed_len(&self) -> usize {
        0
    }
}

impl WireReadWrite for () {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        &buf[0..0]
    }
}

impl WireReadWriteSized for () {
    const PACKED_LEN: usize = 0;

    type Buffer = [u8; 0];

    fn pack(&self) -> Self::Buffer {
        [0u8; 0]
    }

    fn buffer() -> Self::Buffer {
        [0u8; 0]
    }
}

impl<const N: usize> WireRead for [u8; N] {
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.get(0..N)
            .ok_or(WireError::DecodeError {
                required: N,
                available: buf.len(),
            })
            .map(|raw| {
                let mut out = [0u8; N];
                out.copy_from_slice(raw);
                out
            })
    }

    fn packed_len(&self) -> usize {
        N
    }
}

impl<const N: usize> WireReadWrite for [u8; N] {
    fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
        let buf = &mut buf[0..N];

        buf.copy_from_slice(self);

        buf
    }
}

impl<const N: usize> WireReadWriteSized for [u8; N] {
    const PACKED_LEN: usize = N;

    type Buffer = [u8; N];

    fn pack(&self) -> Self::Buffer {
        *self
    }

    fn buffer() -> Self::Buffer {
        [0u8; N]
    }
}

/// Blanket impl decoding a fixed-size array of sized, wire-readable elements.
impl<const N: usize, T> WireRead for [T; N]
where
    T: WireReadWriteSized + Copy + Default,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        let elem_len = T::PACKED_LEN;

        if buf.len() < elem_len * N {
            return Err(WireError::DecodeError {
                required: elem_len * N,
                available: buf.len(),
            });
        }

        let mut out = [T::default(); N];

        for (chunk, slot) in buf.chunks_exact(elem_len).zip(out.iter_mut()) {
            *slot = T::unpack_from_slice(chunk)?;
        }

        Ok(out)
    }

    fn packed_len(&self) -> usize {
        self.iter().map(WireReadWrite::packed_len).sum()
    }
}

/// Heapless-vector support, useful for variable-length but bounded sequences such as the
/// OD-List response's `ObjectIndex` field.
impl<const N: usize, T> WireRead for heapless::Vec<T, N>
where
    T: WireReadWriteSized,
{
    fn unpack_from_slice(buf: &[u8]) -> Result<Self, WireError> {
        buf.chunks_exact(T::PACKED_LEN)
            .map(T::unpack_from_slice)
            .collect::<Result<heapless::Vec<_, N>, WireError>>()
    }

    fn packed_len(&self) -> usize {
        self.iter().map(WireReadWrite::packed_len).sum()
    }
}
