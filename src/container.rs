//! The container model: a runtime-described record of named entries, and the binder
//! that projects raw SDO upload bytes onto one.

use crate::error::Error;
use crate::value::Value;

/// A compact wire-format hint naming a primitive type, independent of arity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FormatCode {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
    /// A fixed-size (or, if `size == 0` on the owning entry, variable-size) string.
    Str,
}

impl FormatCode {
    /// Size in bytes of one element of this primitive.
    pub fn element_size(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool | Self::Str => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }
}

/// A named, typed cell within a [`Container`].
#[derive(Debug, Clone)]
pub struct Entry {
    /// Filled in by discovery once the server's entry description is known.
    pub name: String,
    pub sub_index: u8,
    pub value: Value,
    pub format_code: FormatCode,
    /// Size in bytes on the wire. For sequences this is `element_count * element_size`.
    pub size: usize,
    /// Whether the server reports this entry as present. Disabled entries are skipped
    /// both by the descriptor generator and the binder.
    pub enable: bool,
}

impl Entry {
    pub fn new(name: impl Into<String>, sub_index: u8, format_code: FormatCode, size: usize) -> Self {
        Self {
            name: name.into(),
            sub_index,
            value: Value::U8(0),
            format_code,
            size,
            enable: true,
        }
    }

    fn arity(&self) -> usize {
        let element = self.format_code.element_size();

        if element == 0 {
            0
        } else {
            (self.size / element).max(1)
        }
    }

    fn is_sequence(&self) -> bool {
        matches!(self.value, Value::Seq(_))
    }
}

/// One piece of an unpack descriptor: a primitive code repeated `count` times, or a
/// one-byte alignment pad.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DescriptorPiece {
    Pad,
    Repeat(FormatCode, usize),
}

impl DescriptorPiece {
    fn size(self) -> usize {
        match self {
            Self::Pad => 1,
            Self::Repeat(code, count) => code.element_size() * count,
        }
    }
}

/// An ordered, named collection of entries describing one SDO index.
#[derive(Debug, Clone)]
pub struct Container {
    pub entries: Vec<Entry>,
}

impl Container {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn get_by_subindex(&self, sub_index: u8) -> Option<&Entry> {
        self.entries.iter().find(|e| e.sub_index == sub_index)
    }

    pub fn set_by_subindex(&mut self, sub_index: u8, entry: Entry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.sub_index == sub_index) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// The sequence of descriptor pieces, with alignment padding applied.
    ///
    /// Walks entries in declaration order, skipping disabled ones. After tentatively
    /// appending each piece to the accumulated descriptor, a one-byte pad is inserted
    /// ahead of it unless either the accumulated size so far, or the accumulated size
    /// plus the new piece, is even. This preserves natural 2-byte alignment of wide
    /// fields while still allowing consecutive byte-sized fields to pack tightly.
    pub fn unpack_descriptor(&self) -> Vec<DescriptorPiece> {
        let mut descriptor = Vec::new();
        let mut accumulated = 0usize;

        for entry in self.entries.iter().filter(|e| e.enable) {
            let element = entry.format_code.element_size();

            let piece = if entry.is_sequence() {
                DescriptorPiece::Repeat(entry.format_code, entry.arity())
            } else if element > 0 && entry.size > element {
                DescriptorPiece::Repeat(entry.format_code, entry.size / element)
            } else {
                DescriptorPiece::Repeat(entry.format_code, 1)
            };

            let piece_size = piece.size();

            if accumulated % 2 == 0 || (accumulated + piece_size) % 2 == 0 {
                descriptor.push(piece);
            } else {
                descriptor.push(DescriptorPiece::Pad);
                accumulated += 1;
                descriptor.push(piece);
            }

            accumulated += piece_size;
        }

        descriptor
    }

    /// Total size in bytes, consistent with [`Container::unpack_descriptor`].
    pub fn total_size(&self) -> usize {
        self.unpack_descriptor().iter().map(|p| p.size()).sum()
    }
}

/// Project raw SDO upload bytes onto a fresh copy of `container`, consuming the
/// descriptor in order.
///
/// Follows the protocol's binder procedure: if the container's declared `total_size` is
/// smaller than `payload`, the last enabled entry (a trailing string or sequence of
/// variable length) grows to absorb the excess before the descriptor is computed. If
/// `payload` is instead shorter than the descriptor's declared length, it is
/// zero-padded rather than rejected.
pub fn bind(payload: &[u8], mut container: Container) -> Result<Container, Error> {
    let declared_total = container.total_size();

    if declared_total < payload.len() {
        // The descriptor always puts the last enabled entry's piece last (any alignment
        // pad for it comes immediately before, never after), so subtracting its own
        // contribution from the total leaves exactly the space every other entry (plus
        // padding) needs; the remainder is what the last entry grows to absorb.
        let last_piece_size = container.unpack_descriptor().last().map(|p| p.size()).unwrap_or(0);
        let fixed_total = declared_total - last_piece_size;

        if let Some(last_enabled) = container.entries.iter_mut().filter(|e| e.enable).last() {
            last_enabled.size = payload.len().saturating_sub(fixed_total);
        }
    }

    let descriptor = container.unpack_descriptor();

    if descriptor.is_empty() {
        return Err(Error::NothingEnabled);
    }

    let descriptor_len: usize = descriptor.iter().map(|p| p.size()).sum();

    let mut owned;
    let payload: &[u8] = if payload.len() < descriptor_len {
        warn!(
            "response body ({} bytes) shorter than descriptor ({} bytes), zero-padding",
            payload.len(),
            descriptor_len
        );
        owned = payload.to_vec();
        owned.resize(descriptor_len, 0);
        &owned
    } else {
        payload
    };

    let enabled_indices: Vec<usize> = container
        .entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.enable)
        .map(|(i, _)| i)
        .collect();

    let mut cursor = 0usize;
    let mut descriptor_iter = descriptor.into_iter().peekable();
    let mut produced = 0usize;

    for &entry_index in enabled_indices.iter() {
        // Absorb any pad directly preceding this entry's piece.
        if matches!(descriptor_iter.peek(), Some(DescriptorPiece::Pad)) {
            descriptor_iter.next();
            cursor += 1;
        }

        let Some(DescriptorPiece::Repeat(code, count)) = descriptor_iter.next() else {
            return Err(Error::ShapeMismatch {
                expected: enabled_indices.len(),
                got: produced,
            });
        };

        let entry = &mut container.entries[entry_index];

        // An entry declared as a sequence (`Value::Seq`, e.g. a port array or a
        // multi-word request buffer) is decoded element-wise into a list; a `Str`
        // piece is instead consumed whole as one opaque, NUL-trimmed string. A
        // sequence entry whose own format code is `Str` can't be decoded either way,
        // so reject it instead of silently decoding an arbitrary one of the two.
        if entry.is_sequence() && code == FormatCode::Str {
            return Err(Error::TypeMismatch {
                expected: entry.format_code,
            });
        }

        if code == FormatCode::Str {
            let declared = code.element_size() * count;

            let bytes = payload
                .get(cursor..cursor + declared)
                .ok_or(Error::EndOfStream)?;

            let trimmed = match bytes.iter().position(|&b| b == 0) {
                Some(nul) => &bytes[..nul],
                None => bytes,
            };

            let text = String::from_utf8_lossy(trimmed).into_owned();

            entry.value = Value::Str(text);
            cursor += bytes.len();
        } else {
            let mut values = Vec::with_capacity(count);

            for _ in 0..count {
                let element_size = code.element_size();
                let raw = payload
                    .get(cursor..cursor + element_size)
                    .ok_or(Error::EndOfStream)?;

                values.push(decode_primitive(code, raw)?);
                cursor += element_size;
            }

            entry.value = if count == 1 && !entry.is_sequence() {
                values.into_iter().next().expect("count == 1")
            } else {
                Value::Seq(values)
            };
        }

        produced += 1;
    }

    Ok(container)
}

fn decode_primitive(code: FormatCode, raw: &[u8]) -> Result<Value, Error> {
    Ok(match code {
        FormatCode::U8 => Value::U8(raw[0]),
        FormatCode::I8 => Value::I8(raw[0] as i8),
        FormatCode::Bool => Value::Bool(raw[0] != 0),
        FormatCode::U16 => Value::U16(u16::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::I16 => Value::I16(i16::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::U32 => Value::U32(u32::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::I32 => Value::I32(i32::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::F32 => Value::F32(f32::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::U64 => Value::U64(u64::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::I64 => Value::I64(i64::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::F64 => Value::F64(f64::from_le_bytes(raw.try_into().unwrap())),
        FormatCode::Str => unreachable!("strings are handled separately in bind()"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_entry(name: &str, sub_index: u8) -> Entry {
        Entry::new(name, sub_index, FormatCode::U32, 4)
    }

    #[test]
    fn descriptor_alignment_matches_total_size() {
        let container = Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            u32_entry("VendorId", 1),
        ]);

        let descriptor = container.unpack_descriptor();
        let sum: usize = descriptor.iter().map(|p| p.size()).sum();

        assert_eq!(sum, container.total_size());
        // A u8 then a u32: 1 (odd) + pad (1) + 4 = 6 bytes total, preserving the u32's
        // natural alignment.
        assert_eq!(sum, 6);
        assert!(descriptor.contains(&DescriptorPiece::Pad));
    }

    #[test]
    fn disabled_entries_are_skipped() {
        let mut container = Container::new(vec![u32_entry("A", 0), u32_entry("B", 1)]);
        container.entries[1].enable = false;

        assert_eq!(container.total_size(), 4);
        assert_eq!(container.unpack_descriptor().len(), 1);
    }

    #[test]
    fn bind_fills_entries_in_order() {
        let container = Container::new(vec![
            Entry::new("NumberOfEntries", 0, FormatCode::U8, 1),
            u32_entry("SerialNumber", 8),
        ]);

        let payload = [0x05u8, 0x00, 0xef, 0xbe, 0xad, 0xde];

        let bound = bind(&payload, container).unwrap();

        assert_eq!(bound.get_by_subindex(0).unwrap().value, Value::U8(5));
        assert_eq!(
            bound.get_by_subindex(8).unwrap().value,
            Value::U32(0xdeadbeef)
        );
    }

    #[test]
    fn variable_length_string_absorbs_trailing_bytes() {
        let container = Container::new(vec![Entry::new("Name", 3, FormatCode::Str, 0)]);

        let payload = b"EK1100\0";

        let bound = bind(payload, container).unwrap();

        assert_eq!(
            bound.get_by_subindex(3).unwrap().value,
            Value::Str("EK1100".to_string())
        );
        assert_eq!(bound.get_by_subindex(3).unwrap().size, payload.len());
    }

    #[test]
    fn oversized_primitive_entry_grows_multiplicity_instead_of_erroring() {
        // spec.md's descriptor rule: a primitive entry whose size outgrows one element
        // (e.g. a server reporting a wider BitLength than templated) just repeats the
        // format code `size / element_size` times and comes back as a Seq, it is not
        // an error.
        let mut container = Container::new(vec![u32_entry("A", 0)]);
        container.entries[0].size = 8;

        let payload = [1, 0, 0, 0, 2, 0, 0, 0];

        let bound = bind(&payload, container).unwrap();

        assert_eq!(
            bound.get_by_subindex(0).unwrap().value,
            Value::Seq(vec![Value::U32(1), Value::U32(2)])
        );
    }

    #[test]
    fn sequence_entry_with_str_format_is_a_type_mismatch() {
        // A field declared as a sequence (element-wise decode) can't also be decoded
        // as a single opaque NUL-trimmed string; the two consumption rules conflict.
        let mut container = Container::new(vec![Entry::new("Name", 3, FormatCode::Str, 4)]);
        container.entries[0].value = Value::Seq(Vec::new());

        let payload = b"abcd";

        assert!(matches!(
            bind(payload, container),
            Err(Error::TypeMismatch {
                expected: FormatCode::Str
            })
        ));
    }

    #[test]
    fn nothing_enabled_is_an_error() {
        let mut container = Container::new(vec![u32_entry("A", 0)]);
        container.entries[0].enable = false;

        assert!(matches!(bind(&[], container), Err(Error::NothingEnabled)));
    }

    #[test]
    fn bind_is_idempotent() {
        let container = Container::new(vec![u32_entry("A", 0), u32_entry("B", 1)]);
        let payload = [1, 0, 0, 0, 2, 0, 0, 0];

        let a = bind(&payload, container.clone()).unwrap();
        let b = bind(&payload, container).unwrap();

        assert_eq!(
            a.entries.iter().map(|e| &e.value).collect::<Vec<_>>(),
            b.entries.iter().map(|e| &e.value).collect::<Vec<_>>()
        );
    }
}
