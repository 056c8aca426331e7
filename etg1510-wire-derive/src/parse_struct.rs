use crate::help::{all_valid_attrs, attr_exists, bit_width_attr, usize_attr};
use syn::{DataStruct, DeriveInput, Fields, FieldsNamed, Ident, Type, Visibility};

#[derive(Clone)]
pub struct StructMeta {
    /// Width in bits on the wire.
    pub width_bits: usize,

    pub fields: Vec<FieldMeta>,
}

#[derive(Clone)]
pub struct FieldMeta {
    #[allow(unused)]
    pub vis: Visibility,
    pub name: Ident,
    pub ty: Type,

    /// Bit offset of this field's first bit, counted from the start of the struct, least
    /// significant bit of each byte first. Fields are no longer required to be
    /// byte-aligned: a field may begin or end mid-byte, which is how e.g. the EtherCAT
    /// datagram header's 11-bit `length` packs against the 3-bit `reserved`/`circulated`
    /// flags that follow it in the same halfword.
    pub bit_start: usize,
    pub width: usize,

    pub skip: bool,
}

impl FieldMeta {
    pub fn byte_start(&self) -> usize {
        self.bit_start / 8
    }

    pub fn byte_end(&self) -> usize {
        (self.bit_start + self.width).div_ceil(8)
    }

    /// True if this field occupies whole bytes and starts on a byte boundary, so it can
    /// be packed/unpacked via its own `WireReadWrite` impl rather than bit-by-bit.
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_start % 8 == 0 && self.width % 8 == 0
    }
}

pub fn parse_struct(
    s: DataStruct,
    DeriveInput { attrs, ident, .. }: DeriveInput,
) -> syn::Result<StructMeta> {
    // --- Struct attributes

    all_valid_attrs(&attrs, &["bits", "bytes"])?;

    let width = bit_width_attr(&attrs)?;

    let Some(width) = width else {
        return Err(syn::Error::new(
            ident.span(),
            "Struct total bit width is required, e.g. #[wire(bytes = 6)]",
        ));
    };

    // --- Fields

    let Fields::Named(FieldsNamed { named: fields, .. }) = s.fields else {
        return Err(syn::Error::new(
            ident.span(),
            "Only structs with named fields can be derived.",
        ));
    };

    let mut cursor = 0usize;

    let mut field_meta = Vec::new();

    for field in fields {
        all_valid_attrs(
            &field.attrs,
            &[
                "bits",
                "bytes",
                "skip",
                "pre_skip",
                "pre_skip_bytes",
                "post_skip",
                "post_skip_bytes",
            ],
        )?;

        // Unwrap: this is a named-field struct so the field will always have a name.
        let field_name = field.ident.unwrap();
        let field_width = bit_width_attr(&field.attrs)?;

        let skip = attr_exists(&field.attrs, "skip");

        let pre_skip = usize_attr(&field.attrs, "pre_skip")?
            .or(usize_attr(&field.attrs, "pre_skip_bytes")?.map(|bytes| bytes * 8))
            .filter(|_| !skip);

        let post_skip = usize_attr(&field.attrs, "post_skip")?
            .or(usize_attr(&field.attrs, "post_skip_bytes")?.map(|bytes| bytes * 8))
            .filter(|_| !skip);

        if let Some(skip) = pre_skip {
            cursor += skip;
        }

        let bit_start = cursor;

        if skip {
            // A skipped field contributes no bits of its own; only pre/post_skip move
            // the cursor. Its width is recorded as 0 so codegen never touches the wire
            // for it.
            field_meta.push(FieldMeta {
                name: field_name,
                vis: field.vis,
                ty: field.ty,
                bit_start,
                width: 0,
                skip,
            });
        } else {
            let Some(field_width) = field_width else {
                return Err(syn::Error::new(
                    field_name.span(),
                    "Field must have a width attribute, e.g. #[wire(bits = 4)]",
                ));
            };

            cursor += field_width;

            field_meta.push(FieldMeta {
                name: field_name,
                vis: field.vis,
                ty: field.ty,
                bit_start,
                width: field_width,
                skip,
            });
        }

        if let Some(skip) = post_skip {
            cursor += skip;
        }
    }

    if cursor != width {
        return Err(syn::Error::new(
            ident.span(),
            format!(
                "Total field width is {cursor}, expected {width} from struct definition"
            ),
        ));
    }

    Ok(StructMeta {
        width_bits: width,
        fields: field_meta,
    })
}
