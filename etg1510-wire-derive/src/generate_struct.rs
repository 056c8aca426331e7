use crate::parse_struct::StructMeta;
use quote::quote;
use syn::DeriveInput;

/// Combine the read and write halves of the derive output for a struct.
pub fn generate_struct(parsed: StructMeta, input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let read = generate_struct_read(&parsed, input);
    let write = generate_struct_write(&parsed, input);

    Ok(quote! {
        #read
        #write
    })
}

fn generate_struct_write(parsed: &StructMeta, input: &DeriveInput) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let size_bytes = parsed.width_bits.div_ceil(8);

    let fields_pack = parsed.fields.iter().map(|field| {
        if field.skip {
            return quote! {};
        }

        let field_name = &field.name;
        let field_ty = &field.ty;
        let bit_start = field.bit_start;
        let width = field.width;

        if field.is_byte_aligned() {
            let byte_start = field.byte_start();
            let byte_end = field.byte_end();

            quote! {
                <#field_ty as ::etg1510_wire::WireReadWrite>::pack_to_slice_unchecked(
                    &self.#field_name,
                    &mut buf[#byte_start..#byte_end],
                );
            }
        } else {
            quote! {
                ::etg1510_wire::bits::write_bits(
                    buf,
                    #bit_start,
                    #width,
                    ::etg1510_wire::bits::value_to_u64(&self.#field_name),
                )?;
            }
        }
    });

    quote! {
        impl ::etg1510_wire::WireReadWrite for #name {
            fn pack_to_slice<'buf>(&self, buf: &'buf mut [u8]) -> Result<&'buf [u8], ::etg1510_wire::WireError> {
                if buf.len() < #size_bytes {
                    return Err(::etg1510_wire::WireError::BufferTooShort {
                        required: #size_bytes,
                        available: buf.len(),
                    });
                }

                let buf = &mut buf[0..#size_bytes];

                for byte in buf.iter_mut() {
                    *byte = 0;
                }

                #(#fields_pack)*

                Ok(buf)
            }

            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                self.pack_to_slice(buf).expect("buffer too short for pack_to_slice_unchecked")
            }
        }

        impl ::etg1510_wire::WireReadWriteSized for #name {
            const PACKED_LEN: usize = #size_bytes;

            type Buffer = [u8; #size_bytes];

            fn pack(&self) -> Self::Buffer {
                let mut buf = [0u8; #size_bytes];

                ::etg1510_wire::WireReadWrite::pack_to_slice(self, &mut buf)
                    .expect("freshly allocated buffer is always the right size");

                buf
            }

            fn buffer() -> Self::Buffer {
                [0u8; #size_bytes]
            }
        }
    }
}

fn generate_struct_read(parsed: &StructMeta, input: &DeriveInput) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let size_bytes = parsed.width_bits.div_ceil(8);

    let fields_unpack = parsed.fields.iter().map(|field| {
        let field_name = &field.name;
        let ty = &field.ty;

        if field.skip {
            return quote! {
                #field_name: Default::default()
            };
        }

        let bit_start = field.bit_start;
        let width = field.width;

        if field.is_byte_aligned() {
            let byte_start = field.byte_start();
            let byte_end = field.byte_end();

            quote! {
                #field_name: <#ty as ::etg1510_wire::WireRead>::unpack_from_slice(&buf[#byte_start..#byte_end])?
            }
        } else {
            quote! {
                #field_name: ::etg1510_wire::bits::u64_to_value::<#ty>(
                    ::etg1510_wire::bits::read_bits(buf, #bit_start, #width)?
                )?
            }
        }
    });

    quote! {
        impl ::etg1510_wire::WireRead for #name {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, ::etg1510_wire::WireError> {
                let buf = buf.get(0..#size_bytes).ok_or(::etg1510_wire::WireError::DecodeError {
                    required: #size_bytes,
                    available: buf.len(),
                })?;

                Ok(Self {
                    #(#fields_unpack),*
                })
            }

            fn packed_len(&self) -> usize {
                #size_bytes
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use etg1510_wire::{WireRead, WireReadWrite};

    #[test]
    fn byte_aligned_fields_round_trip() {
        #[derive(etg1510_wire::WireReadWrite, PartialEq, Debug)]
        #[wire(bytes = 8)]
        struct TestType {
            #[wire(bits = 32)]
            a: i32,
            #[wire(bits = 32)]
            b: u32,
        }

        let value = TestType {
            a: -16,
            b: u32::MAX,
        };
        let mut slice = [0u8; 8];
        value.pack_to_slice(&mut slice).unwrap();
        assert_eq!(Ok(value), TestType::unpack_from_slice(&slice));
    }

    #[test]
    fn bit_packed_fields_round_trip() {
        #[derive(etg1510_wire::WireReadWrite, PartialEq, Debug)]
        #[wire(bytes = 2)]
        struct TestType {
            #[wire(bits = 11)]
            length: u16,
            #[wire(bits = 3)]
            reserved: u8,
            #[wire(bits = 1)]
            circulated: bool,
            #[wire(bits = 1)]
            repeated: bool,
        }

        let value = TestType {
            length: 0x4cb,
            reserved: 0b011,
            circulated: true,
            repeated: false,
        };
        let mut slice = [0u8; 2];
        value.pack_to_slice(&mut slice).unwrap();
        assert_eq!(Ok(value), TestType::unpack_from_slice(&slice));
    }
}
