use crate::parse_enum::EnumMeta;
use quote::quote;
use std::str::FromStr;
use syn::DeriveInput;

pub fn generate_enum(
    parsed: EnumMeta,
    input: &DeriveInput,
) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;
    let repr_type = &parsed.repr_type;

    let read_arms = parsed.variants.iter().filter(|v| !v.catch_all).map(|variant| {
        let value = proc_macro2::TokenStream::from_str(&variant.discriminant.to_string()).unwrap();
        let variant_name = &variant.name;

        quote! {
            #value => Ok(Self::#variant_name),
        }
    });

    let fallback = if let Some(catch_all) = &parsed.catch_all {
        let variant_name = &catch_all.name;

        quote! {
            other => Ok(Self::#variant_name(other)),
        }
    } else if let Some(default) = &parsed.default_variant {
        let variant_name = &default.name;

        quote! {
            _other => Ok(Self::#variant_name),
        }
    } else {
        quote! {
            other => Err(::etg1510_wire::WireError::InvalidDiscriminant(other as u64)),
        }
    };

    let write_arms = parsed.variants.iter().filter(|v| !v.catch_all).map(|variant| {
        let value = proc_macro2::TokenStream::from_str(&variant.discriminant.to_string()).unwrap();
        let variant_name = &variant.name;

        quote! {
            Self::#variant_name => #value,
        }
    });

    let write_fallback = if let Some(catch_all) = &parsed.catch_all {
        let variant_name = &catch_all.name;

        quote! {
            Self::#variant_name(raw) => *raw,
        }
    } else {
        quote! {}
    };

    let out = quote! {
        impl ::etg1510_wire::WireRead for #name {
            fn unpack_from_slice(buf: &[u8]) -> Result<Self, ::etg1510_wire::WireError> {
                const SIZE: usize = (#repr_type::BITS / 8) as usize;

                let raw = buf
                    .get(0..SIZE)
                    .ok_or(::etg1510_wire::WireError::DecodeError {
                        required: SIZE,
                        available: buf.len(),
                    })
                    .map(|bytes| {
                        let mut array = [0u8; SIZE];
                        array.copy_from_slice(bytes);

                        #repr_type::from_le_bytes(array)
                    })?;

                match raw {
                    #(#read_arms)*
                    #fallback
                }
            }

            fn packed_len(&self) -> usize {
                (#repr_type::BITS / 8) as usize
            }
        }

        impl ::etg1510_wire::WireReadWrite for #name {
            fn pack_to_slice_unchecked<'buf>(&self, buf: &'buf mut [u8]) -> &'buf [u8] {
                const SIZE: usize = (#repr_type::BITS / 8) as usize;

                let raw: #repr_type = match self {
                    #(#write_arms)*
                    #write_fallback
                };

                let chunk = &mut buf[0..SIZE];
                chunk.copy_from_slice(&raw.to_le_bytes());
                chunk
            }
        }

        impl ::etg1510_wire::WireReadWriteSized for #name {
            const PACKED_LEN: usize = (#repr_type::BITS / 8) as usize;

            type Buffer = [u8; (#repr_type::BITS / 8) as usize];

            fn pack(&self) -> Self::Buffer {
                let mut buf = [0u8; (#repr_type::BITS / 8) as usize];

                ::etg1510_wire::WireReadWrite::pack_to_slice_unchecked(self, &mut buf);

                buf
            }

            fn buffer() -> Self::Buffer {
                [0u8; (#repr_type::BITS / 8) as usize]
            }
        }
    };

    Ok(out)
}
