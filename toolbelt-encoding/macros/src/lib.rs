//! Derive macros for `toolbelt_encoding::{Marshal, Unmarshal}`.
//!
//! Fields are visited in declaration order, which is the wire order.

use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse_macro_input;
use syn::parse_quote;
use syn::Data;
use syn::DeriveInput;
use syn::Fields;
use syn::Member;
use syn::Type;

/// Derives `toolbelt_encoding::Marshal` for a struct.
///
/// ```ignore
/// #[derive(Marshal)]
/// struct Header {
///     magic: [u8; 4],
///     len: u64,
/// }
/// ```
///
/// expands to
///
/// ```ignore
/// impl toolbelt_encoding::Marshal for Header
/// where
///     [u8; 4]: toolbelt_encoding::Marshal,
///     u64: toolbelt_encoding::Marshal,
/// {
///     fn marshal_into(&self, out: &mut Vec<u8>, order: toolbelt_encoding::ByteOrder)
///         -> toolbelt_encoding::Result<()>
///     {
///         toolbelt_encoding::Marshal::marshal_into(&self.magic, out, order)?;
///         toolbelt_encoding::Marshal::marshal_into(&self.len, out, order)?;
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_derive(Marshal)]
pub fn derive_marshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input, Direction::Marshal)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Derives `toolbelt_encoding::Unmarshal` for a struct, decoding each field
/// in place.
#[proc_macro_derive(Unmarshal)]
pub fn derive_unmarshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input, Direction::Unmarshal)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

#[derive(Clone, Copy)]
enum Direction {
    Marshal,
    Unmarshal,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Direction::Marshal => "Marshal",
            Direction::Unmarshal => "Unmarshal",
        }
    }
}

fn crate_path() -> syn::Path {
    parse_quote!(::toolbelt_encoding)
}

fn expand(input: DeriveInput, direction: Direction) -> syn::Result<TokenStream2> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;
    let crate_path = crate_path();

    let fields = match data {
        Data::Struct(data_struct) => data_struct.fields,
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new(
                Span::call_site(),
                format!("{} derive supports only structs", direction.name()),
            ));
        }
    };

    let (members, field_types) = struct_members(&fields);

    let trait_ident = syn::Ident::new(direction.name(), Span::call_site());
    let mut impl_generics = generics.clone();
    if !field_types.is_empty() {
        let where_clause = impl_generics.make_where_clause();
        for field_ty in &field_types {
            where_clause
                .predicates
                .push(parse_quote! { #field_ty: #crate_path::#trait_ident });
        }
    }
    let (impl_generics_tokens, _, where_clause_tokens) = impl_generics.split_for_impl();
    let (_, ty_generics, _) = generics.split_for_impl();

    let body = match direction {
        Direction::Marshal => {
            let steps = members.iter().map(|m| {
                quote! { #crate_path::Marshal::marshal_into(&self.#m, out, order)?; }
            });
            quote! {
                fn marshal_into(
                    &self,
                    out: &mut ::std::vec::Vec<u8>,
                    order: #crate_path::ByteOrder,
                ) -> #crate_path::Result<()> {
                    let _ = (&out, order);
                    #( #steps )*
                    Ok(())
                }
            }
        }
        Direction::Unmarshal => {
            let steps = members.iter().map(|m| {
                quote! { #crate_path::Unmarshal::unmarshal_from(&mut self.#m, reader, order)?; }
            });
            quote! {
                fn unmarshal_from<R: ::std::io::Read + ?Sized>(
                    &mut self,
                    reader: &mut R,
                    order: #crate_path::ByteOrder,
                ) -> #crate_path::Result<()> {
                    let _ = (&reader, order);
                    #( #steps )*
                    Ok(())
                }
            }
        }
    };

    Ok(quote! {
        impl #impl_generics_tokens #crate_path::#trait_ident for #ident #ty_generics #where_clause_tokens {
            #body
        }
    })
}

fn struct_members(fields: &Fields) -> (Vec<Member>, Vec<Type>) {
    let members = fields.members().collect();
    let types = fields.iter().map(|field| field.ty.clone()).collect();
    (members, types)
}
