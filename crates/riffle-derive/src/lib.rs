//! Derive macros for riffle destinations.
//!
//! - `ChunkRecord`: a struct whose `#[chunk(id = "....")]` fields are matched
//!   against chunk identifiers, in declaration order.
//! - `FixedLayout`: a `bytemuck::Pod` struct filled by a raw memory copy.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

#[proc_macro_derive(ChunkRecord, attributes(chunk))]
pub fn derive_chunk_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_chunk_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(FixedLayout)]
pub fn derive_fixed_layout(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    quote! {
        impl #impl_generics ::riffle_core::Destination for #name #ty_generics #where_clause {
            fn slot(&mut self) -> ::riffle_core::Slot<'_> {
                ::riffle_core::fixed_slot(self)
            }
        }

        impl #impl_generics ::riffle_core::Element for #name #ty_generics #where_clause {
            fn sequence_slot(_items: &mut ::std::vec::Vec<Self>) -> ::riffle_core::Slot<'_> {
                ::riffle_core::Slot::UnsupportedElement(::std::any::type_name::<Self>())
            }
        }
    }
    .into()
}

struct TaggedField {
    member: syn::Member,
    name: String,
    id: [u8; 4],
}

fn expand_chunk_record(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "ChunkRecord can only be derived for structs",
        ));
    };
    let fields: Vec<&syn::Field> = match &data.fields {
        Fields::Named(f) => f.named.iter().collect(),
        Fields::Unnamed(f) => f.unnamed.iter().collect(),
        Fields::Unit => Vec::new(),
    };

    let mut tagged = Vec::new();
    for (index, field) in fields.into_iter().enumerate() {
        let Some(id) = chunk_id(field)? else {
            continue;
        };
        let (member, name) = match &field.ident {
            Some(ident) => (syn::Member::Named(ident.clone()), ident.to_string()),
            None => (syn::Member::Unnamed(index.into()), index.to_string()),
        };
        tagged.push(TaggedField { member, name, id });
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let descriptors = tagged.iter().map(|f| {
        let field_name = &f.name;
        let [a, b, c, d] = f.id;
        quote! {
            ::riffle_core::FieldDescriptor::new(
                #field_name,
                ::riffle_core::FourCc::new([#a, #b, #c, #d]),
            )
        }
    });
    let arms = tagged.iter().enumerate().map(|(i, f)| {
        let member = &f.member;
        quote! {
            #i => ::riffle_core::Destination::slot(&mut self.#member),
        }
    });

    Ok(quote! {
        impl #impl_generics ::riffle_core::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> &'static [::riffle_core::FieldDescriptor] {
                const FIELDS: &[::riffle_core::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            fn field_slot(&mut self, index: usize) -> ::riffle_core::Slot<'_> {
                match index {
                    #(#arms)*
                    _ => ::riffle_core::Slot::Unsupported(::std::any::type_name::<Self>()),
                }
            }
        }

        impl #impl_generics ::riffle_core::Destination for #name #ty_generics #where_clause {
            fn slot(&mut self) -> ::riffle_core::Slot<'_> {
                ::riffle_core::Slot::Record(self)
            }
        }

        impl #impl_generics ::riffle_core::Element for #name #ty_generics #where_clause {
            fn sequence_slot(items: &mut ::std::vec::Vec<Self>) -> ::riffle_core::Slot<'_> {
                ::riffle_core::Slot::Collection(items)
            }
        }
    })
}

// `#[chunk(id = "fmt ")]`: exactly four ASCII bytes.
fn chunk_id(field: &syn::Field) -> syn::Result<Option<[u8; 4]>> {
    let mut id = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("chunk")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                let lit: LitStr = meta.value()?.parse()?;
                let value = lit.value();
                let bytes: [u8; 4] = value
                    .as_bytes()
                    .try_into()
                    .ok()
                    .filter(|_| value.is_ascii())
                    .ok_or_else(|| {
                        syn::Error::new(lit.span(), "chunk id must be exactly 4 ASCII characters")
                    })?;
                id = Some(bytes);
                Ok(())
            } else {
                Err(meta.error("expected `id = \"....\"`"))
            }
        })?;
    }
    Ok(id)
}
