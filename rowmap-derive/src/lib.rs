use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derive macro for decoding a result row into a struct.
///
/// Generates an implementation of `rowmap::FromRow`, plus a
/// `rowmap::DecodeValue` implementation so the struct can also appear as a
/// nested or repeated-record field of another derived struct.
///
/// Each field reads the source column whose name is the field identifier
/// converted from lowerCamelCase to lower_snake_case. Two per-field
/// attributes adjust that:
///
/// - `#[rowmap(column = "name")]` — read the named column instead.
/// - `#[rowmap(skip)]` — never touch the row; fill the field from
///   `Default::default()`.
///
/// # Example
///
/// ```ignore
/// #[derive(FromRow)]
/// struct Trip {
///     pickup_zone: String,
///     #[rowmap(column = "n_trips")]
///     trips: i64,
/// }
/// ```
///
/// Only structs with named fields are supported.
#[proc_macro_derive(FromRow, attributes(rowmap))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn derive_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "FromRow only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "FromRow only supports structs",
            ));
        }
    };

    let mut field_tokens = Vec::new();

    for field in fields {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;
        let field_name_str = field_name.to_string();

        // Parse #[rowmap(...)] attributes.
        let mut column: Option<String> = None;
        let mut skip = false;

        for attr in &field.attrs {
            if !attr.path().is_ident("rowmap") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let value: LitStr = meta.value()?.parse()?;
                    column = Some(value.value());
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unknown rowmap attribute (expected 'column' or 'skip')"))
                }
            })?;
        }

        if skip && column.is_some() {
            return Err(syn::Error::new_spanned(
                field_name,
                "'skip' cannot be combined with 'column'",
            ));
        }

        let tokens = if skip {
            quote! { #field_name: ::core::default::Default::default() }
        } else if let Some(column) = column {
            quote! { #field_name: ::rowmap::decode_column(schema, row, #column)? }
        } else {
            quote! {
                #field_name: ::rowmap::decode_column(
                    schema,
                    row,
                    &::rowmap::column_name(#field_name_str),
                )?
            }
        };
        field_tokens.push(tokens);
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::rowmap::FromRow for #name #ty_generics #where_clause {
            fn from_row(
                schema: &::rowmap::Schema,
                row: &::rowmap::Row,
            ) -> ::core::result::Result<Self, ::rowmap::MapError> {
                ::core::result::Result::Ok(Self {
                    #(#field_tokens),*
                })
            }
        }

        #[automatically_derived]
        impl #impl_generics ::rowmap::DecodeValue for #name #ty_generics #where_clause {
            fn decode(
                field: &::rowmap::Field,
                value: &::rowmap::FieldValue,
            ) -> ::core::result::Result<Self, ::rowmap::MapError> {
                ::rowmap::decode_record(field, value)
            }

            fn check_field(
                field: &::rowmap::Field,
            ) -> ::core::result::Result<(), ::rowmap::MapError> {
                ::rowmap::check_record::<Self>(field)
            }
        }
    })
}
