use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;

pub(crate) fn from_row_trait(table: &TableMetadata) -> TokenStream {
    let item = &table.item;
    let struct_name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let holder = |ident: &syn::Ident| format_ident!("__{}", ident.unraw());
    let fields_holder_declarations = table.columns.iter().map(|c| {
        let holder = holder(&c.ident);
        let ty = &c.ty;
        quote! {
            let mut #holder: Option<#ty> = None;
        }
    });
    let field_assignment = table
        .columns
        .iter()
        .map(|c| {
            let holder = holder(&c.ident);
            let name = &c.name;
            let ty = &c.ty;
            quote! {
                if #holder.is_none() && __n__.eq_ignore_ascii_case(#name) {
                    #holder = Some(::rowkit::Context::with_context(
                        <#ty as ::rowkit::AsValue>::try_from_value(__v__),
                        || format!("While decoding the column `{}`", #name),
                    )?);
                }
            }
        })
        .reduce(|acc, cur| quote!(#acc else #cur))
        .unwrap_or_default();
    let create_result = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let holder = holder(&c.ident);
        let name = &c.name;
        quote! {
            #ident: #holder.ok_or_else(|| __make_error__(#name))?
        }
    });
    let remaining = table.skipped.iter().map(|c| {
        let ident = &c.ident;
        quote!(#ident: ::std::default::Default::default())
    });
    quote! {
        impl #impl_generics ::rowkit::FromRow for #struct_name #ty_generics #where_clause {
            fn from_row(row: ::rowkit::RowLabeled) -> ::rowkit::Result<Self> {
                #(#fields_holder_declarations)*
                for (__n__, __v__) in ::std::iter::zip(row.labels.iter(), row.values.into_vec())
                {
                    #field_assignment
                }
                let __make_error__ = |name: &str| ::rowkit::Error::msg(format!(
                    "Column `{}` does not exist in the row provided",
                    name
                ));
                Ok(Self {
                    #(#create_result,)*
                    #(#remaining,)*
                })
            }
        }
    }
}
