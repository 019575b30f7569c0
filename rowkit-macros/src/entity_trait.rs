use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn entity_trait(table: &TableMetadata) -> TokenStream {
    let item = &table.item;
    let struct_name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let table_name = &table.name;
    let columns = table.columns.iter().map(|c| {
        let field = &c.field;
        let name = &c.name;
        let primary_key = if c.primary_key {
            let generation = c.key_generation;
            quote!(.primary_key(#generation))
        } else {
            TokenStream::new()
        };
        quote! {
            .column(::rowkit::ColumnDef::new(#field).with_name(#name)#primary_key)
        }
    });
    let getters = table.columns.iter().map(|c| {
        let field = &c.field;
        let ident = &c.ident;
        quote! {
            #field => Some(::rowkit::AsValue::as_value(::std::clone::Clone::clone(&self.#ident))),
        }
    });
    let setters = table.columns.iter().map(|c| {
        let field = &c.field;
        let ident = &c.ident;
        let ty = &c.ty;
        quote! {
            #field => {
                self.#ident = <#ty as ::rowkit::AsValue>::try_from_value(value)?;
                Ok(())
            }
        }
    });
    quote! {
        impl #impl_generics ::rowkit::Entity for #struct_name #ty_generics #where_clause {
            fn table_def() -> ::rowkit::TableDef {
                ::rowkit::TableDef::new(#table_name)
                    #(#columns)*
            }

            fn field(&self, field: &str) -> Option<::rowkit::Value> {
                match field {
                    #(#getters)*
                    _ => None,
                }
            }

            fn set_field(&mut self, field: &str, value: ::rowkit::Value) -> ::rowkit::Result<()> {
                match field {
                    #(#setters)*
                    _ => Err(::rowkit::Error::msg(format!(
                        "{} has no field `{}`",
                        stringify!(#struct_name),
                        field
                    ))),
                }
            }
        }
    }
}
