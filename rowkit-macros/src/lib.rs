mod decode_column;
mod decode_table;
mod entity_trait;
mod from_row_trait;

use decode_table::decode_table;
use entity_trait::entity_trait;
use from_row_trait::from_row_trait;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `rowkit::Entity` and `rowkit::FromRow` for a struct with named fields.
///
/// ```ignore
/// #[derive(Entity)]
/// #[rowkit(table = "users")]
/// struct User {
///     #[rowkit(primary_key, generated)]
///     id: Uuid,
///     #[rowkit(name = "full_name")]
///     name: String,
///     #[rowkit(skip)]
///     cached: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(rowkit))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let table = decode_table(parse_macro_input!(input as ItemStruct));
    let entity = entity_trait(&table);
    let from_row = from_row_trait(&table);
    quote! {
        #entity
        #from_row
    }
    .into()
}

/// Implements only `rowkit::FromRow`, for row shapes that are not persisted on their own
/// (projections, the parts of a joined query). Accepts the same field attributes as `Entity`.
#[proc_macro_derive(FromRow, attributes(rowkit))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let table = decode_table(parse_macro_input!(input as ItemStruct));
    from_row_trait(&table).into()
}
