use crate::decode_column::{ColumnMetadata, decode_column};
use convert_case::{Case, Casing};
use quote::ToTokens;
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    /// Persisted fields, in declaration order.
    pub(crate) columns: Vec<ColumnMetadata>,
    /// Fields marked with `skip`.
    pub(crate) skipped: Vec<ColumnMetadata>,
}

pub(crate) fn decode_table(item: ItemStruct) -> TableMetadata {
    let Fields::Named(..) = &item.fields else {
        panic!(
            "`Entity` can only be derived for structs with named fields, `{}` is not one",
            item.ident
        );
    };
    let mut name = item.ident.to_string().to_case(Case::Snake);
    if name.starts_with('_') {
        name.remove(0);
    }
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("rowkit") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `rowkit`, use it like: `#[rowkit(attribute = value, ..)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("table") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `table`, use it like: `#[rowkit(table = \"my_table\")]`"
                        );
                    };
                    name = value.value();
                } else {
                    panic!(
                        "Unknown attribute `{}` inside rowkit macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    let (skipped, columns): (Vec<_>, Vec<_>) = item.fields.iter().map(decode_column).partition(|c| c.skip);
    TableMetadata {
        item,
        name,
        columns,
        skipped,
    }
}
