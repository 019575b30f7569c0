use quote::ToTokens;
use rowkit_core::KeyGeneration;
use syn::{Field, Ident, LitStr, Type, ext::IdentExt, parse::ParseBuffer};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    /// Field name as seen by `Entity::field`, raw prefix removed.
    pub(crate) field: String,
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) key_generation: KeyGeneration,
    pub(crate) skip: bool,
}

pub(crate) fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let field_name = ident.unraw().to_string();
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        name: field_name.trim_start_matches('_').to_string(),
        field: field_name,
        primary_key: false,
        key_generation: KeyGeneration::None,
        skip: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("rowkit") {
            let Ok(list) = meta.require_list() else {
                panic!(
                    "Error while parsing `rowkit`, use it like: `#[rowkit(attribute = value, ...)]`",
                );
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[rowkit(name = \"my_column\")]`");
                    };
                    metadata.name = v.value();
                } else if arg.path.is_ident("primary_key") {
                    let Err(..) = arg.value() else {
                        // value() is Err for Meta::Path
                        panic!("Error while parsing `primary_key`, use it like: `#[rowkit(primary_key)]`");
                    };
                    metadata.primary_key = true;
                } else if arg.path.is_ident("auto_increment") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `auto_increment`, use it like: `#[rowkit(primary_key, auto_increment)]`");
                    };
                    set_generation(&mut metadata, KeyGeneration::AutoIncrement);
                } else if arg.path.is_ident("generated") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `generated`, use it like: `#[rowkit(primary_key, generated)]`");
                    };
                    set_generation(&mut metadata, KeyGeneration::GeneratedIdentifier);
                } else if arg.path.is_ident("skip") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `skip`, use it like: `#[rowkit(skip)]`");
                    };
                    metadata.skip = true;
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
    if metadata.key_generation != KeyGeneration::None && !metadata.primary_key {
        panic!(
            "Field `{}` declares a key generation but is not a primary key, use it like: `#[rowkit(primary_key, {})]`",
            metadata.field,
            if metadata.key_generation == KeyGeneration::AutoIncrement {
                "auto_increment"
            } else {
                "generated"
            }
        );
    }
    if metadata.skip && metadata.primary_key {
        panic!(
            "Field `{}` cannot be both skipped and part of the primary key",
            metadata.field
        );
    }
    metadata
}

fn set_generation(metadata: &mut ColumnMetadata, generation: KeyGeneration) {
    if metadata.key_generation != KeyGeneration::None {
        panic!(
            "Field `{}` can use either `auto_increment` or `generated`, not both",
            metadata.field
        );
    }
    metadata.key_generation = generation;
}
