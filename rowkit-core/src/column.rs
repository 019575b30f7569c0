use proc_macro2::TokenStream;
use quote::{ToTokens, TokenStreamExt, quote};
use std::borrow::Cow;

/// How the value of a primary key column is produced on insert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyGeneration {
    /// Not a key.
    #[default]
    None,
    /// Assigned by the database, never written by `INSERT`.
    AutoIncrement,
    /// A fresh uuid is generated when the current value is empty.
    GeneratedIdentifier,
    /// Provided by the caller and used as-is.
    ExternallySupplied,
}

impl ToTokens for KeyGeneration {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        use KeyGeneration::*;
        tokens.append_all(match self {
            None => quote!(::rowkit::KeyGeneration::None),
            AutoIncrement => quote!(::rowkit::KeyGeneration::AutoIncrement),
            GeneratedIdentifier => quote!(::rowkit::KeyGeneration::GeneratedIdentifier),
            ExternallySupplied => quote!(::rowkit::KeyGeneration::ExternallySupplied),
        });
    }
}

/// Declaration of a persisted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Entity field, also the name of the bound parameter (`@field`).
    pub field: Cow<'static, str>,
    /// Column name in the table.
    pub name: Cow<'static, str>,
    pub primary_key: bool,
    pub key_generation: KeyGeneration,
}

impl ColumnDef {
    /// A regular column named after the field.
    pub fn new(field: impl Into<Cow<'static, str>>) -> Self {
        let field = field.into();
        Self {
            name: field.clone(),
            field,
            primary_key: false,
            key_generation: KeyGeneration::None,
        }
    }

    /// Overrides the column name (defaults to the field name).
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = name.into();
        self
    }

    /// Marks the column as (part of) the primary key. `KeyGeneration::None` means the
    /// caller supplies the value.
    pub fn primary_key(mut self, generation: KeyGeneration) -> Self {
        self.primary_key = true;
        self.key_generation = match generation {
            KeyGeneration::None => KeyGeneration::ExternallySupplied,
            v => v,
        };
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.primary_key && self.key_generation == KeyGeneration::AutoIncrement
    }

    pub fn is_generated(&self) -> bool {
        self.primary_key && self.key_generation == KeyGeneration::GeneratedIdentifier
    }
}
