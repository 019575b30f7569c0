use crate::{ColumnDef, ConfigurationError, KeyGeneration};
use std::{borrow::Cow, collections::HashSet};

/// Table name and ordered columns of an entity.
///
/// ```rust
/// use rowkit_core::{ColumnDef, KeyGeneration, TableDef};
/// let users = TableDef::new("users")
///     .column(ColumnDef::new("Id").with_name("id").primary_key(KeyGeneration::GeneratedIdentifier))
///     .column(ColumnDef::new("Name").with_name("name"));
/// assert_eq!(users.primary_key_defs().count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: Cow<'static, str>,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn primary_key_defs(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn value_defs(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| !c.primary_key)
    }

    pub fn column_by_field(&self, field: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Checks the declaration of `entity` is usable to generate statements.
    pub fn validate(&self, entity: &str) -> Result<(), ConfigurationError> {
        if self.name.trim().is_empty() {
            return Err(ConfigurationError::new(format!(
                "{} is missing the table name",
                entity
            )));
        }
        if self.columns.is_empty() {
            return Err(ConfigurationError::new(format!(
                "{} (table `{}`) does not declare any column",
                entity, self.name
            )));
        }
        let mut fields = HashSet::with_capacity(self.columns.len());
        let mut generated = 0;
        for column in &self.columns {
            if column.field.is_empty() || column.name.trim().is_empty() {
                return Err(ConfigurationError::new(format!(
                    "{} declares a column without a name",
                    entity
                )));
            }
            if !fields.insert(column.field.as_ref()) {
                return Err(ConfigurationError::new(format!(
                    "{} declares the field `{}` more than once",
                    entity, column.field
                )));
            }
            if !column.primary_key && column.key_generation != KeyGeneration::None {
                return Err(ConfigurationError::new(format!(
                    "{}: column `{}` has a key generation policy but is not a primary key",
                    entity, column.name
                )));
            }
            if column.is_auto_increment() || column.is_generated() {
                generated += 1;
            }
        }
        if generated > 1 {
            return Err(ConfigurationError::new(format!(
                "{} declares more than one generated primary key column",
                entity
            )));
        }
        Ok(())
    }
}
