use crate::{
    ColumnDef, ConfigurationError, Entity, Error, GeneratedKey, ParameterSet, Result, Statement,
    TableDef, ValidationError, Value, separated_by,
};
use std::any::type_name;
use uuid::Uuid;

/// Dialect printer turning entity metadata into parameterized statements.
///
/// Identifiers come only from the resolved [`TableDef`], values are only ever bound as
/// `@field` parameters. Drivers override the small `write_*` hooks (identifier quoting,
/// placeholder syntax) and inherit the statement shapes:
///
/// ```sql
/// INSERT INTO <table> (<col>, ...) VALUES (@<field>, ...)
/// UPDATE <table> SET <col>=@<field>, ... WHERE <key>=@<field> AND ...
/// DELETE FROM <table> WHERE <key>=@<field> AND ...
/// ```
pub trait SqlWriter: Send + Sync {
    /// Render a table or column identifier.
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_table_name(&self, out: &mut String, table: &TableDef) {
        self.write_identifier(out, &table.name);
    }

    /// Render the placeholder bound to the parameter `name`.
    fn write_parameter(&self, out: &mut String, name: &str) {
        out.push('@');
        out.push_str(name);
    }

    /// Render `<col>=@<field>`.
    fn write_assignment(&self, out: &mut String, column: &ColumnDef) {
        self.write_identifier(out, &column.name);
        out.push('=');
        self.write_parameter(out, &column.field);
    }

    /// Source of identifiers for `GeneratedIdentifier` keys.
    fn generate_identifier(&self) -> Uuid {
        Uuid::new_v4()
    }

    /// Emit the `INSERT` statement of `entity`.
    ///
    /// `AutoIncrement` keys are left out. An empty `GeneratedIdentifier` key receives a fresh
    /// identifier which is stored back into `entity` before being bound.
    fn write_insert<E: Entity>(&self, entity: &mut E) -> Result<Statement>
    where
        Self: Sized,
    {
        let table = E::metadata()?;
        let mut columns = Vec::with_capacity(table.columns.len());
        let mut params = ParameterSet::with_capacity(table.columns.len());
        let mut generated = None;
        for column in &table.columns {
            if column.is_auto_increment() {
                continue;
            }
            let mut value = read_field(entity, column)?;
            if column.is_generated() && value.is_empty_key() {
                let Some(identifier) = value.with_identifier(self.generate_identifier()) else {
                    return Err(Error::new(ValidationError::new(format!(
                        "Column `{}` of {} cannot hold a generated identifier ({} value)",
                        column.name,
                        type_name::<E>(),
                        value.type_name()
                    ))));
                };
                entity.set_field(&column.field, identifier.clone())?;
                log::debug!(
                    "Generated {} = {} for table `{}`",
                    column.field,
                    identifier,
                    table.name
                );
                generated = Some(GeneratedKey {
                    field: column.field.clone(),
                    value: identifier.clone(),
                });
                value = identifier;
            }
            params.add(column.field.clone(), value);
            columns.push(column);
        }
        if columns.is_empty() {
            return Err(Error::new(ValidationError::new(
                "No columns found to insert",
            )));
        }
        let mut sql = String::with_capacity(64 + columns.len() * 32);
        sql.push_str("INSERT INTO ");
        self.write_table_name(&mut sql, &table);
        sql.push_str(" (");
        separated_by(
            &mut sql,
            &columns,
            |out, column| self.write_identifier(out, &column.name),
            ", ",
        );
        sql.push_str(") VALUES (");
        separated_by(
            &mut sql,
            &columns,
            |out, column| self.write_parameter(out, &column.field),
            ", ",
        );
        sql.push(')');
        Ok(Statement {
            sql,
            params,
            generated,
        })
    }

    /// Emit the `UPDATE` statement of `entity`: every non-key column is set, keys go in
    /// the `WHERE` clause.
    fn write_update<E: Entity>(&self, entity: &E) -> Result<Statement>
    where
        Self: Sized,
    {
        let table = E::metadata()?;
        let (keys, values): (Vec<_>, Vec<_>) = table.columns.iter().partition(|c| c.primary_key);
        if values.is_empty() {
            return Err(Error::new(ValidationError::new(
                "No columns found to update",
            )));
        }
        if keys.is_empty() {
            return Err(Error::new(ValidationError::new(
                "No primary key defined for update",
            )));
        }
        let mut params = ParameterSet::with_capacity(table.columns.len());
        for column in values.iter().chain(keys.iter()) {
            params.add(column.field.clone(), read_field(entity, column)?);
        }
        let mut sql = String::with_capacity(64 + table.columns.len() * 40);
        sql.push_str("UPDATE ");
        self.write_table_name(&mut sql, &table);
        sql.push_str(" SET ");
        separated_by(
            &mut sql,
            &values,
            |out, column| self.write_assignment(out, column),
            ", ",
        );
        self.write_key_condition(&mut sql, &keys);
        Ok(Statement::with_params(sql, params))
    }

    /// Emit the `DELETE` statement of `entity`, matched by its primary key.
    fn write_delete<E: Entity>(&self, entity: &E) -> Result<Statement>
    where
        Self: Sized,
    {
        let table = E::metadata()?;
        let keys: Vec<_> = table.primary_key_defs().collect();
        if keys.is_empty() {
            return Err(Error::new(ValidationError::new(
                "No primary key defined for delete",
            )));
        }
        let mut params = ParameterSet::with_capacity(keys.len());
        for column in &keys {
            params.add(column.field.clone(), read_field(entity, column)?);
        }
        let mut sql = String::with_capacity(64 + keys.len() * 40);
        sql.push_str("DELETE FROM ");
        self.write_table_name(&mut sql, &table);
        self.write_key_condition(&mut sql, &keys);
        Ok(Statement::with_params(sql, params))
    }

    /// Render ` WHERE <key>=@<field> AND ...`.
    fn write_key_condition(&self, out: &mut String, keys: &[&ColumnDef]) {
        out.push_str(" WHERE ");
        separated_by(
            out,
            keys,
            |out, column| self.write_assignment(out, column),
            " AND ",
        );
    }
}

fn read_field<E: Entity>(entity: &E, column: &ColumnDef) -> Result<Value> {
    entity.field(&column.field).ok_or_else(|| {
        let error = ConfigurationError::new(format!(
            "{} does not expose the declared field `{}`",
            type_name::<E>(),
            column.field
        ));
        log::error!("{}", error);
        Error::new(error)
    })
}

/// Fallback writer: bare identifiers and `@name` placeholders.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {}
