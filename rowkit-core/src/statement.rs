use crate::{Entity, GenericSqlWriter, ParameterSet, Result, SqlWriter, Value, truncate_long};
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

/// SQL text and its parameters, ready to be handed to an [`Executor`](crate::Executor).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: ParameterSet,
    /// Identifier produced while building an `INSERT`, if any.
    pub generated: Option<GeneratedKey>,
}

/// Key value synthesized for a `GeneratedIdentifier` column.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedKey {
    pub field: Cow<'static, str>,
    pub value: Value,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            ..Default::default()
        }
    }

    pub fn with_params(sql: impl Into<String>, params: ParameterSet) -> Self {
        Self {
            sql: sql.into(),
            params,
            generated: None,
        }
    }

    /// Appends a parameter binding.
    pub fn bind(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        self.params.add(name, value);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql))?;
        if !self.params.is_empty() {
            write!(f, " {}", self.params)?;
        }
        Ok(())
    }
}

impl From<&str> for Statement {
    fn from(value: &str) -> Self {
        Statement::new(value)
    }
}

impl From<String> for Statement {
    fn from(value: String) -> Self {
        Statement::new(value)
    }
}

impl<S: Into<String>> From<(S, ParameterSet)> for Statement {
    fn from((sql, params): (S, ParameterSet)) -> Self {
        Statement::with_params(sql, params)
    }
}

/// `INSERT` for `entity` using the generic writer. A generated key is written back
/// into `entity` and also reported in [`Statement::generated`].
pub fn generate_insert<E: Entity>(entity: &mut E) -> Result<Statement> {
    GenericSqlWriter::new().write_insert(entity)
}

/// `UPDATE` of every non-key column of `entity`, matched by its primary key.
pub fn generate_update<E: Entity>(entity: &E) -> Result<Statement> {
    GenericSqlWriter::new().write_update(entity)
}

/// `DELETE` of `entity`, matched by its primary key.
pub fn generate_delete<E: Entity>(entity: &E) -> Result<Statement> {
    GenericSqlWriter::new().write_delete(entity)
}
