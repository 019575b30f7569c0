use crate::{Result, TableDef, Value, resolve};
use std::sync::Arc;

/// A statically typed record mapped to one table.
///
/// Usually implemented with `#[derive(Entity)]`. A manual implementation declares the
/// table with the [`TableDef`] builder and exposes the persisted fields by name.
pub trait Entity: Send + Sync + 'static {
    /// The declared metadata. Called once per type, see [`resolve`].
    fn table_def() -> TableDef
    where
        Self: Sized;

    /// Current value of a persisted field, `None` if the entity has no such field.
    fn field(&self, field: &str) -> Option<Value>;

    /// Stores a value into a persisted field.
    fn set_field(&mut self, field: &str, value: Value) -> Result<()>;

    /// Validated, memoized metadata of this entity type.
    fn metadata() -> Result<Arc<TableDef>>
    where
        Self: Sized,
    {
        resolve::<Self>()
    }
}
