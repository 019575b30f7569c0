use crate::{Entity, Error, Result, TableDef};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

static TABLES: LazyLock<RwLock<HashMap<TypeId, Arc<TableDef>>>> =
    LazyLock::new(Default::default);

/// Metadata of `E`, validated and memoized by type.
///
/// Two threads resolving the same type for the first time may both compute it, the first
/// stored wins. A broken declaration fails with a [`ConfigurationError`](crate::ConfigurationError)
/// every time it is resolved.
pub fn resolve<E: Entity>() -> Result<Arc<TableDef>> {
    let id = TypeId::of::<E>();
    if let Some(table) = TABLES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(table.clone());
    }
    let table = E::table_def();
    if let Err(error) = table.validate(type_name::<E>()) {
        log::error!("{}", error);
        return Err(Error::new(error));
    }
    log::trace!(
        "Resolved metadata of {} (table `{}`, {} columns)",
        type_name::<E>(),
        table.name,
        table.columns.len()
    );
    let mut tables = TABLES.write().unwrap_or_else(PoisonError::into_inner);
    Ok(tables.entry(id).or_insert_with(|| Arc::new(table)).clone())
}
