use crate::{Connection, SqlWriter};

/// A database backend: its connection type and its SQL dialect.
pub trait Driver: Default + Send + Sync {
    type Connection: Connection<Driver = Self>;
    type SqlWriter: SqlWriter;

    /// Scheme of the connection URLs this driver accepts (`sqlite` for `sqlite://...`).
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
