use crate::{SqliteConnection, SqliteSqlWriter};
use rowkit_core::{Driver, UrlConnector};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub const fn new() -> Self {
        Self
    }
}

impl Driver for SqliteDriver {
    type Connection = SqliteConnection;
    type SqlWriter = SqliteSqlWriter;

    const NAME: &'static str = "sqlite";

    fn sql_writer(&self) -> SqliteSqlWriter {
        SqliteSqlWriter::new()
    }
}

/// Opens a new [`SqliteConnection`] on every call, from a `sqlite://<path>[?<uri parameters>]` URL.
///
/// ```no_run
/// use rowkit_core::ScopedExecutor;
/// use rowkit_sqlite::SqliteConnector;
/// let executor = ScopedExecutor::new(SqliteConnector::new("sqlite://app.sqlite?mode=rwc"));
/// ```
pub type SqliteConnector = UrlConnector<SqliteConnection>;
