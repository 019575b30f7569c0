use crate::{
    CBox, SqliteDriver,
    bind::bind_parameters,
    error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use async_stream::try_stream;
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_busy_timeout, sqlite3_changes, sqlite3_close,
    sqlite3_column_count, sqlite3_db_handle, sqlite3_errmsg, sqlite3_finalize,
    sqlite3_last_insert_rowid, sqlite3_open_v2, sqlite3_prepare_v2, sqlite3_step, sqlite3_stmt,
    sqlite3_total_changes,
};
use rowkit_core::{
    Connection, Context, Driver, Error, Executor, ParameterSet, QueryResult, Result, Row,
    RowLabeled, RowNames, RowsAffected, Statement,
    stream::{Stream, StreamExt},
    truncate_long,
};
use std::{
    ffi::{CStr, CString},
    pin::pin,
    ptr,
};
use tokio::task::spawn_blocking;

/// Milliseconds a statement waits on a locked database before failing.
const BUSY_TIMEOUT: i32 = 5000;

pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

impl SqliteConnection {
    fn run_prepared(
        statement: CBox<*mut sqlite3_stmt>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        try_stream! {
            let count = unsafe { sqlite3_column_count(*statement) };
            let labels = (0..count)
                .map(|i| extract_name(*statement, i))
                .collect::<Result<RowNames>>()?;
            let before = unsafe { sqlite3_total_changes(sqlite3_db_handle(*statement)) };
            loop {
                let rc = unsafe { sqlite3_step(*statement) };
                match rc {
                    SQLITE_ROW => {
                        let values = (0..count)
                            .map(|i| extract_value(*statement, i))
                            .collect::<Result<Row>>()?;
                        yield QueryResult::Row(RowLabeled::new(labels.clone(), values));
                    }
                    SQLITE_DONE => break,
                    _ => {
                        let error = unsafe {
                            Error::msg(
                                error_message_from_ptr(&sqlite3_errmsg(sqlite3_db_handle(
                                    *statement,
                                )))
                                .to_string(),
                            )
                        };
                        log::error!("{}", error);
                        Err::<(), Error>(error)?;
                    }
                }
            }
            if count == 0 {
                // The total also counts trigger and cascade writes, it only tells DML from DDL
                let (changes, last) = unsafe {
                    let db = sqlite3_db_handle(*statement);
                    let changes = if sqlite3_total_changes(db) > before {
                        sqlite3_changes(db)
                    } else {
                        0
                    };
                    (changes, sqlite3_last_insert_rowid(db))
                };
                yield QueryResult::Affected(RowsAffected {
                    rows_affected: changes.max(0) as u64,
                    last_affected_id: Some(last),
                });
            }
        }
    }
}

fn prepare(
    connection: CBox<*mut sqlite3>,
    sql: String,
    params: ParameterSet,
) -> Result<CBox<*mut sqlite3_stmt>> {
    let context = || format!("While preparing the statement:\n{}", truncate_long!(sql));
    let source = CString::new(sql.as_bytes()).with_context(context)?;
    unsafe {
        let mut statement = CBox::new(ptr::null_mut(), |p| {
            sqlite3_finalize(p);
        });
        let mut tail = ptr::null();
        let rc = sqlite3_prepare_v2(
            *connection,
            source.as_ptr(),
            -1,
            &mut *statement,
            &mut tail,
        );
        if rc != SQLITE_OK {
            let error =
                Error::msg(error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string())
                    .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        if statement.is_null() {
            return Err(Error::msg("The statement does not contain any SQL").context(context()));
        }
        if !tail.is_null()
            && !CStr::from_ptr(tail)
                .to_bytes()
                .iter()
                .all(|c| c.is_ascii_whitespace() || *c == b';')
        {
            return Err(
                Error::msg("Cannot prepare more than one statement at a time").context(context())
            );
        }
        bind_parameters(*statement, &params).with_context(context)?;
        Ok(statement)
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &SqliteDriver
    }

    fn run(&mut self, statement: &Statement) -> impl Stream<Item = Result<QueryResult>> + Send {
        let connection = CBox::new(*self.connection, |_| {});
        let sql = statement.sql.clone();
        let params = statement.params.clone();
        try_stream! {
            let prepared = spawn_blocking(move || prepare(connection, sql, params)).await??;
            let mut stream = pin!(Self::run_prepared(prepared));
            while let Some(value) = stream.next().await {
                yield value?;
            }
        }
    }
}

impl Connection for SqliteConnection {
    async fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", SqliteDriver::NAME);
        let Some(path) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{}`, found `{}`",
                prefix, url
            ));
            log::error!("{}", error);
            return Err(error);
        };
        let location = CString::new(format!("file:{}", path))
            .with_context(|| format!("Error while decoding connection URL: `{}`", url))?;
        spawn_blocking(move || unsafe {
            let mut connection = CBox::new(ptr::null_mut(), |p| {
                sqlite3_close(p);
            });
            let rc = sqlite3_open_v2(
                location.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_URI | SQLITE_OPEN_FULLMUTEX,
                ptr::null(),
            );
            if rc != SQLITE_OK {
                let error =
                    Error::msg(error_message_from_ptr(&sqlite3_errmsg(*connection)).to_string())
                        .context(format!(
                            "Could not open the database `{}`",
                            location.to_string_lossy()
                        ));
                log::error!("{:#}", error);
                return Err(error);
            }
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT);
            Ok(SqliteConnection { connection })
        })
        .await?
    }
}
