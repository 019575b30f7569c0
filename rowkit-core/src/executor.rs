use crate::{
    ConnectionFactory, Driver, Error, FromRow, JoinMap, Outcome, QueryResult, Result, RowLabeled,
    RowSplitter, RowsAffected, Statement,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::{future::Future, sync::Arc};

pub trait Executor: Send {
    type Driver: Driver;

    fn driver(&self) -> &Self::Driver;

    /// General method to send any statement and return any result type (either row or count)
    fn run(&mut self, statement: &Statement) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Execute the statement and returns the rows.
    fn fetch(&mut self, statement: &Statement) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(statement).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Execute the statement and return the total number of rows affected.
    fn execute(&mut self, statement: &Statement) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(statement)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }
}

/// Runs every call on its own connection and folds the result into an [`Outcome`].
///
/// The connection is opened at the start of the call and dropped before the outcome is
/// built, on success and on failure alike. No call returns `Err`.
pub struct ScopedExecutor<F: ConnectionFactory> {
    factory: Arc<F>,
}

impl<F: ConnectionFactory> ScopedExecutor<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    pub fn from_arc(factory: Arc<F>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Fetch and materialize every row.
    ///
    /// An empty result is `NotFound` with an empty payload.
    pub async fn query<T: FromRow>(&self, statement: &Statement) -> Outcome<Vec<T>> {
        match self.fetch_with(statement, T::from_row).await {
            Ok(rows) => rows_outcome(rows),
            Err(error) => failed(statement, error),
        }
    }

    /// Fetch rows spanning several shapes, split them on the `split_on` columns and feed the
    /// parts to `map`.
    pub async fn query_joined<Args, R, M: JoinMap<Args, R>>(
        &self,
        statement: &Statement,
        map: M,
        split_on: &str,
    ) -> Outcome<Vec<R>> {
        let mut splitter = match RowSplitter::new(split_on, M::PARTS) {
            Ok(splitter) => splitter,
            Err(error) => return failed(statement, error),
        };
        let result = self
            .fetch_with(statement, |row| map.map_row(splitter.split(row)?))
            .await;
        match result {
            Ok(rows) => rows_outcome(rows),
            Err(error) => failed(statement, error),
        }
    }

    /// Run a command, the payload is the number of rows affected.
    pub async fn execute(&self, statement: &Statement) -> Outcome<u64> {
        log::debug!("Executing: {}", statement);
        let result = async {
            let mut connection = self.factory.connect().await?;
            let result = connection.execute(statement).await;
            drop(connection);
            result
        }
        .await;
        match result {
            Ok(RowsAffected {
                rows_affected: 0, ..
            }) => Outcome::empty("No rows affected."),
            Ok(RowsAffected { rows_affected, .. }) => Outcome::success_with(
                rows_affected,
                format!("{} record(s) affected.", rows_affected),
            ),
            Err(error) => failed(statement, error),
        }
    }

    async fn fetch_with<T>(
        &self,
        statement: &Statement,
        mut materialize: impl FnMut(RowLabeled) -> Result<T>,
    ) -> Result<Vec<T>> {
        log::debug!("Querying: {}", statement);
        let mut connection = self.factory.connect().await?;
        let rows = connection
            .fetch(statement)
            .map(|row| row.and_then(&mut materialize))
            .try_collect::<Vec<_>>()
            .await;
        drop(connection);
        rows
    }
}

impl<F: ConnectionFactory> Clone for ScopedExecutor<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
        }
    }
}

fn rows_outcome<T>(rows: Vec<T>) -> Outcome<Vec<T>> {
    if rows.is_empty() {
        Outcome::empty("No records found.")
    } else {
        Outcome::success(rows)
    }
}

fn failed<T>(statement: &Statement, error: Error) -> Outcome<T> {
    log::error!("{:#}\nWhile running: {}", error, statement);
    Outcome::failed(format!("{:#}", error))
}
