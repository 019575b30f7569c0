use crate::{
    ConfigurationError, ConnectionFactory, Driver, Entity, Error, Executor, FromRow,
    GeneratedKey, JoinMap, Outcome, OutcomeStatus, Result, ScopedExecutor, SqlWriter, Statement,
    ValidationError,
};

/// Read side: runs caller supplied statements through a [`ScopedExecutor`].
///
/// Blank statements are answered with `Invalid` without opening any connection.
pub struct QueryService<F: ConnectionFactory> {
    executor: ScopedExecutor<F>,
}

impl<F: ConnectionFactory> QueryService<F> {
    pub fn new(executor: ScopedExecutor<F>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ScopedExecutor<F> {
        &self.executor
    }

    /// Build the statement from `filter` and fetch the rows as `T`.
    pub async fn get<T, Filter>(
        &self,
        builder: impl FnOnce(&Filter) -> Statement,
        filter: &Filter,
    ) -> Outcome<Vec<T>>
    where
        T: FromRow,
        Filter: ?Sized,
    {
        self.get_statement(&builder(filter)).await
    }

    /// Like [`QueryService::get`], the rows are fetched as `Raw` and passed through `map`.
    /// Without a mapping step use [`QueryService::get`] with the result type directly.
    pub async fn get_mapped<Raw, R, Filter>(
        &self,
        builder: impl FnOnce(&Filter) -> Statement,
        filter: &Filter,
        map: impl Fn(Raw) -> R,
    ) -> Outcome<Vec<R>>
    where
        Raw: FromRow,
        Filter: ?Sized,
    {
        self.get_statement_mapped(&builder(filter), map).await
    }

    pub async fn get_statement<T: FromRow>(&self, statement: &Statement) -> Outcome<Vec<T>> {
        if statement.is_blank() {
            return invalid("SQL cannot be empty.");
        }
        self.executor.query(statement).await
    }

    pub async fn get_statement_mapped<Raw: FromRow, R>(
        &self,
        statement: &Statement,
        map: impl Fn(Raw) -> R,
    ) -> Outcome<Vec<R>> {
        self.get_statement::<Raw>(statement)
            .await
            .map(|rows| rows.into_iter().map(map).collect())
    }

    /// Fetch rows spanning 2 to 4 shapes, see [`ScopedExecutor::query_joined`].
    pub async fn get_by_join<Args, R, M>(
        &self,
        statement: &Statement,
        map: Option<M>,
        split_on: &str,
    ) -> Outcome<Vec<R>>
    where
        M: JoinMap<Args, R>,
    {
        if statement.is_blank() {
            return invalid("SQL cannot be empty.");
        }
        let Some(map) = map else {
            return invalid("Table mapper cannot be null.");
        };
        let outcome = self.executor.query_joined(statement, map, split_on).await;
        match outcome.status {
            OutcomeStatus::Failed => outcome,
            _ => match outcome.payload {
                Some(rows) if !rows.is_empty() => Outcome::success(rows),
                _ => Outcome::empty("No records found."),
            },
        }
    }
}

impl<F: ConnectionFactory> Clone for QueryService<F> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
        }
    }
}

/// Rows written by [`CommandService::insert`] and the identifier generated for the key, if any.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Inserted {
    pub rows_affected: u64,
    pub generated: Option<GeneratedKey>,
}

/// Write side: builds `INSERT`/`UPDATE`/`DELETE` from the entity metadata with the driver's
/// [`SqlWriter`] and executes them.
///
/// # Panics
///
/// When the entity metadata is broken (a [`ConfigurationError`]).
pub struct CommandService<F: ConnectionFactory> {
    executor: ScopedExecutor<F>,
}

impl<F: ConnectionFactory> CommandService<F> {
    pub fn new(executor: ScopedExecutor<F>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ScopedExecutor<F> {
        &self.executor
    }

    fn sql_writer(&self) -> <<F::Connection as Executor>::Driver as Driver>::SqlWriter {
        self.executor.factory().driver().sql_writer()
    }

    /// Insert `entity`, a generated key is stored into it before the statement runs.
    pub async fn insert<E: Entity>(&self, entity: &mut E) -> Outcome<Inserted> {
        let statement = match self.sql_writer().write_insert(entity) {
            Ok(statement) => statement,
            Err(error) => return rejected(error),
        };
        let generated = statement.generated.clone();
        self.executor
            .execute(&statement)
            .await
            .map(|rows_affected| Inserted {
                rows_affected,
                generated,
            })
    }

    pub async fn update<E: Entity>(&self, entity: &E) -> Outcome<u64> {
        self.run(self.sql_writer().write_update(entity)).await
    }

    pub async fn delete<E: Entity>(&self, entity: &E) -> Outcome<u64> {
        self.run(self.sql_writer().write_delete(entity)).await
    }

    async fn run(&self, statement: Result<Statement>) -> Outcome<u64> {
        match statement {
            Ok(statement) => self.executor.execute(&statement).await,
            Err(error) => rejected(error),
        }
    }
}

impl<F: ConnectionFactory> Clone for CommandService<F> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
        }
    }
}

fn invalid<T>(message: &str) -> Outcome<T> {
    log::error!("{}", message);
    Outcome::invalid(message)
}

/// Outcome of a statement that could not be built.
fn rejected<T>(error: Error) -> Outcome<T> {
    if let Some(error) = error.downcast_ref::<ConfigurationError>() {
        log::error!("{}", error);
        panic!("{}", error);
    }
    if let Some(error) = error.downcast_ref::<ValidationError>() {
        return invalid(&error.to_string());
    }
    log::error!("{:#}", error);
    Outcome::failed(format!("{:#}", error))
}
