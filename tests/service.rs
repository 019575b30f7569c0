#[cfg(test)]
mod tests {
    use rowkit::{
        CommandService, Connection, ConnectionFactory, Driver, Entity, Error, Executor, FromRow,
        GenericSqlWriter, OutcomeStatus, QueryResult, QueryService, Result, Row, RowLabeled,
        RowNames, RowsAffected, ScopedExecutor, Statement, Value, stream,
    };
    use std::{
        future::Future,
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use uuid::Uuid;

    #[derive(Default, Debug, Clone, Copy)]
    struct MockDriver;

    impl Driver for MockDriver {
        type Connection = MockConnection;
        type SqlWriter = GenericSqlWriter;
        const NAME: &'static str = "mock";
        fn sql_writer(&self) -> GenericSqlWriter {
            GenericSqlWriter::new()
        }
    }

    /// What every connection of a factory answers.
    #[derive(Debug, Clone)]
    enum Script {
        Rows(RowNames, Vec<Row>),
        Affected(u64),
        Fail(&'static str),
        Refuse,
    }

    #[derive(Default)]
    struct Journal {
        connects: AtomicUsize,
        drops: AtomicUsize,
        statements: Mutex<Vec<String>>,
    }

    impl Journal {
        fn connects(&self) -> usize {
            self.connects.load(Ordering::Relaxed)
        }
        fn drops(&self) -> usize {
            self.drops.load(Ordering::Relaxed)
        }
        fn statements(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    struct MockConnection {
        journal: Arc<Journal>,
        script: Script,
    }

    impl Drop for MockConnection {
        fn drop(&mut self) {
            self.journal.drops.fetch_add(1, Ordering::Relaxed);
        }
    }

    impl Executor for MockConnection {
        type Driver = MockDriver;

        fn driver(&self) -> &MockDriver {
            &MockDriver
        }

        fn run(
            &mut self,
            statement: &Statement,
        ) -> impl stream::Stream<Item = Result<QueryResult>> + Send {
            self.journal
                .statements
                .lock()
                .unwrap()
                .push(statement.sql.clone());
            let results: Vec<Result<QueryResult>> = match self.script.clone() {
                Script::Rows(labels, rows) => rows
                    .into_iter()
                    .map(|values| Ok(RowLabeled::new(labels.clone(), values).into()))
                    .collect(),
                Script::Affected(rows_affected) => vec![Ok(RowsAffected {
                    rows_affected,
                    last_affected_id: None,
                }
                .into())],
                Script::Fail(message) => vec![Err(Error::msg(message))],
                Script::Refuse => vec![],
            };
            stream::iter(results)
        }
    }

    impl Connection for MockConnection {
        async fn connect(url: &str) -> Result<MockConnection> {
            Err(Error::msg(format!("Cannot connect to `{}` without a factory", url)))
        }
    }

    struct MockFactory {
        journal: Arc<Journal>,
        script: Script,
        driver: MockDriver,
    }

    impl MockFactory {
        fn new(script: Script) -> (Self, Arc<Journal>) {
            let journal = Arc::new(Journal::default());
            (
                Self {
                    journal: journal.clone(),
                    script,
                    driver: MockDriver,
                },
                journal,
            )
        }
    }

    impl ConnectionFactory for MockFactory {
        type Connection = MockConnection;

        fn driver(&self) -> &MockDriver {
            &self.driver
        }

        fn connect(&self) -> impl Future<Output = Result<MockConnection>> + Send {
            let journal = self.journal.clone();
            let script = self.script.clone();
            async move {
                if let Script::Refuse = script {
                    return Err(Error::msg("Connection refused"));
                }
                journal.connects.fetch_add(1, Ordering::Relaxed);
                Ok(MockConnection { journal, script })
            }
        }
    }

    #[derive(FromRow, Debug, PartialEq)]
    struct Person {
        id: i64,
        name: String,
    }

    #[derive(FromRow, Debug, PartialEq)]
    struct Total {
        id: i64,
        total: f64,
    }

    #[derive(Entity, Debug, Default)]
    #[rowkit(table = "people")]
    struct Member {
        #[rowkit(primary_key, generated)]
        id: Uuid,
        name: String,
    }

    fn labels(names: &[&str]) -> RowNames {
        names.iter().map(|v| v.to_string()).collect()
    }

    fn people() -> Script {
        Script::Rows(
            labels(&["id", "name"]),
            vec![
                [Value::Int64(Some(1)), Value::Varchar(Some("Ann".into()))].into(),
                [Value::Int64(Some(2)), Value::Varchar(Some("Bob".into()))].into(),
            ],
        )
    }

    fn services(script: Script) -> (QueryService<MockFactory>, CommandService<MockFactory>, Arc<Journal>) {
        let (factory, journal) = MockFactory::new(script);
        let executor = ScopedExecutor::new(factory);
        (
            QueryService::new(executor.clone()),
            CommandService::new(executor),
            journal,
        )
    }

    #[tokio::test]
    async fn rows_are_materialized() {
        let (queries, _, journal) = services(people());
        let statement = Statement::new("SELECT id, name FROM people");
        let outcome = queries.get_statement::<Person>(&statement).await;
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.message, "Success");
        assert_eq!(
            outcome.payload,
            Some(vec![
                Person {
                    id: 1,
                    name: "Ann".into()
                },
                Person {
                    id: 2,
                    name: "Bob".into()
                },
            ])
        );
        let outcome = queries
            .get(|id: &i64| statement.clone().bind("id", *id), &1)
            .await;
        assert_eq!(outcome.payload.map(|v: Vec<RowLabeled>| v.len()), Some(2));
        assert_eq!(journal.connects(), 2);
        assert_eq!(journal.drops(), 2);
        assert_eq!(journal.statements(), [statement.sql.clone(), statement.sql]);
    }

    #[tokio::test]
    async fn mapped_rows() {
        let (queries, _, _) = services(people());
        let statement = Statement::new("SELECT id, name FROM people");
        let outcome = queries
            .get_statement_mapped(&statement, |p: Person| Person {
                id: p.id * 100,
                ..p
            })
            .await;
        assert_eq!(
            outcome.payload.map(|v| v.iter().map(|p| p.id).collect::<Vec<_>>()),
            Some(vec![100, 200])
        );

        // The mapped type does not need to be read from a row
        let outcome = queries
            .get_statement_mapped(&statement, |p: Person| p.name)
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(
            outcome.payload,
            Some(vec!["Ann".to_string(), "Bob".to_string()])
        );
        let outcome = queries
            .get_mapped(
                |id: &i64| statement.clone().bind("id", *id),
                &1,
                |row: RowLabeled| row.values().len(),
            )
            .await;
        assert_eq!(outcome.payload, Some(vec![2, 2]));
        let outcome = queries
            .get(|_: &str| statement.clone(), "")
            .await;
        assert_eq!(outcome.payload.map(|v: Vec<Person>| v[1].id), Some(2));
    }

    #[tokio::test]
    async fn empty_result() {
        let (queries, _, journal) = services(Script::Rows(labels(&["id", "name"]), vec![]));
        let outcome = queries
            .get_statement::<Person>(&Statement::new("SELECT id, name FROM people"))
            .await;
        assert_eq!(outcome.status, OutcomeStatus::NotFound);
        assert_eq!(outcome.message, "No records found.");
        assert_eq!(outcome.payload, Some(vec![]));
        assert!(!outcome.is_success());
        assert_eq!(journal.drops(), 1);
    }

    #[tokio::test]
    async fn blank_sql_never_connects() {
        let (queries, _, journal) = services(people());
        for sql in ["", "   ", "\n\t"] {
            let outcome = queries.get_statement::<Person>(&Statement::new(sql)).await;
            assert_eq!(outcome.status, OutcomeStatus::Invalid);
            assert_eq!(outcome.message, "SQL cannot be empty.");
            assert_eq!(outcome.payload, None);
        }
        let outcome = queries
            .get_by_join(&Statement::new(" "), Some(|p: Person, t: Total| (p, t)), "id")
            .await;
        assert_eq!(outcome.message, "SQL cannot be empty.");
        let outcome = queries
            .get_by_join(
                &Statement::new("SELECT 1"),
                None::<fn(Person, Total) -> i64>,
                "id",
            )
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Invalid);
        assert_eq!(outcome.message, "Table mapper cannot be null.");
        assert_eq!(journal.connects(), 0);
        assert!(journal.statements().is_empty());
    }

    #[tokio::test]
    async fn database_errors_become_failed() {
        let (queries, commands, journal) = services(Script::Fail("disk I/O error"));
        let outcome = queries
            .get_statement::<Person>(&Statement::new("SELECT * FROM people"))
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.message, "disk I/O error");
        assert_eq!(outcome.payload, None);
        let outcome = commands
            .update(&Member {
                id: Uuid::new_v4(),
                name: "Ann".into(),
            })
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        let outcome = queries
            .get_by_join(
                &Statement::new("SELECT * FROM people"),
                Some(|p: Person, t: Total| (p, t)),
                "id",
            )
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.message, "disk I/O error");
        assert_eq!(journal.connects(), 3);
        assert_eq!(journal.drops(), 3);
    }

    #[tokio::test]
    async fn connection_errors_become_failed() {
        let (queries, commands, journal) = services(Script::Refuse);
        let outcome = queries
            .get_statement::<Person>(&Statement::new("SELECT * FROM people"))
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.message, "Connection refused");
        let mut member = Member::default();
        let outcome = commands.insert(&mut member).await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.payload, None);
        assert_eq!(journal.connects(), 0);
        assert_eq!(journal.drops(), 0);
    }

    #[tokio::test]
    async fn commands_report_rows_affected() {
        let (_, commands, journal) = services(Script::Affected(1));
        let mut member = Member {
            name: "Ann".into(),
            ..Default::default()
        };
        let outcome = commands.insert(&mut member).await;
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.message, "1 record(s) affected.");
        let inserted = outcome.payload.unwrap();
        assert_eq!(inserted.rows_affected, 1);
        assert_eq!(
            inserted.generated.map(|v| v.value),
            Some(Value::Uuid(Some(member.id)))
        );
        let outcome = commands.delete(&member).await;
        assert_eq!(outcome.payload, Some(1));
        assert_eq!(
            journal.statements(),
            [
                "INSERT INTO people (id, name) VALUES (@id, @name)",
                "DELETE FROM people WHERE id=@id",
            ]
        );

        let (_, commands, _) = services(Script::Affected(0));
        let outcome = commands.update(&member).await;
        assert_eq!(outcome.status, OutcomeStatus::NotFound);
        assert_eq!(outcome.message, "No rows affected.");
        assert_eq!(outcome.payload, Some(0));
    }

    #[tokio::test]
    async fn rejected_commands_never_connect() {
        #[derive(Entity)]
        #[rowkit(table = "flags")]
        struct Flag {
            #[rowkit(primary_key)]
            name: String,
        }
        let (_, commands, journal) = services(Script::Affected(1));
        let outcome = commands
            .update(&Flag {
                name: "dark_mode".into(),
            })
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Invalid);
        assert_eq!(outcome.message, "No columns found to update");
        assert_eq!(outcome.payload, None);
        assert_eq!(journal.connects(), 0);
    }

    #[tokio::test]
    #[should_panic(expected = "is missing the table name")]
    async fn broken_metadata_panics() {
        #[derive(Entity)]
        #[rowkit(table = "")]
        struct Nameless {
            #[rowkit(primary_key)]
            id: i64,
            label: String,
        }
        let (_, commands, _) = services(Script::Affected(1));
        commands
            .update(&Nameless {
                id: 1,
                label: "x".into(),
            })
            .await;
    }

    #[tokio::test]
    async fn joined_rows() {
        let (queries, _, journal) = services(Script::Rows(
            labels(&["id", "name", "id", "total"]),
            vec![
                [
                    Value::Int64(Some(1)),
                    Value::Varchar(Some("Ann".into())),
                    Value::Int64(Some(10)),
                    Value::Float64(Some(4.5)),
                ]
                .into(),
                [
                    Value::Int64(Some(2)),
                    Value::Varchar(Some("Bob".into())),
                    Value::Int64(Some(11)),
                    Value::Float64(Some(0.5)),
                ]
                .into(),
            ],
        ));
        let statement = Statement::new("SELECT p.id, p.name, o.id, o.total FROM people p JOIN orders o");
        let outcome = queries
            .get_by_join(
                &statement,
                Some(|p: Person, t: Total| format!("{}:{}:{}", p.name, t.id, t.total)),
                "id",
            )
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(
            outcome.payload,
            Some(vec!["Ann:10:4.5".to_string(), "Bob:11:0.5".to_string()])
        );
        let outcome = queries
            .get_by_join(
                &statement,
                Some(|p: Person, t: Total| (p, t)),
                "total",
            )
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        let outcome = queries
            .get_by_join(&statement, Some(|p: Person, t: Total| (p, t)), "missing")
            .await;
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.message.contains("`missing`"), "{}", outcome.message);
        assert_eq!(journal.connects(), journal.drops());
    }
}
