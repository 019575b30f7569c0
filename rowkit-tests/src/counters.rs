use crate::setup;
use rowkit::{
    CommandService, ConnectionFactory, Driver, Entity, OutcomeStatus, QueryService, RowLabeled,
    ScopedExecutor, SqlWriter, Statement,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "counters")]
pub struct Counter {
    #[rowkit(primary_key, auto_increment)]
    pub id: i64,
    pub label: String,
    #[rowkit(name = "current_value")]
    pub value: i32,
}

pub async fn counters<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    setup(executor, "DROP TABLE IF EXISTS counters").await;
    setup(
        executor,
        "CREATE TABLE counters (id INTEGER PRIMARY KEY, label TEXT NOT NULL, current_value INTEGER NOT NULL)",
    )
    .await;

    // The key is never written
    let mut draft = Counter {
        id: 99,
        label: "draft".into(),
        value: 0,
    };
    let statement = executor
        .factory()
        .driver()
        .sql_writer()
        .write_insert(&mut draft)
        .expect("Could not build the insert");
    assert!(statement.params.get("id").is_none(), "{}", statement);
    assert_eq!(statement.params.len(), 2);
    assert_eq!(statement.generated, None);
    assert_eq!(draft.id, 99);

    // Keys assigned by the database
    let mut counters = ["visits", "likes", "shares"]
        .into_iter()
        .enumerate()
        .map(|(i, label)| Counter {
            id: 0,
            label: label.into(),
            value: i as i32 * 10,
        })
        .collect::<Vec<_>>();
    for counter in counters.iter_mut() {
        let outcome = commands.insert(counter).await;
        assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
        assert_eq!(outcome.payload.map(|v| v.rows_affected), Some(1));
        assert_eq!(counter.id, 0, "Auto increment keys are not written back");
    }
    let outcome = queries
        .get_statement::<Counter>(&Statement::new(
            "SELECT id, label, current_value FROM counters ORDER BY id",
        ))
        .await;
    let stored = outcome.payload.expect("Counters must be found");
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|c| c.id > 0));
    assert!(stored.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(
        stored.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
        ["visits", "likes", "shares"]
    );
    assert_eq!(stored[2].value, 20);

    // Update through the assigned key
    let mut likes = stored[1].clone();
    likes.value += 1;
    let outcome = commands.update(&likes).await;
    assert_eq!(outcome.payload, Some(1), "{}", outcome);
    let outcome = queries
        .get(
            |id: &i64| {
                Statement::new("SELECT * FROM counters WHERE id = @id").bind("id", *id)
            },
            &likes.id,
        )
        .await;
    assert_eq!(outcome.payload, Some(vec![likes.clone()]));

    // Execute returns the rows affected
    let outcome = executor
        .execute(&Statement::new(
            "UPDATE counters SET current_value = current_value + 1",
        ))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.message, "3 record(s) affected.");
    assert_eq!(outcome.payload, Some(3));
    let outcome = executor
        .execute(
            &Statement::new("DELETE FROM counters WHERE label = @label").bind("label", "missing"),
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound);
    assert_eq!(outcome.payload, Some(0));

    // Writes made by triggers are not counted
    setup(executor, "DROP TABLE IF EXISTS counter_audit").await;
    setup(
        executor,
        "CREATE TABLE counter_audit (counter_id INTEGER NOT NULL, note TEXT NOT NULL)",
    )
    .await;
    setup(
        executor,
        "CREATE TRIGGER counters_audit AFTER UPDATE ON counters BEGIN \
            INSERT INTO counter_audit VALUES (NEW.id, 'before'); \
            INSERT INTO counter_audit VALUES (NEW.id, 'after'); \
        END",
    )
    .await;
    let outcome = executor
        .execute(
            &Statement::new("UPDATE counters SET label = @label WHERE id = @id")
                .bind("label", "views")
                .bind("id", stored[0].id),
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.message, "1 record(s) affected.");
    assert_eq!(outcome.payload, Some(1));
    let outcome = queries
        .get_statement_mapped(
            &Statement::new("SELECT * FROM counter_audit"),
            |row: RowLabeled| row.len(),
        )
        .await;
    assert_eq!(outcome.payload, Some(vec![2, 2]));
    setup(executor, "DROP TRIGGER counters_audit").await;
    setup(executor, "DROP TABLE counter_audit").await;

    // Delete by the assigned key
    let outcome = commands.delete(&stored[0]).await;
    assert_eq!(outcome.payload, Some(1));
    assert_eq!(Counter::metadata().unwrap().columns[2].name, "current_value");
}
