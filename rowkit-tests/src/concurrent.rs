use crate::setup;
use futures::future::join_all;
use rowkit::{
    CommandService, ConnectionFactory, Entity, OutcomeStatus, QueryService, ScopedExecutor,
    Statement,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "readings")]
pub struct Reading {
    #[rowkit(primary_key)]
    pub sensor: String,
    #[rowkit(primary_key)]
    pub sequence: i32,
    pub celsius: f64,
}

pub async fn concurrent<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    setup(executor, "DROP TABLE IF EXISTS readings").await;
    setup(
        executor,
        "CREATE TABLE readings (sensor TEXT NOT NULL, sequence INTEGER NOT NULL, celsius REAL NOT NULL, PRIMARY KEY (sensor, sequence))",
    )
    .await;

    // Every call opens its own connection
    let readings = (0..40)
        .map(|i| Reading {
            sensor: format!("sensor-{}", i % 4),
            sequence: i / 4,
            celsius: 18.0 + i as f64 * 0.25,
        })
        .collect::<Vec<_>>();
    let outcomes = join_all(readings.iter().cloned().map(|mut reading| {
        let commands = commands.clone();
        async move { commands.insert(&mut reading).await }
    }))
    .await;
    for outcome in &outcomes {
        assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    }

    // Reads interleaved
    let outcomes = join_all((0..4).map(|sensor| {
        let queries = queries.clone();
        async move {
            queries
                .get::<Reading, _>(
                    |sensor: &String| {
                        Statement::new(
                            "SELECT * FROM readings WHERE sensor = @sensor ORDER BY sequence",
                        )
                        .bind("sensor", sensor.clone())
                    },
                    &format!("sensor-{}", sensor),
                )
                .await
        }
    }))
    .await;
    for (i, outcome) in outcomes.into_iter().enumerate() {
        let rows = outcome.payload.expect("Every sensor has readings");
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|r| r.sensor == format!("sensor-{}", i)));
        assert_eq!(rows[3], readings[3 * 4 + i]);
    }

    // Composite keys
    let mut changed = readings[5].clone();
    changed.celsius = -4.5;
    let (updated, deleted) = futures::join!(
        commands.update(&changed),
        commands.delete(&readings[6]),
    );
    assert_eq!(updated.payload, Some(1), "{}", updated);
    assert_eq!(deleted.payload, Some(1), "{}", deleted);
    let outcome = queries
        .get_statement::<Reading>(
            &Statement::new("SELECT * FROM readings WHERE sensor = @sensor AND sequence = @sequence")
                .bind("sensor", changed.sensor.clone())
                .bind("sequence", changed.sequence),
        )
        .await;
    assert_eq!(outcome.payload, Some(vec![changed]));
    let outcome = executor
        .execute(&Statement::new("DELETE FROM readings"))
        .await;
    assert_eq!(outcome.payload, Some(39));
}
