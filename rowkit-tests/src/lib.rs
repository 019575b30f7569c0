mod concurrent;
mod counters;
mod failures;
mod joins;
mod schedule;
mod users;

use concurrent::concurrent;
use counters::counters;
use failures::failures;
use joins::joins;
use log::LevelFilter;
use rowkit::{ConnectionFactory, OutcomeStatus, ScopedExecutor, Statement};
use schedule::schedule;
use std::env;
use users::users;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs every suite against the database reachable through `factory`. The database is expected
/// to be empty and to accept SQLite flavored DDL.
pub async fn execute_tests<F: ConnectionFactory>(factory: F) {
    let executor = ScopedExecutor::new(factory);
    users(&executor).await;
    counters(&executor).await;
    joins(&executor).await;
    schedule(&executor).await;
    failures(&executor).await;
    concurrent(&executor).await;
}

/// Runs DDL, which affects no rows: anything but `Failed` is fine.
pub(crate) async fn setup<F: ConnectionFactory>(executor: &ScopedExecutor<F>, sql: &str) {
    let outcome = executor.execute(&Statement::new(sql)).await;
    assert_ne!(
        outcome.status,
        OutcomeStatus::Failed,
        "Setup statement failed: {}\n{}",
        outcome.message,
        sql
    );
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
