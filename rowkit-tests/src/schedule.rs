use crate::setup;
use indoc::indoc;
use rowkit::{
    CommandService, ConnectionFactory, Entity, OutcomeStatus, QueryService, ScopedExecutor,
    Statement,
};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::LazyLock};
use time::{
    Date, PrimitiveDateTime, Time,
    macros::{date, datetime, time},
};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "meetings")]
pub struct Meeting {
    #[rowkit(primary_key, generated)]
    pub code: String,
    pub day: Date,
    pub starts: Time,
    pub created: Option<PrimitiveDateTime>,
    pub budget: Option<Decimal>,
    pub attachment: Option<Vec<u8>>,
    pub seats: u16,
}

pub async fn schedule<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    setup(executor, "DROP TABLE IF EXISTS meetings").await;
    setup(
        executor,
        indoc! {"
            CREATE TABLE meetings (
                code TEXT PRIMARY KEY,
                day TEXT NOT NULL,
                starts TEXT NOT NULL,
                created TEXT,
                budget TEXT,
                attachment BLOB,
                seats INTEGER NOT NULL
            )
        "},
    )
    .await;

    let mut standup = Meeting {
        code: String::new(),
        day: date!(2025 - 03 - 14),
        starts: time!(09:30),
        created: Some(datetime!(2025-03-01 17:45:12.25)),
        budget: Some(Decimal::from_str("1250.75").unwrap()),
        attachment: Some(vec![0xCA, 0xFE]),
        seats: 12,
    };
    let mut review = Meeting {
        code: "REVIEW-1".into(),
        day: date!(2025 - 03 - 15),
        starts: time!(14:00:30),
        created: None,
        budget: None,
        attachment: None,
        seats: 4,
    };
    for meeting in [&mut standup, &mut review] {
        let outcome = commands.insert(meeting).await;
        assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    }
    assert_eq!(standup.code.len(), 36, "Text keys receive a hyphenated uuid");
    assert_eq!(review.code, "REVIEW-1");

    // Temporal and decimal values survive the text representation
    let outcome = queries
        .get_statement::<Meeting>(&Statement::new("SELECT * FROM meetings ORDER BY day"))
        .await;
    assert_eq!(outcome.payload, Some(vec![standup.clone(), review.clone()]));

    // Comparisons on the stored text
    let outcome = queries
        .get(
            |day: &Date| {
                Statement::new("SELECT * FROM meetings WHERE day > @day").bind("day", *day)
            },
            &date!(2025 - 03 - 14),
        )
        .await;
    assert_eq!(outcome.payload, Some(vec![review.clone()]));

    review.budget = Some(Decimal::new(-1, 2));
    review.attachment = Some(vec![]);
    let outcome = commands.update(&review).await;
    assert_eq!(outcome.payload, Some(1), "{}", outcome);
    let outcome = queries
        .get_statement::<Meeting>(
            &Statement::new("SELECT * FROM meetings WHERE code = :code").bind("code", "REVIEW-1"),
        )
        .await;
    let stored = outcome.payload.unwrap().pop().unwrap();
    assert_eq!(stored.budget, Some(Decimal::from_str("-0.01").unwrap()));
    assert_eq!(stored.attachment, Some(vec![]));
    assert_eq!(stored.created, None);
}
