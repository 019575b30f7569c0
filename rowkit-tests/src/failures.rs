use crate::setup;
use rowkit::{
    CommandService, ConnectionFactory, Entity, FromRow, OutcomeStatus, QueryService, RowLabeled,
    ScopedExecutor, Statement,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "notes")]
pub struct Note {
    #[rowkit(primary_key)]
    pub id: i64,
    pub body: String,
    pub pinned: bool,
}

/// Mapped to a table that is never created.
#[derive(Entity, Debug)]
#[rowkit(table = "missing_entities")]
pub struct Orphan {
    #[rowkit(primary_key)]
    pub id: i64,
    pub label: String,
}

/// Key only, nothing to update.
#[derive(Entity, Debug)]
#[rowkit(table = "tags")]
pub struct Tag {
    #[rowkit(primary_key)]
    pub name: String,
}

#[derive(Entity, Debug)]
#[rowkit(table = "events")]
pub struct Event {
    pub kind: String,
    pub payload: Option<String>,
}

/// A numeric key cannot receive a generated identifier.
#[derive(Entity, Debug)]
#[rowkit(table = "tickets")]
pub struct Ticket {
    #[rowkit(primary_key, generated)]
    pub id: i64,
    pub title: String,
}

#[derive(FromRow, Debug)]
pub struct NoteSummary {
    pub body: String,
    pub words: i64,
}

pub async fn failures<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    setup(executor, "DROP TABLE IF EXISTS notes").await;
    setup(
        executor,
        "CREATE TABLE notes (id INTEGER PRIMARY KEY, body TEXT NOT NULL, pinned INTEGER NOT NULL)",
    )
    .await;
    let mut note = Note {
        id: 1,
        body: "remember the milk".into(),
        pinned: true,
    };
    assert!(commands.insert(&mut note).await.is_success());

    // Unknown table
    let outcome = queries
        .get_statement::<RowLabeled>(&Statement::new("SELECT * FROM missing_table"))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(
        outcome.message.contains("no such table"),
        "{}",
        outcome.message
    );
    assert_eq!(outcome.payload, None);

    // Malformed command
    let outcome = executor
        .execute(&Statement::new("UPDAT notes SET body = 'x'"))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(!outcome.is_success());
    assert_eq!(outcome.payload, None);

    // Constraint violation
    let mut duplicate = note.clone();
    let outcome = commands.insert(&mut duplicate).await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(outcome.message.to_lowercase().contains("unique"), "{}", outcome.message);

    // Write to a table that does not exist
    let mut orphan = Orphan {
        id: 1,
        label: "lost".into(),
    };
    let outcome = commands.insert(&mut orphan).await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(outcome.message.contains("missing_entities"), "{}", outcome.message);

    // Row that does not fit the requested shape
    let outcome = queries
        .get_statement::<Note>(&Statement::new("SELECT body FROM notes"))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(
        outcome.message.contains("does not exist in the row provided"),
        "{}",
        outcome.message
    );
    let outcome = queries
        .get_statement::<NoteSummary>(&Statement::new(
            "SELECT body, 'many' AS words FROM notes",
        ))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(outcome.message.contains("words"), "{}", outcome.message);
    let outcome = queries
        .get_statement::<NoteSummary>(&Statement::new(
            "SELECT body, length(body) - length(replace(body, ' ', '')) + 1 AS words FROM notes",
        ))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.payload.unwrap()[0].words, 3);

    // Rejected before reaching the database
    let outcome = commands.update(&Tag { name: "rust".into() }).await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "No columns found to update");
    let event = Event {
        kind: "login".into(),
        payload: None,
    };
    let outcome = commands.update(&event).await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "No primary key defined for update");
    let outcome = commands.delete(&event).await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "No primary key defined for delete");
    let mut ticket = Ticket {
        id: 0,
        title: "broken".into(),
    };
    let outcome = commands.insert(&mut ticket).await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid, "{}", outcome);
    assert!(outcome.message.contains("generated identifier"), "{}", outcome.message);
    assert_eq!(ticket.id, 0);

    // Parameters the statement does not use are ignored
    let outcome = queries
        .get_statement::<Note>(
            &Statement::new("SELECT * FROM notes WHERE id = @id")
                .bind("id", 1i64)
                .bind("unused", "value"),
        )
        .await;
    assert_eq!(outcome.payload, Some(vec![note.clone()]));

    // Only a single statement at a time
    let outcome = executor
        .execute(&Statement::new(
            "DELETE FROM notes; DROP TABLE notes",
        ))
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    let outcome = queries.get_statement::<Note>(&Statement::new("SELECT * FROM notes")).await;
    assert_eq!(outcome.payload.map(|v| v.len()), Some(1));
}
