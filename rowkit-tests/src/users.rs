use crate::setup;
use rowkit::{
    CommandService, ConnectionFactory, Entity, FromRow, OutcomeStatus, QueryService,
    ScopedExecutor, Statement, Value,
};
use std::sync::LazyLock;
use tokio::sync::Mutex;
use uuid::Uuid;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq, Default)]
#[rowkit(table = "users")]
pub struct User {
    #[rowkit(primary_key, generated)]
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    #[rowkit(skip)]
    pub session: Option<String>,
}

#[derive(FromRow, Debug, PartialEq)]
pub struct UserName {
    pub name: String,
}

pub async fn users<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    // Setup
    setup(executor, "DROP TABLE IF EXISTS users").await;
    setup(
        executor,
        "CREATE TABLE users (id TEXT PRIMARY KEY, name TEXT NOT NULL, email TEXT, active INTEGER NOT NULL)",
    )
    .await;
    let select_all = Statement::new("SELECT id, name, email, active FROM users ORDER BY name");

    // Empty table
    let outcome = queries.get_statement::<User>(&select_all).await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound, "{}", outcome);
    assert_eq!(outcome.message, "No records found.");
    assert_eq!(outcome.payload, Some(vec![]));

    // Insert with a generated key
    let mut alice = User {
        name: "alice".into(),
        email: None,
        active: true,
        ..Default::default()
    };
    let outcome = commands.insert(&mut alice).await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.message, "1 record(s) affected.");
    let inserted = outcome.payload.expect("Insert must report the rows affected");
    assert_eq!(inserted.rows_affected, 1);
    assert!(!alice.id.is_nil(), "The generated key must be stored into the entity");
    let generated = inserted.generated.expect("A key must have been generated");
    assert_eq!(generated.field, "id");
    assert_eq!(generated.value, Value::Uuid(Some(alice.id)));

    // Insert with a key supplied by the caller
    let bob_id = Uuid::parse_str("b2b2b2b2-b2b2-b2b2-b2b2-b2b2b2b2b2b2").unwrap();
    let mut bob = User {
        id: bob_id,
        name: "bob".into(),
        email: Some("bob@example.com".into()),
        active: false,
        session: Some("not persisted".into()),
    };
    let outcome = commands.insert(&mut bob).await;
    assert!(outcome.is_success(), "{}", outcome);
    assert_eq!(outcome.payload.unwrap().generated, None);
    assert_eq!(bob.id, bob_id);

    // Read back by key
    let by_id = Statement::new("SELECT id, name, email, active FROM users WHERE id = @id")
        .bind("id", alice.id);
    let outcome = queries.get_statement::<User>(&by_id).await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.message, "Success");
    assert_eq!(outcome.payload, Some(vec![alice.clone()]));

    // Skipped fields are not read back
    let outcome = queries
        .get(
            |name: &str| {
                Statement::new("SELECT * FROM users WHERE name = @name").bind("name", name.to_string())
            },
            "bob",
        )
        .await;
    let found: Vec<User> = outcome.payload.expect("Bob must be found");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].email.as_deref(), Some("bob@example.com"));
    assert_eq!(found[0].session, None);
    assert!(!found[0].active);

    // Update
    alice.email = Some("alice@example.com".into());
    alice.active = false;
    let outcome = commands.update(&alice).await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.payload, Some(1));
    let outcome = queries.get_statement::<User>(&by_id).await;
    let stored = outcome.payload.unwrap().pop().unwrap();
    assert_eq!(stored.email.as_deref(), Some("alice@example.com"));
    assert!(!stored.active);

    // Mapped
    let outcome = queries
        .get_mapped(
            |_: &()| select_all.clone(),
            &(),
            |user: User| UserName {
                name: user.name.to_uppercase(),
            },
        )
        .await;
    assert_eq!(
        outcome.payload,
        Some(vec![
            UserName {
                name: "ALICE".into()
            },
            UserName { name: "BOB".into() }
        ])
    );
    let outcome = queries
        .get_statement::<UserName>(&select_all)
        .await;
    assert_eq!(
        outcome.payload,
        Some(vec![
            UserName {
                name: "alice".into()
            },
            UserName { name: "bob".into() }
        ])
    );
    let outcome = queries
        .get_statement_mapped(
            &Statement::new("SELECT * FROM users WHERE name = 'nobody'"),
            |user: User| UserName { name: user.name },
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound);
    assert_eq!(outcome.payload, Some(vec![]));

    // Blank SQL
    let outcome = queries.get_statement::<User>(&Statement::new("  \n")).await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "SQL cannot be empty.");
    assert_eq!(outcome.payload, None);

    // Delete
    let outcome = commands.delete(&alice).await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    assert_eq!(outcome.payload, Some(1));
    let outcome = commands.delete(&alice).await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound, "{}", outcome);
    assert_eq!(outcome.message, "No rows affected.");
    assert_eq!(outcome.payload, Some(0));
    let outcome = queries.get_statement::<User>(&select_all).await;
    assert_eq!(outcome.payload.map(|v| v.len()), Some(1));

    // Update of a missing row
    let ghost = User {
        id: Uuid::new_v4(),
        name: "ghost".into(),
        ..Default::default()
    };
    let outcome = commands.update(&ghost).await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound);

    // Raw rows
    let outcome = queries.get_statement::<rowkit::RowLabeled>(&select_all).await;
    let rows = outcome.payload.unwrap();
    assert_eq!(rows[0].names(), ["id", "name", "email", "active"]);
    assert_eq!(
        rows[0].get_column("NAME"),
        Some(&Value::Varchar(Some("bob".into())))
    );

    // Entity metadata
    let table = User::metadata().unwrap();
    assert_eq!(table.name, "users");
    assert_eq!(
        table.columns.iter().map(|c| c.name.as_ref()).collect::<Vec<_>>(),
        ["id", "name", "email", "active"]
    );
}
