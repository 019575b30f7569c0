//! rowkit: metadata-driven SQL statements and uniform outcomes over any relational driver.
//!
//! ```ignore
//! use rowkit::{CommandService, Entity, QueryService, ScopedExecutor, Statement};
//! use rowkit_sqlite::SqliteConnector;
//!
//! #[derive(Entity, Debug, Clone, Default)]
//! #[rowkit(table = "users")]
//! struct User {
//!     #[rowkit(primary_key, generated)]
//!     id: uuid::Uuid,
//!     name: String,
//! }
//!
//! let executor = ScopedExecutor::new(SqliteConnector::new("sqlite://app.sqlite"));
//! let commands = CommandService::new(executor.clone());
//! let mut user = User { name: "Alice".into(), ..Default::default() };
//! let inserted = commands.insert(&mut user).await;
//! assert!(inserted.is_success());
//!
//! let queries = QueryService::new(executor);
//! let users = queries
//!     .get_statement::<User>(&Statement::new("SELECT * FROM users WHERE id = @id").bind("id", user.id))
//!     .await;
//! ```
pub use rowkit_core::*;
pub use rowkit_macros::*;
