use crate::setup;
use indoc::indoc;
use rowkit::{
    CommandService, ConnectionFactory, Entity, FromRow, OutcomeStatus, QueryService,
    ScopedExecutor, Statement,
};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::LazyLock};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "customers")]
pub struct Customer {
    #[rowkit(primary_key)]
    pub id: i64,
    pub name: String,
}

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "orders")]
pub struct Order {
    #[rowkit(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub product_sku: String,
    pub total: Decimal,
}

#[derive(Entity, Debug, Clone, PartialEq)]
#[rowkit(table = "products")]
pub struct Product {
    #[rowkit(primary_key)]
    pub sku: String,
    pub title: String,
}

#[derive(FromRow, Debug, PartialEq)]
pub struct OrderLine {
    pub customer: String,
    pub title: String,
    pub total: Decimal,
}

const SELECT_ORDERS: &str = indoc! {"
    SELECT c.id, c.name, o.id, o.customer_id, o.product_sku, o.total, p.sku, p.title
    FROM customers c
    JOIN orders o ON o.customer_id = c.id
    JOIN products p ON p.sku = o.product_sku
    ORDER BY o.id
"};

pub async fn joins<F: ConnectionFactory>(executor: &ScopedExecutor<F>) {
    let _lock = MUTEX.lock().await;
    let queries = QueryService::new(executor.clone());
    let commands = CommandService::new(executor.clone());

    // Setup
    for table in ["orders", "customers", "products"] {
        setup(executor, &format!("DROP TABLE IF EXISTS {}", table)).await;
    }
    setup(executor, "CREATE TABLE customers (id INTEGER PRIMARY KEY, name TEXT NOT NULL)").await;
    setup(executor, "CREATE TABLE products (sku TEXT PRIMARY KEY, title TEXT NOT NULL)").await;
    setup(
        executor,
        "CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_id INTEGER NOT NULL, product_sku TEXT NOT NULL, total TEXT NOT NULL)",
    )
    .await;
    let statement = Statement::new(SELECT_ORDERS);

    // Nothing joined yet
    let outcome = queries
        .get_by_join(
            &statement,
            Some(|c: Customer, o: Order| (c.name, o.total)),
            "id",
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::NotFound, "{}", outcome);
    assert_eq!(outcome.payload, Some(vec![]));

    let mut customers = vec![
        Customer {
            id: 1,
            name: "Ada".into(),
        },
        Customer {
            id: 2,
            name: "Grace".into(),
        },
    ];
    let mut products = vec![
        Product {
            sku: "KB-01".into(),
            title: "Keyboard".into(),
        },
        Product {
            sku: "MS-02".into(),
            title: "Mouse".into(),
        },
    ];
    let mut orders = vec![
        Order {
            id: 10,
            customer_id: 1,
            product_sku: "KB-01".into(),
            total: Decimal::from_str("49.90").unwrap(),
        },
        Order {
            id: 11,
            customer_id: 2,
            product_sku: "MS-02".into(),
            total: Decimal::from_str("19.99").unwrap(),
        },
        Order {
            id: 12,
            customer_id: 1,
            product_sku: "MS-02".into(),
            total: Decimal::from_str("18.50").unwrap(),
        },
    ];
    for customer in customers.iter_mut() {
        assert!(commands.insert(customer).await.is_success());
    }
    for product in products.iter_mut() {
        assert!(commands.insert(product).await.is_success());
    }
    for order in orders.iter_mut() {
        assert!(commands.insert(order).await.is_success());
    }

    // Two shapes, the same marker repeated
    let outcome = queries
        .get_by_join(
            &statement,
            Some(|c: Customer, o: Order| (c, o)),
            "id",
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Success, "{}", outcome);
    let rows = outcome.payload.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].0, customers[0]);
    assert_eq!(rows[1].0, customers[1]);
    assert_eq!(rows[2].1, orders[2]);

    // Three shapes, one marker per boundary
    let outcome = queries
        .get_by_join(
            &statement,
            Some(|c: Customer, o: Order, p: Product| OrderLine {
                customer: c.name,
                title: p.title,
                total: o.total,
            }),
            "id, sku",
        )
        .await;
    assert_eq!(
        outcome.payload,
        Some(vec![
            OrderLine {
                customer: "Ada".into(),
                title: "Keyboard".into(),
                total: Decimal::from_str("49.90").unwrap(),
            },
            OrderLine {
                customer: "Grace".into(),
                title: "Mouse".into(),
                total: Decimal::from_str("19.99").unwrap(),
            },
            OrderLine {
                customer: "Ada".into(),
                title: "Mouse".into(),
                total: Decimal::from_str("18.50").unwrap(),
            },
        ])
    );

    // The executor classifies the same way
    let outcome = executor
        .query_joined(
            &statement,
            |c: Customer, o: Order, p: Product| (c.id, o.id, p.sku),
            "ID,SKU",
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.payload.unwrap()[1], (2, 11, "MS-02".to_string()));

    // Marker not in the result
    let outcome = queries
        .get_by_join(
            &statement,
            Some(|c: Customer, o: Order| (c, o)),
            "code",
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Failed, "{}", outcome);
    assert!(outcome.message.contains("code"), "{}", outcome.message);
    assert_eq!(outcome.payload, None);

    // Missing mapping function
    let outcome = queries
        .get_by_join(&statement, None::<fn(Customer, Order) -> ()>, "id")
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "Table mapper cannot be null.");

    // Blank statement
    let outcome = queries
        .get_by_join(
            &Statement::new(""),
            Some(|c: Customer, o: Order| (c, o)),
            "id",
        )
        .await;
    assert_eq!(outcome.status, OutcomeStatus::Invalid);
    assert_eq!(outcome.message, "SQL cannot be empty.");

    // Single shape reads work on the joined tables too
    let outcome = queries
        .get_statement::<Order>(
            &Statement::new("SELECT * FROM orders WHERE customer_id = @customer_id")
                .bind("customer_id", 1i64),
        )
        .await;
    assert_eq!(outcome.payload.map(|v| v.len()), Some(2));
    assert_eq!(Product::metadata().unwrap().primary_key_defs().count(), 1);
}
