use keepdb::{create_ephemeral, Database, Value};

/// Create a migrated in-memory database for testing
///
/// Each call creates a completely isolated database instance.
pub async fn setup_test_db() -> Database {
    create_ephemeral(true)
        .await
        .expect("failed to create test database")
}

/// Run a `COUNT(*)`-style query and return the single integer it yields.
pub async fn count(db: &Database, sql: &str) -> i64 {
    let mut rows = db.query(sql, ()).await.expect("count query failed");
    let row = rows
        .next()
        .await
        .expect("failed to read row")
        .expect("count query returned no rows");
    row.get::<i64>(0).expect("count is not an integer")
}

/// Read a pragma from a live connection.
pub async fn pragma(db: &Database, name: &str) -> Value {
    db.pragma(name)
        .await
        .expect("failed to read pragma")
        .expect("pragma returned no value")
}
