//! The process-wide handle is a per-process singleton, so everything that
//! touches it lives in this single test.

use keepdb::{
    database, initialize, is_ready, ConnectionTarget, Database, DatabaseError, DatabaseSettings,
    Directive,
};

#[tokio::test]
async fn test_process_wide_connection_lifecycle() {
    assert!(!is_ready());
    assert!(matches!(database(), Err(DatabaseError::NotInitialized)));

    let dir = tempfile::tempdir().unwrap();
    let settings = DatabaseSettings::local(dir.path().join("app.db"), true);

    // A failed bootstrap leaves the slot empty.
    let bad = DatabaseSettings::local("", true);
    assert!(matches!(
        initialize(&bad).await,
        Err(DatabaseError::Config(_))
    ));
    assert!(!is_ready());

    // A directive the engine refuses also leaves the slot empty. Another
    // session holds an exclusive lock, so the journal mode cannot change.
    let locked = dir.path().join("locked.db");
    let blocker = Database::connect(ConnectionTarget::LocalFile {
        path: locked.clone(),
    })
    .await
    .unwrap();
    blocker
        .execute("CREATE TABLE held (id INTEGER)", ())
        .await
        .unwrap();
    blocker.execute("BEGIN EXCLUSIVE", ()).await.unwrap();

    let err = initialize(&DatabaseSettings::local(&locked, true))
        .await
        .expect_err("locked database cannot switch journal mode");
    assert!(
        matches!(
            err,
            DatabaseError::Directive {
                directive: Directive::JournalMode(_),
                ..
            }
        ),
        "{err}"
    );
    assert!(!is_ready());
    assert!(matches!(database(), Err(DatabaseError::NotInitialized)));
    blocker.execute("COMMIT", ()).await.unwrap();

    let (first, second) = tokio::join!(initialize(&settings), initialize(&settings));
    let first = first.expect("initialization should succeed");
    let second = second.expect("initialization should succeed");
    assert!(std::ptr::eq(first, second));
    assert!(is_ready());

    // Later settings are ignored once the handle exists.
    let other = DatabaseSettings::local(dir.path().join("other.db"), false);
    let again = initialize(&other).await.unwrap();
    assert!(std::ptr::eq(first, again));
    assert!(!dir.path().join("other.db").exists());

    let published = database().expect("handle should be published");
    assert!(std::ptr::eq(first, published));
    published.verify().await.unwrap();
}
