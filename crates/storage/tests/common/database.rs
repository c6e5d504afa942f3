//! Test database setup
#![allow(dead_code)]

use storage::Database;

/// A fresh in-memory database with the schema applied. Every test gets its
/// own, so tests can run in parallel.
pub async fn setup_test_database() -> Database {
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    db
}
