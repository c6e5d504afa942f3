//! Shared setup for backoffice integration tests
#![allow(dead_code)]

use storage::Database;
use storage::dto::submission::CreateSubmissionRequest;
use storage::models::{StatementFormat, User};
use storage::repository::user::UserRepository;

pub async fn setup_test_database() -> Database {
    let db = Database::in_memory()
        .await
        .expect("Failed to open in-memory database");
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub async fn create_test_user(db: &Database, name: &str) -> User {
    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    UserRepository::new(&mut conn)
        .create(&format!("{name}@example.com"), name)
        .await
        .expect("Failed to create test user")
}

pub fn submission_request(statement: &str, format: StatementFormat) -> CreateSubmissionRequest {
    CreateSubmissionRequest {
        title: "Sum of squares".to_string(),
        statement: statement.to_string(),
        statement_format: format,
        proposed_tags: "algebra".to_string(),
        proposed_difficulty: 4,
    }
}
