//! Test fixtures for creating test data
#![allow(dead_code)]

use sqlx::SqlitePool;
use storage::models::{Comment, NewProblem, Problem, Solution, StatementFormat, User};
use storage::repository::community::CommunityRepository;
use storage::repository::contest::ContestRepository;
use storage::repository::problem::ProblemRepository;
use storage::repository::user::UserRepository;

pub async fn create_test_user(pool: &SqlitePool, name: &str) -> User {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    UserRepository::new(&mut conn)
        .create(&format!("{name}@example.com"), name)
        .await
        .expect("Failed to create test user")
}

pub async fn create_user_with_rating(pool: &SqlitePool, name: &str, rating: f64) -> User {
    let user = create_test_user(pool, name).await;
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = UserRepository::new(&mut conn);
    users
        .update_rating(user.user_id, rating)
        .await
        .expect("Failed to set rating");
    users
        .find_by_id(user.user_id)
        .await
        .expect("Failed to reload user")
}

/// A contest whose participants are ranked in the order of `ratings`, best
/// first. Returns the contest id and the participants' user ids.
pub async fn create_ranked_contest(pool: &SqlitePool, slug: &str, ratings: &[f64]) -> (i64, Vec<i64>) {
    let mut user_ids = Vec::with_capacity(ratings.len());
    for (i, rating) in ratings.iter().enumerate() {
        let user = create_user_with_rating(pool, &format!("{slug}-p{i}"), *rating).await;
        user_ids.push(user.user_id);
    }

    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut contests = ContestRepository::new(&mut conn);
    let contest = contests
        .create(&format!("Contest {slug}"), slug, true)
        .await
        .expect("Failed to create contest");

    for (i, user_id) in user_ids.iter().enumerate() {
        contests
            .add_result(contest.contest_id, *user_id, 100.0 - i as f64, i as i64 + 1)
            .await
            .expect("Failed to add result");
    }

    (contest.contest_id, user_ids)
}

pub async fn current_rating(pool: &SqlitePool, user_id: i64) -> f64 {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    UserRepository::new(&mut conn)
        .find_by_id(user_id)
        .await
        .expect("Failed to load user")
        .rating
}

pub async fn create_test_problem(pool: &SqlitePool, statement: &str) -> Problem {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    ProblemRepository::new(&mut conn)
        .create(&NewProblem {
            label: "P1".to_string(),
            title: "Test problem".to_string(),
            statement: statement.to_string(),
            statement_format: StatementFormat::Plain,
            statement_plaintext: statement.to_string(),
            editorial_difficulty: 3,
        })
        .await
        .expect("Failed to create problem")
}

pub async fn create_test_solution(pool: &SqlitePool, problem_id: i64, author_id: i64, content: &str) -> Solution {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    CommunityRepository::new(&mut conn)
        .create_solution(problem_id, author_id, "Solution", content)
        .await
        .expect("Failed to create solution")
}

pub async fn create_test_comment(pool: &SqlitePool, problem_id: i64, author_id: i64, content: &str) -> Comment {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    CommunityRepository::new(&mut conn)
        .create_comment(Some(problem_id), None, author_id, content)
        .await
        .expect("Failed to create comment")
}
