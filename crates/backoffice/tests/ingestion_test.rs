mod common;

use backoffice::ingestion;
use backoffice::{IngestError, LintIssue};
use common::{create_test_user, setup_test_database, submission_request};
use storage::error::StorageError;
use storage::models::{AbusePolicy, Actor, StatementFormat, SubmissionStatus};
use storage::repository::problem::ProblemRepository;
use storage::services::abuse::AbuseViolation;

const CLEAN_STATEMENT: &str = r"Let $x = \frac{a}{b}$ and find $\{x\}$.";

#[tokio::test]
async fn test_submit_stores_plaintext() {
    let db = setup_test_database().await;
    let author = create_test_user(&db, "author").await;

    let submission = ingestion::submit_problem(
        db.pool(),
        Some(author.user_id),
        &submission_request(CLEAN_STATEMENT, StatementFormat::Latex),
        None,
    )
    .await
    .expect("Failed to submit");

    assert_eq!(submission.status, SubmissionStatus::New);
    assert_eq!(submission.submitter_id, Some(author.user_id));
    assert!(submission.statement_plaintext.contains("Let"));
    assert!(!submission.statement_plaintext.contains('$'));
    assert!(!submission.statement_plaintext.contains('\\'));
}

#[tokio::test]
async fn test_submit_rejects_lint_issues() {
    let db = setup_test_database().await;

    let result = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request(r"\input{/etc/passwd} {", StatementFormat::Latex),
        None,
    )
    .await;

    match result {
        Err(IngestError::LintError(issues)) => assert_eq!(
            issues,
            vec![
                LintIssue::DisallowedCommand(r"\input"),
                LintIssue::UnbalancedBraces,
            ]
        ),
        other => panic!("expected lint failure, got {other:?}"),
    }

    let pending = ingestion::list_submissions(db.pool(), SubmissionStatus::New)
        .await
        .expect("Failed to list submissions");
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_plain_statement_is_not_linted() {
    let db = setup_test_database().await;

    let submission = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("  Count the } braces {{ here  ", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Plain statements are never linted");

    assert_eq!(submission.statement_plaintext, "Count the } braces {{ here");
}

#[tokio::test]
async fn test_submit_checks_abuse_policy() {
    let db = setup_test_database().await;
    let policy = AbusePolicy {
        bad_word_list: "casino".to_string(),
        ..AbusePolicy::default()
    };

    let result = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Visit the Casino for hints", StatementFormat::Plain),
        Some(&policy),
    )
    .await;

    assert!(matches!(
        result,
        Err(IngestError::PolicyError(AbuseViolation::BlockedTerm))
    ));
}

#[tokio::test]
async fn test_submit_validates_request() {
    let db = setup_test_database().await;
    let mut req = submission_request(CLEAN_STATEMENT, StatementFormat::Latex);
    req.proposed_difficulty = 11;

    let result = ingestion::submit_problem(db.pool(), None, &req, None).await;
    assert!(matches!(result, Err(IngestError::ValidationError(_))));
}

#[tokio::test]
async fn test_accept_creates_linked_problem() {
    let db = setup_test_database().await;
    let reviewer = create_test_user(&db, "reviewer").await;

    let submission = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request(CLEAN_STATEMENT, StatementFormat::MarkdownTex),
        None,
    )
    .await
    .expect("Failed to submit");

    let accepted = ingestion::accept_submission(
        db.pool(),
        &Actor::moderator(reviewer.user_id),
        submission.submission_id,
        "nice one",
    )
    .await
    .expect("Failed to accept");

    assert_eq!(accepted.status, SubmissionStatus::Accepted);
    assert_eq!(accepted.reviewer_id, Some(reviewer.user_id));
    assert_eq!(accepted.decision_note, "nice one");

    let problem_id = accepted.linked_problem_id.expect("accepted submission is linked");
    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    let problem = ProblemRepository::new(&mut conn)
        .find_by_id(problem_id)
        .await
        .expect("Problem should exist");

    assert_eq!(problem.label, format!("SUB-{}", submission.submission_id));
    assert_eq!(problem.title, submission.title);
    assert_eq!(problem.statement_format, StatementFormat::MarkdownTex);
    assert_eq!(problem.editorial_difficulty, 4);
    assert_eq!(problem.statement_plaintext, submission.statement_plaintext);
}

#[tokio::test]
async fn test_accept_relints_statement() {
    let db = setup_test_database().await;
    let reviewer = create_test_user(&db, "reviewer").await;

    let submission = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Compute a + b", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");

    // The statement was edited into TeX with a shell escape after submission.
    sqlx::query(
        "UPDATE problem_submissions SET statement = ?, statement_format = 'latex' WHERE submission_id = ?",
    )
    .bind(r"\write18{ls}")
    .bind(submission.submission_id)
    .execute(db.pool())
    .await
    .expect("Failed to edit submission");

    let result = ingestion::accept_submission(
        db.pool(),
        &Actor::moderator(reviewer.user_id),
        submission.submission_id,
        "",
    )
    .await;
    assert!(matches!(result, Err(IngestError::LintError(_))));

    let mut conn = db.pool().acquire().await.expect("Failed to acquire connection");
    let unchanged = ProblemRepository::new(&mut conn)
        .find_submission(submission.submission_id)
        .await
        .expect("Submission should exist");
    assert_eq!(unchanged.status, SubmissionStatus::New);
    assert_eq!(unchanged.linked_problem_id, None);

    let problems: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM problems")
        .fetch_one(&mut *conn)
        .await
        .expect("Failed to count problems");
    assert_eq!(problems, 0);
}

#[tokio::test]
async fn test_reject_and_duplicate() {
    let db = setup_test_database().await;
    let reviewer = create_test_user(&db, "reviewer").await;
    let actor = Actor::moderator(reviewer.user_id);

    let first = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("First", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");
    let second = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Second", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");
    let third = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Third", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");

    let accepted = ingestion::accept_submission(db.pool(), &actor, first.submission_id, "")
        .await
        .expect("Failed to accept");
    let original = accepted.linked_problem_id;

    let rejected = ingestion::reject_submission(db.pool(), &actor, second.submission_id, "off topic")
        .await
        .expect("Failed to reject");
    assert_eq!(rejected.status, SubmissionStatus::Rejected);
    assert_eq!(rejected.decision_note, "off topic");
    assert_eq!(rejected.linked_problem_id, None);

    let duplicate =
        ingestion::mark_duplicate(db.pool(), &actor, third.submission_id, "same as first", original)
            .await
            .expect("Failed to mark duplicate");
    assert_eq!(duplicate.status, SubmissionStatus::Duplicate);
    assert_eq!(duplicate.linked_problem_id, original);
    assert_eq!(duplicate.reviewer_id, Some(reviewer.user_id));
}

#[tokio::test]
async fn test_decided_submission_is_final() {
    let db = setup_test_database().await;
    let reviewer = create_test_user(&db, "reviewer").await;
    let actor = Actor::moderator(reviewer.user_id);

    let submission = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Once", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");

    ingestion::reject_submission(db.pool(), &actor, submission.submission_id, "")
        .await
        .expect("Failed to reject");

    let result = ingestion::accept_submission(db.pool(), &actor, submission.submission_id, "").await;
    assert!(matches!(
        result,
        Err(IngestError::StorageError(StorageError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn test_decisions_require_moderator() {
    let db = setup_test_database().await;
    let user = create_test_user(&db, "someone").await;
    let guest = Actor {
        user_id: user.user_id,
        is_admin: false,
        is_moderator: false,
    };

    let submission = ingestion::submit_problem(
        db.pool(),
        Some(user.user_id),
        &submission_request("Mine", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");

    let result = ingestion::accept_submission(db.pool(), &guest, submission.submission_id, "").await;
    assert!(matches!(
        result,
        Err(IngestError::StorageError(StorageError::Forbidden(_)))
    ));
}

#[tokio::test]
async fn test_duplicate_of_missing_problem() {
    let db = setup_test_database().await;
    let reviewer = create_test_user(&db, "reviewer").await;

    let submission = ingestion::submit_problem(
        db.pool(),
        None,
        &submission_request("Again", StatementFormat::Plain),
        None,
    )
    .await
    .expect("Failed to submit");

    let result = ingestion::mark_duplicate(
        db.pool(),
        &Actor::moderator(reviewer.user_id),
        submission.submission_id,
        "",
        Some(9999),
    )
    .await;
    assert!(matches!(
        result,
        Err(IngestError::StorageError(StorageError::NotFound))
    ));
}
