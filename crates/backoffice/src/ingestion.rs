//! Review pipeline that turns user submissions into archived problems.
//!
//! Statements are linted both when proposed and again when accepted, so a
//! submission edited in between cannot reach the archive with a
//! disallowed command.

use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

use crate::error::{IngestError, Result};
use crate::statement::{lint, normalize_to_plaintext};
use storage::dto::submission::CreateSubmissionRequest;
use storage::error::StorageError;
use storage::models::{AbusePolicy, Actor, NewProblem, ProblemSubmission, SubmissionStatus};
use storage::repository::problem::ProblemRepository;
use storage::services::abuse;

/// Store a new submission after the abuse policy (when given) and the
/// statement lint both pass.
pub async fn submit_problem(
    pool: &SqlitePool,
    submitter_id: Option<i64>,
    req: &CreateSubmissionRequest,
    policy: Option<&AbusePolicy>,
) -> Result<ProblemSubmission> {
    req.validate()?;

    if let Some(policy) = policy {
        let text = format!("{}\n{}", req.title, req.statement);
        if let Some(violation) = abuse::check_post(pool, policy, &text, submitter_id).await? {
            warn!(?submitter_id, %violation, "Submission blocked by abuse policy");
            return Err(IngestError::PolicyError(violation));
        }
    }

    let issues = lint(&req.statement, req.statement_format);
    if !issues.is_empty() {
        return Err(IngestError::LintError(issues));
    }

    let plaintext = normalize_to_plaintext(&req.statement, req.statement_format);

    let mut conn = pool.acquire().await?;
    let submission = ProblemRepository::new(&mut conn)
        .create_submission(submitter_id, req, &plaintext)
        .await?;

    info!(
        submission_id = submission.submission_id,
        format = %submission.statement_format,
        "Problem submitted"
    );

    Ok(submission)
}

pub async fn list_submissions(
    pool: &SqlitePool,
    status: SubmissionStatus,
) -> Result<Vec<ProblemSubmission>> {
    let mut conn = pool.acquire().await?;
    let submissions = ProblemRepository::new(&mut conn)
        .list_submissions(status)
        .await?;
    Ok(submissions)
}

/// Promote a submission into the archive as problem `SUB-{id}`. A statement
/// that no longer lints cleanly leaves the submission untouched.
pub async fn accept_submission(
    pool: &SqlitePool,
    actor: &Actor,
    submission_id: i64,
    note: &str,
) -> Result<ProblemSubmission> {
    actor.require_moderator()?;

    let mut tx = pool.begin().await?;
    let mut problems = ProblemRepository::new(&mut tx);

    let submission = problems.find_submission(submission_id).await?;
    check_pending(&submission, SubmissionStatus::Accepted)?;

    let issues = lint(&submission.statement, submission.statement_format);
    if !issues.is_empty() {
        warn!(submission_id, issues = issues.len(), "Cannot accept submission");
        return Err(IngestError::LintError(issues));
    }

    let problem = problems
        .create(&NewProblem {
            label: format!("SUB-{}", submission.submission_id),
            title: submission.title.clone(),
            statement: submission.statement.clone(),
            statement_format: submission.statement_format,
            statement_plaintext: normalize_to_plaintext(
                &submission.statement,
                submission.statement_format,
            ),
            editorial_difficulty: submission.proposed_difficulty,
        })
        .await?;

    let accepted = problems
        .record_decision(
            submission_id,
            SubmissionStatus::Accepted,
            actor.user_id,
            note,
            Some(problem.problem_id),
        )
        .await?;

    tx.commit().await?;

    info!(
        submission_id,
        problem_id = problem.problem_id,
        reviewer_id = actor.user_id,
        "Submission accepted"
    );

    Ok(accepted)
}

pub async fn reject_submission(
    pool: &SqlitePool,
    actor: &Actor,
    submission_id: i64,
    note: &str,
) -> Result<ProblemSubmission> {
    decide(pool, actor, submission_id, SubmissionStatus::Rejected, note, None).await
}

/// Close a submission as a copy of an existing problem, optionally linking
/// that problem.
pub async fn mark_duplicate(
    pool: &SqlitePool,
    actor: &Actor,
    submission_id: i64,
    note: &str,
    duplicate_of: Option<i64>,
) -> Result<ProblemSubmission> {
    decide(
        pool,
        actor,
        submission_id,
        SubmissionStatus::Duplicate,
        note,
        duplicate_of,
    )
    .await
}

async fn decide(
    pool: &SqlitePool,
    actor: &Actor,
    submission_id: i64,
    status: SubmissionStatus,
    note: &str,
    linked_problem_id: Option<i64>,
) -> Result<ProblemSubmission> {
    actor.require_moderator()?;

    let mut tx = pool.begin().await?;
    let mut problems = ProblemRepository::new(&mut tx);

    let submission = problems.find_submission(submission_id).await?;
    check_pending(&submission, status)?;

    if let Some(problem_id) = linked_problem_id {
        problems.find_by_id(problem_id).await?;
    }

    let decided = problems
        .record_decision(submission_id, status, actor.user_id, note, linked_problem_id)
        .await?;

    tx.commit().await?;

    info!(submission_id, status = %status, reviewer_id = actor.user_id, "Submission decided");

    Ok(decided)
}

fn check_pending(submission: &ProblemSubmission, next: SubmissionStatus) -> Result<()> {
    if submission.status.is_pending() {
        Ok(())
    } else {
        Err(StorageError::InvalidTransition {
            from: submission.status.to_string(),
            to: next.to_string(),
        }
        .into())
    }
}
