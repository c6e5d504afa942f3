use chrono::Utc;
use sqlx::SqliteConnection;

use crate::dto::submission::CreateSubmissionRequest;
use crate::error::{Result, StorageError};
use crate::models::{NewProblem, Problem, ProblemSubmission, SubmissionStatus};

/// Repository for archived problems and the submissions that feed them
pub struct ProblemRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ProblemRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, problem: &NewProblem) -> Result<Problem> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            INSERT INTO problems (
                label, title, statement, statement_format, statement_plaintext,
                editorial_difficulty, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING problem_id, label, title, statement, statement_format,
                      statement_plaintext, editorial_difficulty, status, created_at
            "#,
        )
        .bind(&problem.label)
        .bind(&problem.title)
        .bind(&problem.statement)
        .bind(problem.statement_format.as_str())
        .bind(&problem.statement_plaintext)
        .bind(problem.editorial_difficulty)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(problem)
    }

    pub async fn find_by_id(&mut self, problem_id: i64) -> Result<Problem> {
        let problem = sqlx::query_as::<_, Problem>(
            r#"
            SELECT problem_id, label, title, statement, statement_format,
                   statement_plaintext, editorial_difficulty, status, created_at
            FROM problems
            WHERE problem_id = ?
            "#,
        )
        .bind(problem_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(problem)
    }

    /// Persist the fields moderation may touch: statement, its plaintext and
    /// status.
    pub async fn save(&mut self, problem: &Problem) -> Result<()> {
        sqlx::query(
            "UPDATE problems SET statement = ?, statement_plaintext = ?, status = ? WHERE problem_id = ?",
        )
        .bind(&problem.statement)
        .bind(&problem.statement_plaintext)
        .bind(problem.status.as_str())
        .bind(problem.problem_id)
        .execute(&mut *self.conn)
        .await?;

        Ok(())
    }

    pub async fn create_submission(
        &mut self,
        submitter_id: Option<i64>,
        req: &CreateSubmissionRequest,
        plaintext: &str,
    ) -> Result<ProblemSubmission> {
        let now = Utc::now();
        let submission = sqlx::query_as::<_, ProblemSubmission>(
            r#"
            INSERT INTO problem_submissions (
                submitter_id, title, statement, statement_format, statement_plaintext,
                proposed_tags, proposed_difficulty, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING submission_id, submitter_id, title, statement, statement_format,
                      statement_plaintext, proposed_tags, proposed_difficulty, status,
                      linked_problem_id, reviewer_id, decision_note, created_at, updated_at
            "#,
        )
        .bind(submitter_id)
        .bind(&req.title)
        .bind(&req.statement)
        .bind(req.statement_format.as_str())
        .bind(plaintext)
        .bind(&req.proposed_tags)
        .bind(req.proposed_difficulty)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(submission)
    }

    pub async fn find_submission(&mut self, submission_id: i64) -> Result<ProblemSubmission> {
        let submission = sqlx::query_as::<_, ProblemSubmission>(
            r#"
            SELECT submission_id, submitter_id, title, statement, statement_format,
                   statement_plaintext, proposed_tags, proposed_difficulty, status,
                   linked_problem_id, reviewer_id, decision_note, created_at, updated_at
            FROM problem_submissions
            WHERE submission_id = ?
            "#,
        )
        .bind(submission_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(submission)
    }

    pub async fn list_submissions(&mut self, status: SubmissionStatus) -> Result<Vec<ProblemSubmission>> {
        let submissions = sqlx::query_as::<_, ProblemSubmission>(
            r#"
            SELECT submission_id, submitter_id, title, statement, statement_format,
                   statement_plaintext, proposed_tags, proposed_difficulty, status,
                   linked_problem_id, reviewer_id, decision_note, created_at, updated_at
            FROM problem_submissions
            WHERE status = ?
            ORDER BY created_at ASC, submission_id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(submissions)
    }

    /// Record a review decision. `linked_problem_id` is only overwritten when
    /// one is given.
    pub async fn record_decision(
        &mut self,
        submission_id: i64,
        status: SubmissionStatus,
        reviewer_id: i64,
        note: &str,
        linked_problem_id: Option<i64>,
    ) -> Result<ProblemSubmission> {
        let submission = sqlx::query_as::<_, ProblemSubmission>(
            r#"
            UPDATE problem_submissions
            SET status = ?,
                reviewer_id = ?,
                decision_note = ?,
                linked_problem_id = COALESCE(?, linked_problem_id),
                updated_at = ?
            WHERE submission_id = ?
            RETURNING submission_id, submitter_id, title, statement, statement_format,
                      statement_plaintext, proposed_tags, proposed_difficulty, status,
                      linked_problem_id, reviewer_id, decision_note, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(reviewer_id)
        .bind(note)
        .bind(linked_problem_id)
        .bind(Utc::now())
        .bind(submission_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(submission)
    }
}
