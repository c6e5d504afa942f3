use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::dto::report::CreateReportRequest;
use crate::error::{Result, StorageError};
use crate::models::{Report, ReportStatus};

/// Repository for user reports
pub struct ReportRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> ReportRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, reporter_id: i64, req: &CreateReportRequest) -> Result<Report> {
        let now = Utc::now();
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (
                reporter_id, target_kind, target_id, reason_code, details, severity,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING report_id, reporter_id, target_kind, target_id, reason_code, details,
                      severity, status, assignee_id, resolution_note, resolved_by,
                      resolved_at, created_at, updated_at
            "#,
        )
        .bind(reporter_id)
        .bind(req.target.kind.as_str())
        .bind(req.target.id)
        .bind(req.reason_code.as_str())
        .bind(&req.details)
        .bind(req.severity)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(report)
    }

    pub async fn find_by_id(&mut self, report_id: i64) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            SELECT report_id, reporter_id, target_kind, target_id, reason_code, details,
                   severity, status, assignee_id, resolution_note, resolved_by,
                   resolved_at, created_at, updated_at
            FROM reports
            WHERE report_id = ?
            "#,
        )
        .bind(report_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(report)
    }

    /// The moderation queue: reports in `status`, most severe first, then
    /// oldest first.
    pub async fn list_by_status(&mut self, status: ReportStatus) -> Result<Vec<Report>> {
        let reports = sqlx::query_as::<_, Report>(
            r#"
            SELECT report_id, reporter_id, target_kind, target_id, reason_code, details,
                   severity, status, assignee_id, resolution_note, resolved_by,
                   resolved_at, created_at, updated_at
            FROM reports
            WHERE status = ?
            ORDER BY severity DESC, created_at ASC, report_id ASC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(reports)
    }

    pub async fn assign(&mut self, report_id: i64, assignee_id: i64) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET status = ?, assignee_id = ?, updated_at = ?
            WHERE report_id = ?
            RETURNING report_id, reporter_id, target_kind, target_id, reason_code, details,
                      severity, status, assignee_id, resolution_note, resolved_by,
                      resolved_at, created_at, updated_at
            "#,
        )
        .bind(ReportStatus::InReview.as_str())
        .bind(assignee_id)
        .bind(Utc::now())
        .bind(report_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(report)
    }

    pub async fn close(
        &mut self,
        report_id: i64,
        status: ReportStatus,
        note: &str,
        resolved_by: i64,
        resolved_at: DateTime<Utc>,
    ) -> Result<Report> {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports
            SET status = ?, resolution_note = ?, resolved_by = ?, resolved_at = ?, updated_at = ?
            WHERE report_id = ?
            RETURNING report_id, reporter_id, target_kind, target_id, reason_code, details,
                      severity, status, assignee_id, resolution_note, resolved_by,
                      resolved_at, created_at, updated_at
            "#,
        )
        .bind(status.as_str())
        .bind(note)
        .bind(resolved_by)
        .bind(resolved_at)
        .bind(resolved_at)
        .bind(report_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)?;

        Ok(report)
    }
}
