use chrono::Utc;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::dto::audit::AuditFilter;
use crate::dto::common::PaginationParams;
use crate::error::Result;
use crate::models::{ContentRevision, ModerationLog, NewContentRevision, NewModerationLog, TargetRef};

/// Append-only access to the moderation ledger. The schema rejects updates
/// and deletes with triggers.
pub struct AuditRepository<'a> {
    conn: &'a mut SqliteConnection,
}

impl<'a> AuditRepository<'a> {
    pub fn new(conn: &'a mut SqliteConnection) -> Self {
        Self { conn }
    }

    pub async fn append_log(&mut self, entry: &NewModerationLog) -> Result<ModerationLog> {
        let log = sqlx::query_as::<_, ModerationLog>(
            r#"
            INSERT INTO moderation_logs (
                actor_id, action, reason, report_id, target_kind, target_id,
                target_user_id, metadata, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING log_id, actor_id, action, reason, report_id, target_kind, target_id,
                      target_user_id, metadata, created_at
            "#,
        )
        .bind(entry.actor_id)
        .bind(entry.action.as_str())
        .bind(&entry.reason)
        .bind(entry.report_id)
        .bind(entry.target.map(|t| t.kind.as_str()))
        .bind(entry.target.map(|t| t.id))
        .bind(entry.target_user_id)
        .bind(Json(&entry.metadata))
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(log)
    }

    pub async fn append_revision(&mut self, revision: &NewContentRevision) -> Result<ContentRevision> {
        let revision = sqlx::query_as::<_, ContentRevision>(
            r#"
            INSERT INTO content_revisions (
                target_kind, target_id, previous_text, new_text, edited_by,
                moderation_log_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING revision_id, target_kind, target_id, previous_text, new_text, edited_by,
                      moderation_log_id, created_at
            "#,
        )
        .bind(revision.target.kind.as_str())
        .bind(revision.target.id)
        .bind(&revision.previous_text)
        .bind(&revision.new_text)
        .bind(revision.edited_by)
        .bind(revision.moderation_log_id)
        .bind(Utc::now())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(revision)
    }

    pub async fn count_logs(&mut self, filter: &AuditFilter) -> Result<i64> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM moderation_logs WHERE 1=1");
        push_filter(&mut query, filter);

        let total = query
            .build_query_scalar::<i64>()
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(total)
    }

    /// Matching log rows, newest first.
    pub async fn query_logs(
        &mut self,
        filter: &AuditFilter,
        pagination: &PaginationParams,
    ) -> Result<Vec<ModerationLog>> {
        let mut query = select_logs(filter);
        query.push(" LIMIT ");
        query.push_bind(pagination.limit() as i64);
        query.push(" OFFSET ");
        query.push_bind(pagination.offset() as i64);

        let logs = query
            .build_query_as::<ModerationLog>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(logs)
    }

    /// Every matching log, newest first, without paging.
    pub async fn all_logs(&mut self, filter: &AuditFilter) -> Result<Vec<ModerationLog>> {
        let logs = select_logs(filter)
            .build_query_as::<ModerationLog>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(logs)
    }

    /// Revisions of one target, oldest first so the edit chain reads in order.
    pub async fn revisions_for_target(&mut self, target: TargetRef) -> Result<Vec<ContentRevision>> {
        let revisions = sqlx::query_as::<_, ContentRevision>(
            r#"
            SELECT revision_id, target_kind, target_id, previous_text, new_text, edited_by,
                   moderation_log_id, created_at
            FROM content_revisions
            WHERE target_kind = ? AND target_id = ?
            ORDER BY created_at ASC, revision_id ASC
            "#,
        )
        .bind(target.kind.as_str())
        .bind(target.id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(revisions)
    }

    pub async fn count_revisions(&mut self, target: TargetRef) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_revisions WHERE target_kind = ? AND target_id = ?",
        )
        .bind(target.kind.as_str())
        .bind(target.id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }
}

fn select_logs(filter: &AuditFilter) -> QueryBuilder<'static, Sqlite> {
    let mut query = QueryBuilder::new(
        r#"
        SELECT log_id, actor_id, action, reason, report_id, target_kind, target_id,
               target_user_id, metadata, created_at
        FROM moderation_logs
        WHERE 1=1
        "#,
    );
    push_filter(&mut query, filter);
    query.push(" ORDER BY created_at DESC, log_id DESC");
    query
}

fn push_filter(query: &mut QueryBuilder<'_, Sqlite>, filter: &AuditFilter) {
    if let Some(actor_id) = filter.actor_id {
        query.push(" AND actor_id = ");
        query.push_bind(actor_id);
    }

    if let Some(target) = filter.target {
        query.push(" AND target_kind = ");
        query.push_bind(target.kind.as_str());
        query.push(" AND target_id = ");
        query.push_bind(target.id);
    }

    if let Some(user_id) = filter.target_user_id {
        query.push(" AND target_user_id = ");
        query.push_bind(user_id);
    }

    if let Some(report_id) = filter.report_id {
        query.push(" AND report_id = ");
        query.push_bind(report_id);
    }

    if let Some(action) = filter.action {
        query.push(" AND action = ");
        query.push_bind(action.as_str());
    }

    if let Some(since) = filter.since {
        query.push(" AND created_at >= ");
        query.push_bind(since);
    }

    if let Some(until) = filter.until {
        query.push(" AND created_at < ");
        query.push_bind(until);
    }
}
