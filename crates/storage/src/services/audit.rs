use sqlx::SqlitePool;

use crate::dto::audit::AuditFilter;
use crate::dto::common::{PaginatedResponse, PaginationParams};
use crate::error::{Result, StorageError};
use crate::models::{ContentRevision, ModerationLog, TargetRef};
use crate::repository::audit::AuditRepository;

/// Filtered page of the moderation ledger, newest first.
pub async fn query_logs(
    pool: &SqlitePool,
    filter: &AuditFilter,
    pagination: &PaginationParams,
) -> Result<PaginatedResponse<ModerationLog>> {
    pagination
        .validate()
        .map_err(StorageError::ConstraintViolation)?;

    let mut conn = pool.acquire().await?;
    let mut repo = AuditRepository::new(&mut conn);
    let total = repo.count_logs(filter).await?;
    let logs = repo.query_logs(filter, pagination).await?;

    Ok(PaginatedResponse::new(
        logs,
        pagination.page,
        pagination.page_size,
        total,
    ))
}

/// Every log row attached to a report, newest first.
pub async fn report_history(pool: &SqlitePool, report_id: i64) -> Result<Vec<ModerationLog>> {
    let mut conn = pool.acquire().await?;
    AuditRepository::new(&mut conn)
        .all_logs(&AuditFilter::by_report(report_id))
        .await
}

pub async fn revisions_for_target(
    pool: &SqlitePool,
    target: TargetRef,
) -> Result<Vec<ContentRevision>> {
    let mut conn = pool.acquire().await?;
    AuditRepository::new(&mut conn).revisions_for_target(target).await
}
