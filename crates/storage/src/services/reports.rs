use chrono::{Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use validator::Validate;

use super::moderation::{self, RedactOutcome};
use crate::dto::report::{CreateReportRequest, ReportActionRequest};
use crate::error::{Result, StorageError};
use crate::models::{
    Actor, Moderatable, ModerationAction, ModerationLog, NewModerationLog, Report, ReportStatus,
};
use crate::repository::audit::AuditRepository;
use crate::repository::report::ReportRepository;
use crate::repository::target::TargetRepository;

pub async fn file_report(
    pool: &SqlitePool,
    reporter_id: i64,
    req: &CreateReportRequest,
) -> Result<Report> {
    req.validate()?;

    let mut tx = pool.begin().await?;
    TargetRepository::new(&mut tx).load(req.target).await?;
    let report = ReportRepository::new(&mut tx).create(reporter_id, req).await?;
    tx.commit().await?;

    info!(
        report_id = report.report_id,
        target = %req.target,
        reason = %req.reason_code,
        "Report filed"
    );
    Ok(report)
}

pub async fn get_report(pool: &SqlitePool, report_id: i64) -> Result<Report> {
    let mut conn = pool.acquire().await?;
    ReportRepository::new(&mut conn).find_by_id(report_id).await
}

/// Reports awaiting a decision, most severe first.
pub async fn moderation_queue(pool: &SqlitePool, status: ReportStatus) -> Result<Vec<Report>> {
    let mut conn = pool.acquire().await?;
    ReportRepository::new(&mut conn).list_by_status(status).await
}

/// Move an open report into review under `assignee_id`.
pub async fn assign_report(
    pool: &SqlitePool,
    actor: &Actor,
    report_id: i64,
    assignee_id: i64,
) -> Result<Report> {
    actor.require_moderator()?;

    let mut tx = pool.begin().await?;
    let mut reports = ReportRepository::new(&mut tx);
    let report = reports.find_by_id(report_id).await?;
    check_transition(report.status, ReportStatus::InReview)?;
    let report = reports.assign(report_id, assignee_id).await?;
    tx.commit().await?;

    info!(report_id, assignee_id, "Report assigned");
    Ok(report)
}

/// Close a report with a terminal status and log the matching action.
pub async fn resolve_report(
    pool: &SqlitePool,
    actor: &Actor,
    report_id: i64,
    status: ReportStatus,
    note: &str,
) -> Result<(Report, ModerationLog)> {
    let mut tx = pool.begin().await?;
    let resolved = resolve_in(&mut tx, actor, report_id, status, note).await?;
    tx.commit().await?;
    Ok(resolved)
}

async fn resolve_in(
    conn: &mut SqliteConnection,
    actor: &Actor,
    report_id: i64,
    status: ReportStatus,
    note: &str,
) -> Result<(Report, ModerationLog)> {
    actor.require_moderator()?;

    let mut reports = ReportRepository::new(conn);
    let report = reports.find_by_id(report_id).await?;
    if !status.is_terminal() {
        return Err(invalid_transition(report.status, status));
    }
    check_transition(report.status, status)?;

    let report = reports
        .close(report_id, status, note, actor.user_id, Utc::now())
        .await?;

    let action = status.closing_action();
    let reason = if note.is_empty() { action.as_str() } else { note };
    let entry = NewModerationLog::new(actor.user_id, action, reason)
        .with_report(Some(report_id))
        .with_target(Some(report.target()));
    let log = AuditRepository::new(conn).append_log(&entry).await?;

    info!(report_id, %status, log_id = log.log_id, "Report closed");
    Ok((report, log))
}

/// Apply a moderator's decision to a report's target in one transaction.
///
/// Content actions act on the reported target. User-state actions act on
/// the user responsible for it: the author for comments and solutions, the
/// owner for profiles. Returns `Ok(None)` when nothing was logged, either
/// because a redaction changed nothing or the target has no responsible
/// user.
pub async fn apply_report_action(
    pool: &SqlitePool,
    actor: &Actor,
    report_id: i64,
    req: &ReportActionRequest,
) -> Result<Option<ModerationLog>> {
    let mut tx = pool.begin().await?;

    let report = ReportRepository::new(&mut tx).find_by_id(report_id).await?;
    let target = report.target();
    let reason = req.reason.as_str();

    let log = match req.action {
        ModerationAction::Hide | ModerationAction::Unhide => {
            let hidden = req.action == ModerationAction::Hide;
            let log = moderation::set_visibility_in(
                &mut tx,
                actor,
                target,
                hidden,
                reason,
                Some(report_id),
            )
            .await?;
            Some(log)
        }
        ModerationAction::Redact => {
            let replacement = req
                .replacement_text
                .as_deref()
                .ok_or(StorageError::MissingField("replacement_text"))?;
            let outcome = moderation::redact_in(
                &mut tx,
                actor,
                target,
                replacement,
                reason,
                Some(report_id),
            )
            .await?;
            match outcome {
                RedactOutcome::Redacted { log, .. } => Some(log),
                RedactOutcome::Unchanged => None,
            }
        }
        ModerationAction::Warn
        | ModerationAction::Mute
        | ModerationAction::Ban
        | ModerationAction::ShadowBan => {
            let loaded = TargetRepository::new(&mut tx).load(target).await?;
            match loaded.responsible_user() {
                Some(user_id) => {
                    let mute_until = (req.action == ModerationAction::Mute)
                        .then(|| Utc::now() + Duration::days(req.mute_days()));
                    let log = moderation::set_user_state_in(
                        &mut tx,
                        actor,
                        user_id,
                        req.action,
                        reason,
                        mute_until,
                        Some(report_id),
                    )
                    .await?;
                    Some(log)
                }
                None => {
                    debug!(report_id, %target, "Target has no responsible user");
                    None
                }
            }
        }
        ModerationAction::Resolve => {
            Some(resolve_in(&mut tx, actor, report_id, ReportStatus::Resolved, reason).await?.1)
        }
        ModerationAction::Dismiss => {
            Some(resolve_in(&mut tx, actor, report_id, ReportStatus::Dismissed, reason).await?.1)
        }
        ModerationAction::Escalate => {
            Some(resolve_in(&mut tx, actor, report_id, ReportStatus::Escalated, reason).await?.1)
        }
    };

    tx.commit().await?;
    Ok(log)
}

fn check_transition(from: ReportStatus, to: ReportStatus) -> Result<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(invalid_transition(from, to))
    }
}

fn invalid_transition(from: ReportStatus, to: ReportStatus) -> StorageError {
    StorageError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}
