//! Moderation actions against content and users.
//!
//! Each public function runs in its own transaction and pairs the state
//! change with its ledger row. The `*_in` variants take an open connection
//! so report handling can compose them inside a larger transaction.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{Result, StorageError};
use crate::models::{
    Actor, ContentRevision, Moderatable, ModerationAction, ModerationLog, NewContentRevision,
    NewModerationLog, TargetRef,
};
use crate::repository::audit::AuditRepository;
use crate::repository::target::TargetRepository;
use crate::repository::user::UserRepository;

/// Result of a redaction request.
#[derive(Debug, Clone)]
pub enum RedactOutcome {
    /// The target has no text field or already holds the replacement.
    /// Nothing was written.
    Unchanged,
    Redacted {
        log: ModerationLog,
        revision: ContentRevision,
    },
}

impl RedactOutcome {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, RedactOutcome::Unchanged)
    }
}

pub async fn hide_target(
    pool: &SqlitePool,
    actor: &Actor,
    target: TargetRef,
    reason: &str,
    report_id: Option<i64>,
) -> Result<ModerationLog> {
    let mut tx = pool.begin().await?;
    let log = set_visibility_in(&mut tx, actor, target, true, reason, report_id).await?;
    tx.commit().await?;
    Ok(log)
}

pub async fn unhide_target(
    pool: &SqlitePool,
    actor: &Actor,
    target: TargetRef,
    reason: &str,
    report_id: Option<i64>,
) -> Result<ModerationLog> {
    let mut tx = pool.begin().await?;
    let log = set_visibility_in(&mut tx, actor, target, false, reason, report_id).await?;
    tx.commit().await?;
    Ok(log)
}

/// Hide or unhide through the target's visibility capability. The log row
/// is written even when the target has no such capability or is already in
/// the requested state.
pub(crate) async fn set_visibility_in(
    conn: &mut SqliteConnection,
    actor: &Actor,
    target: TargetRef,
    hidden: bool,
    reason: &str,
    report_id: Option<i64>,
) -> Result<ModerationLog> {
    actor.require_moderator()?;

    let mut loaded = TargetRepository::new(conn).load(target).await?;
    match loaded.try_set_hidden(hidden) {
        Some(change) => {
            TargetRepository::new(conn).save(&loaded).await?;
            debug!(%target, field = ?change.field, was_hidden = change.was_hidden, hidden, "Visibility set");
        }
        None => debug!(%target, "Target has no visibility capability"),
    }

    let action = if hidden {
        ModerationAction::Hide
    } else {
        ModerationAction::Unhide
    };
    let entry = NewModerationLog::new(actor.user_id, action, reason)
        .with_report(report_id)
        .with_target(Some(target));
    let log = AuditRepository::new(conn).append_log(&entry).await?;

    info!(actor_id = actor.user_id, %target, %action, log_id = log.log_id, "Moderation action applied");
    Ok(log)
}

pub async fn redact_target(
    pool: &SqlitePool,
    actor: &Actor,
    target: TargetRef,
    replacement: &str,
    reason: &str,
    report_id: Option<i64>,
) -> Result<RedactOutcome> {
    let mut tx = pool.begin().await?;
    let outcome = redact_in(&mut tx, actor, target, replacement, reason, report_id).await?;
    tx.commit().await?;
    Ok(outcome)
}

pub(crate) async fn redact_in(
    conn: &mut SqliteConnection,
    actor: &Actor,
    target: TargetRef,
    replacement: &str,
    reason: &str,
    report_id: Option<i64>,
) -> Result<RedactOutcome> {
    actor.require_moderator()?;

    let mut loaded = TargetRepository::new(conn).load(target).await?;
    let Some(change) = loaded.try_set_text(replacement) else {
        debug!(%target, "Redaction left target unchanged");
        return Ok(RedactOutcome::Unchanged);
    };
    TargetRepository::new(conn).save(&loaded).await?;

    let entry = NewModerationLog::new(actor.user_id, ModerationAction::Redact, reason)
        .with_report(report_id)
        .with_target(Some(target));
    let mut audit = AuditRepository::new(conn);
    let log = audit.append_log(&entry).await?;
    let revision = audit
        .append_revision(&NewContentRevision {
            target,
            previous_text: change.previous,
            new_text: change.new,
            edited_by: Some(actor.user_id),
            moderation_log_id: log.log_id,
        })
        .await?;

    info!(
        actor_id = actor.user_id,
        %target,
        log_id = log.log_id,
        revision_id = revision.revision_id,
        "Target redacted"
    );
    Ok(RedactOutcome::Redacted { log, revision })
}

/// Apply a user-state action. `mute_until` is only read for mutes.
pub async fn set_user_state(
    pool: &SqlitePool,
    actor: &Actor,
    user_id: i64,
    action: ModerationAction,
    reason: &str,
    mute_until: Option<DateTime<Utc>>,
) -> Result<ModerationLog> {
    let mut tx = pool.begin().await?;
    let log = set_user_state_in(&mut tx, actor, user_id, action, reason, mute_until, None).await?;
    tx.commit().await?;
    Ok(log)
}

pub(crate) async fn set_user_state_in(
    conn: &mut SqliteConnection,
    actor: &Actor,
    user_id: i64,
    action: ModerationAction,
    reason: &str,
    mute_until: Option<DateTime<Utc>>,
    report_id: Option<i64>,
) -> Result<ModerationLog> {
    check_user_state_action(actor, action)?;

    let mut users = UserRepository::new(conn);
    users.find_by_id(user_id).await?;

    let mut metadata = json!({});
    match action {
        ModerationAction::Mute => {
            users.set_mute(user_id, mute_until).await?;
            metadata = json!({ "mute_until": mute_until.map(|t| t.to_rfc3339()) });
        }
        ModerationAction::Ban => users.set_banned(user_id, true).await?,
        ModerationAction::ShadowBan => users.set_shadow_banned(user_id, true).await?,
        // Warnings only log.
        _ => {}
    }

    let entry = NewModerationLog::new(actor.user_id, action, reason)
        .with_report(report_id)
        .with_target_user(user_id)
        .with_metadata(metadata);
    let log = AuditRepository::new(conn).append_log(&entry).await?;

    info!(actor_id = actor.user_id, user_id, %action, log_id = log.log_id, "User state set");
    Ok(log)
}

/// Undo a mute, ban or shadow ban. Any other action is a no-op that writes
/// nothing and returns `Ok(None)`.
pub async fn clear_user_state(
    pool: &SqlitePool,
    actor: &Actor,
    user_id: i64,
    action: ModerationAction,
    reason: &str,
) -> Result<Option<ModerationLog>> {
    if !matches!(
        action,
        ModerationAction::Mute | ModerationAction::Ban | ModerationAction::ShadowBan
    ) {
        return Ok(None);
    }
    check_user_state_action(actor, action)?;

    let mut tx = pool.begin().await?;
    let mut users = UserRepository::new(&mut tx);
    users.find_by_id(user_id).await?;

    match action {
        ModerationAction::Mute => users.set_mute(user_id, None).await?,
        ModerationAction::Ban => users.set_banned(user_id, false).await?,
        _ => users.set_shadow_banned(user_id, false).await?,
    }

    let entry = NewModerationLog::new(actor.user_id, action, reason)
        .with_target_user(user_id)
        .with_metadata(json!({ "cleared": true }));
    let log = AuditRepository::new(&mut tx).append_log(&entry).await?;
    tx.commit().await?;

    info!(actor_id = actor.user_id, user_id, %action, log_id = log.log_id, "User state cleared");
    Ok(Some(log))
}

fn check_user_state_action(actor: &Actor, action: ModerationAction) -> Result<()> {
    if !action.is_user_state() {
        return Err(StorageError::UnsupportedAction(action));
    }
    if action.requires_admin() {
        actor.require_admin()
    } else {
        actor.require_moderator()
    }
}
