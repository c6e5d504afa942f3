use sqlx::SqlitePool;
use tracing::{info, warn};
use validator::Validate;

use super::rating_engine;
use crate::dto::rating::{RatingHistoryEntry, RatingRunDetail};
use crate::error::Result;
use crate::models::{NewRatingRun, RatingConfig, RatingRun};
use crate::repository::contest::ContestRepository;
use crate::repository::rating::RatingRepository;
use crate::repository::user::UserRepository;

/// Apply one rating run to a contest.
///
/// Returns `Ok(None)` when the contest has fewer than two results; in that
/// case nothing is written, not even a run header. Otherwise the run header,
/// every result delta, every live rating and one entry per participant are
/// committed together.
pub async fn apply_rating_run(
    pool: &SqlitePool,
    contest_id: i64,
    config: &RatingConfig,
    triggered_by: Option<i64>,
    k_override: Option<f64>,
) -> Result<Option<RatingRunDetail>> {
    // The snapshot records the K actually used.
    let config = match k_override {
        Some(k_factor) => RatingConfig {
            k_factor,
            ..config.clone()
        },
        None => config.clone(),
    };
    config.validate()?;

    let mut tx = pool.begin().await?;

    ContestRepository::new(&mut tx).find_by_id(contest_id).await?;
    let standings = ContestRepository::new(&mut tx)
        .ranked_results(contest_id)
        .await?;

    let changes = rating_engine::compute(&standings, &config, None);
    if changes.is_empty() {
        info!(
            contest_id,
            participants = standings.len(),
            "Skipping rating run: not enough participants"
        );
        return Ok(None);
    }

    let run = RatingRepository::new(&mut tx)
        .create_run(&NewRatingRun::applied(contest_id, triggered_by, &config))
        .await?;

    let mut entries = Vec::with_capacity(changes.len());
    for change in &changes {
        ContestRepository::new(&mut tx)
            .set_rating_delta(change.result_id, change.delta)
            .await?;
        UserRepository::new(&mut tx)
            .update_rating(change.user_id, change.new_rating)
            .await?;
        let entry = RatingRepository::new(&mut tx)
            .insert_entry(
                run.run_id,
                change.user_id,
                change.previous_rating,
                change.new_rating,
                change.delta,
            )
            .await?;
        entries.push(entry);
    }

    tx.commit().await?;

    info!(
        contest_id,
        run_id = run.run_id,
        participants = entries.len(),
        "Rating run applied"
    );

    Ok(Some(RatingRunDetail { run, entries }))
}

/// Reverse an applied run by copying each entry's stored `previous_rating`
/// back onto the participant. The participants' result deltas are reset to
/// zero.
///
/// Returns `Ok(None)` without writing anything when the run is itself a
/// rollback or has already been rolled back.
pub async fn rollback_rating_run(
    pool: &SqlitePool,
    run_id: i64,
    triggered_by: Option<i64>,
) -> Result<Option<RatingRunDetail>> {
    let mut tx = pool.begin().await?;

    let original = RatingRepository::new(&mut tx).find_run(run_id).await?;
    if original.is_rollback {
        warn!(run_id, "Refusing to roll back a rollback run");
        return Ok(None);
    }

    if !RatingRepository::new(&mut tx).mark_rolled_back(run_id).await? {
        warn!(run_id, status = %original.status, "Run is not in applied state");
        return Ok(None);
    }

    let original_entries = RatingRepository::new(&mut tx).entries_for_run(run_id).await?;
    let run = RatingRepository::new(&mut tx)
        .create_run(&NewRatingRun::rollback_of(&original, triggered_by))
        .await?;

    let mut entries = Vec::with_capacity(original_entries.len());
    for entry in &original_entries {
        let current = UserRepository::new(&mut tx)
            .find_by_id(entry.user_id)
            .await?
            .rating;
        UserRepository::new(&mut tx)
            .update_rating(entry.user_id, entry.previous_rating)
            .await?;
        ContestRepository::new(&mut tx)
            .reset_rating_delta(original.contest_id, entry.user_id)
            .await?;
        let reverse = RatingRepository::new(&mut tx)
            .insert_entry(
                run.run_id,
                entry.user_id,
                current,
                entry.previous_rating,
                entry.previous_rating - current,
            )
            .await?;
        entries.push(reverse);
    }

    tx.commit().await?;

    info!(
        run_id,
        rollback_run_id = run.run_id,
        participants = entries.len(),
        "Rating run rolled back"
    );

    Ok(Some(RatingRunDetail { run, entries }))
}

pub async fn get_run_detail(pool: &SqlitePool, run_id: i64) -> Result<RatingRunDetail> {
    let mut conn = pool.acquire().await?;
    let mut repo = RatingRepository::new(&mut conn);
    let run = repo.find_run(run_id).await?;
    let entries = repo.entries_for_run(run_id).await?;
    Ok(RatingRunDetail { run, entries })
}

pub async fn list_runs(pool: &SqlitePool, contest_id: i64) -> Result<Vec<RatingRun>> {
    let mut conn = pool.acquire().await?;
    RatingRepository::new(&mut conn)
        .list_runs_for_contest(contest_id)
        .await
}

pub async fn rating_history(pool: &SqlitePool, user_id: i64) -> Result<Vec<RatingHistoryEntry>> {
    let mut conn = pool.acquire().await?;
    RatingRepository::new(&mut conn).history_for_user(user_id).await
}
