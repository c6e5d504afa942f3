/// Integration tests for the moderation ledger, configuration rows and the
/// abuse policy
mod common;

use chrono::{Duration, Utc};
use common::{database::*, fixtures::*};
use storage::dto::audit::AuditFilter;
use storage::dto::common::PaginationParams;
use storage::error::StorageError;
use storage::models::{AbusePolicy, Actor, ModerationAction, RatingConfig, TargetKind, TargetRef};
use storage::repository::config::ConfigRepository;
use storage::services::abuse::{check_post, AbuseViolation};
use storage::dto::report::CreateReportRequest;
use storage::models::{NewModerationLog, ReportReason};
use storage::repository::audit::AuditRepository;
use storage::services::audit::{query_logs, report_history};
use storage::services::reports::file_report;
use storage::services::moderation::{hide_target, set_user_state, unhide_target};

#[tokio::test]
async fn test_query_filters_and_orders_newest_first() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let first = Actor::moderator(create_test_user(pool, "first").await.user_id);
    let second = Actor::admin(create_test_user(pool, "second").await.user_id);
    let user = create_test_user(pool, "user").await;
    let problem = create_test_problem(pool, "Statement").await;
    let target = TargetRef::new(TargetKind::Problem, problem.problem_id);

    hide_target(pool, &first, target, "one", None).await.unwrap();
    unhide_target(pool, &second, target, "two", None).await.unwrap();
    set_user_state(pool, &second, user.user_id, ModerationAction::Warn, "three", None)
        .await
        .unwrap();

    let all = query_logs(pool, &AuditFilter::default(), &PaginationParams::default())
        .await
        .unwrap();
    let reasons: Vec<_> = all.data.iter().map(|l| l.reason.as_str()).collect();
    assert_eq!(reasons, ["three", "two", "one"]);

    let by_actor = query_logs(pool, &AuditFilter::by_actor(second.user_id), &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(by_actor.pagination.total_items, 2);

    let by_target = query_logs(pool, &AuditFilter::by_target(target), &PaginationParams::default())
        .await
        .unwrap();
    assert_eq!(by_target.data.len(), 2);

    let hides = query_logs(
        pool,
        &AuditFilter::by_target(target).with_action(ModerationAction::Hide),
        &PaginationParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(hides.data.len(), 1);
    assert_eq!(hides.data[0].actor_id, Some(first.user_id));

    let future = query_logs(
        pool,
        &AuditFilter::default().between(Some(Utc::now() + Duration::hours(1)), None),
        &PaginationParams::default(),
    )
    .await
    .unwrap();
    assert!(future.data.is_empty());

    let past = query_logs(
        pool,
        &AuditFilter::default().between(Some(Utc::now() - Duration::hours(1)), Some(Utc::now() + Duration::hours(1))),
        &PaginationParams::default(),
    )
    .await
    .unwrap();
    assert_eq!(past.data.len(), 3);
}

#[tokio::test]
async fn test_query_paginates() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let moderator = Actor::moderator(create_test_user(pool, "mod").await.user_id);
    let problem = create_test_problem(pool, "Statement").await;
    let target = TargetRef::new(TargetKind::Problem, problem.problem_id);

    for i in 0..5 {
        hide_target(pool, &moderator, target, &format!("r{i}"), None)
            .await
            .unwrap();
    }

    let page = query_logs(pool, &AuditFilter::default(), &PaginationParams::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 5);
    assert_eq!(page.pagination.total_pages, 3);
    let reasons: Vec<_> = page.data.iter().map(|l| l.reason.as_str()).collect();
    assert_eq!(reasons, ["r2", "r1"]);

    let invalid = query_logs(pool, &AuditFilter::default(), &PaginationParams::new(0, 2)).await;
    assert!(matches!(invalid, Err(StorageError::ConstraintViolation(_))));
}

#[tokio::test]
async fn test_report_history_is_not_truncated() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let moderator = create_test_user(pool, "mod").await;
    let problem = create_test_problem(pool, "Statement").await;
    let target = TargetRef::new(TargetKind::Problem, problem.problem_id);
    let report = file_report(
        pool,
        moderator.user_id,
        &CreateReportRequest::new(target, ReportReason::Spam),
    )
    .await
    .unwrap();

    {
        let mut conn = pool.acquire().await.unwrap();
        let mut audit = AuditRepository::new(&mut conn);
        for i in 0..520 {
            audit
                .append_log(
                    &NewModerationLog::new(moderator.user_id, ModerationAction::Warn, format!("note {i}"))
                        .with_report(Some(report.report_id))
                        .with_target(Some(target)),
                )
                .await
                .unwrap();
        }
    }

    let history = report_history(pool, report.report_id).await.unwrap();
    assert_eq!(history.len(), 520);
    assert_eq!(history[0].reason, "note 519");
    assert_eq!(history[519].reason, "note 0");
}

#[tokio::test]
async fn test_logs_are_append_only() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let moderator = Actor::moderator(create_test_user(pool, "mod").await.user_id);
    let problem = create_test_problem(pool, "Statement").await;
    let log = hide_target(
        pool,
        &moderator,
        TargetRef::new(TargetKind::Problem, problem.problem_id),
        "",
        None,
    )
    .await
    .unwrap();

    let update = sqlx::query("UPDATE moderation_logs SET reason = 'edited' WHERE log_id = ?")
        .bind(log.log_id)
        .execute(pool)
        .await;
    assert!(update.is_err());

    let delete = sqlx::query("DELETE FROM moderation_logs WHERE log_id = ?")
        .bind(log.log_id)
        .execute(pool)
        .await;
    assert!(delete.is_err());
}

#[tokio::test]
async fn test_config_rows_default_and_validate() {
    let db = setup_test_database().await;
    let mut conn = db.pool().acquire().await.unwrap();
    let mut configs = ConfigRepository::new(&mut conn);

    assert_eq!(configs.load_rating_config().await.unwrap(), RatingConfig::default());
    assert_eq!(configs.load_abuse_policy().await.unwrap(), AbusePolicy::default());

    let bounded = RatingConfig {
        rating_floor: Some(100.0),
        rating_cap: Some(3000.0),
        ..RatingConfig::default()
    };
    configs.save_rating_config(&bounded).await.unwrap();
    assert_eq!(configs.load_rating_config().await.unwrap(), bounded);

    let inverted = RatingConfig {
        rating_floor: Some(3000.0),
        rating_cap: Some(100.0),
        ..RatingConfig::default()
    };
    assert!(matches!(
        configs.save_rating_config(&inverted).await,
        Err(StorageError::Validation(_))
    ));
    assert_eq!(configs.load_rating_config().await.unwrap(), bounded);
}

#[tokio::test]
async fn test_posting_limits_count_comments_and_solutions() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let author = create_test_user(pool, "author").await;
    let problem = create_test_problem(pool, "Statement").await;
    let policy = AbusePolicy {
        comment_limit_per_minute: 3,
        comment_limit_per_hour: 10,
        ..AbusePolicy::default()
    };

    assert_eq!(check_post(pool, &policy, "hi", Some(author.user_id)).await.unwrap(), None);

    create_test_comment(pool, problem.problem_id, author.user_id, "one").await;
    create_test_comment(pool, problem.problem_id, author.user_id, "two").await;
    create_test_solution(pool, problem.problem_id, author.user_id, "three").await;

    assert_eq!(
        check_post(pool, &policy, "hi", Some(author.user_id)).await.unwrap(),
        Some(AbuseViolation::MinuteLimit)
    );
    assert_eq!(check_post(pool, &policy, "hi", None).await.unwrap(), None);
}

#[tokio::test]
async fn test_content_checks_run_before_rate_limits() {
    let db = setup_test_database().await;
    let pool = db.pool();
    let author = create_test_user(pool, "author").await;
    let policy = AbusePolicy {
        bad_word_list: "casino".to_string(),
        ..AbusePolicy::default()
    };

    let violation = check_post(pool, &policy, "Best CASINO odds", Some(author.user_id))
        .await
        .unwrap();
    assert_eq!(violation, Some(AbuseViolation::BlockedTerm));
    assert_eq!(check_post(pool, &policy, "", Some(author.user_id)).await.unwrap(), None);
}
