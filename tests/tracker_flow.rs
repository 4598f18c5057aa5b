use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

use skilltrack::{
    ActivityStatus, Badge, BadgeCriteria, BadgeTier, Category, Database, GoalDraft, GoalPeriod,
    NewActivity, Profile, ScoringConfig, Tracker,
};

fn setup() -> (TempDir, Database, Tracker) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db = Database::new(dir.path().join("skilltrack.sqlite3")).expect("failed to open db");
    let tracker = Tracker::new(db.clone(), ScoringConfig::default());
    (dir, db, tracker)
}

fn category(id: &str, name: &str, multiplier: f64) -> Category {
    Category {
        id: id.into(),
        name: name.into(),
        slug: name.to_lowercase(),
        description: None,
        icon: "Award".into(),
        color: "#0F52BA".into(),
        xp_multiplier: multiplier,
        created_at: Utc::now(),
    }
}

fn profile(id: &str, name: &str, is_admin: bool) -> Profile {
    let now = Utc::now();
    Profile {
        id: id.into(),
        display_name: name.into(),
        is_admin,
        total_xp: 0,
        level: 1,
        streak: 0,
        created_at: now,
        updated_at: now,
    }
}

fn activity_input(user_id: &str, category_id: &str, date: NaiveDate, hours: f64) -> NewActivity {
    NewActivity {
        user_id: user_id.into(),
        category_id: category_id.into(),
        title: "Robotics club".into(),
        description: None,
        date,
        duration_hours: hours,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn logging_credits_profile_and_levels_up() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.5))
        .await
        .unwrap();
    let mut user = profile("user-1", "Alice", false);
    user.total_xp = 900;
    db.insert_profile(&user).await.unwrap();

    let activity = tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 10), 2.0))
        .await
        .unwrap();

    assert_eq!(activity.xp_earned, 250);
    assert_eq!(activity.status, ActivityStatus::Approved);

    let updated = db.get_profile("user-1").await.unwrap();
    assert_eq!(updated.total_xp, 1150);
    assert_eq!(updated.level, 2);
}

#[tokio::test]
async fn unknown_category_is_rejected_before_any_write() {
    let (_dir, db, tracker) = setup();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();

    let result = tracker
        .log_activity(activity_input("user-1", "cat-missing", date(2024, 9, 10), 2.0))
        .await;
    assert!(result.is_err());

    let untouched = db.get_profile("user-1").await.unwrap();
    assert_eq!(untouched.total_xp, 0);
}

#[tokio::test]
async fn verification_credits_only_on_approval() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-arts", "Arts", 2.0))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();
    db.insert_profile(&profile("admin-1", "Taylor", true))
        .await
        .unwrap();

    let first = tracker
        .submit_activity(activity_input("user-1", "cat-arts", date(2024, 9, 10), 3.0))
        .await
        .unwrap();
    let second = tracker
        .submit_activity(activity_input("user-1", "cat-arts", date(2024, 9, 11), 1.0))
        .await
        .unwrap();

    // Nothing counts while pending.
    assert_eq!(db.get_profile("user-1").await.unwrap().total_xp, 0);
    assert_eq!(tracker.pending_activities().await.unwrap().len(), 2);

    // Non-admins cannot verify.
    assert!(tracker
        .verify_activity(&first.id, ActivityStatus::Approved, "user-1")
        .await
        .is_err());

    let approved = tracker
        .verify_activity(&first.id, ActivityStatus::Approved, "admin-1")
        .await
        .unwrap();
    assert_eq!(approved.status, ActivityStatus::Approved);
    assert_eq!(approved.verified_by.as_deref(), Some("admin-1"));
    assert!(approved.verified_at.is_some());
    assert_eq!(db.get_profile("user-1").await.unwrap().total_xp, 300);

    let denied = tracker
        .verify_activity(&second.id, ActivityStatus::Denied, "admin-1")
        .await
        .unwrap();
    assert_eq!(denied.status, ActivityStatus::Denied);
    assert_eq!(db.get_profile("user-1").await.unwrap().total_xp, 300);

    // The transition away from pending happens at most once.
    assert!(tracker
        .verify_activity(&first.id, ActivityStatus::Denied, "admin-1")
        .await
        .is_err());
}

#[tokio::test]
async fn goal_completes_exactly_once() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.0))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();

    let goal = tracker
        .create_goal(GoalDraft {
            user_id: "user-1".into(),
            category_id: "cat-stem".into(),
            target_hours: 10.0,
            period: GoalPeriod::Semester,
            start_date: date(2024, 9, 1),
            end_date: None,
        })
        .await
        .unwrap();
    assert_eq!(goal.target_xp, 1000);
    assert_eq!(goal.end_date, date(2025, 1, 1));

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 5), 6.0))
        .await
        .unwrap();

    let progress = tracker.goal_progress("user-1").await.unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].progress_percentage, 60.0);
    assert!(!progress[0].completion_event);

    // An activity outside the window moves nothing.
    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2025, 2, 1), 8.0))
        .await
        .unwrap();
    let progress = tracker.goal_progress("user-1").await.unwrap();
    assert_eq!(progress[0].current_hours, 6.0);

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 20), 4.0))
        .await
        .unwrap();

    let progress = tracker.goal_progress("user-1").await.unwrap();
    assert_eq!(progress[0].progress_percentage, 100.0);
    assert!(progress[0].completion_event);
    assert!(progress[0].goal.is_completed);
    let completed_at = progress[0].goal.completed_at;
    assert!(completed_at.is_some());

    // Re-evaluation is quiet and leaves the completion timestamp alone.
    let again = tracker.goal_progress("user-1").await.unwrap();
    assert_eq!(again[0].progress_percentage, 100.0);
    assert!(!again[0].completion_event);
    assert_eq!(db.get_goal(&goal.id).await.unwrap().completed_at, completed_at);

    // Completed goals are retained.
    assert!(tracker.delete_goal(&goal.id, "user-1").await.is_err());
}

#[tokio::test]
async fn active_goals_can_be_deleted_by_their_owner_only() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.0))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();

    let goal = tracker
        .create_goal(GoalDraft {
            user_id: "user-1".into(),
            category_id: "cat-stem".into(),
            target_hours: 10.0,
            period: GoalPeriod::Year,
            start_date: date(2024, 9, 1),
            end_date: None,
        })
        .await
        .unwrap();

    assert!(tracker.delete_goal(&goal.id, "user-2").await.is_err());
    tracker.delete_goal(&goal.id, "user-1").await.unwrap();
    assert!(tracker.goal_progress("user-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn leaderboard_ranks_users_by_category_xp() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.0))
        .await
        .unwrap();
    db.insert_category(&category("cat-arts", "Arts", 1.5))
        .await
        .unwrap();
    for (id, name) in [("user-1", "Alice"), ("user-2", "Bob"), ("user-3", "Carol")] {
        db.insert_profile(&profile(id, name, false)).await.unwrap();
    }

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 1), 1.0))
        .await
        .unwrap();
    tracker
        .log_activity(activity_input("user-2", "cat-stem", date(2024, 9, 1), 3.0))
        .await
        .unwrap();
    tracker
        .log_activity(activity_input("user-3", "cat-stem", date(2024, 9, 1), 2.0))
        .await
        .unwrap();
    // Other-category XP must not leak into the STEM board.
    tracker
        .log_activity(activity_input("user-1", "cat-arts", date(2024, 9, 2), 40.0))
        .await
        .unwrap();

    let board = tracker.leaderboard("cat-stem", None).await.unwrap();
    assert_eq!(board.len(), 3);
    assert_eq!(board[0].user_id, "user-2");
    assert_eq!(board[0].total_xp, 300);
    assert_eq!(board[0].rank, 1);
    assert_eq!(board[1].user_id, "user-3");
    assert_eq!(board[2].user_id, "user-1");
    assert_eq!(board[2].rank, 3);

    let top_two = tracker.leaderboard("cat-stem", Some(2)).await.unwrap();
    assert_eq!(top_two.len(), 2);
}

#[tokio::test]
async fn report_card_covers_every_category() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.0))
        .await
        .unwrap();
    db.insert_category(&category("cat-arts", "Arts", 1.5))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 1), 25.0))
        .await
        .unwrap();

    let card = tracker.report_card("user-1").await.unwrap();
    assert_eq!(card.len(), 2);

    let (_, arts) = card.iter().find(|(c, _)| c.id == "cat-arts").unwrap();
    assert_eq!(arts.activities_count, 0);
    assert_eq!(arts.progress_percentage, 0.0);

    let (_, stem) = card.iter().find(|(c, _)| c.id == "cat-stem").unwrap();
    assert_eq!(stem.total_hours, 25.0);
    assert_eq!(stem.total_xp, 2500);
    assert_eq!(stem.progress_percentage, 50.0);
}

#[tokio::test]
async fn reconciliation_matches_the_incremental_counter() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.5))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();

    for day in 1..=5 {
        tracker
            .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, day), 2.0))
            .await
            .unwrap();
    }

    let incremental = db.get_profile("user-1").await.unwrap();
    let recomputed = db
        .recompute_profile_totals("user-1", tracker.config().xp_per_level)
        .await
        .unwrap();

    assert_eq!(recomputed.total_xp, incremental.total_xp);
    assert_eq!(recomputed.level, incremental.level);
    assert_eq!(recomputed.total_xp, 1250);
    assert_eq!(recomputed.level, 2);
}

#[tokio::test]
async fn badges_award_once_per_user() {
    let (_dir, db, tracker) = setup();
    db.insert_category(&category("cat-stem", "STEM", 2.0))
        .await
        .unwrap();
    db.insert_profile(&profile("user-1", "Alice", false))
        .await
        .unwrap();
    db.insert_badge(&Badge {
        id: "badge-dedicated".into(),
        category_id: Some("cat-stem".into()),
        name: "Dedicated".into(),
        description: None,
        icon: "Medal".into(),
        tier: BadgeTier::Bronze,
        criteria: BadgeCriteria {
            activities_count: Some(2),
            xp_amount: None,
            hours_amount: None,
        },
        created_at: Utc::now(),
    })
    .await
    .unwrap();

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 1), 1.0))
        .await
        .unwrap();
    assert!(tracker.eligible_badges("user-1").await.unwrap().is_empty());

    tracker
        .log_activity(activity_input("user-1", "cat-stem", date(2024, 9, 2), 1.0))
        .await
        .unwrap();

    let eligible = tracker.eligible_badges("user-1").await.unwrap();
    assert_eq!(eligible.len(), 1);
    assert_eq!(eligible[0].id, "badge-dedicated");

    let awarded = tracker.award_eligible_badges("user-1").await.unwrap();
    assert_eq!(awarded.len(), 1);
    assert_eq!(db.list_user_badges("user-1").await.unwrap().len(), 1);

    // Once earned, the badge drops out of eligibility and a direct re-award
    // is an error.
    assert!(tracker.eligible_badges("user-1").await.unwrap().is_empty());
    assert!(tracker.award_badge("user-1", "badge-dedicated").await.is_err());
}
