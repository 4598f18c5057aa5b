use anyhow::{bail, Result};
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::db::{
    Activity, ActivityStatus, Badge, Category, CategoryStats, Database, Goal, GoalProgress,
    LeaderboardEntry, NewActivity, UserBadge,
};
use crate::engine::{self, ScoringConfig};
use crate::goals::{self, GoalDraft};

/// Facade tying the ledger to the engine. Validation runs before any write;
/// writes that change approved XP go through the transactional repository
/// paths.
#[derive(Clone)]
pub struct Tracker {
    db: Database,
    config: ScoringConfig,
}

impl Tracker {
    pub fn new(db: Database, config: ScoringConfig) -> Self {
        Self { db, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn build_activity(&self, input: &NewActivity, category: &Category, status: ActivityStatus) -> Result<Activity> {
        let xp_earned = engine::xp_for_activity(input.duration_hours, category, &self.config)?;
        if input.title.trim().is_empty() {
            bail!("activity title must not be empty");
        }
        let now = Utc::now();

        Ok(Activity {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id.clone(),
            category_id: input.category_id.clone(),
            title: input.title.clone(),
            description: input.description.clone(),
            date: input.date,
            duration_hours: input.duration_hours,
            xp_earned,
            status,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Direct logging path: the activity lands approved and the owner's
    /// totals are credited in the same transaction.
    pub async fn log_activity(&self, input: NewActivity) -> Result<Activity> {
        let category = self.db.get_category(&input.category_id).await?;
        let activity = self.build_activity(&input, &category, ActivityStatus::Approved)?;

        self.db
            .record_approved_activity(&activity, self.config.xp_per_level)
            .await?;

        info!(
            "Logged {}h of {} for user {} (+{} XP)",
            activity.duration_hours, category.name, activity.user_id, activity.xp_earned
        );
        Ok(activity)
    }

    /// Submission path: the activity waits in the verification queue and
    /// contributes nothing until approved.
    pub async fn submit_activity(&self, input: NewActivity) -> Result<Activity> {
        let category = self.db.get_category(&input.category_id).await?;
        let activity = self.build_activity(&input, &category, ActivityStatus::Pending)?;

        self.db.insert_pending_activity(&activity).await?;

        info!(
            "Queued activity {} by user {} for verification",
            activity.id, activity.user_id
        );
        Ok(activity)
    }

    pub async fn pending_activities(&self) -> Result<Vec<Activity>> {
        self.db.list_pending_activities().await
    }

    /// Admin decision on a pending activity. Approval credits the owner's
    /// totals; denial only stamps the verifier.
    pub async fn verify_activity(
        &self,
        activity_id: &str,
        decision: ActivityStatus,
        verifier_id: &str,
    ) -> Result<Activity> {
        let verifier = self.db.get_profile(verifier_id).await?;
        if !verifier.is_admin {
            bail!("user {verifier_id} is not an administrator");
        }

        let activity = self
            .db
            .set_activity_status(
                activity_id,
                decision,
                verifier_id,
                Utc::now(),
                self.config.xp_per_level,
            )
            .await?;

        info!(
            "Activity {} {} by {}",
            activity.id,
            activity.status.as_str(),
            verifier_id
        );
        Ok(activity)
    }

    pub async fn category_stats(
        &self,
        user_id: &str,
        category_id: &str,
        target_hours: Option<f64>,
    ) -> Result<CategoryStats> {
        let category = self.db.get_category(category_id).await?;
        let activities = self
            .db
            .list_approved_in_category(user_id, &category.id)
            .await?;
        let target = target_hours.unwrap_or(self.config.default_target_hours);
        engine::category_stats(&category.id, &activities, target)
    }

    /// Stats for every category, in category name order.
    pub async fn report_card(&self, user_id: &str) -> Result<Vec<(Category, CategoryStats)>> {
        let categories = self.db.list_categories().await?;
        let activities = self.db.list_approved_for_user(user_id).await?;

        let mut card = Vec::with_capacity(categories.len());
        for category in categories {
            let stats = engine::category_stats(
                &category.id,
                &activities,
                self.config.default_target_hours,
            )?;
            card.push((category, stats));
        }
        Ok(card)
    }

    pub async fn leaderboard(
        &self,
        category_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let category = self.db.get_category(category_id).await?;
        let activities = self.db.list_category_activity(&category.id).await?;
        engine::compute_leaderboard(&activities, limit.unwrap_or(self.config.leaderboard_limit))
    }

    pub async fn create_goal(&self, draft: GoalDraft) -> Result<Goal> {
        let category = self.db.get_category(&draft.category_id).await?;
        let goal = goals::build_goal(&draft, &category, &self.config, Utc::now())?;

        self.db.insert_goal(&goal).await?;

        info!(
            "Goal {} created: {}h of {} by {}",
            goal.id, goal.target_hours, category.name, goal.end_date
        );
        Ok(goal)
    }

    /// Evaluate all of a user's goals and persist first-time completions.
    /// Each goal is independent; a completion that another evaluation beat us
    /// to is reported without a duplicate event.
    pub async fn goal_progress(&self, user_id: &str) -> Result<Vec<GoalProgress>> {
        let user_goals = self.db.list_goals_for_user(user_id).await?;

        let mut results = Vec::with_capacity(user_goals.len());
        for goal in user_goals {
            let activities = self
                .db
                .list_approved_in_window(
                    &goal.user_id,
                    &goal.category_id,
                    goal.start_date,
                    goal.end_date,
                )
                .await?;

            let mut progress = goals::evaluate(&goal, &activities)?;

            if progress.completion_event {
                let completed_at = Utc::now();
                let transitioned = self.db.mark_goal_completed(&goal.id, completed_at).await?;
                if transitioned {
                    info!("Goal {} completed by user {}", goal.id, user_id);
                    progress.goal.is_completed = true;
                    progress.goal.completed_at = Some(completed_at);
                } else {
                    progress.completion_event = false;
                    progress.goal = self.db.get_goal(&goal.id).await?;
                }
            }

            results.push(progress);
        }
        Ok(results)
    }

    /// Users may delete their own goals while still active; completed goals
    /// are retained.
    pub async fn delete_goal(&self, goal_id: &str, user_id: &str) -> Result<()> {
        let goal = self.db.get_goal(goal_id).await?;
        if goal.user_id != user_id {
            bail!("goal {goal_id} does not belong to user {user_id}");
        }
        self.db.delete_goal(goal_id).await
    }

    /// Category badges whose thresholds the user has reached but not yet
    /// been awarded. Badges without a category stay admin-awarded only.
    pub async fn eligible_badges(&self, user_id: &str) -> Result<Vec<Badge>> {
        let badges = self.db.list_badges().await?;
        let earned: Vec<String> = self
            .db
            .list_user_badges(user_id)
            .await?
            .into_iter()
            .map(|ub| ub.badge_id)
            .collect();
        let activities = self.db.list_approved_for_user(user_id).await?;

        let mut eligible = Vec::new();
        for badge in badges {
            if earned.contains(&badge.id) {
                continue;
            }
            let Some(category_id) = badge.category_id.as_deref() else {
                continue;
            };
            let stats = engine::category_stats(
                category_id,
                &activities,
                self.config.default_target_hours,
            )?;
            if engine::criteria_met(&badge.criteria, &stats) {
                eligible.push(badge);
            }
        }
        Ok(eligible)
    }

    pub async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<UserBadge> {
        let awarded = self.db.award_badge(user_id, badge_id, Utc::now()).await?;
        info!("Badge {badge_id} awarded to user {user_id}");
        Ok(awarded)
    }

    /// Award every badge the user currently qualifies for.
    pub async fn award_eligible_badges(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let eligible = self.eligible_badges(user_id).await?;

        let mut awarded = Vec::with_capacity(eligible.len());
        for badge in eligible {
            awarded.push(self.award_badge(user_id, &badge.id).await?);
        }
        Ok(awarded)
    }
}
