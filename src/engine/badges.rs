use crate::db::models::{BadgeCriteria, CategoryStats};

/// A badge is earned once every threshold that is present has been reached.
/// A criteria object with no thresholds never matches.
pub fn criteria_met(criteria: &BadgeCriteria, stats: &CategoryStats) -> bool {
    if criteria.activities_count.is_none()
        && criteria.xp_amount.is_none()
        && criteria.hours_amount.is_none()
    {
        return false;
    }

    if let Some(required) = criteria.activities_count {
        if stats.activities_count < required {
            return false;
        }
    }
    if let Some(required) = criteria.xp_amount {
        if stats.total_xp < required {
            return false;
        }
    }
    if let Some(required) = criteria.hours_amount {
        if stats.total_hours < required {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hours: f64, xp: i64, count: i64) -> CategoryStats {
        CategoryStats {
            category_id: "cat-stem".into(),
            total_hours: hours,
            total_xp: xp,
            activities_count: count,
            progress_percentage: 0.0,
        }
    }

    #[test]
    fn all_present_thresholds_must_hold() {
        let criteria = BadgeCriteria {
            activities_count: Some(5),
            xp_amount: Some(1000),
            hours_amount: None,
        };
        assert!(criteria_met(&criteria, &stats(0.0, 1200, 6)));
        assert!(!criteria_met(&criteria, &stats(0.0, 1200, 4)));
        assert!(!criteria_met(&criteria, &stats(0.0, 900, 6)));
    }

    #[test]
    fn empty_criteria_never_match() {
        assert!(!criteria_met(
            &BadgeCriteria::default(),
            &stats(100.0, 10_000, 100)
        ));
    }

    #[test]
    fn hours_threshold_is_inclusive() {
        let criteria = BadgeCriteria {
            activities_count: None,
            xp_amount: None,
            hours_amount: Some(25.0),
        };
        assert!(criteria_met(&criteria, &stats(25.0, 0, 0)));
        assert!(!criteria_met(&criteria, &stats(24.9, 0, 0)));
    }
}
