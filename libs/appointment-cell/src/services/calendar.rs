// libs/appointment-cell/src/services/calendar.rs
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{ClinicSchedulePolicy, PolicyRule};
use crate::store::ClinicConfigStore;

fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

impl ClinicSchedulePolicy {
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.works_on(date.weekday())
    }

    /// Half-open containment `lunch_start <= time < lunch_end`, minute precision.
    pub fn is_lunch_conflict(&self, time: NaiveTime) -> bool {
        if !self.lunch_break_enabled {
            return false;
        }
        let (Some(start), Some(end)) = (self.lunch_start, self.lunch_end) else {
            return false;
        };

        let candidate = minutes_since_midnight(time);
        minutes_since_midnight(start) <= candidate && candidate < minutes_since_midnight(end)
    }

    /// First rule the candidate start breaks, working day checked first.
    pub fn violation_for(&self, date: NaiveDate, time: NaiveTime) -> Option<PolicyRule> {
        if !self.is_working_day(date) {
            return Some(PolicyRule::NonWorkingDay { date });
        }
        if self.is_lunch_conflict(time) {
            if let (Some(lunch_start), Some(lunch_end)) = (self.lunch_start, self.lunch_end) {
                return Some(PolicyRule::LunchBreak { lunch_start, lunch_end });
            }
        }
        None
    }
}

/// Resolves clinic calendar rules, degrading to the fallback policy when the
/// clinic settings cannot be read.
pub struct CalendarPolicyService {
    config_store: Arc<dyn ClinicConfigStore>,
}

impl CalendarPolicyService {
    pub fn new(config_store: Arc<dyn ClinicConfigStore>) -> Self {
        Self { config_store }
    }

    pub async fn resolve(&self, clinic_id: Uuid) -> ClinicSchedulePolicy {
        match self.config_store.get_schedule_policy(clinic_id).await {
            Ok(Some(policy)) => {
                debug!("Loaded schedule policy for clinic {}", clinic_id);
                policy
            }
            Ok(None) => {
                warn!("No schedule policy stored for clinic {}, using Monday-Friday fallback", clinic_id);
                ClinicSchedulePolicy::fallback()
            }
            Err(e) => {
                warn!("Schedule policy lookup failed for clinic {}: {} - using Monday-Friday fallback without lunch break", clinic_id, e);
                ClinicSchedulePolicy::fallback()
            }
        }
    }

    pub async fn is_working_day(&self, clinic_id: Uuid, date: NaiveDate) -> bool {
        self.resolve(clinic_id).await.is_working_day(date)
    }

    pub async fn is_lunch_conflict(&self, clinic_id: Uuid, time: NaiveTime) -> bool {
        self.resolve(clinic_id).await.is_lunch_conflict(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn lunch_policy() -> ClinicSchedulePolicy {
        ClinicSchedulePolicy::fallback().with_lunch_break(t(12, 0), t(13, 0))
    }

    #[test]
    fn weekdays_follow_sunday_zero_numbering() {
        let policy = ClinicSchedulePolicy { working_days: vec![0, 6], ..ClinicSchedulePolicy::fallback() };
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        let monday = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();

        assert!(policy.is_working_day(saturday));
        assert!(policy.is_working_day(sunday));
        assert!(!policy.is_working_day(monday));
    }

    #[test]
    fn lunch_window_is_half_open() {
        let policy = lunch_policy();

        assert!(!policy.is_lunch_conflict(t(11, 59)));
        assert!(policy.is_lunch_conflict(t(12, 0)));
        assert!(policy.is_lunch_conflict(t(12, 59)));
        assert!(!policy.is_lunch_conflict(t(13, 0)));
    }

    #[test]
    fn disabled_or_incomplete_lunch_never_conflicts() {
        let mut policy = lunch_policy();
        policy.lunch_break_enabled = false;
        assert!(!policy.is_lunch_conflict(t(12, 30)));

        let mut incomplete = lunch_policy();
        incomplete.lunch_end = None;
        assert!(!incomplete.is_lunch_conflict(t(12, 30)));
    }

    #[test]
    fn working_day_is_reported_before_lunch() {
        let policy = lunch_policy();
        let saturday = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        assert_eq!(
            policy.violation_for(saturday, t(12, 30)),
            Some(PolicyRule::NonWorkingDay { date: saturday })
        );
    }
}
