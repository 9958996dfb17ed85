use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            ..AppConfig::default()
        }
    }
}

/// Ids for one tenant with a contact and a professional already registered.
#[derive(Debug, Clone, Copy)]
pub struct TestClinic {
    pub clinic_id: Uuid,
    pub contact_id: Uuid,
    pub professional_id: Uuid,
    pub tag_id: Uuid,
}

impl Default for TestClinic {
    fn default() -> Self {
        Self {
            clinic_id: Uuid::new_v4(),
            contact_id: Uuid::new_v4(),
            professional_id: Uuid::new_v4(),
            tag_id: Uuid::new_v4(),
        }
    }
}

/// First date strictly after `from` that falls on `weekday`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let mut date = from + Duration::days(1);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_row(
        clinic: &TestClinic,
        date: &str,
        time: &str,
        duration_minutes: i32,
        status: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4(),
            "contact_id": clinic.contact_id,
            "clinic_id": clinic.clinic_id,
            "professional_id": clinic.professional_id,
            "scheduled_date": date,
            "scheduled_time": format!("{}:00", time),
            "duration_minutes": duration_minutes,
            "status": status,
            "tag_id": null,
            "payment_status": null,
            "payment_amount": null,
            "cancellation_reason": null,
            "cancelled_by": null,
            "session_notes": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        })
    }

    pub fn clinic_row(working_days: &[u8], lunch: Option<(&str, &str)>) -> serde_json::Value {
        json!({
            "working_days": working_days,
            "lunch_break_enabled": lunch.is_some(),
            "lunch_start": lunch.map(|(start, _)| format!("{}:00", start)),
            "lunch_end": lunch.map(|(_, end)| format!("{}:00", end)),
            "work_start": "08:00:00",
            "work_end": "18:00:00",
            "ai_pause_duration": 30,
            "ai_pause_unit": "minutes"
        })
    }

    pub fn exclusion_violation() -> serde_json::Value {
        json!({
            "code": "23P01",
            "details": null,
            "hint": null,
            "message": "conflicting key value violates exclusion constraint \"appointments_no_overlap\""
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default().to_app_config();

        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.service_token(), Some("test-service-role-key"));
        assert!(config.is_configured());
    }

    #[test]
    fn next_weekday_is_strictly_after() {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(next_weekday(monday, Weekday::Mon), NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        assert_eq!(next_weekday(monday, Weekday::Sat), NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }
}
