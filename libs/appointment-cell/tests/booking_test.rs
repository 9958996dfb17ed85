use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use uuid::Uuid;

use appointment_cell::models::{
    AppointmentFilters, AppointmentStatus, AvailabilityQuery, CancelAppointmentRequest,
    CancelledBy, ClinicSchedulePolicy, CreateAppointmentRequest, EntityKind, Pagination,
    PolicyRule, RescheduleAppointmentRequest, SchedulingError, UpdateStatusRequest,
};
use appointment_cell::services::booking::{AppointmentBookingService, SchedulingDeps, SchedulingSettings};
use appointment_cell::store::{AppointmentStore, InMemoryStore, StoreError};
use shared_utils::test_utils::{next_weekday, TestClinic};
use shared_utils::FixedClock;

struct Harness {
    store: Arc<InMemoryStore>,
    clock: Arc<FixedClock>,
    service: Arc<AppointmentBookingService>,
    clinic: TestClinic,
    monday: NaiveDate,
}

async fn harness() -> Harness {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap()));
    let store = Arc::new(InMemoryStore::new());
    let clinic = TestClinic::default();

    store.add_contact(clinic.clinic_id, clinic.contact_id).await;
    store.add_professional(clinic.clinic_id, clinic.professional_id, true).await;
    store.add_tag(clinic.clinic_id, clinic.tag_id).await;
    store.set_policy(clinic.clinic_id, ClinicSchedulePolicy::fallback()).await;

    let service = Arc::new(AppointmentBookingService::new(
        SchedulingDeps::in_memory(store.clone(), clock.clone()),
        SchedulingSettings::default(),
    ));

    let monday = next_weekday(clock_date(&clock), Weekday::Mon);
    Harness { store, clock, service, clinic, monday }
}

fn clock_date(clock: &FixedClock) -> NaiveDate {
    use shared_utils::Clock;
    clock.now().date_naive()
}

fn request(clinic: &TestClinic, date: NaiveDate, time: &str, duration_minutes: i32) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        contact_id: clinic.contact_id,
        professional_id: clinic.professional_id,
        scheduled_date: date.format("%Y-%m-%d").to_string(),
        scheduled_time: time.to_string(),
        duration_minutes,
        status: None,
        tag_id: None,
        payment_status: None,
        payment_amount: None,
        session_notes: None,
    }
}

fn reschedule_to(date: NaiveDate, time: &str) -> RescheduleAppointmentRequest {
    RescheduleAppointmentRequest {
        scheduled_date: date.format("%Y-%m-%d").to_string(),
        scheduled_time: time.to_string(),
        duration_minutes: None,
        status: None,
    }
}

fn status(status: AppointmentStatus) -> UpdateStatusRequest {
    UpdateStatusRequest { status, notes: None }
}

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn overlapping_booking_reports_conflict_with_suggestions() {
    let h = harness().await;

    let first = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .expect("first booking succeeds");
    assert_eq!(first.status, AppointmentStatus::Scheduled);

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:30", 60))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::Conflict { conflicting_appointments, suggested_slots } => {
        assert_eq!(conflicting_appointments.len(), 1);
        assert_eq!(conflicting_appointments[0].id, first.id);

        let starts: Vec<NaiveTime> = suggested_slots.iter().map(|s| s.time).collect();
        assert_eq!(starts, vec![t(8, 0), t(10, 0), t(10, 30), t(11, 0), t(11, 30)]);
        assert!(suggested_slots.iter().all(|s| s.available));
    });
    assert_eq!(h.store.appointment_count().await, 1);
}

#[tokio::test]
async fn late_booking_blocks_the_next_morning() {
    let h = harness().await;
    let tuesday = h.monday.succ_opt().unwrap();

    let late = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "23:00", 180))
        .await
        .unwrap();
    assert_eq!(late.ends_at(), tuesday.and_time(t(2, 0)));

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, tuesday, "00:30", 60))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::Conflict { conflicting_appointments, .. } => {
        assert_eq!(conflicting_appointments.len(), 1);
        assert_eq!(conflicting_appointments[0].id, late.id);
    });

    h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, tuesday, "02:00", 60))
        .await
        .expect("booking after the late one ends is free");
    assert_eq!(h.store.appointment_count().await, 2);
}

#[tokio::test]
async fn early_booking_blocks_a_late_one_reaching_into_it() {
    let h = harness().await;
    let tuesday = h.monday.succ_opt().unwrap();

    let early = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, tuesday, "00:30", 60))
        .await
        .unwrap();

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "23:00", 180))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::Conflict { conflicting_appointments, .. } => {
        assert_eq!(conflicting_appointments[0].id, early.id);
    });
}

#[tokio::test]
async fn store_refuses_overlap_across_midnight() {
    let h = harness().await;
    let tuesday = h.monday.succ_opt().unwrap();
    let late = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "23:00", 180))
        .await
        .unwrap();

    let mut overlapping = late.clone();
    overlapping.id = Uuid::new_v4();
    overlapping.scheduled_date = tuesday;
    overlapping.scheduled_time = t(1, 0);
    overlapping.duration_minutes = 60;

    assert_matches!(h.store.insert(&overlapping).await, Err(StoreError::Overlap));
}

#[tokio::test]
async fn lunch_break_is_a_policy_violation_not_a_conflict() {
    let h = harness().await;
    h.store.set_policy(
        h.clinic.clinic_id,
        ClinicSchedulePolicy::fallback().with_lunch_break(t(12, 0), t(13, 0)),
    ).await;

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "12:30", 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::PolicyViolation(PolicyRule::LunchBreak { lunch_start, lunch_end }) => {
        assert_eq!(lunch_start, t(12, 0));
        assert_eq!(lunch_end, t(13, 0));
    });

    let at_lunch_start = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "12:00", 15))
        .await
        .unwrap_err();
    assert_eq!(at_lunch_start.kind(), "policy_violation");
    assert_eq!(h.store.appointment_count().await, 0);
}

#[tokio::test]
async fn weekend_booking_is_rejected() {
    let h = harness().await;
    let saturday = next_weekday(h.monday, Weekday::Sat);

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, saturday, "10:00", 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::PolicyViolation(PolicyRule::NonWorkingDay { date }) if date == saturday);
    assert!(err.to_string().contains("not a working day"));
}

#[tokio::test]
async fn fully_booked_day_has_no_available_slots() {
    let h = harness().await;
    h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "08:00", 480)).await.unwrap();
    h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "16:00", 120)).await.unwrap();

    let slots = h.service.get_available_slots(h.clinic.clinic_id, AvailabilityQuery {
        professional_id: h.clinic.professional_id,
        date: h.monday.to_string(),
        duration_minutes: 30,
        work_start: None,
        work_end: None,
    }).await.unwrap();

    assert_eq!(slots.len(), 20);
    assert!(slots.iter().all(|slot| !slot.available));
}

#[tokio::test]
async fn availability_is_stable_between_calls() {
    let h = harness().await;
    h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "11:00", 45)).await.unwrap();

    let query = AvailabilityQuery {
        professional_id: h.clinic.professional_id,
        date: h.monday.to_string(),
        duration_minutes: 30,
        work_start: Some("09:00".to_string()),
        work_end: Some("13:00".to_string()),
    };

    let first = h.service.get_available_slots(h.clinic.clinic_id, query.clone()).await.unwrap();
    let second = h.service.get_available_slots(h.clinic.clinic_id, query).await.unwrap();
    assert_eq!(first, second);

    let unavailable: Vec<NaiveTime> = first.iter().filter(|s| !s.available).map(|s| s.time).collect();
    assert_eq!(unavailable, vec![t(11, 0), t(11, 30)]);
}

#[tokio::test]
async fn availability_rejects_inverted_window() {
    let h = harness().await;

    let err = h.service.get_available_slots(h.clinic.clinic_id, AvailabilityQuery {
        professional_id: h.clinic.professional_id,
        date: h.monday.to_string(),
        duration_minutes: 30,
        work_start: Some("17:00".to_string()),
        work_end: Some("09:00".to_string()),
    }).await.unwrap_err();

    assert_matches!(err, SchedulingError::Validation { field: "work_end", .. });
}

#[tokio::test]
async fn back_to_back_bookings_are_allowed() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.unwrap();
    h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "10:00", 30)).await.unwrap();
    h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "08:00", 60)).await.unwrap();

    assert_eq!(h.store.appointment_count().await, 3);
}

#[tokio::test]
async fn other_professionals_do_not_conflict() {
    let h = harness().await;
    let colleague = Uuid::new_v4();
    h.store.add_professional(h.clinic.clinic_id, colleague, true).await;

    h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.unwrap();

    let mut other = request(&h.clinic, h.monday, "09:00", 60);
    other.professional_id = colleague;
    assert!(h.service.create_appointment(h.clinic.clinic_id, other).await.is_ok());
}

#[tokio::test]
async fn cancelled_appointment_releases_its_slot() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    let first = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.unwrap();
    let cancelled = h.service.cancel_appointment(clinic_id, first.id, CancelAppointmentRequest {
        cancelled_by: CancelledBy::Patient,
        reason: Some("travelling".to_string()),
    }).await.unwrap();

    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by, Some(CancelledBy::Patient));
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("travelling"));

    assert!(h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.is_ok());
}

#[tokio::test]
async fn terminal_appointments_refuse_further_changes() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    let apt = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.unwrap();
    h.service.update_appointment_status(clinic_id, apt.id, status(AppointmentStatus::Confirmed)).await.unwrap();
    h.service.update_appointment_status(clinic_id, apt.id, status(AppointmentStatus::Completed)).await.unwrap();

    let err = h.service.update_appointment_status(clinic_id, apt.id, status(AppointmentStatus::Scheduled))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::InvalidStatusTransition {
        from: AppointmentStatus::Completed,
        to: AppointmentStatus::Scheduled,
    });

    let err = h.service.reschedule_appointment(clinic_id, apt.id, reschedule_to(h.monday, "14:00"))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::Validation { field: "status", message } => {
        assert_eq!(message, "completed appointments cannot be rescheduled");
    });

    let err = h.service.cancel_appointment(clinic_id, apt.id, CancelAppointmentRequest {
        cancelled_by: CancelledBy::Professional,
        reason: None,
    }).await.unwrap_err();
    assert_matches!(err, SchedulingError::InvalidStatusTransition { .. });

    let stored = h.service.get_appointment(clinic_id, apt.id).await.unwrap();
    assert_eq!(stored.status, AppointmentStatus::Completed);
    assert_eq!(stored.scheduled_time, t(9, 0));
}

#[tokio::test]
async fn completion_requires_confirmation_first() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();

    let err = h.service.update_appointment_status(h.clinic.clinic_id, apt.id, status(AppointmentStatus::Completed))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::InvalidStatusTransition { .. });
}

#[tokio::test]
async fn status_update_stores_notes_and_clock_time() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();

    h.clock.advance(Duration::hours(2));
    let updated = h.service.update_appointment_status(h.clinic.clinic_id, apt.id, UpdateStatusRequest {
        status: AppointmentStatus::Scheduled,
        notes: Some("patient asked for a reminder".to_string()),
    }).await.unwrap();

    assert_eq!(updated.session_notes.as_deref(), Some("patient asked for a reminder"));
    assert_eq!(updated.created_at, apt.created_at);
    assert_eq!(updated.updated_at, apt.created_at + Duration::hours(2));
}

#[tokio::test]
async fn reschedule_ignores_the_appointment_being_moved() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();

    let moved = h.service.reschedule_appointment(h.clinic.clinic_id, apt.id, reschedule_to(h.monday, "09:30"))
        .await
        .unwrap();
    assert_eq!(moved.scheduled_time, t(9, 30));
    assert_eq!(moved.duration_minutes, 60);

    let same = h.service.reschedule_appointment(h.clinic.clinic_id, apt.id, reschedule_to(h.monday, "09:30"))
        .await
        .unwrap();
    assert_eq!(same.scheduled_time, t(9, 30));
}

#[tokio::test]
async fn reschedule_into_a_booked_slot_conflicts() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    let blocker = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "14:00", 60)).await.unwrap();
    let apt = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 60)).await.unwrap();

    let mut req = reschedule_to(h.monday, "13:30");
    req.duration_minutes = Some(60);
    let err = h.service.reschedule_appointment(clinic_id, apt.id, req).await.unwrap_err();

    assert_matches!(err, SchedulingError::Conflict { conflicting_appointments, suggested_slots } => {
        assert_eq!(conflicting_appointments.len(), 1);
        assert_eq!(conflicting_appointments[0].id, blocker.id);
        // The moving appointment's own 09:00 slot counts as free.
        assert!(suggested_slots.iter().any(|slot| slot.time == t(9, 0)));
    });

    let unchanged = h.service.get_appointment(clinic_id, apt.id).await.unwrap();
    assert_eq!(unchanged.scheduled_time, t(9, 0));
}

#[tokio::test]
async fn reschedule_checks_the_new_date_against_policy() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();
    let sunday = next_weekday(h.monday, Weekday::Sun);

    let err = h.service.reschedule_appointment(h.clinic.clinic_id, apt.id, reschedule_to(sunday, "09:00"))
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::PolicyViolation(PolicyRule::NonWorkingDay { .. }));
}

#[tokio::test]
async fn reschedule_cannot_finish_the_appointment() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();

    let mut req = reschedule_to(h.monday, "15:00");
    req.status = Some(AppointmentStatus::Cancelled);
    let err = h.service.reschedule_appointment(h.clinic.clinic_id, apt.id, req).await.unwrap_err();
    assert_matches!(err, SchedulingError::Validation { field: "status", .. });

    let mut req = reschedule_to(h.monday, "15:00");
    req.status = Some(AppointmentStatus::Confirmed);
    let moved = h.service.reschedule_appointment(h.clinic.clinic_id, apt.id, req).await.unwrap();
    assert_eq!(moved.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn other_clinics_cannot_see_appointments() {
    let h = harness().await;
    let apt = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 60))
        .await
        .unwrap();
    let stranger = Uuid::new_v4();

    assert_matches!(
        h.service.get_appointment(stranger, apt.id).await,
        Err(SchedulingError::NotFound(EntityKind::Appointment))
    );
    assert_matches!(
        h.service.update_appointment_status(stranger, apt.id, status(AppointmentStatus::Confirmed)).await,
        Err(SchedulingError::NotFound(EntityKind::Appointment))
    );
    assert_matches!(
        h.service.get_appointment(h.clinic.clinic_id, Uuid::new_v4()).await,
        Err(SchedulingError::NotFound(EntityKind::Appointment))
    );
}

#[tokio::test]
async fn unknown_references_are_reported_by_kind() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    let mut unknown_contact = request(&h.clinic, h.monday, "09:00", 30);
    unknown_contact.contact_id = Uuid::new_v4();
    assert_matches!(
        h.service.create_appointment(clinic_id, unknown_contact).await,
        Err(SchedulingError::NotFound(EntityKind::Contact))
    );

    let inactive = Uuid::new_v4();
    h.store.add_professional(clinic_id, inactive, false).await;
    let mut inactive_professional = request(&h.clinic, h.monday, "09:00", 30);
    inactive_professional.professional_id = inactive;
    assert_matches!(
        h.service.create_appointment(clinic_id, inactive_professional).await,
        Err(SchedulingError::NotFound(EntityKind::Professional))
    );

    let mut unknown_tag = request(&h.clinic, h.monday, "09:00", 30);
    unknown_tag.tag_id = Some(Uuid::new_v4());
    assert_matches!(
        h.service.create_appointment(clinic_id, unknown_tag).await,
        Err(SchedulingError::NotFound(EntityKind::Tag))
    );

    let mut known_tag = request(&h.clinic, h.monday, "09:00", 30);
    known_tag.tag_id = Some(h.clinic.tag_id);
    assert!(h.service.create_appointment(clinic_id, known_tag).await.is_ok());
}

#[tokio::test]
async fn malformed_input_is_a_validation_error() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;

    assert_matches!(
        h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "9:00", 30)).await,
        Err(SchedulingError::Validation { field: "scheduled_time", .. })
    );

    let mut bad_date = request(&h.clinic, h.monday, "09:00", 30);
    bad_date.scheduled_date = "2025-02-30".to_string();
    assert_matches!(
        h.service.create_appointment(clinic_id, bad_date).await,
        Err(SchedulingError::Validation { field: "scheduled_date", .. })
    );

    assert_matches!(
        h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "09:00", 10)).await,
        Err(SchedulingError::Validation { field: "duration_minutes", .. })
    );

    let mut completed = request(&h.clinic, h.monday, "09:00", 30);
    completed.status = Some(AppointmentStatus::Completed);
    assert_matches!(
        h.service.create_appointment(clinic_id, completed).await,
        Err(SchedulingError::Validation { field: "status", .. })
    );

    assert_eq!(h.store.appointment_count().await, 0);
}

#[tokio::test]
async fn settings_lookup_failure_falls_back_to_weekday_hours() {
    let h = harness().await;
    h.store.set_policy(
        h.clinic.clinic_id,
        ClinicSchedulePolicy::fallback().with_lunch_break(t(12, 0), t(13, 0)),
    ).await;
    h.store.fail_config_lookups(true);

    // Fallback has no lunch break.
    assert!(h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "12:30", 30))
        .await
        .is_ok());

    let saturday = next_weekday(h.monday, Weekday::Sat);
    assert_matches!(
        h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, saturday, "10:00", 30)).await,
        Err(SchedulingError::PolicyViolation(PolicyRule::NonWorkingDay { .. }))
    );
}

#[tokio::test]
async fn store_outage_surfaces_as_store_error() {
    let h = harness().await;
    h.store.set_unavailable(true);

    let err = h.service.create_appointment(h.clinic.clinic_id, request(&h.clinic, h.monday, "09:00", 30))
        .await
        .unwrap_err();

    assert_matches!(err, SchedulingError::Store(StoreError::Unavailable(_)));
    assert!(!err.is_business());
    assert_eq!(err.kind(), "internal");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_creates_book_once() {
    let h = harness().await;

    let attempts = ["09:00", "09:15", "09:30", "09:00", "09:45", "09:15", "09:30", "09:00"]
        .into_iter()
        .map(|time| {
            let service = Arc::clone(&h.service);
            let req = request(&h.clinic, h.monday, time, 60);
            let clinic_id = h.clinic.clinic_id;
            tokio::spawn(async move { service.create_appointment(clinic_id, req).await })
        });

    let results: Vec<_> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.expect("task completes"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, SchedulingError::Conflict { .. })));
    assert_eq!(h.store.appointment_count().await, 1);
}

#[tokio::test]
async fn listing_filters_orders_and_pages() {
    let h = harness().await;
    let clinic_id = h.clinic.clinic_id;
    let tuesday = h.monday + Duration::days(1);

    let late = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "15:00", 30)).await.unwrap();
    let early = h.service.create_appointment(clinic_id, request(&h.clinic, h.monday, "08:30", 30)).await.unwrap();
    let next_day = h.service.create_appointment(clinic_id, request(&h.clinic, tuesday, "08:00", 30)).await.unwrap();
    h.service.update_appointment_status(clinic_id, late.id, status(AppointmentStatus::Confirmed)).await.unwrap();

    let all = h.service.list_appointments(clinic_id, AppointmentFilters::default(), Pagination::default())
        .await
        .unwrap();
    let ids: Vec<Uuid> = all.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![early.id, late.id, next_day.id]);

    let confirmed = h.service.list_appointments(clinic_id, AppointmentFilters {
        status: Some(AppointmentStatus::Confirmed),
        ..Default::default()
    }, Pagination::default()).await.unwrap();
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, late.id);

    let second_page = h.service.list_appointments(clinic_id, AppointmentFilters::default(), Pagination {
        limit: Some(1),
        offset: Some(1),
    }).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, late.id);

    let on_tuesday = h.service.list_appointments(clinic_id, AppointmentFilters {
        date_from: Some(tuesday),
        date_to: Some(tuesday),
        ..Default::default()
    }, Pagination::default()).await.unwrap();
    assert_eq!(on_tuesday.len(), 1);

    assert!(h.service.list_appointments(Uuid::new_v4(), AppointmentFilters::default(), Pagination::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn listing_rejects_inverted_date_range() {
    let h = harness().await;

    let err = h.service.list_appointments(h.clinic.clinic_id, AppointmentFilters {
        date_from: Some(h.monday + Duration::days(2)),
        date_to: Some(h.monday),
        ..Default::default()
    }, Pagination::default()).await.unwrap_err();

    assert_matches!(err, SchedulingError::Validation { field: "date_from", .. });
}
