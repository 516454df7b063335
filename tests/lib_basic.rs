#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use clinic_roster::{
    ClinicData, Department, DepartmentId, Doctor, DoctorId, EngineConfig, LeaveWindow, Location,
    LocationId, RosterEngine, RosterRequest, RosterRules, SlotId, TimeSlot,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn one_doctor_clinic() -> ClinicData {
    let dept = DepartmentId::new(1);
    ClinicData {
        departments: vec![Department {
            id: dept,
            name: "Cardiology".into(),
        }],
        doctors: vec![Doctor::new(DoctorId::new(1), "Ada", dept).with_title("attending")],
        time_slots: vec![TimeSlot {
            id: SlotId::new(1),
            name: "Morning".into(),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        }],
        locations: vec![Location {
            id: LocationId::new(1),
            name: "Room 101".into(),
            department: dept,
        }],
        ..ClinicData::default()
    }
}

fn request(rules: RosterRules) -> RosterRequest {
    RosterRequest::new(DepartmentId::new(1), day(2), day(4)).with_rules(rules)
}

fn engine() -> RosterEngine {
    RosterEngine::new(EngineConfig::default())
}

#[test]
fn single_doctor_covers_every_day() {
    let mut data = one_doctor_clinic();
    let response = engine()
        .generate(&mut data, &request(RosterRules::default()))
        .unwrap();

    assert!(response.success);
    assert_eq!(response.schedules.len(), 3);
    assert!(response.conflicts.is_empty());
    assert!(response.unassigned_slots.is_empty());
    assert_eq!(response.workload[&DoctorId::new(1)].total_shifts, 3);
    assert_eq!(response.statistics.covered_days, 3);
    assert!((response.statistics.coverage_rate - 1.0).abs() < f64::EPSILON);
    insta::assert_snapshot!(response.message, @"generated and persisted 3 schedules");

    assert_eq!(data.schedules.len(), 3);
    let persistence = response.persistence.unwrap();
    assert_eq!(persistence.committed.len(), 3);
    assert!(persistence.failed.is_empty());
}

#[test]
fn approved_leave_leaves_the_day_unassigned() {
    let mut data = one_doctor_clinic();
    data.leaves.push(
        LeaveWindow::new(
            DoctorId::new(1),
            day(3).and_hms_opt(0, 0, 0).unwrap(),
            day(4).and_hms_opt(0, 0, 0).unwrap(),
        )
        .unwrap(),
    );

    let response = engine()
        .generate(&mut data, &request(RosterRules::default()))
        .unwrap();

    let dates: Vec<_> = response.schedules.iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![day(2), day(4)]);
    assert_eq!(response.unassigned_slots.len(), 1);
    let cell = &response.unassigned_slots[0];
    assert_eq!(cell.date, day(3));
    assert_eq!(cell.reason, "no eligible doctor (on leave: 1)");
    assert!(cell
        .suggestions
        .iter()
        .any(|s| s == "review approved leave for this date"));
}

#[test]
fn strict_mode_refuses_to_break_the_streak_limit() {
    let mut data = one_doctor_clinic();
    let rules = RosterRules {
        consecutive_work_days_limit: 2,
        strict_mode: true,
        ..RosterRules::default()
    };
    let response = engine().generate(&mut data, &request(rules)).unwrap();

    assert_eq!(response.schedules.len(), 2);
    assert_eq!(response.unassigned_slots.len(), 1);
    assert_eq!(response.unassigned_slots[0].date, day(4));
    assert_eq!(
        response.unassigned_slots[0].reason,
        "no eligible doctor (consecutive-day limit: 1)"
    );
    assert!(response.schedules.iter().all(|a| !a.relaxed));
}

#[test]
fn relaxed_mode_fills_the_day_and_warns() {
    let mut data = one_doctor_clinic();
    let rules = RosterRules {
        consecutive_work_days_limit: 2,
        strict_mode: false,
        ..RosterRules::default()
    };
    let response = engine().generate(&mut data, &request(rules)).unwrap();

    assert_eq!(response.schedules.len(), 3);
    assert!(response.unassigned_slots.is_empty());
    let last = &response.schedules[2];
    assert_eq!(last.date, day(4));
    assert!(last.relaxed);
    assert_eq!(last.consecutive_days, 3);
    assert_eq!(response.statistics.relaxed_assignments, 1);
    assert!(response
        .warnings
        .iter()
        .any(|w| w.starts_with("consecutive-day limit relaxed for Ada (#1) on 2025-06-04")));
}

#[test]
fn preview_persists_nothing() {
    let mut data = one_doctor_clinic();
    let response = engine()
        .generate(&mut data, &request(RosterRules::default()).preview())
        .unwrap();

    assert_eq!(response.schedules.len(), 3);
    assert_eq!(response.statistics.total_schedules, 3);
    assert_eq!(response.preview.len(), 3);
    assert_eq!(response.preview[0].day_name, "Monday");
    assert_eq!(response.preview[0].day_of_week, 1);
    assert_eq!(response.preview[0].slots[0].time_range, "08:00-12:00");
    assert!(response.persistence.is_none());
    assert!(data.schedules.is_empty());
    insta::assert_snapshot!(response.message, @"preview generated 3 schedules (not persisted)");
}

#[test]
fn overrides_apply_to_generated_rows() {
    let mut data = one_doctor_clinic();
    let mut req = request(RosterRules::default());
    req.overrides.fee = Some(rust_decimal::Decimal::new(1250, 2));
    req.overrides.remarks = Some("summer clinic".into());

    let response = engine().generate(&mut data, &req).unwrap();
    assert!(data
        .schedules
        .iter()
        .all(|s| s.fee.to_string() == "12.50" && s.remarks.as_deref() == Some("summer clinic")));
    assert!(response.schedules.iter().all(|a| a.total_slots == 20));
}
