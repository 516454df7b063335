#![forbid(unsafe_code)]
use assert_cmd::Command;
use chrono::NaiveTime;
use clinic_roster::{DepartmentId, JsonStorage, LocationId, SlotId, Storage};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("clinic-roster").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

/// Importe deux médecins, puis déclare un créneau et un lieu.
fn seeded_store(dir: &Path) -> std::path::PathBuf {
    let data = dir.join("clinic.json");
    let doctors = dir.join("doctors.csv");
    fs::write(
        &doctors,
        "id,name,title,department_id\n1,Ada,attending,1\n2,Brice,resident,1\n",
    )
    .unwrap();
    cli(&data)
        .args(["import-doctors", "--csv"])
        .arg(&doctors)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 doctor(s)"));

    cli(&data)
        .args(["add-slot", "--id", "1", "--name", "Morning", "--start", "08:00", "--end", "12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slot #1 Morning 08:00-12:00"));
    cli(&data)
        .args(["add-location", "--id", "1", "--name", "Room 101", "--department", "1"])
        .assert()
        .success();
    data
}

#[test]
fn slots_and_locations_are_declared_from_the_cli() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());

    // même id : remplacement, pas de doublon
    cli(&data)
        .args(["add-slot", "--id", "1", "--name", "Early", "--start", "07:30:00", "--end", "11:30"])
        .assert()
        .success();
    cli(&data)
        .args(["add-location", "--id", "2", "--name", "Annex", "--department", "4"])
        .assert()
        .success();

    let clinic = JsonStorage::open(&data).unwrap().load().unwrap();
    assert_eq!(clinic.time_slots.len(), 1);
    assert_eq!(clinic.time_slots[0].id, SlotId::new(1));
    assert_eq!(clinic.time_slots[0].name, "Early");
    assert_eq!(clinic.time_slots[0].start_time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    assert_eq!(clinic.locations.len(), 2);
    assert_eq!(clinic.locations[1].id, LocationId::new(2));
    assert!(clinic.find_department(DepartmentId::new(4)).is_some());
}

#[test]
fn slot_ending_before_it_starts_is_refused() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("clinic.json");
    cli(&data)
        .args(["add-slot", "--id", "1", "--name", "Backwards", "--start", "12:00", "--end", "08:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("slot end must be after start"));
    cli(&data)
        .args(["add-slot", "--id", "1", "--name", "Noon", "--start", "noon", "--end", "13:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid time (HH:MM): noon"));
    assert!(!data.exists());
}

#[test]
fn generate_persists_and_list_shows_rows() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());
    let out_csv = dir.path().join("out.csv");

    cli(&data)
        .args(["generate", "--department", "1", "--start", "2025-06-02", "--end", "2025-06-03"])
        .arg("--out-csv")
        .arg(&out_csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("generated and persisted 2 schedules"))
        .stdout(predicate::str::contains("2025-06-02 | Morning 08:00-12:00 | Room 101 | Ada"));

    assert_eq!(fs::read_to_string(&out_csv).unwrap().lines().count(), 3);

    cli(&data)
        .args(["list", "--department", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-06-03 | Morning | Room 101 | Brice | available"));

    cli(&data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
}

#[test]
fn preview_leaves_the_store_untouched() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());
    let out_json = dir.path().join("preview.json");

    cli(&data)
        .args(["generate", "--department", "1", "--start", "2025-06-02", "--end", "2025-06-04", "--preview"])
        .arg("--out-json")
        .arg(&out_json)
        .assert()
        .success()
        .stdout(predicate::str::contains("preview generated 3 schedules (not persisted)"));

    let clinic = JsonStorage::open(&data).unwrap().load().unwrap();
    assert!(clinic.schedules.is_empty());
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out_json).unwrap()).unwrap();
    assert_eq!(json["statistics"]["total_schedules"], 3);
    assert_eq!(json["preview"][0]["day_name"], "Monday");
}

#[test]
fn unassigned_cells_exit_with_code_2() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());
    let leaves = dir.path().join("leaves.csv");
    fs::write(
        &leaves,
        "doctor_id,start,end\n1,2025-06-02,2025-06-02\n2,2025-06-02,2025-06-02\n",
    )
    .unwrap();
    cli(&data)
        .args(["import-leaves", "--csv"])
        .arg(&leaves)
        .assert()
        .success();

    cli(&data)
        .args(["generate", "--department", "1", "--start", "2025-06-02", "--end", "2025-06-03"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("UNASSIGNED 2025-06-02 | Morning | Room 101 | no eligible doctor (on leave: 2)"));
}

#[test]
fn check_reports_stored_duplicates() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());
    cli(&data)
        .args(["generate", "--department", "1", "--start", "2025-06-02", "--end", "2025-06-02"])
        .assert()
        .success();

    let storage = JsonStorage::open(&data).unwrap();
    let mut clinic = storage.load().unwrap();
    let mut copy = clinic.schedules[0].clone();
    copy.id = clinic_roster::ScheduleId::new("manual-copy");
    clinic.schedules.push(copy);
    storage.save(&clinic).unwrap();

    let report = dir.path().join("conflicts.csv");
    cli(&data)
        .arg("check")
        .arg("--report")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Found 1 conflict(s)"));
    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("TIME_CONFLICT"));
    assert!(text.contains("manual-copy"));
}

#[test]
fn invalid_range_fails() {
    let dir = tempdir().unwrap();
    let data = seeded_store(dir.path());
    cli(&data)
        .args(["generate", "--department", "1", "--start", "2025-06-05", "--end", "2025-06-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date range"));
}
