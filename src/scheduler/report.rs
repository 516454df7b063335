use super::assignment::ScanOutcome;
use super::types::{
    Assignment, PersistenceReport, PreviewDay, PreviewSlot, RosterStatistics, UnassignedSlot,
    WorkloadRecord,
};
use super::util;
use super::workload::WorkloadTracker;
use crate::model::{Doctor, DoctorId};
use crate::rules::RosterRules;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

pub(super) struct StatsInput<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub outcome: &'a ScanOutcome,
    pub workload: &'a BTreeMap<DoctorId, WorkloadRecord>,
    /// Médecins candidats du run.
    pub pool: &'a [Doctor],
    pub conflict_count: usize,
    pub purged: usize,
    pub elapsed: Duration,
}

pub(super) fn statistics(input: &StatsInput<'_>) -> RosterStatistics {
    let outcome = input.outcome;
    let summary = WorkloadTracker::summarize(input.workload, input.pool);
    let involved: HashSet<DoctorId> = outcome.assignments.iter().map(|a| a.doctor_id).collect();
    let coverage_rate = if outcome.required_cells == 0 {
        0.0
    } else {
        f64::from(outcome.assigned_cells) / f64::from(outcome.required_cells)
    };

    RosterStatistics {
        total_schedules: outcome.assignments.len() as u32,
        covered_days: util::span_days(input.start, input.end).max(0) as u32,
        doctors_involved: involved.len() as u32,
        average_workload: summary.average,
        max_workload: summary.max,
        min_workload: summary.min,
        required_cells: outcome.required_cells,
        assigned_cells: outcome.assigned_cells,
        coverage_rate,
        conflict_count: input.conflict_count as u32,
        relaxed_assignments: outcome.assignments.iter().filter(|a| a.relaxed).count() as u32,
        purged_schedules: input.purged as u32,
        execution_time_ms: input.elapsed.as_millis() as u64,
    }
}

/// Avertissements : relâchements, séries proches de la limite, cellules
/// non couvertes par date.
pub(super) fn warnings(
    rules: &RosterRules,
    outcome: &ScanOutcome,
    workload: &BTreeMap<DoctorId, WorkloadRecord>,
) -> Vec<String> {
    let mut out = outcome.relaxation_warnings.clone();

    if let Some(limit) = rules.consecutive_limit() {
        let threshold = limit.saturating_sub(1).max(1);
        for record in workload.values() {
            if record.max_consecutive_days >= threshold {
                out.push(format!(
                    "{} (#{}) works {} consecutive days (limit {}), plan at least {} rest day(s)",
                    record.doctor_name,
                    record.doctor_id,
                    record.max_consecutive_days,
                    limit,
                    rules.min_rest_days
                ));
            }
        }
    }

    out.extend(unassigned_by_date(&outcome.unassigned));
    out
}

fn unassigned_by_date(unassigned: &[UnassignedSlot]) -> Vec<String> {
    let mut per_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for cell in unassigned {
        *per_date.entry(cell.date).or_insert(0) += 1;
    }
    per_date
        .into_iter()
        .map(|(date, count)| format!("{date}: {count} cell(s) without enough doctors"))
        .collect()
}

/// Vue jour par jour, chaque date de la période présente (même vide).
pub(super) fn preview(start: NaiveDate, end: NaiveDate, assignments: &[Assignment]) -> Vec<PreviewDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Assignment>> = BTreeMap::new();
    for a in assignments {
        by_date.entry(a.date).or_default().push(a);
    }

    util::days_inclusive(start, end)
        .map(|date| {
            let (day_of_week, day_name) = util::day_of_week(date);
            let slots = by_date
                .get(&date)
                .map(|day| day.iter().map(|a| preview_slot(a)).collect())
                .unwrap_or_default();
            PreviewDay {
                date,
                day_of_week,
                day_name: day_name.to_string(),
                slots,
            }
        })
        .collect()
}

fn preview_slot(a: &Assignment) -> PreviewSlot {
    PreviewSlot {
        slot_id: a.slot_id,
        slot_name: a.slot_name.clone(),
        time_range: a.time_range.clone(),
        doctor_id: a.doctor_id,
        doctor_name: a.doctor_name.clone(),
        location_id: a.location_id,
        location_name: a.location_name.clone(),
        relaxed: a.relaxed,
        consecutive_days: a.consecutive_days,
    }
}

pub(super) fn message(
    generated: usize,
    conflicts: usize,
    unassigned: usize,
    persistence: Option<&PersistenceReport>,
) -> String {
    let mut msg = match persistence {
        None => format!("preview generated {generated} schedules (not persisted)"),
        Some(report) if !report.is_complete() => format!(
            "persisted {} of {generated} schedules; {} failed",
            report.committed.len(),
            report.failed.len()
        ),
        Some(_) => format!("generated and persisted {generated} schedules"),
    };
    if conflicts > 0 {
        msg.push_str(&format!("; {conflicts} conflict(s) need review"));
    }
    if unassigned > 0 {
        msg.push_str(&format!("; {unassigned} cell(s) under-staffed"));
    }
    msg
}
