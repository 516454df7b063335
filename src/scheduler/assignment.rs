use super::types::{Assignment, RosterRequest, UnassignedSlot, DEFAULT_REMARKS};
use super::util;
use super::validator::{ConstraintValidator, LeaveBook, Rejection};
use super::workload::RunLedger;
use crate::model::{Doctor, Location, ScheduleId, TimeSlot};
use crate::rules::RosterRules;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Entrées figées d'un run, lues avant le balayage.
pub(super) struct ScanPlan<'a> {
    pub request: &'a RosterRequest,
    pub validator: ConstraintValidator<'a>,
    pub leaves: &'a LeaveBook,
    /// Médecins actifs, triés par id.
    pub candidates: &'a [Doctor],
    pub slots: &'a [TimeSlot],
    pub locations: &'a [Location],
}

#[derive(Debug, Default)]
pub(super) struct ScanOutcome {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<UnassignedSlot>,
    pub relaxation_warnings: Vec<String>,
    pub required_cells: u32,
    pub assigned_cells: u32,
}

/// Balaye la grille date × créneau × lieu, dates croissantes. Chaque
/// affectation est inscrite dans `ledger` immédiatement.
pub(super) fn scan(plan: &ScanPlan<'_>, ledger: &mut RunLedger) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();
    let request = plan.request;

    for date in util::days_inclusive(request.start_date, request.end_date) {
        for slot in plan.slots {
            for location in plan.locations {
                outcome.required_cells += 1;
                fill_cell(plan, ledger, &mut outcome, date, slot, location);
            }
        }
    }

    outcome
}

fn fill_cell(
    plan: &ScanPlan<'_>,
    ledger: &mut RunLedger,
    outcome: &mut ScanOutcome,
    date: NaiveDate,
    slot: &TimeSlot,
    location: &Location,
) {
    let rules = &plan.request.rules;
    let wanted = rules.effective_min();
    let mut rejections: BTreeMap<Rejection, u32> = BTreeMap::new();
    let mut placed = 0u32;

    for doctor in ranked_candidates(plan, ledger, date, slot, false, &mut rejections) {
        if placed >= wanted {
            break;
        }
        let assignment = place(plan, ledger, doctor, date, slot, location, false);
        outcome.assignments.push(assignment);
        placed += 1;
    }

    // Le relâchement ne sert qu'à couvrir une cellule vide, avec un seul
    // médecin : il ne consomme jamais de capacité sur une cellule déjà couverte.
    if placed == 0 && !rules.strict_mode {
        let mut ignored = BTreeMap::new();
        let relaxed = ranked_candidates(plan, ledger, date, slot, true, &mut ignored);
        if let Some(doctor) = relaxed.into_iter().next() {
            let assignment = place(plan, ledger, doctor, date, slot, location, true);
            warn!(
                doctor = %assignment.doctor_id,
                %date,
                slot = %slot.name,
                location = %location.name,
                consecutive_days = assignment.consecutive_days,
                "consecutive-day limit relaxed"
            );
            outcome.relaxation_warnings.push(format!(
                "consecutive-day limit relaxed for {} (#{}) on {} {} at {}: {} consecutive days",
                assignment.doctor_name,
                assignment.doctor_id,
                date,
                slot.name,
                location.name,
                assignment.consecutive_days
            ));
            outcome.assignments.push(assignment);
            placed += 1;
        }
    }

    debug!(%date, slot = %slot.name, location = %location.name, placed, wanted, "cell filled");

    if placed > 0 {
        outcome.assigned_cells += 1;
    }
    if placed < wanted {
        warn!(%date, slot = %slot.name, location = %location.name, placed, wanted, "cell left under-staffed");
        outcome.unassigned.push(UnassignedSlot {
            date,
            slot_id: slot.id,
            slot_name: slot.name.clone(),
            location_id: location.id,
            location_name: location.name.clone(),
            assigned: placed,
            required: wanted,
            reason: shortfall_reason(placed, wanted, &rejections),
            suggestions: remedies(rules, &rejections),
        });
    }
}

/// Candidats éligibles, les moins chargés d'abord (égalité : id croissant)
/// si l'équilibrage est actif, sinon dans l'ordre des id.
fn ranked_candidates<'a>(
    plan: &ScanPlan<'a>,
    ledger: &RunLedger,
    date: NaiveDate,
    slot: &TimeSlot,
    relaxed: bool,
    rejections: &mut BTreeMap<Rejection, u32>,
) -> Vec<&'a Doctor> {
    let mut eligible: Vec<&'a Doctor> = Vec::with_capacity(plan.candidates.len());
    for doctor in plan.candidates {
        match plan
            .validator
            .check(doctor, date, slot.id, plan.leaves, ledger, relaxed)
        {
            Ok(()) => eligible.push(doctor),
            Err(rejection) => *rejections.entry(rejection).or_insert(0) += 1,
        }
    }
    if plan.request.rules.balance_workload {
        eligible.sort_by_key(|d| (ledger.shift_count(d.id), d.id));
    }
    eligible
}

fn place(
    plan: &ScanPlan<'_>,
    ledger: &mut RunLedger,
    doctor: &Doctor,
    date: NaiveDate,
    slot: &TimeSlot,
    location: &Location,
    relaxed: bool,
) -> Assignment {
    let rules = &plan.request.rules;
    let overrides = &plan.request.overrides;
    let consecutive_days = plan.validator.consecutive_days_before(doctor.id, date, ledger) + 1;
    ledger.record(doctor.id, date, slot.id);

    Assignment {
        id: ScheduleId::random(),
        doctor_id: doctor.id,
        doctor_name: doctor.name.clone(),
        doctor_title: doctor.title.clone(),
        date,
        slot_id: slot.id,
        slot_name: slot.name.clone(),
        time_range: slot.time_range(),
        location_id: location.id,
        location_name: location.name.clone(),
        total_slots: overrides.total_slots.unwrap_or(rules.default_total_slots),
        fee: overrides.fee.unwrap_or(rules.default_fee),
        status: overrides.status.unwrap_or_default(),
        remarks: overrides
            .remarks
            .clone()
            .unwrap_or_else(|| DEFAULT_REMARKS.to_string()),
        relaxed,
        consecutive_days,
    }
}

fn shortfall_reason(placed: u32, wanted: u32, rejections: &BTreeMap<Rejection, u32>) -> String {
    let head = if placed == 0 {
        "no eligible doctor".to_string()
    } else {
        format!("only {placed} of {wanted} required doctors assigned")
    };
    if rejections.is_empty() {
        return head;
    }
    let detail: Vec<String> = rejections
        .iter()
        .map(|(rejection, count)| format!("{rejection}: {count}"))
        .collect();
    format!("{head} ({})", detail.join(", "))
}

fn remedies(rules: &RosterRules, rejections: &BTreeMap<Rejection, u32>) -> Vec<String> {
    let mut out = vec!["add doctors to the department".to_string()];
    if rules.effective_min() > 1 {
        out.push("lower min_doctors_per_slot".to_string());
    }
    if rejections.contains_key(&Rejection::OnLeave) {
        out.push("review approved leave for this date".to_string());
    }
    if rejections.contains_key(&Rejection::WorkloadCap) {
        out.push("raise max_shifts_per_doctor".to_string());
    }
    if rejections.contains_key(&Rejection::ConsecutiveLimit) {
        if rules.strict_mode {
            out.push("disable strict mode to allow relaxed assignment".to_string());
        } else {
            out.push("raise consecutive_work_days_limit".to_string());
        }
    }
    out
}
