use super::util;
use super::workload::RunLedger;
use crate::model::{Doctor, DoctorId, LeaveWindow, SlotId};
use crate::rules::RosterRules;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// Congés approuvés indexés par médecin. Les autres statuts sont écartés à la construction.
#[derive(Debug, Clone, Default)]
pub struct LeaveBook {
    by_doctor: HashMap<DoctorId, Vec<LeaveWindow>>,
}

impl LeaveBook {
    pub fn new<I: IntoIterator<Item = LeaveWindow>>(windows: I) -> Self {
        let mut by_doctor: HashMap<DoctorId, Vec<LeaveWindow>> = HashMap::new();
        for window in windows.into_iter().filter(LeaveWindow::is_approved) {
            by_doctor.entry(window.doctor).or_default().push(window);
        }
        Self { by_doctor }
    }

    pub fn on_leave(&self, doctor: DoctorId, date: NaiveDate) -> bool {
        let (from, to) = util::day_bounds(date);
        self.by_doctor
            .get(&doctor)
            .is_some_and(|windows| windows.iter().any(|w| w.overlaps(from, to)))
    }
}

/// Première contrainte dure violée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rejection {
    AlreadyBooked,
    OnLeave,
    Inactive,
    WorkloadCap,
    ConsecutiveLimit,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rejection::AlreadyBooked => "already booked",
            Rejection::OnLeave => "on leave",
            Rejection::Inactive => "inactive",
            Rejection::WorkloadCap => "workload cap reached",
            Rejection::ConsecutiveLimit => "consecutive-day limit",
        };
        f.write_str(label)
    }
}

/// Contraintes dures, évaluées dans l'ordre et court-circuitées :
/// unicité, congé, statut, plafond de gardes, jours consécutifs.
/// En mode `relaxed`, seule la dernière est ignorée.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintValidator<'a> {
    rules: &'a RosterRules,
    lookback_days: u32,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(rules: &'a RosterRules, lookback_days: u32) -> Self {
        Self {
            rules,
            lookback_days,
        }
    }

    pub fn check(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        slot: SlotId,
        leaves: &LeaveBook,
        ledger: &RunLedger,
        relaxed: bool,
    ) -> Result<(), Rejection> {
        if ledger.is_booked(doctor.id, date, slot) {
            return Err(Rejection::AlreadyBooked);
        }
        if leaves.on_leave(doctor.id, date) {
            return Err(Rejection::OnLeave);
        }
        if !doctor.is_active() {
            return Err(Rejection::Inactive);
        }
        if ledger.shift_count(doctor.id) >= self.rules.max_shifts_per_doctor {
            return Err(Rejection::WorkloadCap);
        }
        if !relaxed {
            if let Some(limit) = self.rules.consecutive_limit() {
                if self.consecutive_days_before(doctor.id, date, ledger) >= limit {
                    return Err(Rejection::ConsecutiveLimit);
                }
            }
        }
        Ok(())
    }

    pub fn is_eligible(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        slot: SlotId,
        leaves: &LeaveBook,
        ledger: &RunLedger,
        relaxed: bool,
    ) -> bool {
        self.check(doctor, date, slot, leaves, ledger, relaxed).is_ok()
    }

    pub fn consecutive_days_before(&self, doctor: DoctorId, date: NaiveDate, ledger: &RunLedger) -> u32 {
        ledger.consecutive_days_before(doctor, date, self.lookback_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DepartmentId, DoctorStatus, LeaveStatus};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn doctor() -> Doctor {
        Doctor::new(DoctorId::new(1), "Ada", DepartmentId::new(1))
    }

    fn leave(from: NaiveDate, to_exclusive: NaiveDate) -> LeaveWindow {
        LeaveWindow::new(
            DoctorId::new(1),
            from.and_hms_opt(0, 0, 0).unwrap(),
            to_exclusive.and_hms_opt(0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn relaxed_skips_only_the_consecutive_check() {
        let rules = RosterRules {
            consecutive_work_days_limit: 2,
            ..RosterRules::default()
        };
        let validator = ConstraintValidator::new(&rules, 30);
        let mut ledger = RunLedger::default();
        ledger.record(DoctorId::new(1), day(1), SlotId::new(1));
        ledger.record(DoctorId::new(1), day(2), SlotId::new(1));
        let leaves = LeaveBook::default();
        let slot = SlotId::new(1);

        assert_eq!(
            validator.check(&doctor(), day(3), slot, &leaves, &ledger, false),
            Err(Rejection::ConsecutiveLimit)
        );
        assert!(validator.is_eligible(&doctor(), day(3), slot, &leaves, &ledger, true));

        let on_leave = LeaveBook::new([leave(day(3), day(4))]);
        assert_eq!(
            validator.check(&doctor(), day(3), slot, &on_leave, &ledger, true),
            Err(Rejection::OnLeave)
        );

        let mut inactive = doctor();
        inactive.status = DoctorStatus::Inactive;
        assert_eq!(
            validator.check(&inactive, day(3), slot, &leaves, &ledger, true),
            Err(Rejection::Inactive)
        );
    }

    #[test]
    fn checks_short_circuit_in_order() {
        let rules = RosterRules {
            max_shifts_per_doctor: 1,
            ..RosterRules::default()
        };
        let validator = ConstraintValidator::new(&rules, 30);
        let mut ledger = RunLedger::default();
        ledger.record(DoctorId::new(1), day(1), SlotId::new(1));
        let leaves = LeaveBook::new([leave(day(1), day(2))]);

        // réservé ET en congé : l'unicité passe en premier
        assert_eq!(
            validator.check(&doctor(), day(1), SlotId::new(1), &leaves, &ledger, false),
            Err(Rejection::AlreadyBooked)
        );
        assert_eq!(
            validator.check(&doctor(), day(5), SlotId::new(1), &leaves, &ledger, false),
            Err(Rejection::WorkloadCap)
        );
    }

    #[test]
    fn leave_end_is_exclusive_and_pending_is_ignored() {
        let leaves = LeaveBook::new([leave(day(2), day(3))]);
        assert!(!leaves.on_leave(DoctorId::new(1), day(1)));
        assert!(leaves.on_leave(DoctorId::new(1), day(2)));
        assert!(!leaves.on_leave(DoctorId::new(1), day(3)));

        let mut pending = leave(day(2), day(3));
        pending.status = LeaveStatus::Pending;
        assert!(!LeaveBook::new([pending]).on_leave(DoctorId::new(1), day(2)));
    }
}
