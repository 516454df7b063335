use super::catalog::Catalog;
use super::types::WorkloadRecord;
use crate::model::{Doctor, DoctorId, Schedule, SlotId};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Accumulateur d'un run : triplets réservés, jours travaillés et
/// compteur de gardes par médecin. Passé explicitement à chaque étape.
#[derive(Debug, Clone, Default)]
pub struct RunLedger {
    booked: HashSet<(DoctorId, NaiveDate, SlotId)>,
    worked: HashMap<DoctorId, BTreeSet<NaiveDate>>,
    shifts: HashMap<DoctorId, u32>,
}

impl RunLedger {
    /// Ledger initialisé avec les plannings existants de la période.
    pub fn seeded(existing: &[Schedule]) -> Self {
        let mut ledger = Self::default();
        for s in existing {
            ledger.record(s.doctor, s.date, s.slot);
        }
        ledger
    }

    pub fn record(&mut self, doctor: DoctorId, date: NaiveDate, slot: SlotId) {
        self.booked.insert((doctor, date, slot));
        self.worked.entry(doctor).or_default().insert(date);
        *self.shifts.entry(doctor).or_insert(0) += 1;
    }

    pub fn is_booked(&self, doctor: DoctorId, date: NaiveDate, slot: SlotId) -> bool {
        self.booked.contains(&(doctor, date, slot))
    }

    pub fn shift_count(&self, doctor: DoctorId) -> u32 {
        self.shifts.get(&doctor).copied().unwrap_or(0)
    }

    /// Jours travaillés consécutifs juste avant `date` (remonte depuis `date - 1`),
    /// borné à `lookback`.
    pub fn consecutive_days_before(&self, doctor: DoctorId, date: NaiveDate, lookback: u32) -> u32 {
        let Some(days) = self.worked.get(&doctor) else {
            return 0;
        };
        let mut count = 0;
        let mut cursor = date.pred_opt();
        while let Some(day) = cursor {
            if count >= lookback || !days.contains(&day) {
                break;
            }
            count += 1;
            cursor = day.pred_opt();
        }
        count
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorkloadSummary {
    pub min: u32,
    pub max: u32,
    pub average: f64,
}

/// Répartition de la charge après le run.
pub struct WorkloadTracker;

impl WorkloadTracker {
    /// Un enregistrement par médecin du pool (à zéro s'il n'a rien), plus
    /// ceux rencontrés dans `assignments` hors pool.
    pub fn distribute(
        assignments: &[Schedule],
        doctors: &[Doctor],
        catalog: &Catalog,
    ) -> BTreeMap<DoctorId, WorkloadRecord> {
        let mut records: BTreeMap<DoctorId, WorkloadRecord> = doctors
            .iter()
            .map(|d| {
                (
                    d.id,
                    WorkloadRecord::empty(d.id, d.name.clone(), d.title.clone()),
                )
            })
            .collect();
        let mut days: HashMap<DoctorId, BTreeSet<NaiveDate>> = HashMap::new();

        for s in assignments {
            let record = records.entry(s.doctor).or_insert_with(|| {
                WorkloadRecord::empty(
                    s.doctor,
                    catalog.doctor_name(s.doctor),
                    catalog.doctor_title(s.doctor),
                )
            });
            record.total_shifts += 1;
            record
                .details
                .entry(s.date)
                .or_default()
                .push(catalog.slot_name(s.slot));
            days.entry(s.doctor).or_default().insert(s.date);
        }

        for (doctor, worked) in &days {
            if let Some(record) = records.get_mut(doctor) {
                record.work_days = worked.len() as u32;
                record.max_consecutive_days = max_streak(worked);
            }
        }

        records
    }

    /// Min, max et moyenne des gardes sur les seuls médecins du pool ; les
    /// enregistrements hors pool (lignes existantes d'un médecin inactif)
    /// n'entrent pas dans le calcul.
    pub fn summarize(
        records: &BTreeMap<DoctorId, WorkloadRecord>,
        pool: &[Doctor],
    ) -> WorkloadSummary {
        let shifts: Vec<u32> = pool
            .iter()
            .map(|d| records.get(&d.id).map_or(0, |r| r.total_shifts))
            .collect();
        if shifts.is_empty() {
            return WorkloadSummary::default();
        }
        let total: u64 = shifts.iter().copied().map(u64::from).sum();
        WorkloadSummary {
            min: shifts.iter().copied().min().unwrap_or(0),
            max: shifts.iter().copied().max().unwrap_or(0),
            average: total as f64 / shifts.len() as f64,
        }
    }
}

/// Plus longue suite de jours calendaires consécutifs.
pub fn max_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut current = 0;
    let mut prev: Option<NaiveDate> = None;
    for &day in days {
        current = match prev {
            Some(p) if p.succ_opt() == Some(day) => current + 1,
            _ => 1,
        };
        best = best.max(current);
        prev = Some(day);
    }
    best
}
