use super::catalog::Catalog;
use super::types::{Conflict, ConflictKind};
use crate::model::{DoctorId, Schedule, SlotId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Détection des doublons (médecin, date, créneau) sur l'union des
/// plannings générés et existants.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Regroupe par clé puis émet chaque paire (i, j) avec i < j, dans
    /// l'ordre de l'union : même résultat qu'un balayage par paires.
    pub fn detect(generated: &[Schedule], existing: &[Schedule], catalog: &Catalog) -> Vec<Conflict> {
        let all: Vec<&Schedule> = generated.iter().chain(existing.iter()).collect();

        let mut groups: HashMap<(DoctorId, NaiveDate, SlotId), Vec<usize>> = HashMap::new();
        for (idx, s) in all.iter().enumerate() {
            groups.entry(s.key()).or_default().push(idx);
        }

        let mut pairs: Vec<(usize, usize)> = groups
            .values()
            .filter(|members| members.len() > 1)
            .flat_map(|members| {
                members
                    .iter()
                    .enumerate()
                    .flat_map(move |(k, &a)| members[k + 1..].iter().map(move |&b| (a, b)))
            })
            .collect();
        pairs.sort_unstable();

        pairs
            .into_iter()
            .map(|(a, b)| time_conflict(all[a], all[b], catalog))
            .collect()
    }
}

fn time_conflict(a: &Schedule, b: &Schedule, catalog: &Catalog) -> Conflict {
    let kind = ConflictKind::TimeConflict;
    Conflict {
        kind,
        description: "doctor has several schedules in the same time slot".to_string(),
        schedule_ids: vec![a.id.clone(), b.id.clone()],
        doctor_id: a.doctor,
        doctor_name: catalog.doctor_name(a.doctor),
        date: a.date,
        slot_id: a.slot,
        slot_name: catalog.slot_name(a.slot),
        suggestion: kind.suggestion().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocationId, ScheduleId};
    use rust_decimal::Decimal;

    fn schedule(id: &str, doctor: u32, d: u32, slot: u32) -> Schedule {
        Schedule {
            id: ScheduleId::new(id),
            doctor: DoctorId::new(doctor),
            date: NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            slot: SlotId::new(slot),
            location: LocationId::new(1),
            total_slots: 20,
            booked_slots: 0,
            fee: Decimal::new(500, 2),
            status: Default::default(),
            remarks: None,
        }
    }

    /// Version naïve, pour comparaison.
    fn pairwise(all: &[Schedule]) -> Vec<(ScheduleId, ScheduleId)> {
        let mut out = Vec::new();
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                if a.key() == b.key() {
                    out.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        out
    }

    #[test]
    fn grouping_matches_pairwise_scan() {
        let generated = vec![
            schedule("g1", 1, 1, 1),
            schedule("g2", 2, 1, 1),
            schedule("g3", 1, 2, 1),
        ];
        let existing = vec![
            schedule("e1", 1, 1, 1),
            schedule("e2", 1, 1, 2),
            schedule("e3", 1, 1, 1),
            schedule("e4", 2, 1, 1),
        ];
        let conflicts = ConflictDetector::detect(&generated, &existing, &Catalog::default());

        let all: Vec<Schedule> = generated.iter().chain(existing.iter()).cloned().collect();
        let got: Vec<_> = conflicts
            .iter()
            .map(|c| (c.schedule_ids[0].clone(), c.schedule_ids[1].clone()))
            .collect();
        assert_eq!(got, pairwise(&all));
        assert_eq!(conflicts.len(), 4);
        assert!(conflicts.iter().all(|c| c.kind == ConflictKind::TimeConflict));
    }

    #[test]
    fn distinct_keys_never_conflict() {
        let generated = vec![schedule("g1", 1, 1, 1), schedule("g2", 1, 1, 2)];
        let existing = vec![schedule("e1", 1, 2, 1)];
        assert!(ConflictDetector::detect(&generated, &existing, &Catalog::default()).is_empty());
    }
}
