use crate::model::{
    ClinicData, DepartmentId, Doctor, DoctorId, LeaveWindow, Location, Schedule, TimeSlot,
};
use anyhow::bail;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashSet;

/// Sources consommées par le moteur : annuaire des médecins, congés
/// approuvés, plannings existants, créneaux et lieux.
///
/// Tout est lu une seule fois avant le balayage ; seules `purge_schedules`
/// et `insert_schedule` écrivent, et uniquement hors mode aperçu.
pub trait RosterRepository {
    fn department_exists(&self, department: DepartmentId) -> anyhow::Result<bool>;
    /// Tous les médecins du département, actifs ou non.
    fn department_doctors(&self, department: DepartmentId) -> anyhow::Result<Vec<Doctor>>;
    fn time_slots(&self) -> anyhow::Result<Vec<TimeSlot>>;
    fn locations(&self, department: DepartmentId) -> anyhow::Result<Vec<Location>>;
    /// Congés approuvés de `doctors` qui intersectent `[from, to]`.
    fn approved_leaves(
        &self,
        doctors: &[DoctorId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> anyhow::Result<Vec<LeaveWindow>>;
    /// Plannings des médecins du département dans `[start, end]`.
    fn schedules_between(
        &self,
        department: DepartmentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Schedule>>;
    /// Supprime les plannings du département dans `[start, end]` ; renvoie le nombre supprimé.
    fn purge_schedules(
        &mut self,
        department: DepartmentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<usize>;
    /// Refuse toute ligne qui duplique la clé (doctor, date, slot).
    fn insert_schedule(&mut self, schedule: &Schedule) -> anyhow::Result<()>;
}

impl ClinicData {
    fn department_doctor_ids(&self, department: DepartmentId) -> HashSet<DoctorId> {
        self.doctors
            .iter()
            .filter(|d| d.department == department)
            .map(|d| d.id)
            .collect()
    }
}

impl RosterRepository for ClinicData {
    fn department_exists(&self, department: DepartmentId) -> anyhow::Result<bool> {
        Ok(self.find_department(department).is_some())
    }

    fn department_doctors(&self, department: DepartmentId) -> anyhow::Result<Vec<Doctor>> {
        Ok(self
            .doctors
            .iter()
            .filter(|d| d.department == department)
            .cloned()
            .collect())
    }

    fn time_slots(&self) -> anyhow::Result<Vec<TimeSlot>> {
        Ok(self.time_slots.clone())
    }

    fn locations(&self, department: DepartmentId) -> anyhow::Result<Vec<Location>> {
        Ok(self
            .locations
            .iter()
            .filter(|l| l.department == department)
            .cloned()
            .collect())
    }

    fn approved_leaves(
        &self,
        doctors: &[DoctorId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> anyhow::Result<Vec<LeaveWindow>> {
        Ok(self
            .leaves
            .iter()
            .filter(|l| l.is_approved() && doctors.contains(&l.doctor) && l.overlaps(from, to))
            .cloned()
            .collect())
    }

    fn schedules_between(
        &self,
        department: DepartmentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<Schedule>> {
        let members = self.department_doctor_ids(department);
        Ok(self
            .schedules
            .iter()
            .filter(|s| s.date >= start && s.date <= end && members.contains(&s.doctor))
            .cloned()
            .collect())
    }

    fn purge_schedules(
        &mut self,
        department: DepartmentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<usize> {
        let members = self.department_doctor_ids(department);
        let before = self.schedules.len();
        self.schedules
            .retain(|s| !(s.date >= start && s.date <= end && members.contains(&s.doctor)));
        Ok(before - self.schedules.len())
    }

    fn insert_schedule(&mut self, schedule: &Schedule) -> anyhow::Result<()> {
        let key = schedule.key();
        if self.schedules.iter().any(|s| s.key() == key) {
            bail!(
                "duplicate schedule for doctor {} on {} slot {}",
                schedule.doctor,
                schedule.date,
                schedule.slot
            );
        }
        self.schedules.push(schedule.clone());
        Ok(())
    }
}
