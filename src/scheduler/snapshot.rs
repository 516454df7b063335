use super::types::{RosterError, RosterRequest};
use super::util;
use crate::model::{DepartmentId, Doctor, DoctorId, LeaveWindow, Location, LocationId, Schedule, SlotId, TimeSlot};
use crate::repository::RosterRepository;
use tracing::{debug, info};

/// Tout ce qu'un run lit du dépôt, chargé une fois avant le balayage.
#[derive(Debug, Clone, Default)]
pub(super) struct RunSnapshot {
    /// Tous les médecins du département (libellés).
    pub doctors: Vec<Doctor>,
    /// Médecins actifs, triés par id.
    pub candidates: Vec<Doctor>,
    /// Triés par (heure de début, id).
    pub slots: Vec<TimeSlot>,
    /// Triés par id.
    pub locations: Vec<Location>,
    pub leaves: Vec<LeaveWindow>,
    pub existing: Vec<Schedule>,
    pub purged: usize,
}

/// Les vérifications passent toutes avant la purge : une requête refusée
/// ne modifie jamais le dépôt.
pub(super) fn load<R>(repo: &mut R, request: &RosterRequest) -> Result<RunSnapshot, RosterError>
where
    R: RosterRepository + ?Sized,
{
    let department = request.department_id;
    if !repo.department_exists(department)? {
        return Err(RosterError::UnknownDepartment(department));
    }

    let mut doctors = repo.department_doctors(department)?;
    doctors.sort_by_key(|d| d.id);
    let candidates: Vec<Doctor> = doctors.iter().filter(|d| d.is_active()).cloned().collect();
    if candidates.is_empty() {
        return Err(RosterError::NoActiveDoctors(department));
    }

    let slots = select_slots(repo.time_slots()?, request.time_slot_ids.as_deref())?;
    let locations = select_locations(
        repo.locations(department)?,
        request.location_ids.as_deref(),
        department,
    )?;

    let (from, _) = util::day_bounds(request.start_date);
    let (_, to) = util::day_bounds(request.end_date);
    let ids: Vec<DoctorId> = candidates.iter().map(|d| d.id).collect();
    let leaves = repo.approved_leaves(&ids, from, to)?;

    let (start, end) = (request.start_date, request.end_date);
    let (existing, purged) = match (request.overwrite_existing, request.preview_only) {
        (false, _) => (repo.schedules_between(department, start, end)?, 0),
        // aperçu : purge simulée, le dépôt reste intact
        (true, true) => {
            let simulated = repo.schedules_between(department, start, end)?.len();
            debug!(simulated, "overwrite simulated for preview");
            (Vec::new(), simulated)
        }
        (true, false) => {
            let purged = repo.purge_schedules(department, start, end)?;
            info!(purged, "existing schedules purged");
            (repo.schedules_between(department, start, end)?, purged)
        }
    };

    Ok(RunSnapshot {
        doctors,
        candidates,
        slots,
        locations,
        leaves,
        existing,
        purged,
    })
}

fn select_slots(mut all: Vec<TimeSlot>, wanted: Option<&[SlotId]>) -> Result<Vec<TimeSlot>, RosterError> {
    all.sort_by_key(|s| (s.start_time, s.id));
    if let Some(ids) = wanted.filter(|ids| !ids.is_empty()) {
        if let Some(missing) = ids.iter().find(|id| !all.iter().any(|s| s.id == **id)) {
            return Err(RosterError::UnknownTimeSlot(*missing));
        }
        all.retain(|s| ids.contains(&s.id));
    }
    if all.is_empty() {
        return Err(RosterError::NoTimeSlots);
    }
    Ok(all)
}

fn select_locations(
    mut all: Vec<Location>,
    wanted: Option<&[LocationId]>,
    department: DepartmentId,
) -> Result<Vec<Location>, RosterError> {
    all.sort_by_key(|l| l.id);
    if let Some(ids) = wanted.filter(|ids| !ids.is_empty()) {
        if let Some(missing) = ids.iter().find(|id| !all.iter().any(|l| l.id == **id)) {
            return Err(RosterError::UnknownLocation {
                location: *missing,
                department,
            });
        }
        all.retain(|l| ids.contains(&l.id));
    }
    if all.is_empty() {
        return Err(RosterError::NoLocations(department));
    }
    Ok(all)
}
