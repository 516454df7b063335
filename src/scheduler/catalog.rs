use crate::model::{ClinicData, Doctor, DoctorId, Location, LocationId, SlotId, TimeSlot};
use std::collections::HashMap;

/// Annuaire en lecture seule (médecins, créneaux, lieux) pour les libellés.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    doctors: HashMap<DoctorId, Doctor>,
    slots: HashMap<SlotId, TimeSlot>,
    locations: HashMap<LocationId, Location>,
}

impl Catalog {
    pub fn new(doctors: &[Doctor], slots: &[TimeSlot], locations: &[Location]) -> Self {
        Self {
            doctors: doctors.iter().map(|d| (d.id, d.clone())).collect(),
            slots: slots.iter().map(|s| (s.id, s.clone())).collect(),
            locations: locations.iter().map(|l| (l.id, l.clone())).collect(),
        }
    }

    pub fn from_clinic(data: &ClinicData) -> Self {
        Self::new(&data.doctors, &data.time_slots, &data.locations)
    }

    pub fn slot(&self, id: SlotId) -> Option<&TimeSlot> {
        self.slots.get(&id)
    }

    pub fn doctor_name(&self, id: DoctorId) -> String {
        self.doctors
            .get(&id)
            .map_or_else(|| format!("doctor #{id}"), |d| d.name.clone())
    }

    pub fn doctor_title(&self, id: DoctorId) -> String {
        self.doctors
            .get(&id)
            .map(|d| d.title.clone())
            .unwrap_or_default()
    }

    pub fn slot_name(&self, id: SlotId) -> String {
        self.slots
            .get(&id)
            .map_or_else(|| format!("slot #{id}"), |s| s.name.clone())
    }

    pub fn location_name(&self, id: LocationId) -> String {
        self.locations
            .get(&id)
            .map_or_else(|| format!("location #{id}"), |l| l.name.clone())
    }
}
