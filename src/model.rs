use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifiant fort pour Department
    DepartmentId
);
numeric_id!(
    /// Identifiant fort pour Doctor
    DoctorId
);
numeric_id!(
    /// Identifiant fort pour TimeSlot
    SlotId
);
numeric_id!(
    /// Identifiant fort pour Location
    LocationId
);

/// Identifiant fort pour Schedule
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScheduleId(String);

impl ScheduleId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoctorStatus {
    #[default]
    Active,
    Inactive,
}

/// Médecin rattaché à un département
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub department: DepartmentId,
    #[serde(default)]
    pub status: DoctorStatus,
}

impl Doctor {
    pub fn new<N: Into<String>>(id: DoctorId, name: N, department: DepartmentId) -> Self {
        Self {
            id,
            name: name.into(),
            title: String::new(),
            department,
            status: DoctorStatus::Active,
        }
    }

    pub fn with_title<T: Into<String>>(mut self, title: T) -> Self {
        self.title = title.into();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == DoctorStatus::Active
    }
}

/// Créneau horaire fixe d'une journée de consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimeSlot {
    pub fn new<N: Into<String>>(
        id: SlotId,
        name: N,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, String> {
        if end_time <= start_time {
            return Err("slot end must be after start".to_string());
        }
        Ok(Self {
            id,
            name: name.into(),
            start_time,
            end_time,
        })
    }

    /// `08:00-12:00`
    pub fn time_range(&self) -> String {
        format!(
            "{}-{}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

/// Lieu de consultation (cabinet) d'un département.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub department: DepartmentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    #[default]
    Approved,
    Rejected,
}

/// Période d'absence d'un médecin (intervalle local [start, end)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveWindow {
    pub doctor: DoctorId,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LeaveWindow {
    pub fn new(doctor: DoctorId, start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, String> {
        if end <= start {
            return Err("leave end must be after start".to_string());
        }
        Ok(Self {
            doctor,
            start,
            end,
            status: LeaveStatus::Approved,
            reason: None,
        })
    }

    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    /// Chevauchement avec l'intervalle fermé `[from, to]`.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        self.start <= to && self.end > from
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    #[default]
    Available,
    Full,
    Cancelled,
}

impl ScheduleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleStatus::Available => "available",
            ScheduleStatus::Full => "full",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }
}

/// Ligne de planning persistée. Clé unique : (doctor, date, slot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub doctor: DoctorId,
    pub date: NaiveDate,
    pub slot: SlotId,
    pub location: LocationId,
    pub total_slots: u32,
    #[serde(default)]
    pub booked_slots: u32,
    pub fee: Decimal,
    #[serde(default)]
    pub status: ScheduleStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Schedule {
    pub fn key(&self) -> (DoctorId, NaiveDate, SlotId) {
        (self.doctor, self.date, self.slot)
    }
}

/// Instantané complet des données de la clinique (stockage fichier).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClinicData {
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub leaves: Vec<LeaveWindow>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl ClinicData {
    pub fn find_department(&self, id: DepartmentId) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }
    pub fn find_doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }
    pub fn find_doctor_mut(&mut self, id: DoctorId) -> Option<&mut Doctor> {
        self.doctors.iter_mut().find(|d| d.id == id)
    }

    /// Crée le département s'il est absent (libellé provisoire).
    pub fn ensure_department(&mut self, id: DepartmentId) {
        if self.find_department(id).is_none() {
            self.departments.push(Department {
                id,
                name: format!("department {id}"),
            });
        }
    }

    /// Remplace le médecin de même id, ou l'ajoute.
    pub fn upsert_doctor(&mut self, doctor: Doctor) {
        match self.find_doctor_mut(doctor.id) {
            Some(existing) => *existing = doctor,
            None => self.doctors.push(doctor),
        }
    }

    pub fn upsert_time_slot(&mut self, slot: TimeSlot) {
        match self.time_slots.iter_mut().find(|s| s.id == slot.id) {
            Some(existing) => *existing = slot,
            None => self.time_slots.push(slot),
        }
    }

    pub fn upsert_location(&mut self, location: Location) {
        match self.locations.iter_mut().find(|l| l.id == location.id) {
            Some(existing) => *existing = location,
            None => self.locations.push(location),
        }
    }
}
