use crate::model::{
    DepartmentId, DoctorId, LocationId, Schedule, ScheduleId, ScheduleStatus, SlotId,
};
use crate::rules::RosterRules;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_REMARKS: &str = "auto-generated roster";

/// Demande de génération pour un département sur `[start_date, end_date]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRequest {
    pub department_id: DepartmentId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub rules: RosterRules,
    #[serde(default)]
    pub overwrite_existing: bool,
    #[serde(default)]
    pub preview_only: bool,
    /// Restreint les créneaux ; `None` = tous.
    #[serde(default)]
    pub time_slot_ids: Option<Vec<SlotId>>,
    /// Restreint les lieux ; `None` = tous ceux du département.
    #[serde(default)]
    pub location_ids: Option<Vec<LocationId>>,
    #[serde(default)]
    pub overrides: ScheduleOverrides,
}

impl RosterRequest {
    pub fn new(department_id: DepartmentId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            department_id,
            start_date,
            end_date,
            rules: RosterRules::default(),
            overwrite_existing: false,
            preview_only: false,
            time_slot_ids: None,
            location_ids: None,
            overrides: ScheduleOverrides::default(),
        }
    }

    pub fn with_rules(mut self, rules: RosterRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn preview(mut self) -> Self {
        self.preview_only = true;
        self
    }

    pub fn overwrite(mut self) -> Self {
        self.overwrite_existing = true;
        self
    }
}

/// Valeurs imposées aux lignes générées, prioritaires sur les défauts des règles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOverrides {
    #[serde(default)]
    pub total_slots: Option<u32>,
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub status: Option<ScheduleStatus>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Affectation proposée par le moteur (une ligne de planning candidate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: ScheduleId,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub doctor_title: String,
    pub date: NaiveDate,
    pub slot_id: SlotId,
    pub slot_name: String,
    pub time_range: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub total_slots: u32,
    pub fee: Decimal,
    pub status: ScheduleStatus,
    pub remarks: String,
    /// Affecté en ignorant la limite de jours consécutifs.
    pub relaxed: bool,
    /// Jours consécutifs travaillés, jour courant inclus.
    pub consecutive_days: u32,
}

impl Assignment {
    pub fn to_schedule(&self) -> Schedule {
        Schedule {
            id: self.id.clone(),
            doctor: self.doctor_id,
            date: self.date,
            slot: self.slot_id,
            location: self.location_id,
            total_slots: self.total_slots,
            booked_slots: 0,
            fee: self.fee,
            status: self.status,
            remarks: Some(self.remarks.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    TimeConflict,
    LeaveConflict,
    DuplicateSchedule,
    LocationConflict,
    WorkloadExceeded,
}

impl ConflictKind {
    pub fn suggestion(self) -> &'static str {
        match self {
            ConflictKind::TimeConflict => "check and delete the duplicated schedule",
            ConflictKind::LeaveConflict => "move the schedule or cancel the leave",
            ConflictKind::DuplicateSchedule => "the schedule already exists, do not create it again",
            ConflictKind::LocationConflict => "assign another location to this schedule",
            ConflictKind::WorkloadExceeded => {
                "this doctor reached the workload cap, assign another doctor"
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConflictKind::TimeConflict => "TIME_CONFLICT",
            ConflictKind::LeaveConflict => "LEAVE_CONFLICT",
            ConflictKind::DuplicateSchedule => "DUPLICATE_SCHEDULE",
            ConflictKind::LocationConflict => "LOCATION_CONFLICT",
            ConflictKind::WorkloadExceeded => "WORKLOAD_EXCEEDED",
        }
    }
}

/// Conflit signalé, jamais corrigé automatiquement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub description: String,
    pub schedule_ids: Vec<ScheduleId>,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub slot_id: SlotId,
    pub slot_name: String,
    pub suggestion: String,
}

/// Cellule (date, créneau, lieu) restée sous le minimum requis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedSlot {
    pub date: NaiveDate,
    pub slot_id: SlotId,
    pub slot_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub assigned: u32,
    pub required: u32,
    pub reason: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRecord {
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub title: String,
    pub total_shifts: u32,
    pub work_days: u32,
    pub max_consecutive_days: u32,
    /// Libellés des créneaux travaillés, par jour.
    pub details: BTreeMap<NaiveDate, Vec<String>>,
}

impl WorkloadRecord {
    pub fn empty(doctor_id: DoctorId, doctor_name: String, title: String) -> Self {
        Self {
            doctor_id,
            doctor_name,
            title,
            total_shifts: 0,
            work_days: 0,
            max_consecutive_days: 0,
            details: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterStatistics {
    pub total_schedules: u32,
    pub covered_days: u32,
    pub doctors_involved: u32,
    pub average_workload: f64,
    pub max_workload: u32,
    pub min_workload: u32,
    pub required_cells: u32,
    pub assigned_cells: u32,
    pub coverage_rate: f64,
    pub conflict_count: u32,
    pub relaxed_assignments: u32,
    pub purged_schedules: u32,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSlot {
    pub slot_id: SlotId,
    pub slot_name: String,
    pub time_range: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub location_id: LocationId,
    pub location_name: String,
    pub relaxed: bool,
    pub consecutive_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewDay {
    pub date: NaiveDate,
    /// 1 = lundi … 7 = dimanche
    pub day_of_week: u32,
    pub day_name: String,
    pub slots: Vec<PreviewSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAssignment {
    pub schedule_id: ScheduleId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub slot_id: SlotId,
    pub error: String,
}

/// Bilan d'écriture hors mode aperçu : rien n'est annulé en cas d'échec partiel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistenceReport {
    pub committed: Vec<ScheduleId>,
    pub failed: Vec<FailedAssignment>,
}

impl PersistenceReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterResponse {
    pub success: bool,
    pub message: String,
    pub schedules: Vec<Assignment>,
    pub statistics: RosterStatistics,
    pub conflicts: Vec<Conflict>,
    pub unassigned_slots: Vec<UnassignedSlot>,
    pub workload: BTreeMap<DoctorId, WorkloadRecord>,
    pub warnings: Vec<String>,
    pub preview: Vec<PreviewDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceReport>,
}

impl RosterResponse {
    /// Réponse d'échec sans contenu, pour les appelants qui veulent un corps de réponse.
    pub fn from_error(err: &RosterError) -> Self {
        Self {
            success: false,
            message: format!("roster generation failed: {err}"),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("date range spans {days} days, limit is {limit}")]
    RangeTooLong { days: i64, limit: u32 },
    #[error("unknown department: {0}")]
    UnknownDepartment(DepartmentId),
    #[error("department {0} has no active doctor")]
    NoActiveDoctors(DepartmentId),
    #[error("department {0} has no location")]
    NoLocations(DepartmentId),
    #[error("no time slot configured")]
    NoTimeSlots,
    #[error("unknown time slot: {0}")]
    UnknownTimeSlot(SlotId),
    #[error("unknown location {location} for department {department}")]
    UnknownLocation {
        location: LocationId,
        department: DepartmentId,
    },
    #[error("invalid rules: {0}")]
    InvalidRules(String),
    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

impl RosterError {
    /// Erreurs de requête (par opposition aux échecs du support de données).
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, RosterError::Repository(_))
    }
}
