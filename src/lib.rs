#![forbid(unsafe_code)]
//! Clinic roster : génération des plannings de consultation d'un département.
//!
//! - Balayage glouton date × créneau × lieu, équilibrage de charge.
//! - Contraintes dures (unicité, congés, statut, plafond), limite de jours
//!   consécutifs relâchable hors mode strict.
//! - Conflits signalés, jamais corrigés ; mode aperçu sans écriture.
//! - Stockage fichiers (JSON/CSV) ; dates locales sans fuseau.

pub mod config;
pub mod io;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod repository;
pub mod rules;
pub mod scheduler;
pub mod storage;

pub use config::EngineConfig;
pub use model::{
    ClinicData, Department, DepartmentId, Doctor, DoctorId, DoctorStatus, LeaveStatus,
    LeaveWindow, Location, LocationId, Schedule, ScheduleId, ScheduleStatus, SlotId, TimeSlot,
};
pub use repository::RosterRepository;
pub use rules::{load_rules_from_file, RosterRules};
pub use scheduler::{
    Conflict, ConflictKind, RosterEngine, RosterError, RosterRequest, RosterResponse,
    UnassignedSlot,
};
pub use storage::{JsonStorage, Storage};
