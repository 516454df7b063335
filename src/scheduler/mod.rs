mod assignment;
mod catalog;
mod conflicts;
mod report;
mod snapshot;
mod types;
mod util;
mod validator;
mod workload;

pub use catalog::Catalog;
pub use conflicts::ConflictDetector;
pub use types::{
    Assignment, Conflict, ConflictKind, FailedAssignment, PersistenceReport, PreviewDay,
    PreviewSlot, RosterError, RosterRequest, RosterResponse, RosterStatistics, ScheduleOverrides,
    UnassignedSlot, WorkloadRecord, DEFAULT_REMARKS,
};
pub use validator::{ConstraintValidator, LeaveBook, Rejection};
pub use workload::{max_streak, RunLedger, WorkloadSummary, WorkloadTracker};

use crate::config::EngineConfig;
use crate::model::Schedule;
use crate::repository::RosterRepository;
use assignment::ScanPlan;
use report::StatsInput;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Moteur de génération des plannings d'un département.
///
/// Un run lit tout le dépôt avant de balayer la grille, puis n'écrit
/// qu'en fin de run (hors aperçu). Deux runs concurrents sur le même
/// département doivent être sérialisés par l'appelant.
#[derive(Debug, Clone, Copy, Default)]
pub struct RosterEngine {
    config: EngineConfig,
}

impl RosterEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Génère (et persiste, hors aperçu) le planning demandé.
    ///
    /// Les erreurs de requête sont renvoyées avant toute écriture. Les
    /// échecs d'insertion sont reportés ligne par ligne dans
    /// [`RosterResponse::persistence`], sans annulation.
    #[instrument(
        skip_all,
        fields(
            department = %request.department_id,
            start = %request.start_date,
            end = %request.end_date,
            preview = request.preview_only,
        )
    )]
    pub fn generate<R>(&self, repo: &mut R, request: &RosterRequest) -> Result<RosterResponse, RosterError>
    where
        R: RosterRepository + ?Sized,
    {
        let started = Instant::now();
        self.validate(request)?;

        let snapshot = snapshot::load(repo, request)?;
        info!(
            doctors = snapshot.candidates.len(),
            slots = snapshot.slots.len(),
            locations = snapshot.locations.len(),
            leaves = snapshot.leaves.len(),
            existing = snapshot.existing.len(),
            "roster inputs loaded"
        );

        let catalog = Catalog::new(&snapshot.doctors, &snapshot.slots, &snapshot.locations);
        let leaves = LeaveBook::new(snapshot.leaves.iter().cloned());
        let plan = ScanPlan {
            request,
            validator: ConstraintValidator::new(&request.rules, self.config.consecutive_lookback_days),
            leaves: &leaves,
            candidates: &snapshot.candidates,
            slots: &snapshot.slots,
            locations: &snapshot.locations,
        };
        let mut ledger = RunLedger::seeded(&snapshot.existing);
        let outcome = assignment::scan(&plan, &mut ledger);

        let generated: Vec<Schedule> = outcome.assignments.iter().map(Assignment::to_schedule).collect();
        let conflicts = ConflictDetector::detect(&generated, &snapshot.existing, &catalog);
        let combined: Vec<Schedule> = generated
            .iter()
            .chain(snapshot.existing.iter())
            .cloned()
            .collect();
        let workload = WorkloadTracker::distribute(&combined, &snapshot.candidates, &catalog);
        let warnings = report::warnings(&request.rules, &outcome, &workload);
        let preview = report::preview(request.start_date, request.end_date, &outcome.assignments);

        let persistence = if request.preview_only {
            None
        } else {
            Some(persist(repo, &generated))
        };

        let statistics = report::statistics(&StatsInput {
            start: request.start_date,
            end: request.end_date,
            outcome: &outcome,
            workload: &workload,
            pool: &snapshot.candidates,
            conflict_count: conflicts.len(),
            purged: snapshot.purged,
            elapsed: started.elapsed(),
        });
        let success = conflicts.is_empty()
            && persistence
                .as_ref()
                .map_or(true, PersistenceReport::is_complete);
        let message = report::message(
            generated.len(),
            conflicts.len(),
            outcome.unassigned.len(),
            persistence.as_ref(),
        );

        info!(
            schedules = statistics.total_schedules,
            conflicts = statistics.conflict_count,
            unassigned = outcome.unassigned.len(),
            coverage = statistics.coverage_rate,
            elapsed_ms = statistics.execution_time_ms,
            success,
            "roster generated"
        );

        Ok(RosterResponse {
            success,
            message,
            schedules: outcome.assignments,
            statistics,
            conflicts,
            unassigned_slots: outcome.unassigned,
            workload,
            warnings,
            preview,
            persistence,
        })
    }

    fn validate(&self, request: &RosterRequest) -> Result<(), RosterError> {
        if request.start_date > request.end_date {
            return Err(RosterError::InvalidRange {
                start: request.start_date,
                end: request.end_date,
            });
        }
        let days = util::span_days(request.start_date, request.end_date);
        if days > i64::from(self.config.max_range_days) {
            return Err(RosterError::RangeTooLong {
                days,
                limit: self.config.max_range_days,
            });
        }
        request
            .rules
            .validate()
            .map_err(|e| RosterError::InvalidRules(e.to_string()))
    }
}

/// Insère ligne par ligne ; un échec n'arrête pas les suivantes.
fn persist<R>(repo: &mut R, generated: &[Schedule]) -> PersistenceReport
where
    R: RosterRepository + ?Sized,
{
    let mut report = PersistenceReport::default();
    for schedule in generated {
        match repo.insert_schedule(schedule) {
            Ok(()) => report.committed.push(schedule.id.clone()),
            Err(err) => {
                warn!(schedule = %schedule.id, error = %err, "failed to persist schedule");
                report.failed.push(FailedAssignment {
                    schedule_id: schedule.id.clone(),
                    doctor_id: schedule.doctor,
                    date: schedule.date,
                    slot_id: schedule.slot,
                    error: format!("{err:#}"),
                });
            }
        }
    }
    info!(
        committed = report.committed.len(),
        failed = report.failed.len(),
        "schedules persisted"
    );
    report
}
