#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use clinic_roster::{
    io,
    model::{DepartmentId, Location, LocationId, SlotId, TimeSlot},
    rules::{load_rules_from_file, RosterRules},
    scheduler::{Catalog, ConflictDetector, RosterEngine, RosterRequest, RosterResponse},
    storage::{JsonStorage, Storage},
    EngineConfig,
};

/// CLI de génération des plannings de consultation (stockage fichier)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON des données de la clinique
    #[arg(long, global = true, default_value = "clinic.json")]
    data: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des médecins depuis un CSV
    ImportDoctors {
        #[arg(long)]
        csv: String,
    },

    /// Importer des congés depuis un CSV
    ImportLeaves {
        #[arg(long)]
        csv: String,
    },

    /// Ajouter ou remplacer un créneau horaire
    AddSlot {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        name: String,
        /// HH:MM
        #[arg(long)]
        start: String,
        /// HH:MM, après le début
        #[arg(long)]
        end: String,
    },

    /// Ajouter ou remplacer un lieu de consultation
    AddLocation {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        department: u32,
    },

    /// Générer le planning d'un département
    Generate {
        #[arg(long)]
        department: u32,
        /// YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// YYYY-MM-DD (inclus)
        #[arg(long)]
        end: NaiveDate,
        /// Fichier JSON de règles (champs optionnels)
        #[arg(long)]
        rules: Option<String>,
        /// N'écrit rien dans le fichier de données
        #[arg(long)]
        preview: bool,
        /// Supprime les plannings existants de la période
        #[arg(long)]
        overwrite: bool,
        /// Interdit le relâchement des jours consécutifs
        #[arg(long)]
        strict: bool,
        /// liste "1,2,..." d'ids de créneaux
        #[arg(long, value_delimiter = ',')]
        slots: Vec<u32>,
        /// liste "3,4,..." d'ids de lieux
        #[arg(long, value_delimiter = ',')]
        locations: Vec<u32>,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        department: Option<u32>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Vérifier les conflits des plannings stockés
    Check {
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        clinic_roster::logging::init();
    }

    let storage = JsonStorage::open(&cli.data)?;
    let mut data = storage.load_or_default()?;

    let code = match cli.cmd {
        Commands::ImportDoctors { csv } => {
            let doctors = io::import_doctors_csv(csv)?;
            let count = doctors.len();
            for doctor in doctors {
                data.ensure_department(doctor.department);
                data.upsert_doctor(doctor);
            }
            storage.save(&data)?;
            println!("imported {count} doctor(s)");
            0
        }
        Commands::ImportLeaves { csv } => {
            let leaves = io::import_leaves_csv(csv)?;
            let count = leaves.len();
            data.leaves.extend(leaves);
            storage.save(&data)?;
            println!("imported {count} leave window(s)");
            0
        }
        Commands::AddSlot {
            id,
            name,
            start,
            end,
        } => {
            let start = parse_clock(&start)?;
            let end = parse_clock(&end)?;
            let slot = TimeSlot::new(SlotId::new(id), name, start, end)
                .map_err(anyhow::Error::msg)?;
            println!("slot #{} {} {}", slot.id, slot.name, slot.time_range());
            data.upsert_time_slot(slot);
            storage.save(&data)?;
            0
        }
        Commands::AddLocation {
            id,
            name,
            department,
        } => {
            let department = DepartmentId::new(department);
            data.ensure_department(department);
            println!("location #{id} {name} (department {department})");
            data.upsert_location(Location {
                id: LocationId::new(id),
                name,
                department,
            });
            storage.save(&data)?;
            0
        }
        Commands::Generate {
            department,
            start,
            end,
            rules,
            preview,
            overwrite,
            strict,
            slots,
            locations,
            out_json,
            out_csv,
        } => {
            let mut rules = match rules {
                Some(path) => load_rules_from_file(path)?,
                None => RosterRules::default(),
            };
            if strict {
                rules.strict_mode = true;
            }
            let mut request =
                RosterRequest::new(DepartmentId::new(department), start, end).with_rules(rules);
            request.preview_only = preview;
            request.overwrite_existing = overwrite;
            if !slots.is_empty() {
                request.time_slot_ids = Some(slots.into_iter().map(SlotId::new).collect());
            }
            if !locations.is_empty() {
                request.location_ids = Some(locations.into_iter().map(LocationId::new).collect());
            }

            let engine = RosterEngine::new(EngineConfig::from_env());
            let response = engine
                .generate(&mut data, &request)
                .context("roster generation failed")?;
            print_response(&response);

            if !preview {
                storage.save(&data)?;
            }
            if let Some(path) = out_json {
                io::export_response_json(path, &response)?;
            }
            if let Some(path) = out_csv {
                let schedules: Vec<_> = response.schedules.iter().map(|a| a.to_schedule()).collect();
                io::export_schedules_csv(path, &schedules, &Catalog::from_clinic(&data))?;
            }

            // Code 2 = WARNING/INCOMPLETE
            if response.success && response.unassigned_slots.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::List {
            department,
            out_csv,
        } => {
            let catalog = Catalog::from_clinic(&data);
            let mut schedules: Vec<_> = data
                .schedules
                .iter()
                .filter(|s| {
                    department.map_or(true, |dept| {
                        data.find_doctor(s.doctor)
                            .is_some_and(|d| d.department == DepartmentId::new(dept))
                    })
                })
                .cloned()
                .collect();
            schedules.sort_by(|a, b| {
                let slot_start = |s: &clinic_roster::Schedule| {
                    catalog.slot(s.slot).map(|t| t.start_time)
                };
                (a.date, slot_start(a), a.location, a.doctor).cmp(&(
                    b.date,
                    slot_start(b),
                    b.location,
                    b.doctor,
                ))
            });
            if let Some(path) = out_csv {
                io::export_schedules_csv(path, &schedules, &catalog)?;
            }
            // impression compacte
            for s in &schedules {
                println!(
                    "{} | {} | {} | {} | {}",
                    s.date,
                    catalog.slot_name(s.slot),
                    catalog.location_name(s.location),
                    catalog.doctor_name(s.doctor),
                    s.status.as_str()
                );
            }
            0
        }
        Commands::Check { report } => {
            let catalog = Catalog::from_clinic(&data);
            let conflicts = ConflictDetector::detect(&data.schedules, &[], &catalog);
            if conflicts.is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", conflicts.len());
                if let Some(path) = report {
                    io::export_conflicts_csv(path, &conflicts)?;
                }
                2
            }
        }
    };

    std::process::exit(code);
}

fn parse_clock(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid time (HH:MM): {s}"))
}

fn print_response(response: &RosterResponse) {
    println!("{}", response.message);
    for a in &response.schedules {
        let marker = if a.relaxed { " (relaxed)" } else { "" };
        println!(
            "{} | {} {} | {} | {}{}",
            a.date, a.slot_name, a.time_range, a.location_name, a.doctor_name, marker
        );
    }
    for cell in &response.unassigned_slots {
        println!(
            "UNASSIGNED {} | {} | {} | {}",
            cell.date, cell.slot_name, cell.location_name, cell.reason
        );
    }
    for c in &response.conflicts {
        println!(
            "CONFLICT {} | {} | {} | {}",
            c.kind.as_str(),
            c.date,
            c.slot_name,
            c.doctor_name
        );
    }
    for w in &response.warnings {
        eprintln!("warning: {w}");
    }
    let stats = &response.statistics;
    println!(
        "coverage {}/{} cells, {} doctor(s), {} conflict(s)",
        stats.assigned_cells, stats.required_cells, stats.doctors_involved, stats.conflict_count
    );
}
