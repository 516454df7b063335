use tracing_subscriber::{fmt, EnvFilter};

/// Initialise les logs sur stderr.
///
/// `RUST_LOG` filtre les niveaux (défaut : `info`), par exemple
/// `RUST_LOG=clinic_roster=debug`. Sans effet si un subscriber global
/// est déjà installé.
///
/// ```no_run
/// clinic_roster::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .try_init();
}
