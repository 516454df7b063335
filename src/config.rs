use tracing::warn;

pub const ENV_MAX_RANGE_DAYS: &str = "CLINIC_ROSTER_MAX_RANGE_DAYS";
pub const ENV_LOOKBACK_DAYS: &str = "CLINIC_ROSTER_LOOKBACK_DAYS";

/// Limites du moteur, indépendantes des règles métier d'une requête.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Longueur maximale (en jours, bornes incluses) d'une période générée.
    pub max_range_days: u32,
    /// Profondeur maximale du décompte des jours consécutifs.
    pub consecutive_lookback_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_range_days: 90,
            consecutive_lookback_days: 30,
        }
    }
}

impl EngineConfig {
    /// Valeurs par défaut, surchargées par `CLINIC_ROSTER_MAX_RANGE_DAYS`
    /// et `CLINIC_ROSTER_LOOKBACK_DAYS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_range_days: env_u32(ENV_MAX_RANGE_DAYS).unwrap_or(defaults.max_range_days),
            consecutive_lookback_days: env_u32(ENV_LOOKBACK_DAYS)
                .unwrap_or(defaults.consecutive_lookback_days),
        }
    }
}

fn env_u32(key: &str) -> Option<u32> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Some(v),
        _ => {
            warn!(key, value = %raw, "ignoring invalid engine setting");
            None
        }
    }
}
