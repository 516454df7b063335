use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Règles de génération. Chaque champ a une valeur par défaut et peut être
/// surchargé individuellement dans le fichier JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterRules {
    pub min_doctors_per_slot: u32,
    /// Conservé dans le fichier de règles ; une cellule s'arrête au minimum.
    pub max_doctors_per_slot: u32,
    pub max_shifts_per_doctor: u32,
    pub default_total_slots: u32,
    pub default_fee: Decimal,
    /// 0 désactive la limite.
    pub consecutive_work_days_limit: u32,
    pub min_rest_days: u32,
    pub balance_workload: bool,
    pub strict_mode: bool,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            min_doctors_per_slot: 1,
            max_doctors_per_slot: 3,
            max_shifts_per_doctor: 999,
            default_total_slots: 20,
            default_fee: Decimal::new(500, 2),
            consecutive_work_days_limit: 6,
            min_rest_days: 1,
            balance_workload: true,
            strict_mode: false,
        }
    }
}

impl RosterRules {
    pub fn validate(&self) -> Result<()> {
        if self.default_total_slots == 0 {
            bail!("default_total_slots must be > 0");
        }
        if self.default_fee.is_sign_negative() {
            bail!("default_fee cannot be negative");
        }
        Ok(())
    }

    /// Nombre minimal de médecins par cellule (au moins 1).
    pub fn effective_min(&self) -> u32 {
        self.min_doctors_per_slot.max(1)
    }

    pub fn consecutive_limit(&self) -> Option<u32> {
        (self.consecutive_work_days_limit > 0).then_some(self.consecutive_work_days_limit)
    }
}

pub fn load_rules_from_file<P: AsRef<Path>>(path: P) -> Result<RosterRules> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading rules {}", path.display()))?;
    let rules: RosterRules = serde_json::from_slice(&data)
        .with_context(|| format!("parsing rules {}", path.display()))?;
    rules.validate()?;
    Ok(rules)
}
