//! Application configuration management.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Planning horizon and input configuration.
    pub planning: PlanningConfig,
    /// Jurisdictional rates and thresholds, one set per financial year.
    #[serde(default)]
    pub parameters: Vec<ParameterSet>,
}

/// Planning horizon and input configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanningConfig {
    /// Path to the JSON account snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Financial year in which the planning horizon starts.
    pub start_year: i32,
    /// Number of financial years to project.
    #[serde(default = "default_num_years")]
    pub num_years: u32,
    /// Fixed "today" reference; defaults to the local date when absent.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/snapshot.json")
}

fn default_num_years() -> u32 {
    1
}

/// Named rates and thresholds for one financial year.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterSet {
    /// Financial year (the calendar year in which it starts).
    pub year: i32,
    /// Named rates, as fractions (e.g. `0.2`).
    #[serde(default)]
    pub rates: Vec<NamedParameter>,
    /// Named thresholds, in minor units.
    #[serde(default)]
    pub thresholds: Vec<NamedParameter>,
}

/// A single named rate or threshold.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedParameter {
    /// Parameter name (e.g. `IncomeTaxBasicRate`).
    pub name: String,
    /// Parameter value.
    pub value: Decimal,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> AppResult<Self> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("PENNYPLAN")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Checks cross-field invariants the deserializer cannot express.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` describing the first violation found.
    pub fn validate(&self) -> AppResult<()> {
        if self.planning.num_years == 0 {
            return Err(AppError::Config(
                "planning.num_years must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for set in &self.parameters {
            if !seen.insert(set.year) {
                return Err(AppError::Config(format!(
                    "duplicate parameter set for year {}",
                    set.year
                )));
            }
            if let Some(rate) = set
                .rates
                .iter()
                .find(|rate| rate.value < Decimal::ZERO || rate.value > Decimal::ONE)
            {
                return Err(AppError::Config(format!(
                    "rate {} for year {} must be between 0 and 1",
                    rate.name, set.year
                )));
            }
            if let Some(threshold) = set
                .thresholds
                .iter()
                .find(|threshold| threshold.value < Decimal::ZERO)
            {
                return Err(AppError::Config(format!(
                    "threshold {} for year {} cannot be negative",
                    threshold.name, set.year
                )));
            }
        }

        Ok(())
    }
}
