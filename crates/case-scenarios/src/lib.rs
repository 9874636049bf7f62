#![deny(warnings)]

//! Scenario collections: loading, lookup, export and equity comparison.
//!
//! A collection is a list of [`Scenario`]s stored as JSON or YAML. Each
//! scenario is merged onto the [`CaseConfig`] defaults before evaluation.

use case_core::{CaseConfig, ExportedScenario, Scenario, ScenarioInputs, ValidationError};
use case_econ::{evaluate, ScenarioResults};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid json: {0}")]
    Json(String),
    #[error("invalid yaml: {0}")]
    Yaml(String),
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("duplicate scenario id: {0}")]
    DuplicateId(String),
    #[error("scenario {id}: {source}")]
    Validation {
        id: String,
        #[source]
        source: ValidationError,
    },
}

impl From<std::io::Error> for ScenarioError {
    fn from(e: std::io::Error) -> Self {
        ScenarioError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ScenarioError {
    fn from(e: serde_json::Error) -> Self {
        ScenarioError::Json(e.to_string())
    }
}

impl From<serde_yaml::Error> for ScenarioError {
    fn from(e: serde_yaml::Error) -> Self {
        ScenarioError::Yaml(e.to_string())
    }
}

/// On-disk encodings, picked by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self, ScenarioError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(FileFormat::Json),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            _ => Err(ScenarioError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, text: &str) -> Result<T, ScenarioError> {
        match self {
            FileFormat::Json => Ok(serde_json::from_str(text)?),
            FileFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        }
    }
}

/// Load a [`CaseConfig`] from a JSON or YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CaseConfig, ScenarioError> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let text = fs::read_to_string(path)?;
    let config: CaseConfig = format.parse(&text)?;
    case_core::validate_inputs(&config.defaults).map_err(|source| ScenarioError::Validation {
        id: "defaults".to_string(),
        source,
    })?;
    info!(path = %path.display(), "case config loaded");
    Ok(config)
}

/// Ordered collection of scenarios with unique ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, ScenarioError> {
        let mut seen = BTreeSet::new();
        for s in &scenarios {
            if !seen.insert(s.id.as_str()) {
                return Err(ScenarioError::DuplicateId(s.id.clone()));
            }
        }
        Ok(Self { scenarios })
    }

    pub fn from_json_str(text: &str) -> Result<Self, ScenarioError> {
        Self::new(FileFormat::Json.parse(text)?)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ScenarioError> {
        Self::new(FileFormat::Yaml.parse(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let text = fs::read_to_string(path)?;
        let set = Self::new(format.parse(&text)?)?;
        info!(path = %path.display(), count = set.len(), "scenarios loaded");
        Ok(set)
    }

    /// Like [`ScenarioSet::load`], but a missing or malformed file only
    /// produces a warning and an empty collection.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(set) => set,
            Err(err) => {
                warn!(path = %path.display(), %err, "scenario file unavailable");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn get(&self, id: &str) -> Result<&Scenario, ScenarioError> {
        self.scenarios
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| ScenarioError::UnknownScenario(id.to_string()))
    }

    /// Defaults ⊕ overrides for the scenario `id`, validated.
    pub fn resolve(&self, config: &CaseConfig, id: &str) -> Result<ScenarioInputs, ScenarioError> {
        resolve_scenario(config, self.get(id)?)
    }

    /// Append a scenario, e.g. one re-imported from an export.
    pub fn push(&mut self, scenario: Scenario) -> Result<(), ScenarioError> {
        if self.scenarios.iter().any(|s| s.id == scenario.id) {
            return Err(ScenarioError::DuplicateId(scenario.id));
        }
        self.scenarios.push(scenario);
        Ok(())
    }
}

pub fn resolve_scenario(
    config: &CaseConfig,
    scenario: &Scenario,
) -> Result<ScenarioInputs, ScenarioError> {
    config
        .inputs_for(&scenario.values)
        .map_err(|source| ScenarioError::Validation {
            id: scenario.id.clone(),
            source,
        })
}

/// Export the levers of `inputs` as pretty-printed JSON.
pub fn export_json(exported: &ExportedScenario) -> Result<String, ScenarioError> {
    Ok(serde_json::to_string_pretty(exported)?)
}

/// Parse a previously exported scenario back into a collection entry.
pub fn import_json(text: &str) -> Result<Scenario, ScenarioError> {
    let exported: ExportedScenario = serde_json::from_str(text)?;
    Ok(exported.into_scenario())
}

/// Period-end outcome of one scenario in an equity comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EquityRow {
    pub id: String,
    pub label: String,
    pub solvent: bool,
    pub house_sold: bool,
    pub end_balance: Decimal,
    pub equity: Decimal,
    pub viking_end_balance: Decimal,
    pub viking_equity: Decimal,
    pub total_equity: Decimal,
}

impl EquityRow {
    fn from_results(scenario: &Scenario, r: &ScenarioResults) -> Self {
        Self {
            id: scenario.id.clone(),
            label: scenario.label.clone(),
            solvent: r.sandy_solvent,
            house_sold: r.house_sold,
            end_balance: r.sandy_end_balance,
            equity: r.sandy_bs_equity,
            viking_end_balance: r.viking_end_balance,
            viking_equity: r.viking_bs_equity,
            total_equity: r.total_equity(),
        }
    }

    /// Label, or the id when the label is blank.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// Every scenario of a collection evaluated side by side.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EquityComparison {
    pub rows: Vec<EquityRow>,
    pub max_sandy_equity: Option<Decimal>,
    pub max_viking_equity: Option<Decimal>,
    pub max_total_equity: Option<Decimal>,
}

impl EquityComparison {
    pub fn is_best_sandy(&self, row: &EquityRow) -> bool {
        self.max_sandy_equity == Some(row.equity)
    }

    pub fn is_best_viking(&self, row: &EquityRow) -> bool {
        self.max_viking_equity == Some(row.viking_equity)
    }

    pub fn is_best_total(&self, row: &EquityRow) -> bool {
        self.max_total_equity == Some(row.total_equity)
    }
}

/// Evaluate every scenario of `set` and collect the period-end equity rows.
///
/// Fails on the first scenario whose merged inputs do not validate.
pub fn compare_scenarios(
    config: &CaseConfig,
    set: &ScenarioSet,
) -> Result<EquityComparison, ScenarioError> {
    let mut rows = Vec::with_capacity(set.len());
    for scenario in set.iter() {
        let inputs = resolve_scenario(config, scenario)?;
        let results = evaluate(&inputs);
        rows.push(EquityRow::from_results(scenario, &results));
    }
    let max_sandy_equity = rows.iter().map(|r| r.equity).max();
    let max_viking_equity = rows.iter().map(|r| r.viking_equity).max();
    let max_total_equity = rows.iter().map(|r| r.total_equity).max();
    info!(scenarios = rows.len(), "equity comparison complete");
    Ok(EquityComparison {
        rows,
        max_sandy_equity,
        max_viking_equity,
        max_total_equity,
    })
}
