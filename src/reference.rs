//! Reference dataset loading and form choice derivation.
//!
//! The dataset is read once at startup from the first candidate file that
//! parses. A missing or unreadable dataset is not fatal: the form is served
//! with empty choices instead.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Leading entry of the company list meaning "no selection yet"
pub const COMPANY_PLACEHOLDER: &str = "Select Company";

/// Columns the dataset must provide
pub const REQUIRED_COLUMNS: [&str; 4] = ["company", "name", "year", "fuel_type"];

/// Errors raised while reading a dataset file
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column {0:?}")]
    MissingColumn(&'static str),
}

/// One row of the reference dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReferenceRecord {
    /// Car model name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub year: Option<i64>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    /// Historical sale price, not used for inference
    #[serde(default, rename = "Price", alias = "price", deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
}

/// A dataset loaded from one of the candidate files
#[derive(Debug, Clone)]
pub struct ReferenceData {
    pub source: PathBuf,
    pub records: Vec<ReferenceRecord>,
}

/// Parse reference records from delimited text with a header row
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<ReferenceRecord>, ReferenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ReferenceError::MissingColumn(column));
        }
    }

    reader
        .deserialize()
        .collect::<Result<Vec<ReferenceRecord>, _>>()
        .map_err(ReferenceError::from)
}

/// Read one dataset file
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<ReferenceRecord>, ReferenceError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(file)
}

/// Load the first candidate that exists and parses.
///
/// Candidates that are absent or fail to parse are skipped. Returns `None`
/// when no candidate could be used.
pub fn load_first<P: AsRef<Path>>(candidates: &[P]) -> Option<ReferenceData> {
    for candidate in candidates {
        let path = candidate.as_ref();
        if !path.exists() {
            continue;
        }

        match load_file(path) {
            Ok(records) => {
                info!(path = %path.display(), rows = records.len(), "Loaded reference dataset");
                return Some(ReferenceData {
                    source: path.to_path_buf(),
                    records,
                });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read reference dataset, skipping");
            }
        }
    }

    warn!(
        candidates = ?candidates.iter().map(|c| c.as_ref().display().to_string()).collect::<Vec<_>>(),
        "No reference dataset found; the form will be served with empty choices"
    );
    None
}

/// Selectable values offered by the estimation form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormChoices {
    /// Placeholder followed by distinct companies, ascending
    pub companies: Vec<String>,
    /// Distinct years, descending
    pub years: Vec<i64>,
    /// Distinct fuel types, ascending
    pub fuel_types: Vec<String>,
    /// Company to its distinct model names, ascending
    pub car_models: BTreeMap<String, Vec<String>>,
}

impl FormChoices {
    /// Choices offered when no dataset is available
    pub fn empty() -> Self {
        Self {
            companies: vec![COMPANY_PLACEHOLDER.to_string()],
            years: Vec::new(),
            fuel_types: Vec::new(),
            car_models: BTreeMap::new(),
        }
    }

    /// Derive the choice set from reference records
    pub fn from_records(records: &[ReferenceRecord]) -> Self {
        let companies: BTreeSet<&str> = records.iter().filter_map(|r| r.company.as_deref()).collect();
        let years: BTreeSet<i64> = records.iter().filter_map(|r| r.year).collect();
        let fuel_types: BTreeSet<&str> = records.iter().filter_map(|r| r.fuel_type.as_deref()).collect();

        let mut models: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for record in records {
            if let (Some(company), Some(name)) = (record.company.as_deref(), record.name.as_deref()) {
                models.entry(company).or_default().insert(name);
            }
        }

        Self {
            companies: std::iter::once(COMPANY_PLACEHOLDER)
                .chain(companies)
                .map(str::to_string)
                .collect(),
            years: years.into_iter().rev().collect(),
            fuel_types: fuel_types.into_iter().map(str::to_string).collect(),
            car_models: models
                .into_iter()
                .map(|(company, names)| {
                    (company.to_string(), names.into_iter().map(str::to_string).collect())
                })
                .collect(),
        }
    }

    /// Choices for an optional dataset
    pub fn from_data(data: Option<&ReferenceData>) -> Self {
        data.map(|d| Self::from_records(&d.records))
            .unwrap_or_else(Self::empty)
    }
}

impl Default for FormChoices {
    fn default() -> Self {
        Self::empty()
    }
}
