//! Fact rows and the sources that materialize them.
//!
//! A `DatasetSource` turns a `DatasetReference` into a physical location and
//! loads its rows. Sources are read-only: the runner never writes back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::reference::DatasetReference;
use crate::EvaluationError;

/// A record in a materialized dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactRow(Map<String, Value>);

impl FactRow {
    pub fn new(columns: Map<String, Value>) -> Self {
        Self(columns)
    }

    /// Build a row from a JSON value; `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(columns) => Some(Self(columns)),
            _ => None,
        }
    }

    /// Value of a column, `None` if the column is absent.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn columns(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A dataset reference resolved to its materialized location.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDataset {
    pub reference: DatasetReference,

    /// Display location (e.g., "analytics.fct_orders")
    pub location: String,

    /// Backing file, for file-based sources
    pub path: Option<PathBuf>,
}

/// Resolves references and loads their rows.
pub trait DatasetSource {
    /// Resolve a reference to its materialized location.
    fn resolve(&self, reference: &DatasetReference) -> Result<ResolvedDataset, EvaluationError>;

    /// Load every row of a resolved dataset, in materialization order.
    fn load(&self, dataset: &ResolvedDataset) -> Result<Vec<FactRow>, EvaluationError>;
}

/// An in-memory set of datasets keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    datasets: HashMap<String, Vec<FactRow>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a dataset.
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<FactRow>) -> Self {
        self.insert(name, rows);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<FactRow>) {
        self.datasets.insert(name.into(), rows);
    }
}

impl DatasetSource for InMemorySource {
    fn resolve(&self, reference: &DatasetReference) -> Result<ResolvedDataset, EvaluationError> {
        if !self.datasets.contains_key(reference.name()) {
            return Err(EvaluationError::unavailable(
                reference.name(),
                "dataset has not been materialized",
            ));
        }

        Ok(ResolvedDataset {
            reference: reference.clone(),
            location: reference.name().to_string(),
            path: None,
        })
    }

    fn load(&self, dataset: &ResolvedDataset) -> Result<Vec<FactRow>, EvaluationError> {
        self.datasets
            .get(dataset.reference.name())
            .cloned()
            .ok_or_else(|| {
                EvaluationError::unavailable(
                    dataset.reference.name(),
                    "dataset has not been materialized",
                )
            })
    }
}

/// On-disk materialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    /// A JSON array of objects
    Json,
    /// One JSON object per line
    JsonLines,
}

impl FileFormat {
    fn of(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(Self::Json),
            Some("jsonl") => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Datasets materialized as files in a directory.
///
/// `fct_orders` resolves to `<root>/fct_orders.json`, falling back to
/// `<root>/fct_orders.jsonl`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    schema: Option<String>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            schema: None,
        }
    }

    /// Report locations as `<schema>.<name>`.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn display_location(&self, name: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, name),
            None => name.to_string(),
        }
    }

    fn read_rows(&self, dataset: &ResolvedDataset, path: &Path) -> Result<Vec<FactRow>, EvaluationError> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EvaluationError::unavailable(
                dataset.reference.name(),
                format!("{} disappeared before it could be read", path.display()),
            ),
            _ => EvaluationError::query(format!("failed to read {}: {}", path.display(), e)),
        })?;

        // A file with no content at all has not finished materializing.
        // `[]` is an empty dataset.
        if contents.trim().is_empty() {
            return Err(EvaluationError::unavailable(
                dataset.reference.name(),
                format!("materialization is empty: {}", path.display()),
            ));
        }

        match FileFormat::of(path) {
            Some(FileFormat::Json) => serde_json::from_str::<Vec<FactRow>>(&contents).map_err(|e| {
                EvaluationError::query(format!(
                    "{} is not a JSON array of objects: {}",
                    path.display(),
                    e
                ))
            }),
            Some(FileFormat::JsonLines) => parse_json_lines(&contents, path),
            None => Err(EvaluationError::query(format!(
                "unsupported materialization format: {}",
                path.display()
            ))),
        }
    }
}

fn parse_json_lines(contents: &str, path: &Path) -> Result<Vec<FactRow>, EvaluationError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<FactRow>(line).map_err(|e| {
                EvaluationError::query(format!(
                    "{} line {} is not a JSON object: {}",
                    path.display(),
                    n + 1,
                    e
                ))
            })
        })
        .collect()
}

impl DatasetSource for DirectorySource {
    fn resolve(&self, reference: &DatasetReference) -> Result<ResolvedDataset, EvaluationError> {
        let candidates = [
            self.root.join(format!("{}.json", reference.name())),
            self.root.join(format!("{}.jsonl", reference.name())),
        ];

        let path = candidates
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| {
                EvaluationError::unavailable(
                    reference.name(),
                    format!("no materialization found under {}", self.root.display()),
                )
            })?;

        tracing::debug!(dataset = %reference, path = %path.display(), "Resolved dataset");

        Ok(ResolvedDataset {
            reference: reference.clone(),
            location: self.display_location(reference.name()),
            path: Some(path),
        })
    }

    fn load(&self, dataset: &ResolvedDataset) -> Result<Vec<FactRow>, EvaluationError> {
        let path = dataset.path.as_deref().ok_or_else(|| {
            EvaluationError::query(format!("{} has no backing file", dataset.location))
        })?;
        self.read_rows(dataset, path)
    }
}
