use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tabled::Tabled;

/// A table exactly as it came out of the file: header row plus raw cells.
/// Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// One survey entry (usually one class).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub turma: String,
    /// Categorical region label, only present when the source has a `Regiao` column.
    pub region: Option<String>,
    /// Numeric fields, aligned with `Dataset::columns`.
    pub values: Vec<f64>,
}

/// Normalized survey table. Every record carries one value per numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    /// Fails with `ShapeMismatch` when a record does not carry exactly one
    /// value per column.
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Result<Self> {
        if let Some(bad) = records.iter().find(|r| r.values.len() != columns.len()) {
            return Err(DashboardError::ShapeMismatch {
                series: format!("record {}", bad.id),
                expected: columns.len(),
                actual: bad.values.len(),
            });
        }
        Ok(Dataset { columns, records })
    }

    /// Build a dataset column by column. IDs are assigned from 1.
    pub fn from_columns(turmas: Vec<String>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
        let rows = turmas.len();
        for (name, values) in &columns {
            if values.len() != rows {
                return Err(DashboardError::ShapeMismatch {
                    series: name.clone(),
                    expected: rows,
                    actual: values.len(),
                });
            }
        }
        let records = turmas
            .into_iter()
            .enumerate()
            .map(|(i, turma)| Record {
                id: (i + 1).to_string(),
                turma,
                region: None,
                values: columns.iter().map(|(_, v)| v[i]).collect(),
            })
            .collect();
        let names = columns.into_iter().map(|(name, _)| name).collect();
        Dataset::new(names, records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DashboardError::MissingColumn(vec![name.to_string()]))
    }

    /// Values of one numeric column in row order.
    pub fn column_values(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        Ok(self.records.iter().map(|r| r.values[idx]).collect())
    }

    /// Rows whose `Turma` is in the filter, in their original order.
    pub fn filtered(&self, filter: &GroupFilter) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records: self
                .records
                .iter()
                .filter(|r| filter.contains(&r.turma))
                .cloned()
                .collect(),
        }
    }
}

/// Set of `Turma` labels selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupFilter {
    labels: BTreeSet<String>,
}

impl GroupFilter {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        GroupFilter { labels: labels.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

/// Ordered category label -> summed count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregate {
    entries: Vec<(String, f64)>,
}

impl Aggregate {
    pub fn new() -> Self {
        Aggregate::default()
    }

    /// Add `value` to `label`, appending the label if it is new.
    pub fn add(&mut self, label: &str, value: f64) {
        match self.entries.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 += value,
            None => self.entries.push((label.to_string(), value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(|(l, _)| l.clone()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Aggregate {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        let mut agg = Aggregate::new();
        for (label, value) in iter {
            let label: String = label.into();
            agg.add(&label, value);
        }
        agg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    StackedBar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Renderer-agnostic chart: one category axis and one or more series of the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

impl ChartSpec {
    pub fn total(&self) -> f64 {
        self.series.iter().flat_map(|s| s.values.iter()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub region: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub count: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    pub label: String,
    pub value: f64,
    pub display: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct KpiRow {
    #[serde(rename = "Indicador")]
    #[tabled(rename = "Indicador")]
    pub label: String,
    #[serde(rename = "Valor")]
    #[tabled(rename = "Valor")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MarkerRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Label")]
    #[tabled(rename = "Label")]
    pub label: String,
    #[serde(rename = "Lat")]
    #[tabled(rename = "Lat")]
    pub lat: String,
    #[serde(rename = "Lon")]
    #[tabled(rename = "Lon")]
    pub lon: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "Radius")]
    #[tabled(rename = "Radius")]
    pub radius: String,
}

/// One chart data point, flattened for CSV export.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChartPointRow {
    #[serde(rename = "Chart")]
    #[tabled(rename = "Chart")]
    pub chart: String,
    #[serde(rename = "Kind")]
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Series")]
    #[tabled(rename = "Series")]
    pub series: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: f64,
}
