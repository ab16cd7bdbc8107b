//! Column-table archive records and embedded event labels.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{ArchiveError, Result};
use crate::series::{TimeSeries, TimeUnit};
use crate::shape::EventStats;

/// Variable type written on measured data columns.
pub const MEASURED: &str = "measured";
/// Variable type written on derived event columns.
pub const INFERRED: &str = "inferred";

/// One stored fit of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Realization {
    pub id: u32,
    pub created_at: DateTime<Utc>,
    pub stats: EventStats,
}

impl Realization {
    pub fn key(&self) -> String {
        format!("Realization_{}", self.id)
    }
}

/// Event metadata carried by an event label column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventColumn {
    pub event_type: String,
    pub associated_variable: String,
    pub associated_variable_index: usize,
    #[serde(default)]
    pub realizations: Vec<Realization>,
}

/// A named column of the record's measurement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub number: usize,
    pub variable_name: String,
    #[serde(default)]
    pub units: String,
    #[serde(default = "default_variable_type")]
    pub variable_type: String,
    pub values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<EventColumn>,
}

fn default_variable_type() -> String {
    MEASURED.into()
}

impl Column {
    pub fn is_event(&self) -> bool {
        self.event.is_some()
    }

    /// Values as numbers.
    ///
    /// # Errors
    ///
    /// [`ArchiveError::NonNumeric`] for the first entry that is not a number.
    pub fn numbers(&self) -> Result<Vec<f64>, ArchiveError> {
        self.values
            .iter()
            .enumerate()
            .map(|(row, v)| {
                v.as_f64().ok_or_else(|| ArchiveError::NonNumeric {
                    column: self.variable_name.clone(),
                    row,
                })
            })
            .collect()
    }
}

/// Everything needed to embed one realization of an event.
#[derive(Debug, Clone)]
pub struct EventEntry {
    pub event_num: u32,
    pub realization_num: u32,
    pub event_type: String,
    pub associated_variable_index: usize,
    pub labels: Vec<u8>,
    pub stats: EventStats,
}

/// A dataset's measurement table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub dataset_name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// `1` where `event_start <= t <= event_end`, `0` elsewhere.
pub fn event_labels(axis: &[f64], stats: &EventStats) -> Vec<u8> {
    axis.iter()
        .map(|t| u8::from(*t >= stats.event_start && *t <= stats.event_end))
        .collect()
}

impl ArchiveRecord {
    pub fn new(dataset_name: impl Into<String>) -> Self {
        Self {
            dataset_name: dataset_name.into(),
            columns: Vec::new(),
        }
    }

    /// Append a measured numeric column and return its index.
    pub fn push_column(
        &mut self,
        variable_name: impl Into<String>,
        units: impl Into<String>,
        values: Vec<f64>,
    ) -> usize {
        self.columns.push(Column {
            number: self.columns.len() + 1,
            variable_name: variable_name.into(),
            units: units.into(),
            variable_type: MEASURED.into(),
            values: values.into_iter().map(Value::from).collect(),
            event: None,
        });
        self.columns.len() - 1
    }

    /// # Errors
    ///
    /// [`ArchiveError::NoSuchColumn`] if `index` is past the end.
    pub fn column(&self, index: usize) -> Result<&Column, ArchiveError> {
        self.columns.get(index).ok_or(ArchiveError::NoSuchColumn {
            index,
            len: self.columns.len(),
        })
    }

    /// Data columns, with their indices, in table order.
    pub fn data_columns(&self) -> impl Iterator<Item = (usize, &Column)> {
        self.columns.iter().enumerate().filter(|(_, c)| !c.is_event())
    }

    /// Event columns in table order.
    pub fn events(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_event())
    }

    pub fn event_column_name(event_num: u32) -> String {
        format!("Event_{event_num}")
    }

    /// Stats of one stored realization.
    pub fn realization(&self, event_num: u32, realization_num: u32) -> Option<&Realization> {
        let name = Self::event_column_name(event_num);
        self.events()
            .find(|c| c.variable_name == name)?
            .event
            .as_ref()?
            .realizations
            .iter()
            .find(|r| r.id == realization_num)
    }

    /// Build a series from a time column and a value column.
    ///
    /// # Errors
    ///
    /// Fails if the indices are equal or missing, a column is not numeric,
    /// or the pair does not form a valid series.
    pub fn series_from_columns(&self, time_col: usize, value_col: usize) -> Result<TimeSeries> {
        if time_col == value_col {
            return Err(ArchiveError::SameColumn(time_col).into());
        }
        let tc = self.column(time_col)?;
        let vc = self.column(value_col)?;
        let series = TimeSeries::new(tc.numbers()?, vc.numbers()?)?
            .with_names(&tc.variable_name, &vc.variable_name)
            .with_units(&tc.units, &vc.units);
        Ok(series)
    }

    /// A time column converted to `target` without reordering rows.
    ///
    /// # Errors
    ///
    /// Fails if the column is missing, non-numeric, or its unit is unknown.
    pub fn times_in_unit(&self, time_col: usize, target: TimeUnit) -> Result<Vec<f64>> {
        let column = self.column(time_col)?;
        let source = TimeUnit::parse(&column.units)?;
        Ok(column
            .numbers()?
            .into_iter()
            .map(|t| target.from_years_bp(source.to_years_bp(t)))
            .collect())
    }

    /// Embed an event realization.
    ///
    /// An existing `Event_<n>` column gains the realization, replacing one with
    /// the same id. Otherwise a new inferred column is appended holding the
    /// label array.
    ///
    /// # Errors
    ///
    /// Fails if the associated variable is missing or is itself an event, or
    /// the label array does not match the table length.
    pub fn attach_event(&mut self, entry: EventEntry) -> Result<&Column, ArchiveError> {
        let associated = self.column(entry.associated_variable_index)?;
        if associated.is_event() {
            return Err(ArchiveError::Invalid(format!(
                "column {} is an event column, not a variable",
                entry.associated_variable_index
            )));
        }
        let expected = associated.values.len();
        let associated_variable = associated.variable_name.clone();
        let name = Self::event_column_name(entry.event_num);
        if entry.labels.len() != expected {
            return Err(ArchiveError::LabelLength {
                event: name,
                got: entry.labels.len(),
                expected,
            });
        }

        let realization = Realization {
            id: entry.realization_num,
            created_at: Utc::now(),
            stats: entry.stats,
        };

        let idx = match self.columns.iter().position(|c| c.variable_name == name) {
            Some(idx) => {
                let event = self.columns[idx].event.as_mut().ok_or_else(|| {
                    ArchiveError::Invalid(format!("column '{name}' exists but is not an event"))
                })?;
                event.realizations.retain(|r| r.id != realization.id);
                event.realizations.push(realization);
                event.realizations.sort_by_key(|r| r.id);
                idx
            }
            None => {
                self.columns.push(Column {
                    number: self.columns.len() + 1,
                    variable_name: name,
                    units: "NA".into(),
                    variable_type: INFERRED.into(),
                    values: entry.labels.into_iter().map(Value::from).collect(),
                    event: Some(EventColumn {
                        event_type: entry.event_type,
                        associated_variable,
                        associated_variable_index: entry.associated_variable_index,
                        realizations: vec![realization],
                    }),
                });
                self.columns.len() - 1
            }
        };
        Ok(&self.columns[idx])
    }

    /// Structural checks run before every write.
    ///
    /// # Errors
    ///
    /// Duplicate column numbers or names, data columns of unequal length,
    /// and event label arrays holding anything but 0/1.
    pub fn validate(&self) -> Result<(), ArchiveError> {
        let mut numbers = HashSet::new();
        let mut names = HashSet::new();
        for c in &self.columns {
            if !numbers.insert(c.number) {
                return Err(ArchiveError::Invalid(format!("duplicate column number {}", c.number)));
            }
            if !names.insert(c.variable_name.as_str()) {
                return Err(ArchiveError::Invalid(format!(
                    "duplicate column name '{}'",
                    c.variable_name
                )));
            }
        }

        let mut lengths = self.columns.iter().map(|c| (c, c.values.len()));
        if let Some((first, len)) = lengths.next() {
            for (c, l) in lengths {
                if l != len {
                    return Err(ArchiveError::Invalid(format!(
                        "column '{}' has {l} rows but '{}' has {len}",
                        c.variable_name, first.variable_name
                    )));
                }
            }
        }

        for c in self.events() {
            let bad = c
                .values
                .iter()
                .position(|v| !matches!(v.as_f64(), Some(x) if x == 0.0 || x == 1.0));
            if let Some(row) = bad {
                return Err(ArchiveError::Invalid(format!(
                    "event column '{}' has a non-binary label at row {row}",
                    c.variable_name
                )));
            }
        }
        Ok(())
    }
}
