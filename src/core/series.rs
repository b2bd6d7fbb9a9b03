//! Named analyte sequences handed to the core.

use crate::error::{validate_samples, Result};
use serde::{Deserialize, Serialize};

/// One analyte's samples in positional order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// An ordered set of analyte sequences.
///
/// Order is significant: correlation matrices and reports follow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceBundle {
    series: Vec<AnalyteSeries>,
}

impl SequenceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sequence, rejecting non-finite samples.
    ///
    /// A second sequence under an existing name replaces the first.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        let name = name.into();
        validate_samples(&name, &values)?;

        match self.series.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.values = values,
            None => self.series.push(AnalyteSeries { name, values }),
        }
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert(name, values)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.series
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnalyteSeries> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Transpose the named sequences into per-sample rows.
    ///
    /// Returns `None` if a name is missing or the sequences differ in length.
    pub fn rows(&self, names: &[&str]) -> Option<Vec<Vec<f64>>> {
        let columns: Vec<&[f64]> = names
            .iter()
            .map(|name| self.get(name))
            .collect::<Option<_>>()?;

        let len = columns.first().map_or(0, |c| c.len());
        if columns.iter().any(|c| c.len() != len) {
            return None;
        }

        Some(
            (0..len)
                .map(|i| columns.iter().map(|c| c[i]).collect())
                .collect(),
        )
    }
}
