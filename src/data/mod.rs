//! In-memory tabular dataset with named columns.
//!
//! [`Dataset`] is the external collaborator every estimator in this crate
//! operates on: an ordered collection of named columns, each either numeric
//! or categorical, plus a running observation index assigned at
//! construction. The index is preserved verbatim through [`Dataset::filter`]
//! and [`Dataset::take`], so any subset can be traced back to the rows of
//! the table it was derived from.
//!
//! Construction goes through a validating builder:
//!
//! ```rust,ignore
//! use hte_toolkit::data::Dataset;
//!
//! let data = Dataset::builder()
//!     .numeric("y", vec![1.0, 2.0, 3.0])
//!     .numeric("treatment", vec![0.0, 1.0, 0.0])
//!     .categorical("region", vec!["north".into(), "south".into(), "north".into()])
//!     .build()?;
//! ```

use crate::error::{Error, Result};

/// A single named column: numeric measurements or categorical labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Floating-point measurements (covariates, outcomes, 0/1 indicators).
    Numeric(Vec<f64>),
    /// String labels (group markers, pick flags in label form).
    Categorical(Vec<String>),
}

impl Column {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(rows.iter().map(|&r| v[r].clone()).collect())
            }
        }
    }
}

/// An ordered table of named columns with a persistent observation index.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<(String, Column)>,
    obs_index: Vec<usize>,
}

/// Builder validating column names and lengths before producing a [`Dataset`].
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<(String, Column)>,
}

impl DatasetBuilder {
    /// Add a numeric column.
    pub fn numeric(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push((name.into(), Column::Numeric(values)));
        self
    }

    /// Add a categorical column.
    pub fn categorical(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.columns.push((name.into(), Column::Categorical(values)));
        self
    }

    /// Validate and build the dataset.
    ///
    /// Requires at least one column, pairwise-distinct non-empty names, and
    /// equal column lengths. Observation indices are assigned 1..=n.
    pub fn build(self) -> Result<Dataset> {
        let first_len = match self.columns.first() {
            Some((_, column)) => column.len(),
            None => {
                return Err(Error::configuration("dataset requires at least one column"));
            }
        };

        for (i, (name, column)) in self.columns.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::configuration("column names must be non-empty"));
            }
            if column.len() != first_len {
                return Err(Error::configuration(format!(
                    "column `{}` has {} rows, expected {}",
                    name,
                    column.len(),
                    first_len
                )));
            }
            if self.columns[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::configuration(format!(
                    "duplicate column name `{}`",
                    name
                )));
            }
        }

        Ok(Dataset {
            columns: self.columns,
            obs_index: (1..=first_len).collect(),
        })
    }
}

impl Dataset {
    /// Start building a dataset.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.obs_index.len()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Whether a column with this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// The observation index of every row, in row order.
    ///
    /// Indices start at 1 and survive filtering and row selection, which is
    /// what makes subsets traceable back to the original table.
    pub fn obs_index(&self) -> &[usize] {
        &self.obs_index
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, column)| column)
    }

    /// Numeric column values, or a configuration error naming the column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Categorical(_)) => Err(Error::configuration(format!(
                "column `{}` is categorical, expected numeric",
                name
            ))),
            None => Err(Error::configuration(format!("unknown column `{}`", name))),
        }
    }

    /// Categorical column values, or a configuration error naming the column.
    pub fn categorical(&self, name: &str) -> Result<&[String]> {
        match self.column(name) {
            Some(Column::Categorical(values)) => Ok(values),
            Some(Column::Numeric(_)) => Err(Error::configuration(format!(
                "column `{}` is numeric, expected categorical",
                name
            ))),
            None => Err(Error::configuration(format!("unknown column `{}`", name))),
        }
    }

    /// Mutable access to a numeric column (used by in-place score updates).
    pub fn numeric_mut(&mut self, name: &str) -> Result<&mut [f64]> {
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, Column::Numeric(values))) => Ok(values),
            Some((_, Column::Categorical(_))) => Err(Error::configuration(format!(
                "column `{}` is categorical, expected numeric",
                name
            ))),
            None => Err(Error::configuration(format!("unknown column `{}`", name))),
        }
    }

    /// Add or replace a numeric column in place.
    pub fn set_numeric(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        self.set_column(name.into(), Column::Numeric(values))
    }

    /// Add or replace a categorical column in place.
    pub fn set_categorical(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<()> {
        self.set_column(name.into(), Column::Categorical(values))
    }

    fn set_column(&mut self, name: String, column: Column) -> Result<()> {
        if column.len() != self.n_rows() {
            return Err(Error::configuration(format!(
                "column `{}` has {} rows, expected {}",
                name,
                column.len(),
                self.n_rows()
            )));
        }
        match self.columns.iter().position(|(n, _)| *n == name) {
            Some(index) => self.columns[index].1 = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    /// Rows where `mask` is true, as a new dataset keeping observation indices.
    pub fn filter(&self, mask: &[bool]) -> Result<Dataset> {
        if mask.len() != self.n_rows() {
            return Err(Error::configuration(format!(
                "mask has {} entries, expected {}",
                mask.len(),
                self.n_rows()
            )));
        }
        let rows: Vec<usize> = (0..mask.len()).filter(|&i| mask[i]).collect();
        self.take(&rows)
    }

    /// Rows at the given positions, in the given order, as a new dataset.
    ///
    /// Positions may repeat; observation indices follow the selected rows.
    pub fn take(&self, rows: &[usize]) -> Result<Dataset> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows()) {
            return Err(Error::configuration(format!(
                "row position {} out of bounds for {} rows",
                bad,
                self.n_rows()
            )));
        }
        Ok(Dataset {
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.take(rows)))
                .collect(),
            obs_index: rows.iter().map(|&r| self.obs_index[r]).collect(),
        })
    }
}
