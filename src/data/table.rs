//! Raw and discretized tables

use crate::error::{DiscoveryError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Kind of values an attribute holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Real-valued, needs binning before the search
    Numeric,
    /// Category codes stored as floats, passed through unchanged
    Categorical,
}

/// Attribute metadata of a [`DataTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Stable zero-based position in the table
    pub index: usize,
    pub name: String,
    pub kind: AttributeKind,
}

impl Attribute {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            index: 0,
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>) -> Self {
        Self {
            index: 0,
            name: name.into(),
            kind: AttributeKind::Categorical,
        }
    }
}

/// Selection of the target attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Target {
    /// The last attribute of the table
    #[default]
    Last,
    /// Zero-based attribute index
    Index(usize),
}

impl Target {
    /// Resolve to a concrete attribute index of a table with `num_attributes` columns
    pub fn resolve(self, num_attributes: usize) -> Result<usize> {
        if num_attributes == 0 {
            return Err(DiscoveryError::TargetAttributeInvalid(
                "table has no attributes".to_string(),
            ));
        }
        match self {
            Target::Last => Ok(num_attributes - 1),
            Target::Index(index) if index < num_attributes => Ok(index),
            Target::Index(index) => Err(DiscoveryError::TargetAttributeInvalid(format!(
                "index {} out of range for {} attributes",
                index, num_attributes
            ))),
        }
    }
}

// ============================================================================
// Raw table
// ============================================================================

/// Immutable rows x attributes table; `NaN` marks a missing value
#[derive(Debug, Clone)]
pub struct DataTable {
    caption: String,
    attributes: Vec<Attribute>,
    values: Array2<f64>,
}

impl DataTable {
    /// Create a table from attribute metadata and a rows x attributes matrix
    pub fn new(
        caption: impl Into<String>,
        attributes: Vec<Attribute>,
        values: Array2<f64>,
    ) -> Result<Self> {
        if values.ncols() != attributes.len() {
            return Err(DiscoveryError::ShapeError {
                expected: format!("{} attribute columns", attributes.len()),
                actual: format!("{} columns", values.ncols()),
            });
        }
        if values.nrows() == 0 {
            return Err(DiscoveryError::DataError("table has no rows".to_string()));
        }

        let attributes = attributes
            .into_iter()
            .enumerate()
            .map(|(index, attr)| Attribute { index, ..attr })
            .collect();

        Ok(Self {
            caption: caption.into(),
            attributes,
            values,
        })
    }

    /// Create a table from equally long columns
    pub fn from_columns(
        caption: impl Into<String>,
        columns: Vec<(Attribute, Vec<f64>)>,
    ) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        if let Some((attr, col)) = columns.iter().find(|(_, v)| v.len() != n_rows) {
            return Err(DiscoveryError::ShapeError {
                expected: format!("{} rows", n_rows),
                actual: format!("{} rows in column '{}'", col.len(), attr.name),
            });
        }

        let values = Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| columns[c].1[r]);
        let attributes = columns.into_iter().map(|(attr, _)| attr).collect();
        Self::new(caption, attributes, values)
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn num_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Values of one attribute
    pub fn column(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.column(index)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

// ============================================================================
// Discrete table
// ============================================================================

/// Attribute metadata of a [`DiscreteTable`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscreteAttribute {
    pub index: usize,
    pub name: String,
    /// Number of distinct codes, codes lie in `0..arity`
    pub arity: usize,
    /// Upper-inclusive cut points when the attribute was binned
    pub cut_points: Option<Vec<f64>>,
}

/// Dense integer codes, one column per attribute
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteTable {
    caption: String,
    attributes: Vec<DiscreteAttribute>,
    codes: Array2<u32>,
    /// Codes actually present per column; arity may leave gaps
    distinct: Vec<usize>,
}

impl DiscreteTable {
    /// Create a table from metadata and codes, checking every code against its arity
    pub fn new(
        caption: impl Into<String>,
        attributes: Vec<DiscreteAttribute>,
        codes: Array2<u32>,
    ) -> Result<Self> {
        if codes.ncols() != attributes.len() {
            return Err(DiscoveryError::ShapeError {
                expected: format!("{} attribute columns", attributes.len()),
                actual: format!("{} columns", codes.ncols()),
            });
        }
        if codes.nrows() == 0 {
            return Err(DiscoveryError::DataError("table has no rows".to_string()));
        }
        for (j, attr) in attributes.iter().enumerate() {
            if let Some(code) = codes.column(j).iter().find(|&&c| c as usize >= attr.arity) {
                return Err(DiscoveryError::DataError(format!(
                    "code {} of attribute '{}' exceeds arity {}",
                    code, attr.name, attr.arity
                )));
            }
        }

        let distinct = attributes
            .iter()
            .enumerate()
            .map(|(j, attr)| {
                let mut seen = vec![false; attr.arity];
                codes
                    .column(j)
                    .iter()
                    .filter(|&&c| !std::mem::replace(&mut seen[c as usize], true))
                    .count()
            })
            .collect();

        let attributes = attributes
            .into_iter()
            .enumerate()
            .map(|(index, attr)| DiscreteAttribute { index, ..attr })
            .collect();

        Ok(Self {
            caption: caption.into(),
            attributes,
            codes,
            distinct,
        })
    }

    /// Create a table from named code columns; arity is one past the largest code
    pub fn from_columns(
        caption: impl Into<String>,
        columns: Vec<(&str, Vec<u32>)>,
    ) -> Result<Self> {
        let n_rows = columns.first().map(|(_, v)| v.len()).unwrap_or(0);
        if let Some((name, col)) = columns.iter().find(|(_, v)| v.len() != n_rows) {
            return Err(DiscoveryError::ShapeError {
                expected: format!("{} rows", n_rows),
                actual: format!("{} rows in column '{}'", col.len(), name),
            });
        }

        let codes = Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| columns[c].1[r]);
        let attributes = columns
            .iter()
            .map(|(name, col)| DiscreteAttribute {
                index: 0,
                name: name.to_string(),
                arity: col.iter().max().map_or(0, |&m| m as usize + 1),
                cut_points: None,
            })
            .collect();
        Self::new(caption, attributes, codes)
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn num_rows(&self) -> usize {
        self.codes.nrows()
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn attributes(&self) -> &[DiscreteAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&DiscreteAttribute> {
        self.attributes.get(index)
    }

    pub fn arity(&self, index: usize) -> usize {
        self.attributes[index].arity
    }

    pub fn column(&self, index: usize) -> ArrayView1<'_, u32> {
        self.codes.column(index)
    }

    pub fn codes(&self) -> &Array2<u32> {
        &self.codes
    }

    /// Number of different codes occurring in a column
    pub fn distinct_values(&self, index: usize) -> usize {
        self.distinct[index]
    }

    /// Attributes taking a distinct value on every row
    pub fn is_key(&self, index: usize) -> bool {
        self.num_rows() > 1 && self.distinct_values(index) == self.num_rows()
    }

    /// Convert back into a raw table whose attributes are all categorical
    pub fn to_data_table(&self) -> DataTable {
        DataTable {
            caption: self.caption.clone(),
            attributes: self
                .attributes
                .iter()
                .map(|a| Attribute {
                    index: a.index,
                    name: a.name.clone(),
                    kind: AttributeKind::Categorical,
                })
                .collect(),
            values: self.codes.mapv(f64::from),
        }
    }
}
