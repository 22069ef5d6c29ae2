//! Table discretization

use super::binning::{BinnedColumn, Binner, BinningStrategy};
use super::config::{DiscretizationConfig, DiscretizationType};
use crate::data::{AttributeKind, DataTable, DiscreteAttribute, DiscreteTable};
use crate::error::{DiscoveryError, Result};
use crate::scoring::InformationContext;
use ndarray::Array2;
use tracing::debug;

/// Converts a [`DataTable`] into a [`DiscreteTable`].
///
/// The input table is never modified and the result depends only on the
/// table, the target and the configuration.
#[derive(Debug, Clone)]
pub struct Discretizer {
    config: DiscretizationConfig,
}

impl Discretizer {
    /// Create a discretizer, validating the configuration
    pub fn new(config: DiscretizationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DiscretizationConfig {
        &self.config
    }

    /// Discretize every numeric predictor with the configured scheme
    pub fn discretize(&self, table: &DataTable, target: usize) -> Result<DiscreteTable> {
        let predictors: Vec<usize> = (0..table.num_attributes())
            .filter(|&a| a != target)
            .collect();
        self.discretize_attributes(table, &predictors, target)
    }

    /// Discretize the nominated numeric predictors with the configured scheme.
    ///
    /// Other predictors pass through by value. A numeric target is always binned
    /// with equal frequency into `num_bins_for_target` bins.
    pub fn discretize_attributes(
        &self,
        table: &DataTable,
        attributes: &[usize],
        target: usize,
    ) -> Result<DiscreteTable> {
        let n_attrs = table.num_attributes();
        if target >= n_attrs {
            return Err(DiscoveryError::TargetAttributeInvalid(format!(
                "index {} out of range for {} attributes",
                target, n_attrs
            )));
        }
        if let Some(&bad) = attributes.iter().find(|&&a| a >= n_attrs) {
            return Err(DiscoveryError::DataError(format!(
                "attribute index {} out of range for {} attributes",
                bad, n_attrs
            )));
        }

        let target_binner = match table.attributes()[target].kind {
            AttributeKind::Numeric => Binner::new(BinningStrategy::EqualFrequency {
                num_bins: self.config.num_bins_for_target,
            }),
            AttributeKind::Categorical => Binner::new(BinningStrategy::PassThrough),
        };
        let target_column = target_binner.fit_transform(table.column(target), None)?;
        let context = InformationContext::new(
            ndarray::ArrayView1::from(&target_column.codes[..]),
            target_column.arity,
        );

        let predictor_binner = Binner::new(self.predictor_strategy());
        let pass_binner = Binner::new(BinningStrategy::PassThrough);

        let mut columns: Vec<BinnedColumn> = Vec::with_capacity(n_attrs);
        for (index, attr) in table.attributes().iter().enumerate() {
            let column = if index == target {
                target_column.clone()
            } else if attr.kind == AttributeKind::Numeric && attributes.contains(&index) {
                predictor_binner.fit_transform(table.column(index), Some(&context))?
            } else {
                pass_binner.fit_transform(table.column(index), None)?
            };
            debug!(attribute = %attr.name, arity = column.arity, "Discretized attribute");
            columns.push(column);
        }

        let n_rows = table.num_rows();
        let codes = Array2::from_shape_fn((n_rows, n_attrs), |(r, c)| columns[c].codes[r]);
        let attrs = table
            .attributes()
            .iter()
            .zip(columns)
            .map(|(attr, column)| DiscreteAttribute {
                index: attr.index,
                name: attr.name.clone(),
                arity: column.arity,
                cut_points: column.cut_points,
            })
            .collect();

        DiscreteTable::new(table.caption(), attrs, codes)
    }

    fn predictor_strategy(&self) -> BinningStrategy {
        match self.config.kind {
            DiscretizationType::EqualFrequency => BinningStrategy::EqualFrequency {
                num_bins: self.config.num_bins,
            },
            DiscretizationType::CandidateCutPoints => BinningStrategy::CandidateCutPoints {
                max_bins: self.config.max_bins,
                cut_point_multiplier: self.config.cut_point_multiplier,
            },
            DiscretizationType::PreDiscretized => BinningStrategy::PassThrough,
        }
    }
}
