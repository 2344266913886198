// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Validation of Jones chain inputs and the shape of the resulting antenna
//! Jones tensor.
//!
//! Both shape inference and the kernel go through [`plan`], so the shape
//! inferred before any data exists is always the shape the kernel allocates.

use itertools::Itertools;
use log::{debug, trace};

use super::{JonesChainConfig, JonesChainError, JonesTermKind};
use crate::{
    constants::{NUM_CORR, ROW_TO_TIME_INDEX_SCHEMA},
    schema::{DimensionSchema, NamedDimensionMap, SchemaError},
};

/// The shapes of the tensors supplied to a Jones chain. Shapes of terms that
/// aren't present are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermShapes<'a> {
    pub bsqrt: &'a [usize],
    pub complex_phase: &'a [usize],
    pub feed_rotation: &'a [usize],
    pub ddes: &'a [usize],
    pub row_to_time_index: &'a [usize],
}

impl<'a> TermShapes<'a> {
    pub fn term(&self, kind: JonesTermKind) -> &'a [usize] {
        match kind {
            JonesTermKind::BrightnessSqrt => self.bsqrt,
            JonesTermKind::ComplexPhase => self.complex_phase,
            JonesTermKind::FeedRotation => self.feed_rotation,
            JonesTermKind::Ddes => self.ddes,
        }
    }

    pub fn set_term(&mut self, kind: JonesTermKind, shape: &'a [usize]) {
        match kind {
            JonesTermKind::BrightnessSqrt => self.bsqrt = shape,
            JonesTermKind::ComplexPhase => self.complex_phase = shape,
            JonesTermKind::FeedRotation => self.feed_rotation = shape,
            JonesTermKind::Ddes => self.ddes = shape,
        }
    }
}

/// A validated Jones chain, ready to be executed.
#[derive(Debug, Clone)]
pub(super) struct ChainPlan {
    pub(super) num_sources: usize,
    pub(super) num_rows: usize,
    pub(super) num_chans: usize,

    /// The present terms in the order they're applied, along with the axis
    /// permutation that takes each term's tensor into its canonical order.
    pub(super) terms: Vec<(JonesTermKind, Vec<usize>)>,
}

impl ChainPlan {
    pub(super) fn output_shape(&self) -> [usize; 4] {
        [self.num_sources, self.num_rows, self.num_chans, NUM_CORR]
    }
}

/// Resolve all named dimensions of the present terms and check that they
/// describe a Jones chain that can be computed.
pub(super) fn plan(
    config: &JonesChainConfig,
    shapes: &TermShapes,
) -> Result<ChainPlan, JonesChainError> {
    let mut dims = NamedDimensionMap::with_declared(
        config
            .dimensions
            .iter()
            .map(|(name, &size)| (name.as_str(), size)),
    );

    let mut terms = Vec::with_capacity(JonesTermKind::ORDER.len());
    for kind in config.present_terms() {
        let schema = DimensionSchema::parse(config.schema(kind))?;
        let name = kind.to_string();
        dims.merge(&name, &schema, shapes.term(kind))?;

        let canonical = kind.canonical_axes();
        let permutation = schema
            .permutation_to(canonical)
            .ok_or_else(|| SchemaError::SchemaAxes {
                tensor: name.clone(),
                schema: schema.to_string(),
                expected: format!("({})", canonical.iter().join(",")),
            })?;
        trace!("{name} schema {schema} has axis permutation {permutation:?}");
        terms.push((kind, permutation));
    }

    let index_schema = DimensionSchema::parse(ROW_TO_TIME_INDEX_SCHEMA)?;
    dims.merge("row_to_time_index", &index_schema, shapes.row_to_time_index)?;
    debug!("Resolved dimensions: {dims}");

    let num_sources = dims.require("source")?;
    let num_rows = dims.require("row")?;
    let num_chans = dims.require("chan")?;
    if terms.iter().any(|(kind, _)| kind.is_matrix()) {
        let num_corr = dims.require("corr")?;
        if num_corr != NUM_CORR {
            return Err(JonesChainError::InvalidCorrelationCount { found: num_corr });
        }
    }

    Ok(ChainPlan {
        num_sources,
        num_rows,
        num_chans,
        terms,
    })
}

/// Get the shape of the antenna Jones tensor that [`super::create_antenna_jones`]
/// would produce for tensors of the given shapes, without needing any data.
/// The shape is `(source, row, chan, corr)`, and the corr axis always has 4
/// elements.
pub fn infer_antenna_jones_shape(
    config: &JonesChainConfig,
    shapes: &TermShapes,
) -> Result<[usize; 4], JonesChainError> {
    Ok(plan(config, shapes)?.output_shape())
}
