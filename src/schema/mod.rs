// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Named-axis schemas, and the resolution of named dimension sizes across
//! tensors that were shaped independently.
//!
//! Every input tensor is described by a schema string like
//! `(source,time,chan,corr)`. Resolving a set of tensors assigns exactly one
//! size to every axis name; any tensor that disagrees with a size that was
//! already resolved is rejected.

mod error;

pub use error::SchemaError;

use std::{collections::HashMap, fmt, str::FromStr};

use itertools::Itertools;
use log::trace;

use crate::constants::DECLARED_DIMENSIONS;

/// The ordered axis names of a tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSchema(Vec<String>);

impl DimensionSchema {
    /// Parse a schema string, e.g. `(source,row,chan)`. Whitespace around axis
    /// names is ignored. `()` is the schema of a scalar.
    pub fn parse(schema: &str) -> Result<DimensionSchema, SchemaError> {
        let inner = schema
            .trim()
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(|| SchemaError::NoParentheses {
                schema: schema.to_string(),
            })?;
        if inner.trim().is_empty() {
            return Ok(DimensionSchema(vec![]));
        }

        let mut axes: Vec<String> = Vec::new();
        for name in inner.split(',').map(str::trim) {
            if name.is_empty() {
                return Err(SchemaError::EmptyAxisName {
                    schema: schema.to_string(),
                });
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(SchemaError::InvalidAxisName {
                    schema: schema.to_string(),
                    name: name.to_string(),
                });
            }
            if axes.iter().any(|a| a == name) {
                return Err(SchemaError::RepeatedAxis {
                    schema: schema.to_string(),
                    name: name.to_string(),
                });
            }
            axes.push(name.to_string());
        }

        Ok(DimensionSchema(axes))
    }

    pub fn axes(&self) -> &[String] {
        &self.0
    }

    /// The number of axes, i.e. the rank of any tensor described by this
    /// schema.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The rank position of the named axis.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|a| a == name)
    }

    /// Get the axis permutation that takes a tensor described by this schema
    /// into the `canonical` axis order, suitable for
    /// [`ndarray::ArrayBase::permuted_axes`]. `None` is returned if this schema
    /// isn't a reordering of `canonical`.
    pub fn permutation_to(&self, canonical: &[&str]) -> Option<Vec<usize>> {
        if self.len() != canonical.len() {
            return None;
        }
        canonical.iter().map(|name| self.position(name)).collect()
    }
}

impl FromStr for DimensionSchema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DimensionSchema::parse(s)
    }
}

impl fmt::Display for DimensionSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(","))
    }
}

/// A resolved dimension size, along with the name of the tensor that first
/// supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDimension {
    pub size: usize,
    pub tensor: String,
}

/// A mapping from axis names to their resolved sizes.
#[derive(Debug, Clone, Default)]
pub struct NamedDimensionMap {
    sizes: HashMap<String, ResolvedDimension>,
}

impl NamedDimensionMap {
    pub fn new() -> NamedDimensionMap {
        NamedDimensionMap::default()
    }

    /// Start a map from sizes that the caller already knows about. These take
    /// part in conflict checks like any tensor, and are blamed as
    /// [`DECLARED_DIMENSIONS`].
    pub fn with_declared<'a, I>(declared: I) -> NamedDimensionMap
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        let sizes = declared
            .into_iter()
            .map(|(name, size)| {
                (
                    name.to_string(),
                    ResolvedDimension {
                        size,
                        tensor: DECLARED_DIMENSIONS.to_string(),
                    },
                )
            })
            .collect();
        NamedDimensionMap { sizes }
    }

    /// Merge the axis sizes of a tensor into this map. The tensor's rank must
    /// match the number of axes in its schema, and every axis size must agree
    /// with what has already been resolved for that name.
    pub fn merge(
        &mut self,
        tensor: &str,
        schema: &DimensionSchema,
        shape: &[usize],
    ) -> Result<(), SchemaError> {
        if shape.len() != schema.len() {
            return Err(SchemaError::RankMismatch {
                tensor: tensor.to_string(),
                schema: schema.to_string(),
                rank: shape.len(),
                num_axes: schema.len(),
            });
        }

        for (name, &size) in schema.axes().iter().zip(shape) {
            match self.sizes.get(name) {
                Some(resolved) if resolved.size != size => {
                    return Err(SchemaError::ConflictingDimension {
                        name: name.clone(),
                        tensor: tensor.to_string(),
                        size,
                        previous_tensor: resolved.tensor.clone(),
                        previous_size: resolved.size,
                    });
                }
                Some(_) => (),
                None => {
                    trace!("'{tensor}' sets dimension '{name}' to {size}");
                    self.sizes.insert(
                        name.clone(),
                        ResolvedDimension {
                            size,
                            tensor: tensor.to_string(),
                        },
                    );
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.sizes.get(name).map(|d| d.size)
    }

    /// Get the size of a dimension that must have been resolved.
    pub fn require(&self, name: &str) -> Result<usize, SchemaError> {
        self.get(name).ok_or_else(|| SchemaError::MissingDimension {
            name: name.to_string(),
        })
    }

    /// Which tensor resolved the named dimension?
    pub fn resolved_by(&self, name: &str) -> Option<&str> {
        self.sizes.get(name).map(|d| d.tensor.as_str())
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

impl fmt::Display for NamedDimensionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sort so that log messages are stable.
        write!(
            f,
            "{{{}}}",
            self.sizes
                .iter()
                .sorted_by(|(a, _), (b, _)| a.cmp(b))
                .map(|(name, d)| format!("{name}: {}", d.size))
                .join(", ")
        )
    }
}

/// A tensor's name, axis schema and shape; the data itself is not needed to
/// resolve dimensions.
#[derive(Debug, Clone, Copy)]
pub struct SchemaInput<'a> {
    pub tensor: &'a str,
    pub schema: &'a DimensionSchema,
    pub shape: &'a [usize],
}

/// Resolve the sizes of all named dimensions of the supplied tensors, in order.
/// `declared` sizes are merged first.
pub fn resolve_dimensions<'a, D, I>(
    declared: D,
    inputs: I,
) -> Result<NamedDimensionMap, SchemaError>
where
    D: IntoIterator<Item = (&'a str, usize)>,
    I: IntoIterator<Item = SchemaInput<'a>>,
{
    let mut dims = NamedDimensionMap::with_declared(declared);
    for SchemaInput {
        tensor,
        schema,
        shape,
    } in inputs
    {
        dims.merge(tensor, schema, shape)?;
    }
    Ok(dims)
}
