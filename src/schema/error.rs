// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with parsing axis schemas and resolving dimension sizes.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Schema '{schema}' is not enclosed in parentheses, e.g. '(source,time,chan,corr)'")]
    NoParentheses { schema: String },

    #[error("Schema '{schema}' contains an empty axis name")]
    EmptyAxisName { schema: String },

    #[error("Schema '{schema}' contains the axis name '{name}'; only ASCII letters, digits and underscores are allowed")]
    InvalidAxisName { schema: String, name: String },

    #[error("Schema '{schema}' names the axis '{name}' more than once")]
    RepeatedAxis { schema: String, name: String },

    #[error("Tensor '{tensor}' has rank {rank}, but its schema '{schema}' has {num_axes} axes")]
    RankMismatch {
        tensor: String,
        schema: String,
        rank: usize,
        num_axes: usize,
    },

    #[error("Tensor '{tensor}' has size {size} for dimension '{name}', but '{previous_tensor}' previously set it to {previous_size}")]
    ConflictingDimension {
        name: String,
        tensor: String,
        size: usize,
        previous_tensor: String,
        previous_size: usize,
    },

    #[error("No '{name}' dimension was found")]
    MissingDimension { name: String },

    #[error("The schema '{schema}' for '{tensor}' must name exactly the axes {expected}")]
    SchemaAxes {
        tensor: String,
        schema: String,
        expected: String,
    },
}
