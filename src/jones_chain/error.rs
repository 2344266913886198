// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all Jones-chain-related errors.

use thiserror::Error;

use super::Precision;
use crate::{constants::NUM_CORR, schema::SchemaError};

#[derive(Error, Debug)]
pub enum JonesChainError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("The Jones chain is configured for {configured} precision, but was given {used}-precision tensors")]
    PrecisionMismatch {
        configured: Precision,
        used: Precision,
    },

    #[error("Number of correlations '{found}' does not equal '{NUM_CORR}'")]
    InvalidCorrelationCount { found: usize },

    #[error("Row {row} has time index {time}, but the number of times is {num_times}")]
    InvalidTimeIndex {
        row: usize,
        time: i32,
        num_times: usize,
    },

    #[error("{0}")]
    Shape(#[from] ndarray::ShapeError),
}
