// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all antenna_jones-related errors. This should be the *only*
//! error enum that is publicly visible from the CLI.

use thiserror::Error;

use super::common::{JonesTermArgsError, SizeArgsError};
use crate::jones_chain::JonesChainError;

/// The *only* publicly visible error from the antenna_jones binary.
#[derive(Error, Debug)]
pub enum AntennaJonesError {
    /// An error related to named-axis schemas or dimension resolution.
    #[error("{0}\n\nSchemas name each axis of a tensor in order, e.g. \"(source,row,chan,corr)\"")]
    Schema(String),

    /// An error related to the Jones chain inputs.
    #[error("{0}")]
    JonesChain(String),

    /// An error related to command-line arguments.
    #[error("{0}")]
    Args(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<JonesChainError> for AntennaJonesError {
    fn from(e: JonesChainError) -> Self {
        let s = e.to_string();
        match e {
            JonesChainError::Schema(_) => Self::Schema(s),
            JonesChainError::PrecisionMismatch { .. }
            | JonesChainError::InvalidCorrelationCount { .. }
            | JonesChainError::InvalidTimeIndex { .. }
            | JonesChainError::Shape(_) => Self::JonesChain(s),
        }
    }
}

impl From<JonesTermArgsError> for AntennaJonesError {
    fn from(e: JonesTermArgsError) -> Self {
        Self::Args(e.to_string())
    }
}

impl From<SizeArgsError> for AntennaJonesError {
    fn from(e: SizeArgsError) -> Self {
        let s = e.to_string();
        match e {
            SizeArgsError::UnknownAxis { .. } => Self::Schema(s),
            SizeArgsError::TooManyTimes(_) => Self::Args(s),
            SizeArgsError::Schema(e) => Self::from(JonesChainError::from(e)),
        }
    }
}

impl From<std::io::Error> for AntennaJonesError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for AntennaJonesError {
    fn from(e: toml::ser::Error) -> Self {
        Self::ArgFile(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for AntennaJonesError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<log::SetLoggerError> for AntennaJonesError {
    fn from(e: log::SetLoggerError) -> Self {
        Self::Generic(format!("Failed to initialise logging: {e}"))
    }
}
