// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `shape` and
//! `simulate` subcommands describe a Jones chain and the sizes of its tensors
//! in the same way, so those arguments are shared between them.

#[cfg(test)]
mod tests;

use std::{collections::BTreeMap, str::FromStr};

use clap::Parser;
use console::style;
use itertools::Itertools;
use log::{debug, info};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    constants::*,
    jones_chain::{JonesChainConfig, JonesTermKind, Precision, TermShapes},
    schema::{DimensionSchema, SchemaError},
};

pub(super) const DEFAULT_NUM_SOURCES: usize = 10;
pub(super) const DEFAULT_NUM_ROWS: usize = 225;
pub(super) const DEFAULT_NUM_TIMES: usize = 15;
pub(super) const DEFAULT_NUM_CHANS: usize = 16;

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref PRECISION_HELP: String =
        format!("The floating-point precision of all tensors. Supported values: {}. Default: {}", Precision::iter().join(", "), Precision::default());

    static ref BSQRT_SCHEMA_HELP: String =
        format!("The axis schema of the brightness square roots. Default: {DEFAULT_BSQRT_SCHEMA}");

    static ref COMPLEX_PHASE_SCHEMA_HELP: String =
        format!("The axis schema of the complex phases. Default: {DEFAULT_COMPLEX_PHASE_SCHEMA}");

    static ref FEED_ROTATION_SCHEMA_HELP: String =
        format!("The axis schema of the feed rotations. Default: {DEFAULT_FEED_ROTATION_SCHEMA}");

    static ref DDES_SCHEMA_HELP: String =
        format!("The axis schema of the direction-dependent effects. Default: {DEFAULT_DDES_SCHEMA}");

    static ref NUM_SOURCES_HELP: String =
        format!("The number of sources. Default: {DEFAULT_NUM_SOURCES}");

    static ref NUM_ROWS_HELP: String =
        format!("The number of rows (e.g. antenna-time pairs). Default: {DEFAULT_NUM_ROWS}");

    static ref NUM_TIMES_HELP: String =
        format!("The number of distinct times. Rows are spread evenly over them. Default: {DEFAULT_NUM_TIMES}");

    static ref NUM_CHANS_HELP: String =
        format!("The number of frequency channels. Default: {DEFAULT_NUM_CHANS}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// Read the arguments of `$sub_command` from `$arg_file`, a toml or json file
/// whose tables mirror the subcommand's argument groups.
macro_rules! unpack_arg_file {
    ($arg_file:expr, $sub_command:expr) => ({
        use std::{fs::read_to_string, str::FromStr};

        use crate::cli::{common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED}, AntennaJonesError};

        let arg_file = $arg_file;
        let sub_command: &str = $sub_command;
        debug!("Attempting to parse {sub_command} argument file {}", arg_file.display());

        let arg_file_type = arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok())
            .ok_or_else(|| {
                AntennaJonesError::ArgFile(format!(
                    "The {sub_command} argument file {} doesn't have a recognised file extension! Valid extensions are: {}",
                    arg_file.display(),
                    *ARG_FILE_TYPES_COMMA_SEPARATED
                ))
            })?;

        debug!("Parsing {arg_file_type} file...");
        let contents = read_to_string(&arg_file)?;
        let decoded = match arg_file_type {
            ArgFileTypes::Toml => toml::from_str(&contents).map_err(|e| e.to_string()),
            ArgFileTypes::Json => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        };
        decoded.map_err(|err| {
            AntennaJonesError::ArgFile(format!(
                "Couldn't decode {sub_command} arguments from {arg_file_type} file {}:\n{err}",
                arg_file.display()
            ))
        })?
    });
}

/// Which Jones terms are in the chain, and how their tensors are laid out.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct JonesTermArgs {
    /// Include brightness square roots in the chain.
    #[clap(long, help_heading = "JONES TERMS")]
    #[serde(default)]
    pub(super) bsqrt: bool,

    /// Include complex phases in the chain.
    #[clap(long, help_heading = "JONES TERMS")]
    #[serde(default)]
    pub(super) complex_phase: bool,

    /// Include feed rotations in the chain.
    #[clap(long, help_heading = "JONES TERMS")]
    #[serde(default)]
    pub(super) feed_rotation: bool,

    /// Include direction-dependent effects in the chain.
    #[clap(long, help_heading = "JONES TERMS")]
    #[serde(default)]
    pub(super) ddes: bool,

    #[clap(long, help = PRECISION_HELP.as_str(), help_heading = "JONES TERMS")]
    pub(super) precision: Option<String>,

    #[clap(long, help = BSQRT_SCHEMA_HELP.as_str(), help_heading = "SCHEMAS")]
    pub(super) bsqrt_schema: Option<String>,

    #[clap(long, help = COMPLEX_PHASE_SCHEMA_HELP.as_str(), help_heading = "SCHEMAS")]
    pub(super) complex_phase_schema: Option<String>,

    #[clap(long, help = FEED_ROTATION_SCHEMA_HELP.as_str(), help_heading = "SCHEMAS")]
    pub(super) feed_rotation_schema: Option<String>,

    #[clap(long, help = DDES_SCHEMA_HELP.as_str(), help_heading = "SCHEMAS")]
    pub(super) ddes_schema: Option<String>,

    /// Sizes of named dimensions, e.g. "source=10,chan=16". May be given
    /// more than once. These take precedence over the sizes given by other
    /// arguments, and may name axes that only appear in custom schemas.
    #[clap(
        long,
        multiple_occurrences(true),
        use_value_delimiter(true),
        require_value_delimiter(true),
        help_heading = "SCHEMAS"
    )]
    pub(super) dimensions: Option<Vec<String>>,
}

impl JonesTermArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            bsqrt: self.bsqrt || other.bsqrt,
            complex_phase: self.complex_phase || other.complex_phase,
            feed_rotation: self.feed_rotation || other.feed_rotation,
            ddes: self.ddes || other.ddes,
            precision: self.precision.or(other.precision),
            bsqrt_schema: self.bsqrt_schema.or(other.bsqrt_schema),
            complex_phase_schema: self.complex_phase_schema.or(other.complex_phase_schema),
            feed_rotation_schema: self.feed_rotation_schema.or(other.feed_rotation_schema),
            ddes_schema: self.ddes_schema.or(other.ddes_schema),
            dimensions: self.dimensions.or(other.dimensions),
        }
    }

    pub(super) fn parse(self) -> Result<JonesChainConfig, JonesTermArgsError> {
        let JonesTermArgs {
            bsqrt,
            complex_phase,
            feed_rotation,
            ddes,
            precision,
            bsqrt_schema,
            complex_phase_schema,
            feed_rotation_schema,
            ddes_schema,
            dimensions,
        } = self;

        let precision = match precision {
            Some(p) => Precision::from_str(&p.to_lowercase())
                .map_err(|_| JonesTermArgsError::InvalidPrecision(p))?,
            None => Precision::default(),
        };

        let dimensions = dimensions
            .unwrap_or_default()
            .into_iter()
            .map(|d| parse_dimension(&d))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let default = JonesChainConfig::default();
        Ok(JonesChainConfig {
            have_bsqrt: bsqrt,
            have_complex_phase: complex_phase,
            have_feed_rotation: feed_rotation,
            have_ddes: ddes,
            precision,
            bsqrt_schema: bsqrt_schema.unwrap_or(default.bsqrt_schema),
            complex_phase_schema: complex_phase_schema.unwrap_or(default.complex_phase_schema),
            feed_rotation_schema: feed_rotation_schema.unwrap_or(default.feed_rotation_schema),
            ddes_schema: ddes_schema.unwrap_or(default.ddes_schema),
            dimensions,
        })
    }
}

/// Parse a "name=size" dimension declaration.
fn parse_dimension(s: &str) -> Result<(String, usize), JonesTermArgsError> {
    let (name, size) = s
        .split_once('=')
        .ok_or_else(|| JonesTermArgsError::InvalidDimension(s.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(JonesTermArgsError::InvalidDimension(s.to_string()));
    }
    let size = size
        .trim()
        .parse()
        .map_err(|_| JonesTermArgsError::InvalidDimension(s.to_string()))?;
    Ok((name.to_string(), size))
}

#[derive(Error, Debug)]
pub(super) enum JonesTermArgsError {
    #[error("Unrecognised precision '{0}'; supported values are: single, double")]
    InvalidPrecision(String),

    #[error("Couldn't parse dimension declaration '{0}'; expected something like 'source=10'")]
    InvalidDimension(String),
}

/// The sizes of the tensors fed into a Jones chain.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SizeArgs {
    #[clap(short = 's', long, help = NUM_SOURCES_HELP.as_str(), help_heading = "SIZES")]
    pub(super) num_sources: Option<usize>,

    #[clap(short = 'r', long, help = NUM_ROWS_HELP.as_str(), help_heading = "SIZES")]
    pub(super) num_rows: Option<usize>,

    #[clap(short = 't', long, help = NUM_TIMES_HELP.as_str(), help_heading = "SIZES")]
    pub(super) num_times: Option<usize>,

    #[clap(short = 'c', long, help = NUM_CHANS_HELP.as_str(), help_heading = "SIZES")]
    pub(super) num_chans: Option<usize>,
}

impl SizeArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            num_sources: self.num_sources.or(other.num_sources),
            num_rows: self.num_rows.or(other.num_rows),
            num_times: self.num_times.or(other.num_times),
            num_chans: self.num_chans.or(other.num_chans),
        }
    }

    /// Work out the shape of every present term's tensor from its schema, and
    /// make a row-to-time index with rows spread evenly over the times. The
    /// sizes become declared dimensions of `config`, unless a size for the
    /// same name was already declared.
    pub(super) fn parse(self, mut config: JonesChainConfig) -> Result<ChainSetup, SizeArgsError> {
        let SizeArgs {
            num_sources,
            num_rows,
            num_times,
            num_chans,
        } = self;

        let mut declare = |name: &str, size: usize| -> usize {
            *config.dimensions.entry(name.to_string()).or_insert(size)
        };
        declare("source", num_sources.unwrap_or(DEFAULT_NUM_SOURCES));
        declare("chan", num_chans.unwrap_or(DEFAULT_NUM_CHANS));
        let num_rows = declare("row", num_rows.unwrap_or(DEFAULT_NUM_ROWS));
        let num_times = declare("time", num_times.unwrap_or(DEFAULT_NUM_TIMES));
        if i32::try_from(num_times).is_err() {
            return Err(SizeArgsError::TooManyTimes(num_times));
        }

        let mut term_shapes = Vec::with_capacity(JonesTermKind::ORDER.len());
        for kind in config.present_terms() {
            let schema = DimensionSchema::parse(config.schema(kind))?;
            let shape = schema
                .axes()
                .iter()
                .map(|axis| match config.dimensions.get(axis) {
                    Some(&size) => Ok(size),
                    // Matrices have 4 correlations unless declared otherwise.
                    None if axis == "corr" => Ok(NUM_CORR),
                    None => Err(SizeArgsError::UnknownAxis {
                        tensor: kind.to_string(),
                        axis: axis.clone(),
                    }),
                })
                .collect::<Result<Vec<usize>, _>>()?;
            debug!("{kind} {schema} has shape {shape:?}");
            term_shapes.push((kind, shape));
        }

        let row_to_time_index =
            Array1::from_shape_fn(num_rows, |i_row| (i_row * num_times / num_rows) as i32);

        Ok(ChainSetup {
            config,
            term_shapes,
            row_to_time_index,
        })
    }
}

#[derive(Error, Debug)]
pub(super) enum SizeArgsError {
    #[error("The schema of '{tensor}' has an axis '{axis}' with an unknown size; declare it with --dimensions {axis}=<size>")]
    UnknownAxis { tensor: String, axis: String },

    #[error("The number of times ({0}) is too large for a 32-bit time index")]
    TooManyTimes(usize),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Everything needed to describe a Jones chain, without any of its data.
#[derive(Debug, Clone)]
pub(super) struct ChainSetup {
    pub(super) config: JonesChainConfig,

    /// The shape of each present term's tensor, in the order the terms are
    /// applied.
    pub(super) term_shapes: Vec<(JonesTermKind, Vec<usize>)>,

    pub(super) row_to_time_index: Array1<i32>,
}

impl ChainSetup {
    pub(super) fn shapes(&self) -> TermShapes<'_> {
        let mut shapes = TermShapes {
            row_to_time_index: self.row_to_time_index.shape(),
            ..Default::default()
        };
        for (kind, shape) in &self.term_shapes {
            shapes.set_term(*kind, shape);
        }
        shapes
    }

    /// Print high-level information on this chain.
    pub(super) fn display(&self) {
        info!("{}", style("Jones chain").bold());
        let chain = if self.term_shapes.is_empty() {
            "none (identity)".to_string()
        } else {
            self.term_shapes.iter().map(|(kind, _)| kind).join(" -> ")
        };
        info!("├ Terms: {chain}");
        info!("├ Precision: {}", self.config.precision);
        for (kind, shape) in &self.term_shapes {
            info!("├ {kind} {}: {shape:?}", self.config.schema(*kind));
        }
        info!(
            "└ Dimensions: {}",
            self.config
                .dimensions
                .iter()
                .map(|(name, size)| format!("{name}={size}"))
                .join(", ")
        );
        info!("");
    }
}
