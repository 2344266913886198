// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Infer the shape of an antenna Jones tensor from the shapes of its inputs.

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{ChainSetup, JonesTermArgs, SizeArgs, ARG_FILE_HELP};
use crate::{
    cli::AntennaJonesError, constants::ANTENNA_JONES_SCHEMA,
    jones_chain::infer_antenna_jones_shape,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ShapeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "terms")]
    #[serde(default)]
    pub(super) term_args: JonesTermArgs,

    #[clap(flatten)]
    #[serde(rename = "sizes")]
    #[serde(default)]
    pub(super) size_args: SizeArgs,
}

impl ShapeArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    pub(super) fn merge(self) -> Result<ShapeArgs, AntennaJonesError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let ShapeArgs {
                args_file: _,
                term_args,
                size_args,
            } = unpack_arg_file!(arg_file, "shape");

            // Merge all the arguments, preferring the CLI args when available.
            Ok(ShapeArgs {
                args_file: None,
                term_args: cli_args.term_args.merge(term_args),
                size_args: cli_args.size_args.merge(size_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<ChainSetup, AntennaJonesError> {
        let ShapeArgs {
            args_file: _,
            term_args,
            size_args,
        } = self;

        let config = term_args.parse()?;
        Ok(size_args.parse(config)?)
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), AntennaJonesError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let setup = self.parse()?;
        setup.display();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let shape = infer_antenna_jones_shape(&setup.config, &setup.shapes())?;
        info!("Antenna Jones shape {ANTENNA_JONES_SCHEMA}: {shape:?}");
        Ok(())
    }
}
