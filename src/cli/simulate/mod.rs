// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Create antenna Jones matrices from synthetic Jones terms. This is useful to
//! check that a chain's schemas and sizes make sense, and to get an idea of
//! how long the chain takes to compute.


use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use clap::Parser;
use log::{debug, info, trace};
use ndarray::{prelude::*, IxDyn};
use num_complex::Complex;
use num_traits::Float;
use serde::{Deserialize, Serialize};

use super::common::{ChainSetup, JonesTermArgs, SizeArgs, ARG_FILE_HELP};
use crate::{
    cli::AntennaJonesError,
    constants::ANTENNA_JONES_SCHEMA,
    jones_chain::{create_antenna_jones, JonesChainInputs, JonesFloat, JonesTermKind, Precision},
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateCliArgs {
    /// The number of threads to use. The default is to use all available
    /// CPU cores.
    #[clap(short = 'j', long, help_heading = "SIMULATION")]
    pub(super) num_threads: Option<usize>,
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            num_threads: self.num_threads.or(other.num_threads),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
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

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,
}

/// The outcome of a simulation.
#[derive(Debug, Clone)]
pub(super) struct Simulation {
    pub(super) shape: Vec<usize>,
    pub(super) elapsed: Duration,

    /// The sum of the real and imaginary parts of every output element. This is
    /// computed serially so it doesn't depend on the number of threads.
    pub(super) checksum: f64,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    pub(super) fn merge(self) -> Result<SimulateArgs, AntennaJonesError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SimulateArgs {
                args_file: _,
                term_args,
                size_args,
                simulate_args,
            } = unpack_arg_file!(arg_file, "simulate");

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SimulateArgs {
                args_file: None,
                term_args: cli_args.term_args.merge(term_args),
                size_args: cli_args.size_args.merge(size_args),
                simulate_args: cli_args.simulate_args.merge(simulate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), AntennaJonesError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let SimulateArgs {
            args_file: _,
            term_args,
            size_args,
            simulate_args: SimulateCliArgs { num_threads },
        } = self;

        let setup = size_args.parse(term_args.parse()?)?;
        setup.display();

        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(num_threads) = num_threads {
            builder = builder.num_threads(num_threads);
        }
        let pool = builder.build()?;
        info!("Using {} threads", pool.current_num_threads());

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let Simulation {
            shape,
            elapsed,
            checksum,
        } = pool.install(|| match setup.config.precision {
            Precision::Single => simulate::<f32>(&setup),
            Precision::Double => simulate::<f64>(&setup),
        })?;
        info!("Created antenna Jones {ANTENNA_JONES_SCHEMA} {shape:?} in {elapsed:.3?}");
        info!("Checksum: {checksum:.10e}");

        Ok(())
    }
}

/// Fill every present term with synthetic data and chain them together on the
/// current rayon thread pool. Only the kernel itself is timed.
pub(super) fn simulate<F>(setup: &ChainSetup) -> Result<Simulation, AntennaJonesError>
where
    F: JonesFloat + From<f32>,
{
    let terms: Vec<(JonesTermKind, ArrayD<Complex<F>>)> = setup
        .term_shapes
        .iter()
        .map(|(kind, shape)| (*kind, synthetic_term(*kind, shape)))
        .collect();
    let mut inputs = JonesChainInputs::new(setup.row_to_time_index.view().into_dyn());
    for (kind, term) in &terms {
        inputs.set_term(*kind, term.view());
    }

    let start = Instant::now();
    let antenna_jones = create_antenna_jones(&setup.config, &inputs)?;
    let elapsed = start.elapsed();

    let checksum = antenna_jones.iter().fold(0.0, |acc, c| {
        acc + c.re.to_f64().unwrap_or(f64::NAN) + c.im.to_f64().unwrap_or(f64::NAN)
    });
    Ok(Simulation {
        shape: antenna_jones.shape().to_vec(),
        elapsed,
        checksum,
    })
}

/// Deterministic unit-magnitude values for a term's tensor. Different kinds of
/// terms get different values.
fn synthetic_term<F>(kind: JonesTermKind, shape: &[usize]) -> ArrayD<Complex<F>>
where
    F: Float + From<f32>,
{
    let seed = 1.0 + kind as u8 as f32;
    ArrayD::from_shape_fn(IxDyn(shape), |index| {
        let x = index
            .slice()
            .iter()
            .fold(seed, |acc, &i| acc * 1.3 + i as f32);
        let (s, c) = x.sin_cos();
        Complex::new(c.into(), s.into())
    })
}
