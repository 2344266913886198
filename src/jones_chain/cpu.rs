// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to create antenna Jones matrices on the CPU.

use itertools::Itertools;
use log::debug;
use marlu::Jones;
use ndarray::{parallel::prelude::*, prelude::*};
use num_complex::Complex;
use num_traits::{Float, Zero};

use super::{
    shape::{plan, ChainPlan},
    JonesChainConfig, JonesChainError, JonesChainInputs, JonesFloat, JonesTermKind,
};

/// A present Jones term, with its tensor in canonical axis order.
enum TermView<'a, F> {
    BrightnessSqrt {
        bsqrt: ArrayView4<'a, Complex<F>>,
        /// The (validated) time index of each row.
        row_times: Vec<usize>,
    },
    ComplexPhase(ArrayView3<'a, Complex<F>>),
    FeedRotation(ArrayView2<'a, Complex<F>>),
    Ddes(ArrayView4<'a, Complex<F>>),
}

/// The value of a single term for a single (source, row, channel).
enum TermValue<F: Float> {
    /// A scalar times the identity.
    Scalar(Complex<F>),
    Matrix(Jones<F>),
}

impl<'a, F: Float> TermView<'a, F> {
    fn new(
        kind: JonesTermKind,
        term: ArrayViewD<'a, Complex<F>>,
        row_to_time_index: ArrayView1<i32>,
    ) -> Result<TermView<'a, F>, JonesChainError> {
        let view = match kind {
            JonesTermKind::BrightnessSqrt => {
                let bsqrt: ArrayView4<_> = term.into_dimensionality()?;
                let row_times = get_row_times(row_to_time_index, bsqrt.len_of(Axis(1)))?;
                TermView::BrightnessSqrt { bsqrt, row_times }
            }
            JonesTermKind::ComplexPhase => TermView::ComplexPhase(term.into_dimensionality()?),
            JonesTermKind::FeedRotation => TermView::FeedRotation(term.into_dimensionality()?),
            JonesTermKind::Ddes => TermView::Ddes(term.into_dimensionality()?),
        };
        Ok(view)
    }

    #[inline]
    fn value(&self, i_src: usize, i_row: usize, i_chan: usize) -> TermValue<F> {
        match self {
            TermView::BrightnessSqrt { bsqrt, row_times } => {
                let i_time = row_times[i_row];
                TermValue::Matrix(Jones::from([
                    bsqrt[(i_src, i_time, i_chan, 0)],
                    bsqrt[(i_src, i_time, i_chan, 1)],
                    bsqrt[(i_src, i_time, i_chan, 2)],
                    bsqrt[(i_src, i_time, i_chan, 3)],
                ]))
            }

            TermView::ComplexPhase(complex_phase) => {
                TermValue::Scalar(complex_phase[(i_src, i_row, i_chan)])
            }

            TermView::FeedRotation(feed_rotation) => TermValue::Matrix(Jones::from([
                feed_rotation[(i_row, 0)],
                feed_rotation[(i_row, 1)],
                feed_rotation[(i_row, 2)],
                feed_rotation[(i_row, 3)],
            ])),

            TermView::Ddes(ddes) => TermValue::Matrix(Jones::from([
                ddes[(i_src, i_row, i_chan, 0)],
                ddes[(i_src, i_row, i_chan, 1)],
                ddes[(i_src, i_row, i_chan, 2)],
                ddes[(i_src, i_row, i_chan, 3)],
            ])),
        }
    }
}

impl<F: Float> TermValue<F> {
    /// Apply this term to the accumulated Jones matrix; the term is multiplied
    /// on the left. If nothing has been accumulated yet, this term becomes the
    /// accumulator.
    #[inline]
    fn chain(self, accum: Option<Jones<F>>) -> Jones<F> {
        match (self, accum) {
            (TermValue::Scalar(s), None) => {
                let z = Complex::zero();
                Jones::from([s, z, z, s])
            }
            (TermValue::Scalar(s), Some(a)) => a * s,
            (TermValue::Matrix(m), None) => m,
            (TermValue::Matrix(m), Some(a)) => m * a,
        }
    }
}

/// Check that every row's time index can be used on a tensor with `num_times`
/// times, and convert them to array indices.
fn get_row_times(
    row_to_time_index: ArrayView1<i32>,
    num_times: usize,
) -> Result<Vec<usize>, JonesChainError> {
    row_to_time_index
        .iter()
        .enumerate()
        .map(|(row, &time)| {
            usize::try_from(time)
                .ok()
                .filter(|&t| t < num_times)
                .ok_or(JonesChainError::InvalidTimeIndex {
                    row,
                    time,
                    num_times,
                })
        })
        .collect()
}

/// Chain together the present terms for a single (source, row, channel). If no
/// terms are present, the identity is returned.
#[inline]
fn chain_terms<F: Float>(
    terms: &[TermView<F>],
    i_src: usize,
    i_row: usize,
    i_chan: usize,
) -> Jones<F> {
    terms
        .iter()
        .fold(None, |accum, term| {
            Some(term.value(i_src, i_row, i_chan).chain(accum))
        })
        .unwrap_or_else(Jones::identity)
}

/// Create antenna Jones matrices by chaining together all present Jones terms
/// for each (source, row, channel). The returned array has the shape
/// `(source, row, chan, 4)`; the last axis is a row-major 2x2 matrix.
///
/// All inputs are validated before any work is done; if this function returns
/// an error, no antenna Jones matrices were computed. The work is spread over
/// the current rayon thread pool.
///
/// # Errors
///
/// This function will return an error if the input tensors don't match their
/// schemas or each other, if a needed dimension can't be resolved, if the
/// number of correlations isn't 4, if `F` isn't the configured precision, or
/// if a row maps to a time that the
/// brightness square root doesn't have.
pub fn create_antenna_jones<F>(
    config: &JonesChainConfig,
    inputs: &JonesChainInputs<F>,
) -> Result<Array4<Complex<F>>, JonesChainError>
where
    F: JonesFloat,
{
    if config.precision != F::PRECISION {
        return Err(JonesChainError::PrecisionMismatch {
            configured: config.precision,
            used: F::PRECISION,
        });
    }

    let plan = plan(config, &inputs.shapes())?;
    let terms = get_term_views(&plan, inputs)?;
    debug!(
        "Chaining Jones terms [{}] over {} sources, {} rows and {} channels",
        plan.terms.iter().map(|(kind, _)| kind).join(" -> "),
        plan.num_sources,
        plan.num_rows,
        plan.num_chans
    );

    let mut antenna_jones = Array4::zeros(plan.output_shape());
    antenna_jones
        .outer_iter_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(i_src, mut antenna_jones_rfc)| {
            antenna_jones_rfc
                .outer_iter_mut()
                .into_par_iter()
                .enumerate()
                .for_each(|(i_row, mut antenna_jones_fc)| {
                    // Channels are done serially.
                    antenna_jones_fc
                        .outer_iter_mut()
                        .enumerate()
                        .for_each(|(i_chan, mut antenna_jones_c)| {
                            let j = chain_terms(&terms, i_src, i_row, i_chan);
                            antenna_jones_c[0] = j[0];
                            antenna_jones_c[1] = j[1];
                            antenna_jones_c[2] = j[2];
                            antenna_jones_c[3] = j[3];
                        });
                });
        });

    Ok(antenna_jones)
}

fn get_term_views<'a, F: Float>(
    plan: &ChainPlan,
    inputs: &JonesChainInputs<'a, F>,
) -> Result<Vec<TermView<'a, F>>, JonesChainError> {
    let row_to_time_index: ArrayView1<i32> =
        inputs.row_to_time_index.view().into_dimensionality()?;
    plan.terms
        .iter()
        .map(|(kind, permutation)| {
            let term = inputs.term(*kind).clone().permuted_axes(permutation.as_slice());
            TermView::new(*kind, term, row_to_time_index.view())
        })
        .collect()
}
