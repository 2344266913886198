// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to create antenna Jones matrices by chaining together optional Jones
//! terms.
//!
//! Each term has a role ([`JonesTermKind`]). Terms are visited in a fixed
//! order; the first present term initialises an accumulator and every later
//! term is left-multiplied onto it. If a Jones chain contained all terms, the
//! result for each (source, row, channel) would be
//!
//! `E * F * (K * B)`
//!
//! where `B` is the brightness square root, `K` is the complex phase (a scalar
//! times the identity), `F` is the feed rotation and `E` are the
//! direction-dependent effects.

mod cpu;
mod error;
mod shape;

pub use cpu::create_antenna_jones;
pub use error::JonesChainError;
pub use shape::{infer_antenna_jones_shape, TermShapes};

use std::collections::BTreeMap;

use ndarray::{ArrayView1, ArrayViewD};
use num_complex::Complex;
use num_traits::Float;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::*;

/// The role of a Jones term in the chain. The declaration order of the
/// variants is the order in which terms are applied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JonesTermKind {
    /// The brightness matrix square root. 2x2 matrices, indexed by time rather
    /// than row.
    #[strum(to_string = "bsqrt")]
    #[serde(rename = "bsqrt")]
    BrightnessSqrt,

    /// A complex scalar per (source, row, channel), acting as a scaled
    /// identity matrix.
    #[strum(to_string = "complex_phase")]
    ComplexPhase,

    /// 2x2 matrices per row, constant across sources and channels.
    #[strum(to_string = "feed_rotation")]
    FeedRotation,

    /// Direction-dependent effects (e.g. beam responses); 2x2 matrices per
    /// (source, row, channel).
    #[strum(to_string = "ddes")]
    Ddes,
}

impl JonesTermKind {
    /// All of the kinds in the order they're applied.
    pub const ORDER: [JonesTermKind; 4] = [
        JonesTermKind::BrightnessSqrt,
        JonesTermKind::ComplexPhase,
        JonesTermKind::FeedRotation,
        JonesTermKind::Ddes,
    ];

    /// The axes of this kind of term, in the order used by the kernel.
    pub fn canonical_axes(self) -> &'static [&'static str] {
        match self {
            JonesTermKind::BrightnessSqrt => &["source", "time", "chan", "corr"],
            JonesTermKind::ComplexPhase => &["source", "row", "chan"],
            JonesTermKind::FeedRotation => &["row", "corr"],
            JonesTermKind::Ddes => &["source", "row", "chan", "corr"],
        }
    }

    pub fn default_schema(self) -> &'static str {
        match self {
            JonesTermKind::BrightnessSqrt => DEFAULT_BSQRT_SCHEMA,
            JonesTermKind::ComplexPhase => DEFAULT_COMPLEX_PHASE_SCHEMA,
            JonesTermKind::FeedRotation => DEFAULT_FEED_ROTATION_SCHEMA,
            JonesTermKind::Ddes => DEFAULT_DDES_SCHEMA,
        }
    }

    /// Does this term hold full 2x2 matrices (i.e. does it have a "corr"
    /// axis)?
    pub fn is_matrix(self) -> bool {
        !matches!(self, JonesTermKind::ComplexPhase)
    }
}

/// The floating-point precision used for all terms and the output.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Precision {
    /// `f32`, i.e. `Complex<f32>` elements.
    Single,

    /// `f64`, i.e. `Complex<f64>` elements.
    #[default]
    Double,
}

/// The float types that Jones chains can be computed with.
pub trait JonesFloat: Float + Send + Sync {
    /// The [`Precision`] that this float type corresponds to.
    const PRECISION: Precision;
}

impl JonesFloat for f32 {
    const PRECISION: Precision = Precision::Single;
}

impl JonesFloat for f64 {
    const PRECISION: Precision = Precision::Double;
}

/// Which Jones terms are present, how each term's axes are laid out, and any
/// dimension sizes that are known up front.
///
/// Presence can't be inferred from a term's tensor; a present term with zero
/// elements is still present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct JonesChainConfig {
    pub have_bsqrt: bool,
    pub have_complex_phase: bool,
    pub have_feed_rotation: bool,
    pub have_ddes: bool,

    pub precision: Precision,

    pub bsqrt_schema: String,
    pub complex_phase_schema: String,
    pub feed_rotation_schema: String,
    pub ddes_schema: String,

    /// Sizes of named dimensions declared by the caller. These are needed when
    /// no present term has an axis that the output needs, e.g. "source" when
    /// only feed rotations are present.
    pub dimensions: BTreeMap<String, usize>,
}

impl Default for JonesChainConfig {
    fn default() -> Self {
        Self {
            have_bsqrt: false,
            have_complex_phase: false,
            have_feed_rotation: false,
            have_ddes: false,
            precision: Precision::default(),
            bsqrt_schema: DEFAULT_BSQRT_SCHEMA.to_string(),
            complex_phase_schema: DEFAULT_COMPLEX_PHASE_SCHEMA.to_string(),
            feed_rotation_schema: DEFAULT_FEED_ROTATION_SCHEMA.to_string(),
            ddes_schema: DEFAULT_DDES_SCHEMA.to_string(),
            dimensions: BTreeMap::new(),
        }
    }
}

impl JonesChainConfig {
    /// A config with only the specified terms present and everything else
    /// defaulted.
    pub fn with_terms(terms: &[JonesTermKind]) -> JonesChainConfig {
        let mut config = JonesChainConfig::default();
        for &kind in terms {
            config.set_present(kind, true);
        }
        config
    }

    pub fn is_present(&self, kind: JonesTermKind) -> bool {
        match kind {
            JonesTermKind::BrightnessSqrt => self.have_bsqrt,
            JonesTermKind::ComplexPhase => self.have_complex_phase,
            JonesTermKind::FeedRotation => self.have_feed_rotation,
            JonesTermKind::Ddes => self.have_ddes,
        }
    }

    pub fn set_present(&mut self, kind: JonesTermKind, present: bool) {
        match kind {
            JonesTermKind::BrightnessSqrt => self.have_bsqrt = present,
            JonesTermKind::ComplexPhase => self.have_complex_phase = present,
            JonesTermKind::FeedRotation => self.have_feed_rotation = present,
            JonesTermKind::Ddes => self.have_ddes = present,
        }
    }

    pub fn schema(&self, kind: JonesTermKind) -> &str {
        match kind {
            JonesTermKind::BrightnessSqrt => &self.bsqrt_schema,
            JonesTermKind::ComplexPhase => &self.complex_phase_schema,
            JonesTermKind::FeedRotation => &self.feed_rotation_schema,
            JonesTermKind::Ddes => &self.ddes_schema,
        }
    }

    /// The present terms, in the order they're applied.
    pub fn present_terms(&self) -> impl Iterator<Item = JonesTermKind> + '_ {
        JonesTermKind::ORDER
            .into_iter()
            .filter(|&kind| self.is_present(kind))
    }
}

/// The tensors fed into [`create_antenna_jones`]. Every term must be supplied,
/// but only terms flagged as present in the [`JonesChainConfig`] are looked at;
/// [`JonesChainInputs::new`] fills every term with an empty tensor.
#[derive(Debug, Clone)]
pub struct JonesChainInputs<'a, F> {
    pub bsqrt: ArrayViewD<'a, Complex<F>>,
    pub complex_phase: ArrayViewD<'a, Complex<F>>,
    pub feed_rotation: ArrayViewD<'a, Complex<F>>,
    pub ddes: ArrayViewD<'a, Complex<F>>,

    /// The time index of each row. Rows are grouped irregularly by time.
    pub row_to_time_index: ArrayViewD<'a, i32>,
}

impl<'a, F> JonesChainInputs<'a, F> {
    pub fn new(row_to_time_index: ArrayViewD<'a, i32>) -> JonesChainInputs<'a, F> {
        JonesChainInputs {
            bsqrt: empty_view(),
            complex_phase: empty_view(),
            feed_rotation: empty_view(),
            ddes: empty_view(),
            row_to_time_index,
        }
    }

    pub fn term(&self, kind: JonesTermKind) -> &ArrayViewD<'a, Complex<F>> {
        match kind {
            JonesTermKind::BrightnessSqrt => &self.bsqrt,
            JonesTermKind::ComplexPhase => &self.complex_phase,
            JonesTermKind::FeedRotation => &self.feed_rotation,
            JonesTermKind::Ddes => &self.ddes,
        }
    }

    pub fn set_term(&mut self, kind: JonesTermKind, term: ArrayViewD<'a, Complex<F>>) {
        match kind {
            JonesTermKind::BrightnessSqrt => self.bsqrt = term,
            JonesTermKind::ComplexPhase => self.complex_phase = term,
            JonesTermKind::FeedRotation => self.feed_rotation = term,
            JonesTermKind::Ddes => self.ddes = term,
        }
    }

    /// The shapes of all of the tensors, for dimension resolution.
    pub fn shapes(&self) -> TermShapes<'_> {
        TermShapes {
            bsqrt: self.bsqrt.shape(),
            complex_phase: self.complex_phase.shape(),
            feed_rotation: self.feed_rotation.shape(),
            ddes: self.ddes.shape(),
            row_to_time_index: self.row_to_time_index.shape(),
        }
    }
}

fn empty_view<'a, T>() -> ArrayViewD<'a, T> {
    let empty: &'a [T] = &[];
    ArrayView1::from(empty).into_dyn()
}
