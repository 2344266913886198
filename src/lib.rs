// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Antenna Jones matrices for radio-interferometric visibility simulation.

Per-source, per-row, per-channel 2x2 Jones matrices are made by chaining
together optional Jones terms (brightness square roots, complex phases, feed
rotations and direction-dependent effects). The tensors supplied for each term
are described by named-axis schemas, and the sizes of all named dimensions are
resolved and checked for consistency before anything is computed.
 */

mod cli;
pub mod constants;
pub mod jones_chain;
pub mod schema;

// Re-exports.
pub use cli::{AntennaJones, AntennaJonesError};
pub use jones_chain::{
    create_antenna_jones, infer_antenna_jones_shape, JonesChainConfig, JonesChainError,
    JonesChainInputs, JonesFloat, JonesTermKind, Precision, TermShapes,
};
pub use schema::{resolve_dimensions, DimensionSchema, NamedDimensionMap, SchemaError, SchemaInput};

// External re-exports.
pub use marlu::{c32, c64, Jones};
