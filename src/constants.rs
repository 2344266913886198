// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The number of correlations in a single Jones matrix (a 2x2 matrix flattened
/// in row-major order).
pub const NUM_CORR: usize = 4;

/// The default axis schema of brightness square-root tensors.
pub const DEFAULT_BSQRT_SCHEMA: &str = "(source,time,chan,corr)";

/// The default axis schema of complex phase tensors.
pub const DEFAULT_COMPLEX_PHASE_SCHEMA: &str = "(source,row,chan)";

/// The default axis schema of feed rotation tensors.
pub const DEFAULT_FEED_ROTATION_SCHEMA: &str = "(row,corr)";

/// The default axis schema of direction-dependent effects tensors.
pub const DEFAULT_DDES_SCHEMA: &str = "(source,row,chan,corr)";

/// The axis schema of the row-to-time index. Unlike the Jones terms, this is
/// not configurable.
pub const ROW_TO_TIME_INDEX_SCHEMA: &str = "(row)";

/// The axis schema of the output antenna Jones tensor.
pub const ANTENNA_JONES_SCHEMA: &str = "(source,row,chan,corr)";

/// The name blamed for dimension sizes that were declared directly, rather
/// than inferred from a tensor.
pub const DECLARED_DIMENSIONS: &str = "dimensions";
