//! Pure, synchronous report machinery: an indexed model over one generated
//! report, filter and aggregate passes over its rows, and the drill-down
//! selection.
//!
//! Nothing here talks to the network or mutates the report. Derivations are
//! recomputed from the canonical rows on every call, so filtered views and
//! summary figures can never drift out of sync with each other.

mod aggregate;
mod filter;
mod model;
mod selection;

pub use aggregate::{aggregate, Aggregates};
pub use filter::{filter_rows, RowFilter};
pub use model::ReportModel;
pub use selection::DetailSelector;
