//! Event-shape modeling.
//!
//! The fit engine turns a uniform series plus user breakpoints into an
//! [`IdealizedSeries`] and an [`EventStats`] record. The reconstructor runs
//! the same ramp-and-flatten synthesis from the stats record alone, so a
//! stored record plus one baseline value reproduces the fitted curve.

mod breakpoint;
mod fit;
mod idealized;
mod reconstruct;
mod stats;
mod synth;

pub use breakpoint::{AmplitudeMode, AmplitudeSource, Breakpoint, BreakpointScheme, BreakpointSet};
pub use fit::{fit, Fit};
pub use idealized::IdealizedSeries;
pub use reconstruct::{integer_axis, reconstruct, Anchor};
pub use stats::{EventStats, SegmentStats};
