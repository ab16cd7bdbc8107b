//! # paleotag Core Library
//!
//! This library provides the core logic for labelling transient events in
//! paleoclimate time series. All operations are available through the
//! standalone `paleotag` CLI, which is a thin prompting and display layer
//! over this crate.
//!
//! ## Architecture
//!
//! - **Series**: validated time/value samples, unit conversion, and
//!   resampling onto a uniform axis
//! - **Shape**: the piecewise-linear fit engine and the stats-to-series
//!   reconstructor, which share one synthesis routine
//! - **Archive**: column-table records that series are read from and event
//!   labels plus stats records are written back to
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`resample`]: uniform-step linear resampling
//! - [`fit`]: breakpoints to idealized curve and [`EventStats`]
//! - [`reconstruct`]: [`EventStats`] back to an idealized curve
//! - [`ArchiveRecord`]: measurement table with embedded event columns
//! - [`Config`]: application configuration management

pub mod archive;
pub mod convert;
pub mod error;
pub mod series;
pub mod shape;
pub mod storage;

pub use archive::{event_labels, ArchiveRecord, EventEntry, JsonRecordStore, RecordStore};
pub use error::{ArchiveError, ConfigError, CoreError, ShapeError, ValidationError};
pub use series::{prepare, resample, TimeSeries, TimeUnit, UniformSeries};
pub use shape::{
    fit, integer_axis, reconstruct, AmplitudeMode, AmplitudeSource, Anchor, Breakpoint,
    BreakpointScheme, BreakpointSet, EventStats, Fit, IdealizedSeries, SegmentStats,
};
pub use storage::Config;
