//! Breakpoints: the user's control points for an idealized event shape.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Where a breakpoint's target amplitude comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "value")]
pub enum AmplitudeSource {
    /// Target value supplied by the user.
    Explicit(f64),
    /// Target value read from the series at the breakpoint time.
    SeriesLookup,
}

/// A named segment boundary.
///
/// A breakpoint without a time marks a segment that is not present: it
/// contributes `dur = 0, amp = 0` and does not move the fit pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub name: String,
    pub time: Option<f64>,
    pub amplitude: AmplitudeSource,
}

impl Breakpoint {
    /// Breakpoint with a user-supplied target amplitude.
    pub fn explicit(name: impl Into<String>, time: f64, amplitude: f64) -> Self {
        Self {
            name: name.into(),
            time: Some(time),
            amplitude: AmplitudeSource::Explicit(amplitude),
        }
    }

    /// Breakpoint whose amplitude is the series value at `time`.
    pub fn lookup(name: impl Into<String>, time: f64) -> Self {
        Self {
            name: name.into(),
            time: Some(time),
            amplitude: AmplitudeSource::SeriesLookup,
        }
    }

    /// A segment that is not present.
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: None,
            amplitude: AmplitudeSource::SeriesLookup,
        }
    }

    /// Explicit-amplitude breakpoint from optional inputs.
    ///
    /// Time and amplitude must be given together or not at all.
    pub fn from_pair(
        name: impl Into<String>,
        time: Option<f64>,
        amplitude: Option<f64>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        match (time, amplitude) {
            (Some(t), Some(a)) => Ok(Self::explicit(name, t, a)),
            (None, None) => Ok(Self::skipped(name)),
            (Some(_), None) => Err(ValidationError::IncompleteBreakpoint {
                name,
                present: "a time".into(),
                missing: "amplitude".into(),
            }),
            (None, Some(_)) => Err(ValidationError::IncompleteBreakpoint {
                name,
                present: "an amplitude".into(),
                missing: "time".into(),
            }),
        }
    }

    pub fn is_present(&self) -> bool {
        self.time.is_some()
    }
}

/// Named breakpoint layouts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakpointScheme {
    /// `beginning`, `middle`, `end`: the explicit-amplitude layout.
    Staged,
    /// `first`, `second`, `third`: the timing-only layout.
    Spline,
    Custom(Vec<String>),
}

impl BreakpointScheme {
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Staged => ["beginning", "middle", "end"].map(String::from).to_vec(),
            Self::Spline => ["first", "second", "third"].map(String::from).to_vec(),
            Self::Custom(names) => names.clone(),
        }
    }

    /// Amplitude style the scheme was designed around.
    pub fn default_amplitude(&self) -> AmplitudeMode {
        match self {
            Self::Staged => AmplitudeMode::Explicit,
            Self::Spline | Self::Custom(_) => AmplitudeMode::Series,
        }
    }
}

impl FromStr for BreakpointScheme {
    type Err = ValidationError;

    /// `staged`, `spline`, or a comma-separated list of custom names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "staged" => Ok(Self::Staged),
            "spline" => Ok(Self::Spline),
            other => {
                let names: Vec<String> = other
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(String::from)
                    .collect();
                if names.is_empty() {
                    return Err(ValidationError::InvalidValue {
                        field: "scheme".into(),
                        message: format!("'{s}' names no breakpoints"),
                    });
                }
                Ok(Self::Custom(names))
            }
        }
    }
}

impl fmt::Display for BreakpointScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staged => f.write_str("staged"),
            Self::Spline => f.write_str("spline"),
            Self::Custom(names) => f.write_str(&names.join(",")),
        }
    }
}

/// Amplitude style selected for a whole fit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplitudeMode {
    Explicit,
    Series,
}

impl FromStr for AmplitudeMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "explicit" => Ok(Self::Explicit),
            "series" | "lookup" => Ok(Self::Series),
            _ => Err(ValidationError::InvalidValue {
                field: "amplitude".into(),
                message: format!("expected 'explicit' or 'series', got '{s}'"),
            }),
        }
    }
}

impl fmt::Display for AmplitudeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Series => f.write_str("series"),
        }
    }
}

/// Event start plus the ordered named breakpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakpointSet {
    pub event_start: f64,
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointSet {
    /// # Errors
    ///
    /// Rejects a non-finite start or breakpoint time, and duplicate names.
    pub fn new(event_start: f64, breakpoints: Vec<Breakpoint>) -> Result<Self, ValidationError> {
        if !event_start.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "event_start".into(),
                message: format!("{event_start} is not a finite time"),
            });
        }
        let mut seen = HashSet::new();
        for bp in &breakpoints {
            if !seen.insert(bp.name.as_str()) {
                return Err(ValidationError::DuplicateBreakpoint(bp.name.clone()));
            }
            if let Some(t) = bp.time.filter(|t| !t.is_finite()) {
                return Err(ValidationError::InvalidValue {
                    field: bp.name.clone(),
                    message: format!("{t} is not a finite time"),
                });
            }
            if let AmplitudeSource::Explicit(a) = bp.amplitude {
                if !a.is_finite() {
                    return Err(ValidationError::InvalidValue {
                        field: bp.name.clone(),
                        message: format!("{a} is not a finite amplitude"),
                    });
                }
            }
        }
        Ok(Self {
            event_start,
            breakpoints,
        })
    }

    /// Timing-only set over a scheme: each name gets an optional time, amplitude from the series.
    pub fn from_timings(
        event_start: f64,
        scheme: &BreakpointScheme,
        timings: &[Option<f64>],
    ) -> Result<Self, ValidationError> {
        let names = scheme.names();
        if timings.len() != names.len() {
            return Err(ValidationError::InvalidValue {
                field: "timings".into(),
                message: format!(
                    "scheme '{scheme}' has {} breakpoints but {} timings were given",
                    names.len(),
                    timings.len()
                ),
            });
        }
        let breakpoints = names
            .into_iter()
            .zip(timings)
            .map(|(name, t)| match t {
                Some(t) => Breakpoint::lookup(name, *t),
                None => Breakpoint::skipped(name),
            })
            .collect();
        Self::new(event_start, breakpoints)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}
