//! The persisted, series-independent summary of an idealized fit.
//!
//! Field names are a stable contract with stored records:
//! `event_start`, `event_end`, and `<name>_dur` / `<name>_amp` for every
//! named breakpoint. Durations count axis steps; amplitudes are relative to
//! the series value at `event_start`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::ValidationError;

const DUR_SUFFIX: &str = "_dur";
const AMP_SUFFIX: &str = "_amp";
/// Longest segment a record may carry, in axis steps.
const MAX_DUR: f64 = u32::MAX as f64;

/// Duration and amplitude for one named segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub name: String,
    pub dur: u64,
    pub amp: f64,
}

/// Stats record for one realization of an event.
///
/// Serializes to a flat JSON object in breakpoint order; deserializing
/// recovers the breakpoint order from key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Map<String, Value>", try_from = "Map<String, Value>")]
pub struct EventStats {
    pub event_start: f64,
    pub event_end: f64,
    pub segments: Vec<SegmentStats>,
}

impl EventStats {
    pub fn segment(&self, name: &str) -> Option<&SegmentStats> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn dur(&self, name: &str) -> Option<u64> {
        self.segment(name).map(|s| s.dur)
    }

    pub fn amp(&self, name: &str) -> Option<f64> {
        self.segment(name).map(|s| s.amp)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.name.as_str())
    }

    /// Total number of axis steps covered by present segments.
    pub fn total_dur(&self) -> u64 {
        self.segments.iter().map(|s| s.dur).sum()
    }

    /// Flat `field -> number` record.
    pub fn to_record(&self) -> Map<String, Value> {
        self.clone().into()
    }

    /// Parse a flat record.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MalformedStats`] if `event_start`/`event_end` are
    /// missing, a `_dur` has no matching `_amp` (or the reverse), a duration
    /// is negative or fractional, or an unknown key is present.
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut event_start = None;
        let mut event_end = None;
        let mut order: Vec<String> = Vec::new();
        let mut durs: Vec<Option<u64>> = Vec::new();
        let mut amps: Vec<Option<f64>> = Vec::new();

        for (key, value) in record {
            let number = value.as_f64().ok_or_else(|| {
                ValidationError::MalformedStats(format!("'{key}' is not a number: {value}"))
            })?;

            if key == "event_start" {
                event_start = Some(number);
                continue;
            }
            if key == "event_end" {
                event_end = Some(number);
                continue;
            }

            let (name, is_dur) = if let Some(name) = key.strip_suffix(DUR_SUFFIX) {
                (name, true)
            } else if let Some(name) = key.strip_suffix(AMP_SUFFIX) {
                (name, false)
            } else {
                return Err(ValidationError::MalformedStats(format!("unexpected key '{key}'")));
            };

            let slot = match order.iter().position(|n| n == name) {
                Some(i) => i,
                None => {
                    order.push(name.to_string());
                    durs.push(None);
                    amps.push(None);
                    order.len() - 1
                }
            };

            if is_dur {
                if number < 0.0 || number.fract() != 0.0 || number > MAX_DUR {
                    return Err(ValidationError::MalformedStats(format!(
                        "'{key}' must be a whole number of steps in 0..={MAX_DUR}, got {number}"
                    )));
                }
                durs[slot] = Some(number as u64);
            } else {
                amps[slot] = Some(number);
            }
        }

        let event_start = event_start
            .ok_or_else(|| ValidationError::MalformedStats("missing 'event_start'".into()))?;
        let event_end =
            event_end.ok_or_else(|| ValidationError::MalformedStats("missing 'event_end'".into()))?;

        let segments = order
            .into_iter()
            .zip(durs.into_iter().zip(amps))
            .map(|(name, pair)| match pair {
                (Some(dur), Some(amp)) => Ok(SegmentStats { name, dur, amp }),
                (None, _) => Err(ValidationError::MalformedStats(format!("missing '{name}_dur'"))),
                (_, None) => Err(ValidationError::MalformedStats(format!("missing '{name}_amp'"))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            event_start,
            event_end,
            segments,
        })
    }
}

impl From<EventStats> for Map<String, Value> {
    fn from(stats: EventStats) -> Self {
        let mut map = Map::new();
        map.insert("event_start".into(), float(stats.event_start));
        for seg in stats.segments {
            map.insert(format!("{}{DUR_SUFFIX}", seg.name), Value::from(seg.dur));
            map.insert(format!("{}{AMP_SUFFIX}", seg.name), float(seg.amp));
        }
        map.insert("event_end".into(), float(stats.event_end));
        map
    }
}

impl TryFrom<Map<String, Value>> for EventStats {
    type Error = ValidationError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_record(&map)
    }
}

// Non-finite values cannot occur in a fitted record; null keeps the map total.
fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
