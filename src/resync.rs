/*!
 * Timing transforms applied to every cue of a document.
 *
 * `resync` is the general form: a caller-supplied function maps each cue's
 * `(start, end)` in milliseconds to new values. Results are rounded to the
 * nearest millisecond and rejected, never clamped, when they are negative,
 * non-finite or inverted. Cue order is left as is.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::TimingError;
use crate::subtitle_processor::{Cue, Document, Timestamp};

/// Divisor applied to every timestamp, validated on construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Rejects zero, negative and non-finite factors
    pub fn new(value: f64) -> Result<Self, TimingError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(TimingError::InvalidScaleFactor(value));
        }
        Ok(ScaleFactor(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_identity(&self) -> bool {
        self.0 == 1.0
    }
}

/// Fixes applied after rescaling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingAdjustments {
    /// Shift added to every timestamp
    #[serde(default)]
    pub offset_ms: i64,

    /// Longest allowed cue; longer cues are trimmed
    #[serde(default)]
    pub max_duration_ms: Option<u64>,

    /// End of the track; later timestamps are clamped to it
    #[serde(default)]
    pub end_time_ms: Option<u64>,
}

impl TimingAdjustments {
    pub fn is_noop(&self) -> bool {
        self.offset_ms == 0 && self.max_duration_ms.is_none() && self.end_time_ms.is_none()
    }
}

/// Apply `f` to the `(start, end)` of every cue
pub fn resync<F>(doc: Document, f: F) -> Result<Document, TimingError>
where
    F: Fn(f64, f64) -> (f64, f64),
{
    let Document { cues, format, header } = doc;

    let cues = cues
        .into_iter()
        .enumerate()
        .map(|(idx, cue)| {
            let (start, end) = f(cue.start.as_millis() as f64, cue.end.as_millis() as f64);

            let (Some(new_start), Some(new_end)) = (to_timestamp(start), to_timestamp(end)) else {
                return Err(TimingError::InvalidTimestamp { cue: idx + 1, start, end });
            };
            if new_start > new_end {
                return Err(TimingError::InvertedRange {
                    cue: idx + 1,
                    start_ms: new_start.as_millis(),
                    end_ms: new_end.as_millis(),
                });
            }

            Ok(Cue {
                start: new_start,
                end: new_end,
                ..cue
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Document { cues, format, header })
}

/// Divide every timestamp by `factor`
pub fn rescale(doc: Document, factor: ScaleFactor) -> Result<Document, TimingError> {
    if factor.is_identity() {
        return Ok(doc);
    }

    debug!("Rescaling {} cue(s) by 1/{}", doc.len(), factor.value());
    let k = factor.value();
    resync(doc, |start, end| (start / k, end / k))
}

/// Apply offset, duration cap and track end, in that order
pub fn apply_adjustments(doc: Document, adjustments: &TimingAdjustments) -> Result<Document, TimingError> {
    if adjustments.is_noop() {
        return Ok(doc);
    }

    let Document { cues, format, header } = doc;
    let mut trimmed = 0;

    let cues = cues
        .into_iter()
        .enumerate()
        .map(|(idx, mut cue)| {
            if adjustments.offset_ms != 0 {
                let offset = adjustments.offset_ms;
                let (Some(start), Some(end)) = (shift(cue.start, offset), shift(cue.end, offset)) else {
                    if offset < 0 {
                        return Err(TimingError::NegativeOffset { cue: idx + 1, offset_ms: offset });
                    }
                    return Err(TimingError::InvalidTimestamp {
                        cue: idx + 1,
                        start: cue.start.as_millis() as f64 + offset as f64,
                        end: cue.end.as_millis() as f64 + offset as f64,
                    });
                };
                cue.start = start;
                cue.end = end;
            }

            if let Some(max) = adjustments.max_duration_ms {
                if cue.duration_ms() > max {
                    cue.end = Timestamp::from_millis(cue.start.as_millis() + max);
                    trimmed += 1;
                }
            }

            if let Some(track_end) = adjustments.end_time_ms.map(Timestamp::from_millis) {
                cue.start = cue.start.min(track_end);
                cue.end = cue.end.min(track_end);
            }

            Ok(cue)
        })
        .collect::<Result<Vec<_>, TimingError>>()?;

    if trimmed > 0 {
        debug!("Trimmed {} cue(s) to the maximum duration", trimmed);
    }

    Ok(Document { cues, format, header })
}

/// Round to the nearest millisecond; `None` when negative, non-finite or
/// past [`Timestamp::MAX`]
fn to_timestamp(ms: f64) -> Option<Timestamp> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    let rounded = ms.round();
    // Timestamp::MAX as f64 rounds up to 2^63, the first value out of range
    if rounded >= Timestamp::MAX.as_millis() as f64 {
        return None;
    }
    Some(Timestamp::from_millis(rounded as u64))
}

fn shift(ts: Timestamp, offset_ms: i64) -> Option<Timestamp> {
    let shifted = i128::from(ts.as_millis()) + i128::from(offset_ms);
    u64::try_from(shifted)
        .ok()
        .filter(|ms| *ms <= Timestamp::MAX.as_millis())
        .map(Timestamp::from_millis)
}
