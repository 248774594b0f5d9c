
use crate::interval::Interval;
use dwell_common::{Amplitude, DwellTime};

/// Builds a record from `(milliseconds, amplitude)` pairs.
pub(super) fn record_ms(pairs: &[(DwellTime, Amplitude)]) -> Vec<Interval> {
    pairs
        .iter()
        .map(|&(duration, amplitude)| Interval::new(duration / 1000.0, amplitude))
        .collect()
}
