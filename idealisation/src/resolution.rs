//! Imposes a fixed temporal resolution (dead time) on a raw record.
//!
//! Intervals shorter than the resolution cannot be timed reliably, so they are
//! concatenated onto the group which precedes them. A group ends when a
//! resolvable interval of a different kind (shut after open, open after shut,
//! or an opening at a different amplitude level) is met.
use crate::{
    error::{IdealisationError, IdealisationResult},
    interval::{Interval, QualityFlag, UNTERMINATED_DURATION},
};
use dwell_common::{Amplitude, DwellTime, metrics::names::INTERVALS_DISCARDED};
use itertools::Itertools;
use metrics::counter;
use tracing::{trace, warn};

/// Two resolvable openings whose amplitudes differ by no more than this are one level.
pub const AMPLITUDE_TOLERANCE: Amplitude = 1e-5;

/// The idealised record produced by [ResolutionImposer::impose].
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Resolution {
    pub tres: DwellTime,
    pub intervals: Vec<Interval>,
    /// Number of raw intervals before the first reliable resolvable interval.
    pub discarded: usize,
}

impl Resolution {
    /// Sum of resolved durations, leaving out an unterminated trailing opening.
    pub fn total_duration(&self) -> DwellTime {
        self.intervals
            .iter()
            .filter(|interval| !interval.is_unterminated())
            .map(|interval| interval.duration)
            .sum()
    }
}

/// Running state of the concatenated group currently being built.
#[derive(Default, Debug, Clone)]
struct Group {
    duration: DwellTime,
    weighted_amplitude: Amplitude,
    open_time: DwellTime,
    is_open: bool,
    quality: QualityFlag,
}

impl Group {
    fn seed(interval: &Interval) -> Self {
        let is_open = interval.is_open();
        Self {
            duration: interval.duration,
            weighted_amplitude: if is_open {
                interval.amplitude * interval.duration
            } else {
                0.0
            },
            open_time: if is_open { interval.duration } else { 0.0 },
            is_open,
            quality: interval.quality,
        }
    }

    fn mean_amplitude(&self) -> Amplitude {
        if self.is_open && self.open_time != 0.0 {
            self.weighted_amplitude / self.open_time
        } else {
            0.0
        }
    }

    /// Extends the group by `interval`. Only openings contribute to the amplitude.
    fn absorb(&mut self, interval: &Interval) {
        self.duration += interval.duration;
        if self.is_open && interval.is_open() {
            self.weighted_amplitude += interval.amplitude * interval.duration;
            self.open_time += interval.duration;
        }
        self.quality = self.quality.merge(interval.quality);
    }

    fn to_interval(&self) -> Interval {
        Interval {
            duration: self.duration,
            amplitude: self.mean_amplitude(),
            quality: self.quality,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolutionImposer {
    tres: DwellTime,
}

impl ResolutionImposer {
    pub fn new(tres: DwellTime) -> IdealisationResult<Self> {
        if tres.is_finite() && tres > 0.0 {
            Ok(Self { tres })
        } else {
            Err(IdealisationError::InvalidResolution(tres))
        }
    }

    pub fn tres(&self) -> DwellTime {
        self.tres
    }

    fn is_reliable(&self, interval: &Interval) -> bool {
        interval.duration > self.tres && interval.quality.is_usable()
    }

    /// Index of the first reliable interval whose start is also reliable, i.e.
    /// it is either the first interval or is preceded by a reliable interval.
    fn find_bootstrap(&self, intervals: &[Interval]) -> Option<usize> {
        if self.is_reliable(intervals.first()?) {
            return Some(0);
        }
        intervals
            .iter()
            .tuple_windows()
            .position(|(previous, current)| self.is_reliable(previous) && self.is_reliable(current))
            .map(|index| index + 1)
    }

    #[tracing::instrument(skip_all, fields(tres = self.tres, num_raw = raw.len(), num_resolved, discarded))]
    pub fn impose(&self, raw: &[Interval]) -> IdealisationResult<Resolution> {
        if raw.is_empty() {
            return Err(IdealisationError::EmptyRecord);
        }

        // Negative durations can only come from an upstream fault.
        let checked: Vec<Interval> = raw
            .iter()
            .map(|interval| {
                if interval.duration < 0.0 {
                    interval.with_quality(QualityFlag::Bad)
                } else {
                    *interval
                }
            })
            .collect();

        let start = self
            .find_bootstrap(&checked)
            .ok_or(IdealisationError::NoResolvableBootstrap { tres: self.tres })?;
        if start > 0 {
            warn!("Discarding {start} intervals before the first resolvable interval");
            counter!(INTERVALS_DISCARDED).increment(start as u64);
        }

        let (first, rest) = checked
            .get(start..)
            .and_then(<[Interval]>::split_first)
            .ok_or(IdealisationError::NoResolvableBootstrap { tres: self.tres })?;

        let mut resolved = Vec::<Interval>::new();
        let mut group = Group::seed(first);
        let last_index = rest.len().checked_sub(1);

        for (index, interval) in rest.iter().enumerate() {
            if interval.duration < self.tres {
                if Some(index) == last_index && interval.is_shut() && group.is_open {
                    // The length of a final unresolvable shutting cannot be known.
                    trace!("Closing final opening with an unusable shut interval");
                    resolved.push(group.to_interval());
                    group = Group::seed(&interval.with_quality(QualityFlag::Bad));
                } else {
                    group.absorb(interval);
                }
            } else if interval.is_shut() {
                if group.is_open {
                    resolved.push(group.to_interval());
                    group = Group::seed(interval);
                } else {
                    group.absorb(interval);
                }
            } else if !group.is_open {
                resolved.push(group.to_interval());
                group = Group::seed(interval);
            } else if (interval.amplitude - group.mean_amplitude()).abs() <= AMPLITUDE_TOLERANCE {
                group.absorb(interval);
            } else {
                trace!(
                    "Amplitude transition from {} to {}",
                    group.mean_amplitude(),
                    interval.amplitude
                );
                resolved.push(group.to_interval());
                group = Group::seed(interval);
            }
        }

        let mut last = group.to_interval();
        if group.is_open {
            last.duration = UNTERMINATED_DURATION;
            last.quality = QualityFlag::Bad;
        }
        resolved.push(last);

        tracing::Span::current().record("num_resolved", resolved.len());
        tracing::Span::current().record("discarded", start);
        Ok(Resolution {
            tres: self.tres,
            intervals: resolved,
            discarded: start,
        })
    }
}

/// Convenience wrapper validating `tres` and imposing it on `raw`.
pub fn impose_resolution(raw: &[Interval], tres: DwellTime) -> IdealisationResult<Resolution> {
    ResolutionImposer::new(tres)?.impose(raw)
}
