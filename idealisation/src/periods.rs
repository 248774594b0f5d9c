use crate::interval::{Interval, QualityFlag};
use dwell_common::{Amplitude, DwellTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Open,
    Shut,
}

/// A maximal run of resolved openings, or a single resolved shutting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period {
    pub kind: PeriodKind,
    pub duration: DwellTime,
    pub amplitude: Amplitude,
    pub quality: QualityFlag,
}

impl Period {
    pub fn open(duration: DwellTime, amplitude: Amplitude) -> Self {
        Self {
            kind: PeriodKind::Open,
            duration,
            amplitude,
            quality: QualityFlag::Good,
        }
    }

    pub fn shut(duration: DwellTime) -> Self {
        Self {
            kind: PeriodKind::Shut,
            duration,
            amplitude: 0.0,
            quality: QualityFlag::Good,
        }
    }

    pub fn with_quality(self, quality: QualityFlag) -> Self {
        Self { quality, ..self }
    }

    pub fn is_open(&self) -> bool {
        self.kind == PeriodKind::Open
    }

    pub fn is_shut(&self) -> bool {
        self.kind == PeriodKind::Shut
    }

    pub fn is_usable(&self) -> bool {
        self.quality.is_usable()
    }
}

impl From<&Interval> for Period {
    fn from(interval: &Interval) -> Self {
        Self {
            kind: if interval.is_open() {
                PeriodKind::Open
            } else {
                PeriodKind::Shut
            },
            duration: interval.duration,
            amplitude: interval.amplitude,
            quality: interval.quality,
        }
    }
}

/// Open and shut periods of a record. Even positions are open, odd positions are shut.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Periods {
    periods: Vec<Period>,
}

impl Periods {
    pub fn as_slice(&self) -> &[Period] {
        &self.periods
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn open_periods(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter().step_by(2)
    }

    pub fn shut_periods(&self) -> impl Iterator<Item = &Period> {
        self.periods.iter().skip(1).step_by(2)
    }

    pub fn open_durations(&self) -> Vec<DwellTime> {
        self.open_periods().map(|period| period.duration).collect()
    }

    pub fn open_amplitudes(&self) -> Vec<Amplitude> {
        self.open_periods().map(|period| period.amplitude).collect()
    }

    pub fn open_qualities(&self) -> Vec<QualityFlag> {
        self.open_periods().map(|period| period.quality).collect()
    }

    pub fn shut_durations(&self) -> Vec<DwellTime> {
        self.shut_periods().map(|period| period.duration).collect()
    }

    pub fn shut_qualities(&self) -> Vec<QualityFlag> {
        self.shut_periods().map(|period| period.quality).collect()
    }
}

impl<'a> IntoIterator for &'a Periods {
    type Item = &'a Period;
    type IntoIter = std::slice::Iter<'a, Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.periods.iter()
    }
}

#[derive(Debug, Clone)]
struct OpenPeriodBuilder {
    duration: DwellTime,
    weighted_amplitude: Amplitude,
    quality: QualityFlag,
}

impl OpenPeriodBuilder {
    fn new(interval: &Interval) -> Self {
        Self {
            duration: interval.duration,
            weighted_amplitude: interval.amplitude * interval.duration,
            quality: interval.quality,
        }
    }

    fn extend(&mut self, interval: &Interval) {
        self.duration += interval.duration;
        self.weighted_amplitude += interval.amplitude * interval.duration;
        self.quality = self.quality.merge(interval.quality);
    }

    fn build(self) -> Period {
        Period::open(self.duration, self.weighted_amplitude / self.duration)
            .with_quality(self.quality)
    }
}

/// Groups resolved intervals into alternating open and shut periods.
#[derive(Default, Debug, Clone, Copy)]
pub struct PeriodSegmenter;

impl PeriodSegmenter {
    #[tracing::instrument(skip_all, fields(num_resolved = resolved.len(), num_periods))]
    pub fn segment(&self, resolved: &[Interval]) -> Periods {
        let mut usable = resolved;
        if let Some((last, rest)) = usable.split_last() {
            if last.is_open() && last.is_unterminated() {
                usable = rest;
            }
        }
        if let Some((first, rest)) = usable.split_first() {
            if first.is_shut() {
                usable = rest;
            }
        }
        if usable.len() < 2 {
            tracing::Span::current().record("num_periods", 0);
            return Periods::default();
        }

        let mut periods = Vec::with_capacity(usable.len());
        let mut opening: Option<OpenPeriodBuilder> = None;
        for interval in usable {
            if interval.is_open() {
                match opening.as_mut() {
                    Some(builder) => builder.extend(interval),
                    None => opening = Some(OpenPeriodBuilder::new(interval)),
                }
            } else if let Some(builder) = opening.take() {
                periods.push(builder.build());
                periods.push(Period::from(interval));
            }
        }
        if let Some(builder) = opening {
            periods.push(builder.build());
        }

        tracing::Span::current().record("num_periods", periods.len());
        Periods { periods }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::UNTERMINATED_DURATION;
    use assert_approx_eq::assert_approx_eq;

    fn resolved(pairs: &[(DwellTime, Amplitude)]) -> Vec<Interval> {
        pairs
            .iter()
            .map(|&(duration, amplitude)| Interval::new(duration, amplitude))
            .collect()
    }

    #[test]
    fn leading_shut_and_unterminated_opening_are_dropped() {
        let mut intervals = resolved(&[(0.005, 0.0), (0.002, 5.0), (0.003, 0.0), (0.004, 5.0)]);
        intervals.push(Interval::new(UNTERMINATED_DURATION, 5.0).with_quality(QualityFlag::Bad));
        let periods = PeriodSegmenter.segment(&intervals);

        assert_eq!(periods.len(), 3);
        assert_eq!(periods.open_durations(), vec![0.002, 0.004]);
        assert_eq!(periods.shut_durations(), vec![0.003]);
        assert!(periods.open_periods().all(Period::is_open));
        assert!(periods.shut_periods().all(Period::is_shut));
    }

    #[test]
    fn amplitude_levels_join_one_open_period() {
        let intervals = resolved(&[(0.002, 4.0), (0.002, 6.0), (0.003, 0.0), (0.001, 5.0)]);
        let periods = PeriodSegmenter.segment(&intervals);

        assert_eq!(periods.len(), 3);
        let open = periods.open_durations();
        assert_approx_eq!(open[0], 0.004, 1e-12);
        assert_approx_eq!(periods.open_amplitudes()[0], 5.0, 1e-9);
        assert_eq!(open[1], 0.001);
    }

    #[test]
    fn bad_openings_mark_the_period() {
        let intervals = vec![
            Interval::new(0.002, 4.0),
            Interval::new(0.002, 6.0).with_quality(QualityFlag::Bad),
            Interval::new(0.003, 0.0),
            Interval::new(0.001, 5.0),
        ];
        let periods = PeriodSegmenter.segment(&intervals);
        assert_eq!(
            periods.open_qualities(),
            vec![QualityFlag::Bad, QualityFlag::Good]
        );
    }

    #[test]
    fn too_few_intervals() {
        assert!(PeriodSegmenter.segment(&[]).is_empty());
        assert!(
            PeriodSegmenter
                .segment(&resolved(&[(0.005, 0.0), (0.002, 5.0)]))
                .is_empty()
        );
        let intervals = vec![
            Interval::new(0.005, 0.0),
            Interval::new(0.002, 5.0),
            Interval::new(UNTERMINATED_DURATION, 3.0),
        ];
        assert!(PeriodSegmenter.segment(&intervals).is_empty());
    }

    #[test]
    fn record_ending_shut_keeps_final_shut_period() {
        let intervals = resolved(&[(0.002, 5.0), (0.003, 0.0), (0.004, 5.0), (0.006, 0.0)]);
        let periods = PeriodSegmenter.segment(&intervals);
        assert_eq!(periods.len(), 4);
        assert_eq!(periods.shut_durations(), vec![0.003, 0.006]);
    }
}
