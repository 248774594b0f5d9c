use crate::{
    error::{BurstStatistic, IdealisationError, IdealisationResult},
    periods::Period,
};
use dwell_common::{Amplitude, DwellTime};

fn degenerate(statistic: BurstStatistic) -> IdealisationError {
    IdealisationError::DegenerateBurst { statistic }
}

/// Ratio of two durations, refusing a zero denominator.
fn ratio(numerator: DwellTime, denominator: DwellTime, statistic: BurstStatistic) -> IdealisationResult<f64> {
    if denominator == 0.0 {
        Err(degenerate(statistic))
    } else {
        Ok(numerator / denominator)
    }
}

/// Periods believed to come from one activation of the channel.
///
/// A burst always starts with an opening, so openings sit at even positions and
/// the gaps between them at odd positions. An empty burst is a rejected burst:
/// it carries no periods but still occupies its place in the sequence.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Burst {
    periods: Vec<Period>,
}

impl Burst {
    pub fn new(periods: Vec<Period>) -> Self {
        Self { periods }
    }

    pub(crate) fn push(&mut self, period: Period) {
        self.periods.push(period);
    }

    pub fn as_slice(&self) -> &[Period] {
        &self.periods
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

    /// Alternating open and shut durations, as consumed by likelihood code.
    pub fn durations(&self) -> Vec<DwellTime> {
        self.periods.iter().map(|period| period.duration).collect()
    }

    pub fn openings(&self) -> usize {
        self.open_periods().count()
    }

    pub fn length(&self) -> DwellTime {
        self.periods.iter().map(|period| period.duration).sum()
    }

    pub fn total_open_time(&self) -> DwellTime {
        self.open_periods().map(|period| period.duration).sum()
    }

    pub fn last_opening(&self) -> Option<&Period> {
        self.open_periods().last()
    }

    pub fn mean_amplitude(&self) -> IdealisationResult<Amplitude> {
        let openings = self.openings();
        if openings == 0 {
            return Err(degenerate(BurstStatistic::MeanAmplitude));
        }
        let total: Amplitude = self.open_periods().map(|period| period.amplitude).sum();
        Ok(total / openings as Amplitude)
    }

    pub fn popen(&self) -> IdealisationResult<f64> {
        ratio(self.total_open_time(), self.length(), BurstStatistic::Popen)
    }

    /// Popen with the final opening left out of both totals.
    ///
    /// The gap ending a burst often cuts its last opening short, so leaving
    /// that opening out avoids a biased estimate.
    pub fn popen_excluding_last_opening(&self) -> IdealisationResult<f64> {
        let statistic = BurstStatistic::PopenExcludingLastOpening;
        let last = self
            .last_opening()
            .map(|period| period.duration)
            .ok_or_else(|| degenerate(statistic))?;
        ratio(
            self.total_open_time() - last,
            self.length() - last,
            statistic,
        )
    }

    /// Popen over each run of `window` consecutive open/shut pairs, sliding one
    /// pair at a time. Bursts holding no more than `2 * window + 1` periods
    /// yield their whole-burst Popen instead.
    pub fn running_mean_popen(&self, window: usize) -> IdealisationResult<Vec<f64>> {
        if window == 0 {
            return Err(degenerate(BurstStatistic::RunningMeanPopen));
        }
        if self.periods.len() <= 2 * window + 1 {
            return Ok(vec![self.popen()?]);
        }
        let pairs: Vec<(DwellTime, DwellTime)> = self
            .periods
            .chunks_exact(2)
            .map(|pair| {
                let open: DwellTime = pair.iter().filter(|p| p.is_open()).map(|p| p.duration).sum();
                let total: DwellTime = pair.iter().map(|p| p.duration).sum();
                (open, total)
            })
            .collect();
        pairs
            .windows(window)
            .map(|run| {
                let open: DwellTime = run.iter().map(|(open, _)| open).sum();
                let total: DwellTime = run.iter().map(|(_, total)| total).sum();
                ratio(open, total, BurstStatistic::RunningMeanPopen)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn burst(durations: &[DwellTime]) -> Burst {
        Burst::new(
            durations
                .iter()
                .enumerate()
                .map(|(index, &duration)| {
                    if index % 2 == 0 {
                        Period::open(duration, 5.0 + index as Amplitude)
                    } else {
                        Period::shut(duration)
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn basic_statistics() {
        let burst = burst(&[0.002, 0.003, 0.004]);
        assert_eq!(burst.openings(), 2);
        assert_approx_eq!(burst.length(), 0.009, 1e-12);
        assert_approx_eq!(burst.total_open_time(), 0.006, 1e-12);
        assert_approx_eq!(burst.popen().unwrap(), 0.006 / 0.009, 1e-12);
        assert_approx_eq!(burst.mean_amplitude().unwrap(), 6.0, 1e-12);
        assert_approx_eq!(
            burst.popen_excluding_last_opening().unwrap(),
            0.002 / 0.005,
            1e-12
        );
        assert_eq!(burst.durations(), vec![0.002, 0.003, 0.004]);
    }

    #[test]
    fn single_opening_is_degenerate_without_its_last_opening() {
        let burst = burst(&[0.001]);
        assert_eq!(burst.popen().unwrap(), 1.0);
        assert_eq!(
            burst.popen_excluding_last_opening(),
            Err(IdealisationError::DegenerateBurst {
                statistic: BurstStatistic::PopenExcludingLastOpening
            })
        );
    }

    #[test]
    fn empty_burst_is_degenerate() {
        let burst = Burst::default();
        assert_eq!(burst.openings(), 0);
        assert_eq!(burst.length(), 0.0);
        assert!(burst.popen().is_err());
        assert!(burst.mean_amplitude().is_err());
        assert!(burst.popen_excluding_last_opening().is_err());
    }

    #[test]
    fn short_bursts_give_whole_burst_running_popen() {
        let burst = burst(&[0.002, 0.003, 0.004]);
        assert_eq!(
            burst.running_mean_popen(1).unwrap(),
            vec![burst.popen().unwrap()]
        );
        assert!(burst.running_mean_popen(0).is_err());
    }

    #[test]
    fn running_popen_slides_over_pairs() {
        let burst = burst(&[0.001, 0.001, 0.003, 0.001, 0.001, 0.003, 0.002]);
        let running = burst.running_mean_popen(2).unwrap();
        // Pairs are (1,1), (3,1), (1,3) and the trailing opening is not a pair.
        assert_eq!(running.len(), 2);
        assert_approx_eq!(running[0], 0.004 / 0.006, 1e-12);
        assert_approx_eq!(running[1], 0.004 / 0.008, 1e-12);

        let running = burst.running_mean_popen(1).unwrap();
        assert_eq!(running.len(), 3);
        assert_approx_eq!(running[0], 0.5, 1e-12);
        assert_approx_eq!(running[1], 0.75, 1e-12);
        assert_approx_eq!(running[2], 0.25, 1e-12);
    }
}
