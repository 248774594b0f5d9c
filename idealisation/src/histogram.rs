//! Log-binned distributions of dwell times.
use crate::{
    error::{IdealisationError, IdealisationResult},
    resolution::ResolutionImposer,
};
use dwell_common::{DwellTime, to_millis};
use ndarray::array;
use ndarray_stats::histogram::{self, Bins, Edges, Grid};
use tracing::warn;

/// Histogram bins need an ordered type, so durations are binned in whole nanoseconds.
type Nanos = u64;

fn to_nanos(time: DwellTime) -> Nanos {
    (time * 1e9).round() as Nanos
}

fn from_nanos(nanos: Nanos) -> DwellTime {
    nanos as DwellTime * 1e-9
}

/// Bins per decade, growing with the number of observations.
pub fn bins_per_decade(num_observations: usize) -> usize {
    match num_observations {
        0..=300 => 5,
        301..=1000 => 8,
        1001..=3000 => 10,
        _ => 12,
    }
}

/// Logarithmically spaced edges from `tres` up to the first whole
/// millisecond above `max`.
pub fn log_bin_edges(tres: DwellTime, max: DwellTime, bins_per_decade: usize) -> Vec<DwellTime> {
    let end = (1.0 + to_millis(max).floor()) / 1000.0;
    let ratio = 10.0_f64.powf(1.0 / bins_per_decade as f64);
    let num_bins = 1 + ((end / tres).ln() / ratio.ln()).max(0.0) as i32;
    (0..=num_bins).map(|i| tres * ratio.powi(i)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct DwellHistogram {
    tres: DwellTime,
    edges: Vec<DwellTime>,
    counts: Vec<usize>,
    below_resolution: usize,
}

impl DwellHistogram {
    /// Bins every finite observation at or above `tres`.
    #[tracing::instrument(skip_all, fields(tres = tres, num_observations = observations.len()))]
    pub fn new(observations: &[DwellTime], tres: DwellTime) -> IdealisationResult<Self> {
        ResolutionImposer::new(tres)?;
        let kept: Vec<DwellTime> = observations
            .iter()
            .copied()
            .filter(|time| time.is_finite() && *time >= tres)
            .collect();
        let below_resolution = observations.len() - kept.len();
        let max = kept
            .iter()
            .copied()
            .reduce(DwellTime::max)
            .ok_or(IdealisationError::EmptyHistogram { tres })?;

        let mut nanos: Vec<Nanos> = log_bin_edges(tres, max, bins_per_decade(kept.len()))
            .into_iter()
            .map(to_nanos)
            .collect();
        nanos.dedup();
        let edges = nanos.iter().copied().map(from_nanos).collect();
        let grid = Grid::from(vec![Bins::new(Edges::from(nanos))]);
        let mut histogram = histogram::Histogram::new(grid);
        for time in kept {
            if histogram.add_observation(&array![to_nanos(time)]).is_err() {
                warn!("Bin not found for duration {time}");
            }
        }

        Ok(Self {
            tres,
            edges,
            counts: histogram.counts().iter().copied().collect(),
            below_resolution,
        })
    }

    pub fn tres(&self) -> DwellTime {
        self.tres
    }

    /// Bin edges in seconds, one more than there are bins.
    pub fn edges(&self) -> &[DwellTime] {
        &self.edges
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Observations left out for being shorter than the resolution, or not finite.
    pub fn below_resolution(&self) -> usize {
        self.below_resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn bins_grow_with_sample_size() {
        assert_eq!(bins_per_decade(10), 5);
        assert_eq!(bins_per_decade(300), 5);
        assert_eq!(bins_per_decade(301), 8);
        assert_eq!(bins_per_decade(1000), 8);
        assert_eq!(bins_per_decade(3000), 10);
        assert_eq!(bins_per_decade(3001), 12);
    }

    #[test]
    fn edges_cover_the_largest_observation() {
        let edges = log_bin_edges(0.0001, 0.004, 5);
        assert_eq!(edges.len(), 10);
        assert_approx_eq!(edges[0], 0.0001, 1e-15);
        assert_approx_eq!(edges[5], 0.001, 1e-12);
        assert!(edges[9] > 0.005);
        assert!(edges.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn observations_are_binned() {
        let observations = [0.00005, 0.00015, 0.0003, 0.0012, 0.0025, 0.004, -1.0];
        let histogram = DwellHistogram::new(&observations, 0.0001).unwrap();
        assert_eq!(histogram.edges().len(), 10);
        assert_eq!(histogram.counts(), &[1, 0, 1, 0, 0, 1, 1, 0, 1]);
        assert_eq!(histogram.total(), 5);
        assert_eq!(histogram.below_resolution(), 2);
    }

    #[test]
    fn nothing_to_bin() {
        assert_eq!(
            DwellHistogram::new(&[0.00001, -1.0], 0.0001),
            Err(IdealisationError::EmptyHistogram { tres: 0.0001 })
        );
        assert_eq!(
            DwellHistogram::new(&[0.001], 0.0),
            Err(IdealisationError::InvalidResolution(0.0))
        );
    }
}
