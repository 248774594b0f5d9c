mod burst;
mod collection;

pub use burst::Burst;
pub use collection::BurstCollection;

use crate::{
    error::{IdealisationError, IdealisationResult},
    periods::Periods,
};
use dwell_common::DwellTime;
use tracing::debug;

/// Splits a period sequence into bursts wherever a shut period is at least as
/// long as the critical gap, or is unusable.
#[derive(Debug, Clone, Copy)]
pub struct BurstSegmenter {
    tcrit: DwellTime,
}

impl BurstSegmenter {
    /// The sign of `tcrit` is kept for downstream use and plays no part in segmentation.
    pub fn new(tcrit: DwellTime) -> IdealisationResult<Self> {
        if tcrit.is_nan() {
            Err(IdealisationError::InvalidCriticalGap(tcrit))
        } else {
            Ok(Self { tcrit })
        }
    }

    pub fn tcrit(&self) -> DwellTime {
        self.tcrit
    }

    pub fn gap(&self) -> DwellTime {
        self.tcrit.abs()
    }

    #[tracing::instrument(skip_all, fields(tcrit = self.tcrit, num_periods = periods.len(), num_bursts))]
    pub fn segment(&self, periods: &Periods) -> BurstCollection {
        let gap = self.gap();
        let mut bursts = Vec::<Burst>::new();
        let mut current = Burst::default();

        for period in periods {
            if period.is_open() || (period.duration < gap && period.is_usable()) {
                current.push(*period);
            } else {
                if current.is_empty() {
                    debug!("Rejected burst at index {}", bursts.len());
                }
                bursts.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            bursts.push(current);
        }

        tracing::Span::current().record("num_bursts", bursts.len());
        BurstCollection::new(bursts)
    }
}
