use crate::{
    bursts::{BurstCollection, BurstSegmenter},
    error::{IdealisationError, IdealisationResult},
    histogram::DwellHistogram,
    interval::Interval,
    periods::{PeriodSegmenter, Periods},
    resolution::{Resolution, ResolutionImposer},
    settings::IdealisationSettings,
};
use dwell_common::{
    Concentration, DwellTime,
    metrics::{
        failures,
        names::{FAILURES, RECORDS_IDEALISED},
    },
    to_millis,
};
use metrics::counter;
use std::fmt::{Display, Formatter};
use tracing::{error, info};

pub(crate) fn record_failure(error: &IdealisationError) {
    if let Some(kind) = error.failure_kind() {
        error!("{error}");
        counter!(FAILURES, &[failures::get_label(kind)]).increment(1);
    }
}

/// A single-channel record together with everything derived from it.
///
/// The resolved intervals, periods and bursts are always rebuilt together from
/// the raw intervals, so they never lag behind the thresholds. A threshold
/// change which fails leaves the record as it was.
#[derive(Debug, Clone)]
pub struct ScRecord {
    raw: Vec<Interval>,
    settings: IdealisationSettings,
    resolution: Resolution,
    periods: Periods,
    bursts: BurstCollection,
}

impl ScRecord {
    #[tracing::instrument(skip_all, fields(
        num_raw = raw.len(),
        tres = settings.resolution,
        tcrit = settings.critical_gap,
    ))]
    pub fn new(raw: Vec<Interval>, settings: IdealisationSettings) -> IdealisationResult<Self> {
        let (resolution, periods) = match Self::resolve(&raw, settings.resolution) {
            Ok(derived) => derived,
            Err(e) => {
                record_failure(&e);
                return Err(e);
            }
        };
        let bursts = match BurstSegmenter::new(settings.critical_gap) {
            Ok(segmenter) => segmenter.segment(&periods),
            Err(e) => {
                record_failure(&e);
                return Err(e);
            }
        };
        counter!(RECORDS_IDEALISED).increment(1);
        info!(
            "Idealised {} intervals into {} bursts",
            resolution.intervals.len(),
            bursts.count()
        );
        Ok(Self {
            raw,
            settings,
            resolution,
            periods,
            bursts,
        })
    }

    fn resolve(raw: &[Interval], tres: DwellTime) -> IdealisationResult<(Resolution, Periods)> {
        let resolution = ResolutionImposer::new(tres)?.impose(raw)?;
        let periods = PeriodSegmenter.segment(&resolution.intervals);
        Ok((resolution, periods))
    }

    /// Imposes a new resolution, rebuilding resolved intervals, periods and bursts.
    #[tracing::instrument(skip(self))]
    pub fn set_resolution(&mut self, tres: DwellTime) -> IdealisationResult<()> {
        let (resolution, periods) = Self::resolve(&self.raw, tres)?;
        let bursts = BurstSegmenter::new(self.settings.critical_gap)?.segment(&periods);
        self.settings.resolution = tres;
        self.resolution = resolution;
        self.periods = periods;
        self.bursts = bursts;
        Ok(())
    }

    /// Changes the critical gap. Periods do not depend on it, so only bursts are rebuilt.
    #[tracing::instrument(skip(self))]
    pub fn set_critical_gap(&mut self, tcrit: DwellTime) -> IdealisationResult<()> {
        self.bursts = BurstSegmenter::new(tcrit)?.segment(&self.periods);
        self.settings.critical_gap = tcrit;
        Ok(())
    }

    /// Changes both thresholds, rebuilding periods before bursts.
    #[tracing::instrument(skip(self))]
    pub fn set_thresholds(&mut self, tres: DwellTime, tcrit: DwellTime) -> IdealisationResult<()> {
        let segmenter = BurstSegmenter::new(tcrit)?;
        let (resolution, periods) = Self::resolve(&self.raw, tres)?;
        self.bursts = segmenter.segment(&periods);
        self.settings.resolution = tres;
        self.settings.critical_gap = tcrit;
        self.resolution = resolution;
        self.periods = periods;
        Ok(())
    }

    pub fn raw(&self) -> &[Interval] {
        &self.raw
    }

    pub fn settings(&self) -> &IdealisationSettings {
        &self.settings
    }

    pub fn tres(&self) -> DwellTime {
        self.settings.resolution
    }

    pub fn tcrit(&self) -> DwellTime {
        self.settings.critical_gap
    }

    pub fn concentration(&self) -> Concentration {
        self.settings.concentration
    }

    pub fn single_channel_bursts(&self) -> bool {
        self.settings.single_channel_bursts
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn resolved_intervals(&self) -> &[Interval] {
        &self.resolution.intervals
    }

    pub fn periods(&self) -> &Periods {
        &self.periods
    }

    pub fn bursts(&self) -> &BurstCollection {
        &self.bursts
    }

    /// Distribution of usable open period durations.
    pub fn open_period_histogram(&self) -> IdealisationResult<DwellHistogram> {
        let durations: Vec<DwellTime> = self
            .periods
            .open_periods()
            .filter(|period| period.is_usable())
            .map(|period| period.duration)
            .collect();
        DwellHistogram::new(&durations, self.tres())
    }

    /// Distribution of usable shut period durations.
    pub fn shut_period_histogram(&self) -> IdealisationResult<DwellHistogram> {
        let durations: Vec<DwellTime> = self
            .periods
            .shut_periods()
            .filter(|period| period.is_usable())
            .map(|period| period.duration)
            .collect();
        DwellHistogram::new(&durations, self.tres())
    }

    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            tres: self.tres(),
            tcrit: self.tcrit(),
            num_raw: self.raw.len(),
            num_resolved: self.resolution.intervals.len(),
            discarded: self.resolution.discarded,
            num_open_periods: self.periods.open_periods().count(),
            num_shut_periods: self.periods.shut_periods().count(),
            num_bursts: self.bursts.count(),
            num_rejected_bursts: self.bursts.rejected_count(),
            mean_burst_length: self.bursts.mean_length().ok(),
            mean_openings_per_burst: self.bursts.mean_openings().ok(),
            mean_popen: self.bursts.mean_popen().ok(),
        }
    }
}

/// Counts and means describing one idealised record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub tres: DwellTime,
    pub tcrit: DwellTime,
    pub num_raw: usize,
    pub num_resolved: usize,
    pub discarded: usize,
    pub num_open_periods: usize,
    pub num_shut_periods: usize,
    pub num_bursts: usize,
    pub num_rejected_bursts: usize,
    pub mean_burst_length: Option<DwellTime>,
    pub mean_openings_per_burst: Option<f64>,
    pub mean_popen: Option<f64>,
}

impl Display for RecordSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Resolution = {} ms", to_millis(self.tres))?;
        writeln!(f, "Critical gap = {} ms", to_millis(self.tcrit))?;
        writeln!(
            f,
            "{} raw intervals, {} resolved, {} discarded before the first resolvable interval",
            self.num_raw, self.num_resolved, self.discarded
        )?;
        writeln!(
            f,
            "{} open periods, {} shut periods",
            self.num_open_periods, self.num_shut_periods
        )?;
        writeln!(
            f,
            "Number of bursts = {} ({} rejected)",
            self.num_bursts, self.num_rejected_bursts
        )?;
        if let Some(length) = self.mean_burst_length {
            writeln!(f, "Average burst length = {:.9} ms", to_millis(length))?;
        }
        if let Some(openings) = self.mean_openings_per_burst {
            writeln!(f, "Average number of openings per burst = {openings:.9}")?;
        }
        if let Some(popen) = self.mean_popen {
            writeln!(f, "Average Popen = {popen:.9}")?;
        }
        Ok(())
    }
}
