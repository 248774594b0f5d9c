//! Idealisation of single-channel records.
//!
//! A raw record is an ordered list of dwell intervals. Imposing a resolution
//! merges the intervals too short to be timed, the resolved record is split
//! into open and shut periods, and shut periods longer than a critical gap
//! divide the periods into bursts. [ScRecord] keeps all of these consistent
//! with its thresholds.
pub mod batch;
pub mod bursts;
pub mod error;
pub mod false_events;
pub mod histogram;
pub mod interval;
pub mod periods;
pub mod record;
pub mod resolution;
pub mod settings;

#[cfg(test)]
mod tests;

pub use batch::idealise_batch;
pub use bursts::{Burst, BurstCollection, BurstSegmenter};
pub use error::{BurstStatistic, IdealisationError, IdealisationResult, SettingsError};
pub use histogram::DwellHistogram;
pub use interval::{Interval, QualityFlag};
pub use periods::{Period, PeriodKind, PeriodSegmenter, Periods};
pub use record::{RecordSummary, ScRecord};
pub use resolution::{Resolution, ResolutionImposer, impose_resolution};
pub use settings::IdealisationSettings;
