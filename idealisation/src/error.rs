use dwell_common::{DwellTime, metrics::failures::FailureKind};
use thiserror::Error;

pub type IdealisationResult<T> = Result<T, IdealisationError>;

/// Names the statistic whose denominator vanished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BurstStatistic {
    #[strum(to_string = "mean amplitude")]
    MeanAmplitude,
    #[strum(to_string = "Popen")]
    Popen,
    #[strum(to_string = "Popen excluding last opening")]
    PopenExcludingLastOpening,
    #[strum(to_string = "running mean Popen")]
    RunningMeanPopen,
    #[strum(to_string = "mean burst length")]
    MeanLength,
    #[strum(to_string = "mean openings per burst")]
    MeanOpenings,
    #[strum(to_string = "mean Popen")]
    MeanPopen,
}

#[derive(Debug, Error, PartialEq)]
pub enum IdealisationError {
    #[error("Resolution must be positive and finite, got {0}")]
    InvalidResolution(DwellTime),
    #[error("Critical gap must be a number, got {0}")]
    InvalidCriticalGap(DwellTime),
    #[error("Record contains no intervals")]
    EmptyRecord,
    #[error("No usable interval longer than the resolution {tres} s to start from")]
    NoResolvableBootstrap { tres: DwellTime },
    #[error("Degenerate burst: {statistic} has a zero denominator")]
    DegenerateBurst { statistic: BurstStatistic },
    #[error("Unknown interval quality code {0}")]
    UnknownQualityCode(i32),
    #[error("No observation reaches the resolution {tres} s")]
    EmptyHistogram { tres: DwellTime },
}

impl IdealisationError {
    /// The metric label for failures which abandon a whole record.
    pub(crate) fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::InvalidResolution(_) => Some(FailureKind::InvalidResolution),
            Self::InvalidCriticalGap(_) => Some(FailureKind::InvalidCriticalGap),
            Self::EmptyRecord => Some(FailureKind::EmptyRecord),
            Self::NoResolvableBootstrap { .. } => Some(FailureKind::NoResolvableBootstrap),
            Self::UnknownQualityCode(_) => Some(FailureKind::UnknownQualityCode),
            Self::DegenerateBurst { .. } | Self::EmptyHistogram { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid Settings File: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Idealisation(#[from] IdealisationError),
}
