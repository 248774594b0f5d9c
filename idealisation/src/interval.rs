use crate::{error::IdealisationError, record::record_failure};
use dwell_common::{Amplitude, DwellTime};
use std::fmt::{Display, Formatter};

/// Duration given to a trailing opening whose end was never observed.
pub const UNTERMINATED_DURATION: DwellTime = -1.0;

/// Quality of an interval, as assigned by the upstream idealisation.
///
/// Only `Bad` changes how the pipeline treats an interval. The remaining codes
/// are carried through unchanged so they can be reported back downstream.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityFlag {
    #[default]
    Good,
    DubiousAmplitude,
    FixedAmplitude,
    ForcedEqualA,
    ForcedEqualB,
    Bad,
}

impl QualityFlag {
    pub fn is_usable(self) -> bool {
        self != QualityFlag::Bad
    }

    pub fn code(self) -> i32 {
        match self {
            QualityFlag::Good => 0,
            QualityFlag::DubiousAmplitude => 1,
            QualityFlag::FixedAmplitude => 2,
            QualityFlag::ForcedEqualA => 4,
            QualityFlag::ForcedEqualB => 6,
            QualityFlag::Bad => 8,
        }
    }

    /// `Bad` is sticky: merging anything with a bad interval yields a bad interval.
    pub(crate) fn merge(self, other: QualityFlag) -> QualityFlag {
        if other == QualityFlag::Bad {
            QualityFlag::Bad
        } else {
            self
        }
    }
}

impl TryFrom<i32> for QualityFlag {
    type Error = IdealisationError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(QualityFlag::Good),
            1 => Ok(QualityFlag::DubiousAmplitude),
            2 => Ok(QualityFlag::FixedAmplitude),
            4 => Ok(QualityFlag::ForcedEqualA),
            6 => Ok(QualityFlag::ForcedEqualB),
            8 => Ok(QualityFlag::Bad),
            other => Err(IdealisationError::UnknownQualityCode(other)),
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub duration: DwellTime,
    pub amplitude: Amplitude,
    pub quality: QualityFlag,
}

impl Interval {
    pub fn new(duration: DwellTime, amplitude: Amplitude) -> Self {
        Self {
            duration,
            amplitude,
            quality: QualityFlag::Good,
        }
    }

    pub fn with_quality(self, quality: QualityFlag) -> Self {
        Self { quality, ..self }
    }

    pub fn is_open(&self) -> bool {
        self.amplitude != 0.0
    }

    pub fn is_shut(&self) -> bool {
        self.amplitude == 0.0
    }

    pub fn is_unterminated(&self) -> bool {
        self.duration == UNTERMINATED_DURATION
    }
}

/// Decodes a `(duration, amplitude, quality code)` triple as supplied by a record loader.
impl TryFrom<(DwellTime, Amplitude, i32)> for Interval {
    type Error = IdealisationError;

    fn try_from((duration, amplitude, code): (DwellTime, Amplitude, i32)) -> Result<Self, Self::Error> {
        Ok(Self {
            duration,
            amplitude,
            quality: QualityFlag::try_from(code)?,
        })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{0},{1},{2}",
            self.duration,
            self.amplitude,
            self.quality.code()
        ))
    }
}

/// Decodes a whole record of triples, failing on the first unknown quality code.
pub fn intervals_from_triples<I>(triples: I) -> Result<Vec<Interval>, IdealisationError>
where
    I: IntoIterator<Item = (DwellTime, Amplitude, i32)>,
{
    triples
        .into_iter()
        .map(Interval::try_from)
        .collect::<Result<_, _>>()
        .inspect_err(record_failure)
}
