use super::Burst;
use crate::error::{BurstStatistic, IdealisationError, IdealisationResult};
use dwell_common::DwellTime;

fn mean<I>(values: I, statistic: BurstStatistic) -> IdealisationResult<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (count, total) = values
        .into_iter()
        .fold((0usize, 0.0), |(count, total), value| (count + 1, total + value));
    if count == 0 {
        Err(IdealisationError::DegenerateBurst { statistic })
    } else {
        Ok(total / count as f64)
    }
}

/// The bursts of one record, in order of occurrence.
///
/// Rejected (empty) bursts are kept so that burst numbering matches the record,
/// but the per-burst lists and their means only cover accepted bursts.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct BurstCollection {
    bursts: Vec<Burst>,
}

impl BurstCollection {
    pub fn new(bursts: Vec<Burst>) -> Self {
        Self { bursts }
    }

    /// Number of bursts, rejected ones included.
    pub fn count(&self) -> usize {
        self.bursts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bursts.is_empty()
    }

    pub fn as_slice(&self) -> &[Burst] {
        &self.bursts
    }

    pub fn get(&self, index: usize) -> Option<&Burst> {
        self.bursts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Burst> {
        self.bursts.iter()
    }

    pub fn accepted(&self) -> impl Iterator<Item = &Burst> {
        self.bursts.iter().filter(|burst| !burst.is_empty())
    }

    pub fn rejected_count(&self) -> usize {
        self.bursts.iter().filter(|burst| burst.is_empty()).count()
    }

    pub fn lengths(&self) -> Vec<DwellTime> {
        self.accepted().map(Burst::length).collect()
    }

    pub fn openings(&self) -> Vec<usize> {
        self.accepted().map(Burst::openings).collect()
    }

    pub fn popens(&self) -> IdealisationResult<Vec<f64>> {
        self.accepted().map(Burst::popen).collect()
    }

    /// Alternating open/shut durations of each accepted burst.
    pub fn duration_lists(&self) -> Vec<Vec<DwellTime>> {
        self.accepted().map(Burst::durations).collect()
    }

    pub fn mean_length(&self) -> IdealisationResult<DwellTime> {
        mean(self.lengths(), BurstStatistic::MeanLength)
    }

    pub fn mean_openings(&self) -> IdealisationResult<f64> {
        mean(
            self.openings().into_iter().map(|openings| openings as f64),
            BurstStatistic::MeanOpenings,
        )
    }

    pub fn mean_popen(&self) -> IdealisationResult<f64> {
        mean(self.popens()?, BurstStatistic::MeanPopen)
    }

    /// Bursts with at least `min_openings` openings.
    pub fn select_long(&self, min_openings: usize) -> BurstCollection {
        BurstCollection {
            bursts: self
                .accepted()
                .filter(|burst| burst.openings() >= min_openings)
                .cloned()
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BurstCollection {
    type Item = &'a Burst;
    type IntoIter = std::slice::Iter<'a, Burst>;

    fn into_iter(self) -> Self::IntoIter {
        self.bursts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::periods::Period;
    use assert_approx_eq::assert_approx_eq;

    fn collection() -> BurstCollection {
        BurstCollection::new(vec![
            Burst::new(vec![
                Period::open(0.002, 5.0),
                Period::shut(0.003),
                Period::open(0.004, 5.0),
            ]),
            Burst::default(),
            Burst::new(vec![Period::open(0.001, 5.0)]),
        ])
    }

    #[test]
    fn lists_skip_rejected_bursts() {
        let bursts = collection();
        assert_eq!(bursts.count(), 3);
        assert_eq!(bursts.rejected_count(), 1);
        assert_eq!(bursts.openings(), vec![2, 1]);
        assert_eq!(bursts.lengths().len(), 2);
        assert_approx_eq!(bursts.lengths()[0], 0.009, 1e-12);
        assert_eq!(bursts.duration_lists()[1], vec![0.001]);
    }

    #[test]
    fn means() {
        let bursts = collection();
        assert_approx_eq!(bursts.mean_length().unwrap(), 0.005, 1e-12);
        assert_approx_eq!(bursts.mean_openings().unwrap(), 1.5, 1e-12);
        let popens = bursts.popens().unwrap();
        assert_approx_eq!(popens[0], 6.0 / 9.0, 1e-12);
        assert_eq!(popens[1], 1.0);
        assert_approx_eq!(bursts.mean_popen().unwrap(), (6.0 / 9.0 + 1.0) / 2.0, 1e-12);
    }

    #[test]
    fn select_long_bursts() {
        let bursts = collection();
        let long = bursts.select_long(2);
        assert_eq!(long.count(), 1);
        assert_eq!(long.openings(), vec![2]);
        assert_eq!(bursts.select_long(1).count(), 2);
        assert!(bursts.select_long(3).is_empty());
    }

    #[test]
    fn empty_collection_means_are_degenerate() {
        let bursts = BurstCollection::default();
        assert_eq!(
            bursts.mean_length(),
            Err(IdealisationError::DegenerateBurst {
                statistic: BurstStatistic::MeanLength
            })
        );
        assert!(bursts.mean_openings().is_err());
        assert!(bursts.mean_popen().is_err());
    }
}
