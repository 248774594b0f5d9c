use crate::{
    error::IdealisationResult, interval::Interval, record::ScRecord,
    settings::IdealisationSettings,
};
use rayon::prelude::*;
use tracing::info;

/// Idealises each record independently with the same settings.
///
/// Records are spread across the rayon thread pool. The results come back in
/// input order, and one record failing has no effect on the others.
#[tracing::instrument(skip_all, fields(num_records = records.len(), num_failed))]
pub fn idealise_batch(
    records: Vec<Vec<Interval>>,
    settings: &IdealisationSettings,
) -> Vec<IdealisationResult<ScRecord>> {
    let results: Vec<_> = records
        .into_par_iter()
        .map(|raw| ScRecord::new(raw, settings.clone()))
        .collect();

    let num_failed = results.iter().filter(|result| result.is_err()).count();
    tracing::Span::current().record("num_failed", num_failed);
    info!(
        "Idealised {} of {} records",
        results.len() - num_failed,
        results.len()
    );
    results
}
