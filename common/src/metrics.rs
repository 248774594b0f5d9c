use metrics::describe_counter;

/// Registers descriptions for every counter the idealisation pipeline emits.
pub fn describe_pipeline_metrics() {
    describe_counter!(names::RECORDS_IDEALISED, "Records successfully idealised");
    describe_counter!(
        names::INTERVALS_DISCARDED,
        "Raw intervals discarded before the first reliable resolvable interval"
    );
    describe_counter!(names::FAILURES, "Records which could not be idealised");
}

pub mod names {
    use const_format::concatcp;

    pub const METRIC_NAME_PREFIX: &str = "dwell_";

    pub const FAILURES: &str = concatcp!(METRIC_NAME_PREFIX, "failures");
    pub const RECORDS_IDEALISED: &str = concatcp!(METRIC_NAME_PREFIX, "records_idealised");
    pub const INTERVALS_DISCARDED: &str = concatcp!(METRIC_NAME_PREFIX, "intervals_discarded");
}

pub mod failures {
    #[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
    pub enum FailureKind {
        InvalidResolution,
        InvalidCriticalGap,
        EmptyRecord,
        NoResolvableBootstrap,
        UnknownQualityCode,
    }

    // Label building function
    pub fn get_label(failure_kind: FailureKind) -> (&'static str, &'static str) {
        (
            "failure_kind",
            match failure_kind {
                FailureKind::InvalidResolution => "invalid_resolution",
                FailureKind::InvalidCriticalGap => "invalid_critical_gap",
                FailureKind::EmptyRecord => "empty_record",
                FailureKind::NoResolvableBootstrap => "no_resolvable_bootstrap",
                FailureKind::UnknownQualityCode => "unknown_quality_code",
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_share_prefix() {
        for name in [
            names::FAILURES,
            names::RECORDS_IDEALISED,
            names::INTERVALS_DISCARDED,
        ] {
            assert!(name.starts_with(names::METRIC_NAME_PREFIX));
        }
        assert_eq!(names::FAILURES, "dwell_failures");
    }

    #[test]
    fn failure_labels() {
        assert_eq!(
            failures::get_label(failures::FailureKind::EmptyRecord),
            ("failure_kind", "empty_record")
        );
    }
}
