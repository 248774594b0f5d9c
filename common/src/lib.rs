pub mod metrics;
pub mod tracer;

/// Length of an interval, in seconds.
pub type DwellTime = f64;
/// Conductance or current level of an interval, zero when the channel is shut.
pub type Amplitude = f64;
/// Agonist concentration, in molar.
pub type Concentration = f64;

/// Converts a dwell time in seconds to milliseconds, the unit reports are written in.
pub fn to_millis(time: DwellTime) -> f64 {
    time * 1_000.0
}
