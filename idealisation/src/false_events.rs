//! Expected rate of noise excursions mistaken for events at a given resolution.
use dwell_common::{Amplitude, DwellTime};

/// Gauss error function, from the Chebyshev fit in Numerical Recipes 6.2.
/// The fractional error is below 1.2e-7.
pub fn erf(z: f64) -> f64 {
    const COEFFICIENTS: [f64; 10] = [
        -1.26551223,
        1.00002368,
        0.37409196,
        0.09678418,
        -0.18628806,
        0.27886807,
        -1.13520398,
        1.48851587,
        -0.82215223,
        0.17087277,
    ];
    let t = 1.0 / (1.0 + 0.5 * z.abs());
    let polynomial = COEFFICIENTS
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| coefficient + t * acc);
    let ans = 1.0 - t * (-z * z + polynomial).exp();
    if z >= 0.0 { ans } else { -ans }
}

/// Amplitude reached by a rectangular pulse of length `tres` after a
/// Gaussian filter with cut-off `fc`.
pub fn threshold(tres: DwellTime, fc: f64, amplitude: Amplitude) -> Amplitude {
    erf(2.668 * fc * tres) * amplitude
}

/// False event rate in events per second, following Colquhoun and Sigworth.
///
/// `tres` is in seconds, `fc` (the filter cut-off) in Hz, and `rms` (the
/// baseline noise) in the same unit as `amplitude`.
pub fn false_event_rate(tres: DwellTime, fc: f64, rms: Amplitude, amplitude: Amplitude) -> f64 {
    let phi = threshold(tres, fc, amplitude);
    fc * (-(phi * phi) / (2.0 * rms * rms)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn erf_known_values() {
        assert_approx_eq!(erf(0.0), 0.0, 2e-7);
        assert_approx_eq!(erf(1.0), 0.8427007929, 2e-7);
        assert_approx_eq!(erf(-0.5), -0.5204998778, 2e-7);
        assert_approx_eq!(erf(3.0), 0.9999779095, 2e-7);
    }

    #[test]
    fn no_amplitude_means_every_crossing_counts() {
        assert_approx_eq!(false_event_rate(20e-6, 3000.0, 0.5, 0.0), 3000.0, 1e-9);
    }

    #[test]
    fn rate_falls_as_resolution_grows() {
        let rates: Vec<f64> = [10e-6, 20e-6, 40e-6, 80e-6]
            .into_iter()
            .map(|tres| false_event_rate(tres, 3000.0, 0.7, 5.0))
            .collect();
        assert!(rates.windows(2).all(|pair| pair[1] < pair[0]));
        assert!(rates.iter().all(|&rate| rate > 0.0 && rate <= 3000.0));
    }

    #[test]
    fn matches_threshold_formula() {
        let (tres, fc, rms, amplitude) = (30e-6, 4000.0, 0.6, 6.0);
        let phi = threshold(tres, fc, amplitude);
        assert_approx_eq!(phi, erf(0.32016) * 6.0, 1e-9);
        assert_approx_eq!(
            false_event_rate(tres, fc, rms, amplitude),
            fc * (-phi * phi / 0.72).exp(),
            1e-9
        );
    }
}
