use crate::libs::error::NetError;

/// Corrects an MI estimate for measurement noise of variance `noise2` in both
/// genes, whose sample variances are `v1` and `v2`.
///
/// Both variances must exceed `noise2`. Callers skip the correction when the
/// noise level is zero.
///
/// ```
/// use aracne::libs::mi::correct_noise;
/// let mi = correct_noise(0.5, 2.0, 2.0, 1.0).unwrap();
/// assert!(mi > 0.5);
/// assert!(correct_noise(0.5, 1.0, 2.0, 1.0).is_err());
/// ```
pub fn correct_noise(mi: f64, v1: f64, v2: f64, noise2: f64) -> Result<f64, NetError> {
    for v in [v1, v2] {
        if v <= noise2 {
            return Err(NetError::NoiseDomain {
                variance: v,
                noise: noise2,
            });
        }
    }

    let lambda = (v1 / (v1 - noise2)) * (v2 / (v2 - noise2));
    let value = 1.0 + ((2.0 * mi).exp() - 1.0) * (1.0 - 1.0 / lambda);
    let corrected = mi + 0.5 * value.ln();

    if corrected.is_finite() {
        Ok(corrected)
    } else {
        Err(NetError::NoiseDomain {
            variance: v1.min(v2),
            noise: noise2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_correction_value() {
        // lambda = 2 * 2 = 4, value = 1 + (e - 1) * 0.75
        let expected = 0.5 + 0.5 * (1.0 + (1f64.exp() - 1.0) * 0.75).ln();
        assert_relative_eq!(correct_noise(0.5, 2.0, 2.0, 1.0).unwrap(), expected);
    }

    #[test]
    fn test_zero_mi_stays_zero() {
        assert_relative_eq!(correct_noise(0.0, 3.0, 5.0, 0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_tiny_noise_is_almost_identity() {
        let mi = correct_noise(0.8, 10.0, 10.0, 1e-9).unwrap();
        assert_relative_eq!(mi, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_noise_above_variance() {
        assert!(matches!(
            correct_noise(0.5, 2.0, 0.3, 0.5),
            Err(NetError::NoiseDomain { .. })
        ));
        assert!(correct_noise(0.5, 0.5, 2.0, 0.5).is_err());
    }
}
