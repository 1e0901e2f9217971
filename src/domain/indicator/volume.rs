//! Relative volume.

/// volume / average. NaN when the average is NaN or zero.
pub fn volume_ratio(volumes: &[f64], average: &[f64]) -> Vec<f64> {
    volumes
        .iter()
        .zip(average)
        .map(|(&v, &avg)| {
            if avg.is_finite() && avg != 0.0 {
                v / avg
            } else {
                f64::NAN
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio() {
        let out = volume_ratio(&[300.0, 100.0], &[200.0, 200.0]);
        assert_eq!(out, vec![1.5, 0.5]);
    }

    #[test]
    fn zero_average_is_nan() {
        let out = volume_ratio(&[0.0], &[0.0]);
        assert!(out[0].is_nan());
    }

    #[test]
    fn warmup_average_is_nan() {
        let out = volume_ratio(&[100.0], &[f64::NAN]);
        assert!(out[0].is_nan());
    }
}
