//! Small numeric helpers shared by the transforms.

/// Arithmetic mean of a slice. Returns 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Relative change `current / previous - 1`.
///
/// Returns `None` when the previous value is zero or either input is not
/// finite, so an undefined change never turns into an infinity downstream.
pub fn relative_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some(current / previous - 1.0)
}

/// Relative change of every element against the element `period` steps
/// earlier. The first `period` entries are `None`.
pub fn pct_change(data: &[f64], period: usize) -> Vec<Option<f64>> {
    data.iter()
        .enumerate()
        .map(|(i, &current)| {
            if period == 0 || i < period {
                None
            } else {
                relative_change(current, data[i - period])
            }
        })
        .collect()
}

/// First difference of an optional series: `x[t] - x[t-1]`, missing when
/// either side is missing.
pub fn diff(data: &[Option<f64>]) -> Vec<Option<f64>> {
    data.iter()
        .enumerate()
        .map(|(i, current)| {
            if i == 0 {
                return None;
            }
            match (current, data[i - 1]) {
                (Some(c), Some(p)) => Some(c - p),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_pct_change_leading_missing() {
        let out = pct_change(&[1.0, 2.0, 4.0, 8.0], 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 3.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pct_change_zero_base_is_missing() {
        let out = pct_change(&[0.0, 5.0], 1);
        assert_eq!(out, vec![None, None]);
    }

    #[test]
    fn test_diff_propagates_missing() {
        let out = diff(&[None, Some(0.1), Some(0.3), None]);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(out[3], None);
    }
}
