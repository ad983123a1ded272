//! Prominence-filtered local extrema
//!
//! Peak detection follows the usual signal-processing definition: a peak is
//! a sample (or the middle of a flat run) strictly higher than its neighbours,
//! and its prominence is the height above the higher of the two lowest points
//! reached before climbing above the peak on either side.

/// Indices of peaks whose prominence is at least `min_prominence`
pub fn find_peaks(values: &[f64], min_prominence: f64) -> Vec<usize> {
    local_maxima(values)
        .into_iter()
        .filter(|&peak| prominence(values, peak) >= min_prominence)
        .collect()
}

/// Indices of troughs, found as peaks of the negated series
pub fn find_troughs(values: &[f64], min_prominence: f64) -> Vec<usize> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    find_peaks(&negated, min_prominence)
}

/// Strict local maxima; flat tops report their (left-biased) midpoint and
/// edges of the series are never peaks
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if values.len() < 3 {
        return peaks;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                let left_edge = i;
                let right_edge = ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

fn prominence(values: &[f64], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_min = height;
    for &v in values[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &values[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_peak_and_trough() {
        let values = [1.0, 3.0, 1.0, -1.0, 0.5, 2.0];
        assert_eq!(find_peaks(&values, 0.0), vec![1]);
        assert_eq!(find_troughs(&values, 0.0), vec![3]);
    }

    #[test]
    fn test_monotonic_has_no_extrema() {
        let values: Vec<f64> = (0..20).map(f64::from).collect();
        assert!(find_peaks(&values, 0.0).is_empty());
        assert!(find_troughs(&values, 0.0).is_empty());
    }

    #[test]
    fn test_plateau_midpoint() {
        let values = [0.0, 2.0, 2.0, 2.0, 0.0];
        assert_eq!(find_peaks(&values, 0.0), vec![2]);
        let even = [0.0, 2.0, 2.0, 0.0];
        assert_eq!(find_peaks(&even, 0.0), vec![1]);
    }

    #[test]
    fn test_plateau_running_into_edge_is_not_a_peak() {
        let values = [0.0, 2.0, 2.0, 2.0];
        assert!(find_peaks(&values, 0.0).is_empty());
    }

    #[test]
    fn test_prominence_filter() {
        // the small bump at index 3 rises only 0.2 above its base
        let values = [0.0, 5.0, 1.0, 1.2, 1.0, 0.0];
        assert_eq!(find_peaks(&values, 0.0), vec![1, 3]);
        assert_eq!(find_peaks(&values, 0.5), vec![1]);
    }

    #[test]
    fn test_prominence_uses_higher_base() {
        // left base 0.0, right base 3.0 -> prominence 2.0
        let values = [0.0, 5.0, 3.0, 6.0];
        assert!((prominence(&values, 1) - 2.0).abs() < 1e-12);
        assert_eq!(find_peaks(&values, 2.0), vec![1]);
        assert!(find_peaks(&values, 2.5).is_empty());
    }
}
