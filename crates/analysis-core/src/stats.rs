//! Statistical primitives shared by every analysis stage.
//!
//! All functions are pure and total: degenerate input (empty slices,
//! mismatched lengths, zero variance, zero denominators) yields `None`
//! rather than a panic or a silently defaulted zero.

use statrs::statistics::Statistics;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (divides by n).
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Standard deviation as a percentage of the mean.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    Some(std_dev(values)? / m * 100.0)
}

/// Pearson correlation of two paired series.
pub fn correlation(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a * var_b).sqrt())
}

/// Beta of `dependent` against `reference`, measured on percentage changes.
///
/// A step contributes only when both series have a non-zero base value at
/// that step. At least two such steps are required.
pub fn beta(dependent: &[f64], reference: &[f64]) -> Option<f64> {
    if dependent.len() != reference.len() {
        return None;
    }

    let (dep_changes, ref_changes): (Vec<f64>, Vec<f64>) = dependent
        .windows(2)
        .zip(reference.windows(2))
        .filter(|(d, r)| d[0] != 0.0 && r[0] != 0.0)
        .map(|(d, r)| ((d[1] - d[0]) / d[0], (r[1] - r[0]) / r[0]))
        .unzip();

    if dep_changes.len() < 2 {
        return None;
    }

    let ref_variance = ref_changes.as_slice().population_variance();
    if ref_variance == 0.0 || !ref_variance.is_finite() {
        return None;
    }
    let covariance = dep_changes
        .as_slice()
        .population_covariance(ref_changes.as_slice());
    Some(covariance / ref_variance)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Growth of each element relative to the one after it, as a percentage
/// of the absolute base. Input is most-recent-first, so element `i` is
/// compared with its predecessor in time at `i + 1`. Zero bases are skipped.
pub fn growth_rates(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| {
            let (curr, prev) = (w[0], w[1]);
            if prev == 0.0 {
                None
            } else {
                Some((curr - prev) / prev.abs() * 100.0)
            }
        })
        .collect()
}

/// Mean after discarding `floor(n * fraction)` values from each end of the
/// sorted input. Small inputs where the floor is zero are not trimmed.
pub fn trimmed_mean(values: &[f64], fraction: f64) -> Option<f64> {
    trimmed_mean_with_min(values, fraction, 0)
}

/// Like [`trimmed_mean`], but drops at least `min_trim` values from each
/// end as long as something is left to average.
pub fn trimmed_mean_with_min(values: &[f64], fraction: f64, min_trim: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let trim = bounded_trim(sorted.len(), trim_count(sorted.len(), fraction).max(min_trim));
    mean(&sorted[trim..sorted.len() - trim])
}

/// Number of elements dropped from each side by [`trimmed_mean`].
pub fn trim_count(len: usize, fraction: f64) -> usize {
    bounded_trim(len, (len as f64 * fraction).floor() as usize)
}

// never trim everything away
fn bounded_trim(len: usize, trim: usize) -> usize {
    if trim * 2 >= len {
        (len.saturating_sub(1)) / 2
    } else {
        trim
    }
}

/// Percentile (0-100) of `value` in an ascending `sorted` slice: the index
/// of the first element >= `value` over the length, or 100 when every
/// element is smaller.
pub fn percentile_in_sorted(sorted: &[f64], value: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pct = match sorted.iter().position(|&v| v >= value) {
        Some(idx) => idx as f64 / sorted.len() as f64 * 100.0,
        None => 100.0,
    };
    Some(pct)
}

/// Linear interpolation through `points` (ascending x), clamped to the
/// first and last y outside the covered range.
pub fn piecewise_linear(x: f64, points: &[(f64, f64)]) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);
    if x <= first.0 {
        return Some(first.1);
    }
    if x >= last.0 {
        return Some(last.1);
    }
    points.windows(2).find_map(|seg| {
        let ((x0, y0), (x1, y1)) = (seg[0], seg[1]);
        if x >= x0 && x <= x1 {
            Some(y0 + (x - x0) / (x1 - x0) * (y1 - y0))
        } else {
            None
        }
    })
}
