//! Shannon entropy, Jensen-Shannon divergence and the maximum-entropy
//! partition search used by the entity-level detector (§4.4) and the group
//! corrector (§4.6).

/// Shannon entropy of `values`, normalised internally to sum to 1.
/// Zero-valued entries contribute nothing (the `x * log(x)` convention at
/// `x = 0`). Returns `0.0` for an all-zero or empty slice.
pub fn entropy(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    if sum <= 0.0 {
        return 0.0;
    }
    values
        .iter()
        .map(|v| v / sum)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum()
}

/// Updates the entropy of a growing prefix/suffix in O(1), given the
/// entropy `h_prev` and sum `sum_prev` of the run accumulated so far and the
/// next value `m` being folded in.
fn update_entropy_incremental(h_prev: f64, sum_prev: f64, m: f64) -> f64 {
    let s = sum_prev;
    if s + m <= 0.0 {
        return 0.0;
    }
    if s == 0.0 {
        // A single-element distribution always has zero entropy.
        return 0.0;
    }
    let p1 = s / (s + m);
    let p2 = m / (s + m);
    if p2 == 0.0 {
        p1 * h_prev - p1 * p1.ln()
    } else {
        p1 * h_prev - p1 * p1.ln() - p2 * p2.ln()
    }
}

/// Finds the split point `k` in `0..=n` maximising `max(H(p[:k]), H(p[k:]))`
/// and returns the length of the heavy prefix to retain.
///
/// `behaviours` must already be sorted in descending order. When the
/// suffix side wins the comparison, the prefix of equal length is retained
/// instead (§4.4 point 4) — the suffix of a descending-sorted vector is its
/// flat tail, which carries no coordination signal of its own.
///
/// Returns `None` if every value is zero (nothing to partition), or if the
/// winning split has length zero.
pub fn max_entropy_partition_len(behaviours: &[f64]) -> Option<usize> {
    let n = behaviours.len();
    let sum: f64 = behaviours.iter().sum();
    if sum == 0.0 {
        return None;
    }
    let p: Vec<f64> = behaviours.iter().map(|b| b / sum).collect();

    let mut prefix_h = vec![0.0; n + 1];
    let mut running_h = 0.0;
    let mut running_sum = 0.0;
    for k in 1..=n {
        running_h = update_entropy_incremental(running_h, running_sum, p[k - 1]);
        running_sum += p[k - 1];
        prefix_h[k] = running_h;
    }

    let mut suffix_h = vec![0.0; n + 1];
    let mut running_h = 0.0;
    let mut running_sum = 0.0;
    for k in 1..=n {
        running_h = update_entropy_incremental(running_h, running_sum, p[n - k]);
        running_sum += p[n - k];
        suffix_h[k] = running_h;
    }

    let mut max_value = -1.0_f64;
    let mut best_len: Option<usize> = None;
    for k in 0..=n {
        let h1 = prefix_h[k];
        let h2 = suffix_h[n - k];
        if h1 > h2 {
            if h1 > max_value {
                max_value = h1;
                best_len = Some(k);
            }
        } else if h2 > max_value {
            max_value = h2;
            // The split index `k` is always the retained prefix length, even
            // when the suffix side's entropy wins the comparison; `k == 0`
            // means the whole array counted as "suffix" beat an empty
            // prefix, so the retained prefix is the full array.
            best_len = Some(if k == 0 { n } else { k });
        }
    }

    best_len.filter(|&m| m > 0)
}

/// Population standard deviation (`ddof = 0`), matching numpy's default.
pub fn stdev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Cosine similarity of two equal-length vectors. Returns `0.0` if either
/// has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Jensen-Shannon divergence between two non-negative vectors, each
/// normalised internally to its own sum. Returns `0.0` if either sums to
/// zero, sidestepping the division that would otherwise blow up.
pub fn jsd(a: &[f64], b: &[f64]) -> f64 {
    let sum_a: f64 = a.iter().sum();
    let sum_b: f64 = b.iter().sum();
    if sum_a == 0.0 || sum_b == 0.0 {
        return 0.0;
    }
    let mid: Vec<f64> = a
        .iter()
        .zip(b)
        .map(|(x, y)| 0.5 * (x / sum_a + y / sum_b))
        .collect();
    entropy(&mid) - 0.5 * entropy(a) - 0.5 * entropy(b)
}
