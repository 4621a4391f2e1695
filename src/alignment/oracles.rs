//! Closed-form quantities an alignment matrix must agree with.
//!
//! These depend only on the emission sequence, not on the alignment
//! recurrence, so they serve as independent checks of both strategies.

/// Expected number of kept elements, `E[U] = sum_t e[t]`. Equals the total
/// mass of the alignment matrix.
pub fn expected_kept_count(emissions: &[f64]) -> f64 {
    emissions.iter().sum()
}

/// Distribution of the kept count `U`: element `k` is `P(U = k)` for
/// `k = 0..=T` (Poisson-binomial).
pub fn kept_count_distribution(emissions: &[f64]) -> Vec<f64> {
    let mut dist = Vec::with_capacity(emissions.len() + 1);
    dist.push(1.0);
    for &p in emissions {
        dist.push(0.0);
        for k in (1..dist.len()).rev() {
            dist[k] = dist[k] * (1.0 - p) + dist[k - 1] * p;
        }
        dist[0] *= 1.0 - p;
    }
    dist
}

/// `P(U >= m + 1)` for `m = 0..T`: the mass alignment row `m` must carry.
pub fn at_least_kept(emissions: &[f64]) -> Vec<f64> {
    let dist = kept_count_distribution(emissions);
    let mut tail = vec![0.0; emissions.len()];
    let mut acc = 0.0;
    for m in (0..emissions.len()).rev() {
        acc += dist[m + 1];
        tail[m] = acc;
    }
    tail
}
